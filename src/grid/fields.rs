// src/grid/fields.rs

use std::ops::{Index, IndexMut};

use crate::grid::Grid;
use crate::utils::parallel::{max_rows, sum_rows};

/// A cell-centred scalar field with a one-cell ghost border.
///
/// Storage is `(nx + 2) × (ny + 2)` values, row-major, indexed by `(i, j)` with
/// interior cells at `1..=nx × 1..=ny`.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarField {
    nx: usize,
    ny: usize,
    data: Vec<f64>,
}

/// Pressure correction values share the scalar layout.
pub type PressureField = ScalarField;

impl ScalarField {
    pub fn zeros(grid: &Grid) -> Self {
        Self {
            nx: grid.nx(),
            ny: grid.ny(),
            data: vec![0.0; grid.storage_len()],
        }
    }

    /// Builds a field whose interior cell `(i, j)` holds `f(i, j)`. Ghost cells start at zero.
    pub fn from_fn<F>(grid: &Grid, f: F) -> Self
    where
        F: Fn(usize, usize) -> f64,
    {
        let mut field = Self::zeros(grid);
        for (i, j) in grid.interior_indices() {
            field[(i, j)] = f(i, j);
        }
        field
    }

    pub fn nx(&self) -> usize {
        self.nx
    }

    pub fn ny(&self) -> usize {
        self.ny
    }

    #[inline]
    pub fn row_len(&self) -> usize {
        self.nx + 2
    }

    /// True when the field was allocated for `grid`'s cell counts.
    pub fn matches(&self, grid: &Grid) -> bool {
        self.nx == grid.nx() && self.ny == grid.ny()
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.data[j * self.row_len() + i]
    }

    #[inline]
    pub fn set(&mut self, i: usize, j: usize, value: f64) {
        let row_len = self.row_len();
        self.data[j * row_len + i] = value;
    }

    pub fn data(&self) -> &[f64] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [f64] {
        &mut self.data
    }

    /// Exchanges the backing storage with `other`, which must have the same length.
    pub fn swap_data(&mut self, other: &mut Vec<f64>) {
        debug_assert_eq!(self.data.len(), other.len());
        std::mem::swap(&mut self.data, other);
    }

    pub fn fill(&mut self, value: f64) {
        self.data.iter_mut().for_each(|x| *x = value);
    }

    /// Interior slice of storage row `j`.
    #[inline]
    fn interior_row(&self, j: usize) -> &[f64] {
        let start = j * self.row_len() + 1;
        &self.data[start..start + self.nx]
    }

    /// Largest absolute interior value. NaN if any interior value is NaN.
    pub fn max_abs(&self) -> f64 {
        max_rows(self.ny, |r| {
            self.interior_row(r + 1).iter().fold(0.0, |acc: f64, &x| {
                if x.is_nan() || acc.is_nan() { f64::NAN } else { acc.max(x.abs()) }
            })
        })
    }

    pub fn all_finite(&self) -> bool {
        (1..=self.ny).all(|j| self.interior_row(j).iter().all(|x| x.is_finite()))
    }

    pub fn sum(&self) -> f64 {
        sum_rows(self.ny, |r| self.interior_row(r + 1).iter().sum())
    }

    pub fn mean(&self) -> f64 {
        self.sum() / (self.nx * self.ny) as f64
    }

    /// Discrete L2 norm `sqrt(Σ x²)` over interior cells.
    pub fn l2_norm(&self) -> f64 {
        sum_rows(self.ny, |r| self.interior_row(r + 1).iter().map(|x| x * x).sum()).sqrt()
    }

    /// Adds `value` to every interior cell.
    pub fn shift(&mut self, value: f64) {
        let nx = self.nx;
        let row_len = self.row_len();
        for j in 1..=self.ny {
            let start = j * row_len + 1;
            self.data[start..start + nx].iter_mut().for_each(|x| *x += value);
        }
    }

    /// Multiplies every stored value, ghosts included, by `factor`.
    pub fn scale(&mut self, factor: f64) {
        self.data.iter_mut().for_each(|x| *x *= factor);
    }

    /// Largest absolute interior difference to `other`.
    pub fn max_abs_diff(&self, other: &ScalarField) -> f64 {
        debug_assert_eq!(self.data.len(), other.data.len());
        max_rows(self.ny, |r| {
            self.interior_row(r + 1)
                .iter()
                .zip(other.interior_row(r + 1))
                .fold(0.0, |acc: f64, (a, b)| acc.max((a - b).abs()))
        })
    }

    /// Deep copy of the interior as `values[i - 1][j - 1]`.
    pub fn to_interior_array(&self) -> Vec<Vec<f64>> {
        (1..=self.nx)
            .map(|i| (1..=self.ny).map(|j| self.get(i, j)).collect())
            .collect()
    }
}

impl Index<(usize, usize)> for ScalarField {
    type Output = f64;

    fn index(&self, (i, j): (usize, usize)) -> &f64 {
        &self.data[j * (self.nx + 2) + i]
    }
}

impl IndexMut<(usize, usize)> for ScalarField {
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut f64 {
        let row_len = self.nx + 2;
        &mut self.data[j * row_len + i]
    }
}

/// Horizontal and vertical velocity components on the same ghost-padded layout.
#[derive(Debug, Clone, PartialEq)]
pub struct VelocityField {
    pub u: ScalarField,
    pub v: ScalarField,
}

impl VelocityField {
    pub fn zeros(grid: &Grid) -> Self {
        Self {
            u: ScalarField::zeros(grid),
            v: ScalarField::zeros(grid),
        }
    }

    pub fn matches(&self, grid: &Grid) -> bool {
        self.u.matches(grid) && self.v.matches(grid)
    }

    /// `max(|u|, |v|)` over the interior, the speed used by the advective time-step bound.
    pub fn max_component_abs(&self) -> f64 {
        let (u, v) = (self.u.max_abs(), self.v.max_abs());
        if u.is_nan() || v.is_nan() { f64::NAN } else { u.max(v) }
    }

    pub fn all_finite(&self) -> bool {
        self.u.all_finite() && self.v.all_finite()
    }

    /// Largest absolute change of either component relative to `other`.
    pub fn max_abs_diff(&self, other: &VelocityField) -> f64 {
        self.u.max_abs_diff(&other.u).max(self.v.max_abs_diff(&other.v))
    }
}
