// src/solver/operators.rs
//
// Finite-difference operators shared by the solver stages. All of them read
// ghost cells, so callers refresh ghosts before applying them.

use crate::boundary::{BoundaryConditionSpec, Component};
use crate::grid::{Grid, ScalarField, VelocityField};
use crate::utils::parallel::{for_each_row, sum_rows};

/// Five-point Laplacian of `field` at interior cell `(i, j)`.
#[inline]
pub fn laplacian_at(field: &ScalarField, i: usize, j: usize, inv_dx2: f64, inv_dy2: f64) -> f64 {
    let c = field[(i, j)];
    (field[(i + 1, j)] + field[(i - 1, j)] - 2.0 * c) * inv_dx2
        + (field[(i, j + 1)] + field[(i, j - 1)] - 2.0 * c) * inv_dy2
}

/// Centred divergence `(u[i+1]-u[i-1])/2dx + (v[j+1]-v[j-1])/2dy` at every interior cell.
///
/// # Examples
/// ```
/// use rs_navier::grid::{Grid, ScalarField, VelocityField};
/// use rs_navier::solver::divergence;
///
/// let grid = Grid::new(4, 4, 0.5, 0.5).unwrap();
/// // u = x has unit divergence everywhere.
/// let u = ScalarField::from_fn(&grid, |i, _| grid.cell_center(i, 1).0);
/// let mut velocity = VelocityField { u, v: grid.scalar_field() };
/// for j in 0..=5 {
///     velocity.u[(0, j)] = -0.25;
///     velocity.u[(5, j)] = 2.25;
/// }
/// let div = divergence(&grid, &velocity);
/// assert!((div[(1, 1)] - 1.0).abs() < 1e-12);
/// assert!((div[(4, 3)] - 1.0).abs() < 1e-12);
/// ```
pub fn divergence(grid: &Grid, velocity: &VelocityField) -> ScalarField {
    let mut div = grid.scalar_field();
    let nx = grid.nx();
    let ny = grid.ny();
    let half_inv_dx = 0.5 / grid.dx();
    let half_inv_dy = 0.5 / grid.dy();
    let (u, v) = (&velocity.u, &velocity.v);

    for_each_row(div.data_mut(), grid.row_len(), |j, row| {
        if j == 0 || j > ny {
            return;
        }
        for i in 1..=nx {
            row[i] = (u[(i + 1, j)] - u[(i - 1, j)]) * half_inv_dx
                + (v[(i, j + 1)] - v[(i, j - 1)]) * half_inv_dy;
        }
    });
    div
}

/// Pressure operator matched to the centred projection.
///
/// `L(p)` is the centred divergence of the centred gradient of `p`, where the
/// gradient's ghost values follow the homogeneous part of the velocity
/// boundary rules (the slope of each normal-component ghost rule). In the
/// interior this is the wide stencil `(p[i+2] - 2p[i] + p[i-2]) / 4dx²` in
/// each direction; the rows next to an edge pick up that edge's rule.
///
/// With provisional ghosts refreshed, `divergence(project(u*, p))` after a
/// ghost refresh equals `div(u*) - (dt/ρ)·L(p)`, so solving `L(p) = rhs`
/// to a tolerance bounds the divergence left by the projection.
#[derive(Debug, Clone, Copy)]
pub struct PoissonOperator {
    nx: usize,
    ny: usize,
    inv_4dx2: f64,
    inv_4dy2: f64,
    // Normal-velocity ghost slopes per edge.
    left: f64,
    right: f64,
    bottom: f64,
    top: f64,
    // Diagonal contributions of the edge rows, in units of 1/4h².
    diag_left: f64,
    diag_right: f64,
    diag_bottom: f64,
    diag_top: f64,
}

impl PoissonOperator {
    pub fn new(grid: &Grid, boundaries: &BoundaryConditionSpec) -> Self {
        let u = boundaries.for_component(Component::U);
        let v = boundaries.for_component(Component::V);
        let p = &boundaries.pressure;
        let (left, right) = (u.left.ghost_slope(true), u.right.ghost_slope(true));
        let (bottom, top) = (v.bottom.ghost_slope(true), v.top.ghost_slope(true));

        Self {
            nx: grid.nx(),
            ny: grid.ny(),
            inv_4dx2: 0.25 / (grid.dx() * grid.dx()),
            inv_4dy2: 0.25 / (grid.dy() * grid.dy()),
            left,
            right,
            bottom,
            top,
            diag_left: left * p.left.ghost_slope(false) - 1.0,
            diag_right: right * p.right.ghost_slope(false) - 1.0,
            diag_bottom: bottom * p.bottom.ghost_slope(false) - 1.0,
            diag_top: top * p.top.ghost_slope(false) - 1.0,
        }
    }

    /// `L(p)` at interior cell `(i, j)`. Reads the pressure ghost layer.
    #[inline]
    pub fn apply_at(&self, p: &ScalarField, i: usize, j: usize) -> f64 {
        let (nx, ny) = (self.nx, self.ny);
        // Centred pressure difference across an interior cell, 2h times the gradient.
        let gx = |k: usize| p[(k + 1, j)] - p[(k - 1, j)];
        let gy = |k: usize| p[(i, k + 1)] - p[(i, k - 1)];

        let east = if i == nx { self.right * gx(nx) } else { gx(i + 1) };
        let west = if i == 1 { self.left * gx(1) } else { gx(i - 1) };
        let north = if j == ny { self.top * gy(ny) } else { gy(j + 1) };
        let south = if j == 1 { self.bottom * gy(1) } else { gy(j - 1) };

        (east - west) * self.inv_4dx2 + (north - south) * self.inv_4dy2
    }

    /// `∂L(p)_(i,j) / ∂p_(i,j)`, including the dependence of edge ghosts on the cell.
    ///
    /// Zero for a cell whose edges leave it unconstrained, e.g. a corner
    /// between two outflow edges with zero-gradient pressure.
    #[inline]
    pub fn diagonal(&self, i: usize, j: usize) -> f64 {
        let x = if i == 1 {
            self.diag_left
        } else if i == self.nx {
            self.diag_right
        } else {
            -2.0
        };
        let y = if j == 1 {
            self.diag_bottom
        } else if j == self.ny {
            self.diag_top
        } else {
            -2.0
        };
        x * self.inv_4dx2 + y * self.inv_4dy2
    }

    /// L2 norm of `L(p) - rhs` over the interior.
    pub fn residual_norm(&self, grid: &Grid, pressure: &ScalarField, rhs: &ScalarField) -> f64 {
        let nx = grid.nx();
        sum_rows(grid.ny(), |r| {
            let j = r + 1;
            (1..=nx)
                .map(|i| {
                    let res = self.apply_at(pressure, i, j) - rhs[(i, j)];
                    res * res
                })
                .sum()
        })
        .sqrt()
    }
}
