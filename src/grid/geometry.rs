// src/grid/geometry.rs

use crate::boundary::{self, Component, EdgeConditions};
use crate::grid::ScalarField;
use crate::utils::{SimulationError, MIN_CELLS};

/// Immutable geometry of a uniform rectangular grid.
///
/// Cells are addressed with 1-based interior indices `i in 1..=nx`,
/// `j in 1..=ny`. Index `0` and `nx + 1` (resp. `ny + 1`) address the ghost
/// layer that stores boundary values, so storage is `(nx + 2) × (ny + 2)`,
/// laid out row-major with `i` varying fastest.
///
/// # Fields
/// * `nx`, `ny` - Interior cell counts
/// * `dx`, `dy` - Cell spacing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Grid {
    nx: usize,
    ny: usize,
    dx: f64,
    dy: f64,
}

impl Grid {
    /// Creates a grid with `nx × ny` interior cells of size `dx × dy`.
    ///
    /// # Returns
    /// * `Ok(Grid)` - If the geometry is valid
    /// * `Err(SimulationError::InvalidGeometry)` - If `nx < 3`, `ny < 3`, or a spacing is not positive
    ///
    /// # Examples
    /// ```
    /// use rs_navier::grid::Grid;
    ///
    /// let grid = Grid::new(32, 32, 1.0 / 32.0, 1.0 / 32.0).unwrap();
    /// assert_eq!(grid.storage_len(), 34 * 34);
    ///
    /// // Too few cells for an interior stencil.
    /// assert!(Grid::new(2, 32, 0.1, 0.1).is_err());
    /// ```
    pub fn new(nx: usize, ny: usize, dx: f64, dy: f64) -> Result<Self, SimulationError> {
        if nx < MIN_CELLS || ny < MIN_CELLS {
            return Err(SimulationError::InvalidGeometry(format!(
                "need at least {} cells per axis, got {}x{}",
                MIN_CELLS, nx, ny
            )));
        }
        if !(dx.is_finite() && dx > 0.0) || !(dy.is_finite() && dy > 0.0) {
            return Err(SimulationError::InvalidGeometry(format!(
                "cell spacing must be positive, got dx={} dy={}",
                dx, dy
            )));
        }
        Ok(Self { nx, ny, dx, dy })
    }

    pub fn nx(&self) -> usize {
        self.nx
    }

    pub fn ny(&self) -> usize {
        self.ny
    }

    pub fn dx(&self) -> f64 {
        self.dx
    }

    pub fn dy(&self) -> f64 {
        self.dy
    }

    /// Length of one storage row, ghost cells included.
    pub fn row_len(&self) -> usize {
        self.nx + 2
    }

    /// Number of storage rows, ghost rows included.
    pub fn rows(&self) -> usize {
        self.ny + 2
    }

    pub fn storage_len(&self) -> usize {
        self.row_len() * self.rows()
    }

    /// Physical extent `(nx·dx, ny·dy)` of the domain.
    pub fn extent(&self) -> (f64, f64) {
        (self.nx as f64 * self.dx, self.ny as f64 * self.dy)
    }

    pub fn min_spacing(&self) -> f64 {
        self.dx.min(self.dy)
    }

    /// Converts 2D storage coordinates to a 1D index.
    #[inline]
    pub fn index(&self, i: usize, j: usize) -> usize {
        j * self.row_len() + i
    }

    /// Physical coordinates of the centre of interior cell `(i, j)`.
    pub fn cell_center(&self, i: usize, j: usize) -> (f64, f64) {
        ((i as f64 - 0.5) * self.dx, (j as f64 - 0.5) * self.dy)
    }

    /// Lazily enumerates interior cells `(i, j)`, `i` varying fastest.
    /// Every call starts a fresh sequence.
    ///
    /// # Examples
    /// ```
    /// use rs_navier::grid::Grid;
    ///
    /// let grid = Grid::new(3, 4, 1.0, 1.0).unwrap();
    /// let cells: Vec<_> = grid.interior_indices().collect();
    /// assert_eq!(cells.len(), 12);
    /// assert_eq!(cells[0], (1, 1));
    /// assert_eq!(cells[3], (1, 2));
    /// assert_eq!(cells.last(), Some(&(3, 4)));
    /// ```
    pub fn interior_indices(&self) -> InteriorIndices {
        InteriorIndices {
            nx: self.nx,
            ny: self.ny,
            i: 1,
            j: 1,
        }
    }

    /// Allocates a zeroed field shaped for this grid.
    pub fn scalar_field(&self) -> ScalarField {
        ScalarField::zeros(self)
    }

    /// Writes the ghost layer of `field` from the interior according to `edges`.
    pub fn apply_ghost(&self, field: &mut ScalarField, edges: &EdgeConditions, component: Component) {
        boundary::apply_ghost(self, field, edges, component);
    }
}

/// Iterator over the interior cells of a [`Grid`].
#[derive(Debug, Clone)]
pub struct InteriorIndices {
    nx: usize,
    ny: usize,
    i: usize,
    j: usize,
}

impl Iterator for InteriorIndices {
    type Item = (usize, usize);

    fn next(&mut self) -> Option<Self::Item> {
        if self.j > self.ny {
            return None;
        }
        let cell = (self.i, self.j);
        self.i += 1;
        if self.i > self.nx {
            self.i = 1;
            self.j += 1;
        }
        Some(cell)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = if self.j > self.ny {
            0
        } else {
            (self.ny - self.j) * self.nx + (self.nx - self.i + 1)
        };
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for InteriorIndices {}
