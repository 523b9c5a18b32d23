// src/diagnostics/flow_metrics.rs

use crate::grid::{Grid, ScalarField, VelocityField};
use crate::integrator::SimulationState;
use crate::solver::divergence;
use crate::utils::parallel::{for_each_row, max_rows, sum_rows};
use crate::utils::SimulationError;

/// Total kinetic energy `½ Σ (u² + v²) dx dy` per unit density over the interior.
pub fn kinetic_energy(grid: &Grid, velocity: &VelocityField) -> f64 {
    let (u, v) = (&velocity.u, &velocity.v);
    let nx = grid.nx();
    let sum = sum_rows(grid.ny(), |r| {
        let j = r + 1;
        (1..=nx).map(|i| u[(i, j)] * u[(i, j)] + v[(i, j)] * v[(i, j)]).sum()
    });
    0.5 * sum * grid.dx() * grid.dy()
}

/// Largest `sqrt(u² + v²)` over the interior.
pub fn max_speed(grid: &Grid, velocity: &VelocityField) -> f64 {
    let (u, v) = (&velocity.u, &velocity.v);
    let nx = grid.nx();
    max_rows(grid.ny(), |r| {
        let j = r + 1;
        (1..=nx).fold(0.0, |acc: f64, i| acc.max(u[(i, j)].hypot(v[(i, j)])))
    })
}

pub fn mean_speed(grid: &Grid, velocity: &VelocityField) -> f64 {
    let (u, v) = (&velocity.u, &velocity.v);
    let nx = grid.nx();
    let total = sum_rows(grid.ny(), |r| {
        let j = r + 1;
        (1..=nx).map(|i| u[(i, j)].hypot(v[(i, j)])).sum()
    });
    total / (grid.nx() * grid.ny()) as f64
}

/// L2 norm of the centred cell divergence.
pub fn divergence_l2(grid: &Grid, velocity: &VelocityField) -> f64 {
    divergence(grid, velocity).l2_norm()
}

/// Centred vorticity `∂v/∂x - ∂u/∂y` at every interior cell. Ghost cells must be current.
///
/// # Examples
/// ```
/// use rs_navier::diagnostics::vorticity;
/// use rs_navier::grid::{Grid, VelocityField};
///
/// // Solid-body rotation u = -y, v = x has vorticity 2.
/// let grid = Grid::new(4, 4, 0.25, 0.25).unwrap();
/// let mut velocity = VelocityField::zeros(&grid);
/// for j in 0..6 {
///     for i in 0..6 {
///         let (x, y) = grid.cell_center(i, j);
///         velocity.u[(i, j)] = -y;
///         velocity.v[(i, j)] = x;
///     }
/// }
/// let omega = vorticity(&grid, &velocity);
/// assert!((omega[(2, 3)] - 2.0).abs() < 1e-12);
/// ```
pub fn vorticity(grid: &Grid, velocity: &VelocityField) -> ScalarField {
    let mut curl = grid.scalar_field();
    let nx = grid.nx();
    let ny = grid.ny();
    let half_inv_dx = 0.5 / grid.dx();
    let half_inv_dy = 0.5 / grid.dy();
    let (u, v) = (&velocity.u, &velocity.v);

    for_each_row(curl.data_mut(), grid.row_len(), |j, row| {
        if j == 0 || j > ny {
            return;
        }
        for i in 1..=nx {
            row[i] = (v[(i + 1, j)] - v[(i - 1, j)]) * half_inv_dx - (u[(i, j + 1)] - u[(i, j - 1)]) * half_inv_dy;
        }
    });
    curl
}

/// Checks that every interior value of `state` is finite.
///
/// # Returns
/// * `Ok(())` - If the state is usable
/// * `Err(SimulationError::Diverged)` - Tagged with the state's step count otherwise
pub fn validate_state(state: &SimulationState) -> Result<(), SimulationError> {
    if state.velocity.all_finite() && state.pressure.all_finite() && state.time.is_finite() {
        Ok(())
    } else {
        Err(SimulationError::Diverged { step: state.step_count })
    }
}
