// src/solver/projection.rs

use crate::grid::{Grid, ScalarField, VelocityField};
use crate::utils::parallel::for_each_row_pair;

/// Subtracts the pressure gradient from the provisional velocity:
/// `u = u* - (dt/ρ)·∂p/∂x`, `v = v* - (dt/ρ)·∂p/∂y`, centred differences.
///
/// `pressure` must have valid ghost cells. The returned field keeps the
/// provisional ghost layer; callers refresh it from the boundary conditions.
/// Non-finite pressure values propagate unchanged into the result.
///
/// When `pressure` solves `L(p) = (ρ/dt)·div(u*)` for the
/// [`PoissonOperator`](crate::solver::PoissonOperator) of the same boundary
/// conditions, the refreshed result has centred divergence
/// `-(dt/ρ)·(L(p) - rhs)`.
pub fn project(grid: &Grid, provisional: &VelocityField, pressure: &ScalarField, dt: f64, density: f64) -> VelocityField {
    let mut corrected = provisional.clone();
    let nx = grid.nx();
    let ny = grid.ny();
    let scale_x = 0.5 * dt / (density * grid.dx());
    let scale_y = 0.5 * dt / (density * grid.dy());
    let p = pressure;

    for_each_row_pair(corrected.u.data_mut(), corrected.v.data_mut(), grid.row_len(), |j, u_row, v_row| {
        if j == 0 || j > ny {
            return;
        }
        for i in 1..=nx {
            u_row[i] -= scale_x * (p[(i + 1, j)] - p[(i - 1, j)]);
            v_row[i] -= scale_y * (p[(i, j + 1)] - p[(i, j - 1)]);
        }
    });
    corrected
}
