// src/initial_conditions/profiles.rs
//
// Ready-made `(x, y) -> (u0, v0)` initial conditions. Any closure of that
// shape works with `SimulationState::new`; these cover the common cases.

use std::f64::consts::PI;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::grid::Grid;

/// A fluid at rest.
pub fn zero() -> impl Fn(f64, f64) -> (f64, f64) {
    |_, _| (0.0, 0.0)
}

/// Horizontal velocity `speed` inside the central quarter `[lx/4, 3lx/4] × [ly/4, 3ly/4]`
/// of an `lx × ly` domain, zero elsewhere.
///
/// # Examples
/// ```
/// use rs_navier::initial_conditions::central_block;
///
/// let ic = central_block(1.0, 1.0, 1.0);
/// assert_eq!(ic(0.5, 0.5), (1.0, 0.0));
/// assert_eq!(ic(0.1, 0.5), (0.0, 0.0));
/// ```
pub fn central_block(lx: f64, ly: f64, speed: f64) -> impl Fn(f64, f64) -> (f64, f64) {
    move |x, y| {
        let inside = x >= 0.25 * lx && x <= 0.75 * lx && y >= 0.25 * ly && y <= 0.75 * ly;
        if inside { (speed, 0.0) } else { (0.0, 0.0) }
    }
}

/// A single divergence-free Taylor-Green cell filling the `lx × ly` box:
/// `u = A sin(πx/lx) cos(πy/ly)`, `v = -A (ly/lx) cos(πx/lx) sin(πy/ly)`.
///
/// The normal velocity vanishes on all four walls.
pub fn taylor_green(lx: f64, ly: f64, amplitude: f64) -> impl Fn(f64, f64) -> (f64, f64) {
    let (kx, ky) = (PI / lx, PI / ly);
    let aspect = ly / lx;
    move |x, y| {
        let u = amplitude * (kx * x).sin() * (ky * y).cos();
        let v = -amplitude * aspect * (kx * x).cos() * (ky * y).sin();
        (u, v)
    }
}

/// Reproducible uniform noise in `[-amplitude, amplitude)` per interior cell of `grid`.
///
/// The same seed always gives the same field. Points outside the grid map to
/// the nearest cell.
pub fn seeded_noise(seed: u64, amplitude: f64, grid: &Grid) -> impl Fn(f64, f64) -> (f64, f64) {
    let mut rng = StdRng::seed_from_u64(seed);
    let (nx, ny) = (grid.nx(), grid.ny());
    let (dx, dy) = (grid.dx(), grid.dy());
    let values: Vec<(f64, f64)> = (0..nx * ny)
        .map(|_| {
            if amplitude > 0.0 {
                (rng.random_range(-amplitude..amplitude), rng.random_range(-amplitude..amplitude))
            } else {
                (0.0, 0.0)
            }
        })
        .collect();

    move |x, y| {
        let i = ((x / dx).floor().max(0.0) as usize).min(nx - 1);
        let j = ((y / dy).floor().max(0.0) as usize).min(ny - 1);
        values[j * nx + i]
    }
}
