// src/apis/easy_navier_stokes.rs

use crate::boundary::BoundaryConditionSpec;
use crate::grid::Grid;
use crate::integrator::{SimulationRun, SimulationState, Snapshot, StepOutcome, TimeIntegrator};
use crate::utils::{PhysicalParameters, SimulationError, SolverConfig};

/// Builds a ready-to-step simulation with default solver settings.
///
/// The initial condition is evaluated at every interior cell centre.
///
/// # Arguments
/// * `nx`, `ny` - Interior cell counts (at least 3 each)
/// * `dx`, `dy` - Cell spacing
/// * `nu` - Kinematic viscosity
/// * `dt` - Requested time step, clamped for stability on every step
/// * `boundary_spec` - Edge conditions for velocity and pressure
/// * `initial_condition` - `(x, y) -> (u0, v0)`
///
/// # Returns
/// * `Ok(TimeIntegrator)` - An idle integrator owning the initial state
/// * `Err(SimulationError::InvalidGeometry)` - If the grid is rejected
/// * `Err(SimulationError::InvalidParameter)` - If `nu`, `dt` or the initial condition are invalid
///
/// # Examples
/// ```
/// use rs_navier::apis::easy_navier_stokes::{create_simulation, snapshot, step};
/// use rs_navier::boundary::BoundaryConditionSpec;
/// use rs_navier::initial_conditions::central_block;
///
/// let mut sim = create_simulation(16, 16, 1.0 / 16.0, 1.0 / 16.0, 0.1, 0.01, BoundaryConditionSpec::no_slip_box(), central_block(1.0, 1.0, 1.0)).unwrap();
/// step(&mut sim).unwrap();
/// assert_eq!(snapshot(&sim).step_count, 1);
///
/// assert!(create_simulation(2, 16, 0.1, 0.1, 0.1, 0.01, BoundaryConditionSpec::no_slip_box(), |_, _| (0.0, 0.0)).is_err());
/// ```
#[allow(clippy::too_many_arguments)]
pub fn create_simulation<F>(
    nx: usize,
    ny: usize,
    dx: f64,
    dy: f64,
    nu: f64,
    dt: f64,
    boundary_spec: BoundaryConditionSpec,
    initial_condition: F,
) -> Result<TimeIntegrator, SimulationError>
where
    F: Fn(f64, f64) -> (f64, f64),
{
    let grid = Grid::new(nx, ny, dx, dy)?;
    let params = PhysicalParameters::new(nu, dt, None, None)?;
    create_configured_simulation(grid, params, SolverConfig::default(), boundary_spec, initial_condition)
}

/// Like [`create_simulation`] with explicit physical and solver settings.
pub fn create_configured_simulation<F>(
    grid: Grid,
    params: PhysicalParameters,
    config: SolverConfig,
    boundary_spec: BoundaryConditionSpec,
    initial_condition: F,
) -> Result<TimeIntegrator, SimulationError>
where
    F: Fn(f64, f64) -> (f64, f64),
{
    let state = SimulationState::new(&grid, initial_condition)?;
    TimeIntegrator::new(grid, params, config, boundary_spec, state)
}

/// Advances `simulation` by one step.
///
/// Fails when the simulation had already diverged, or with
/// [`SimulationError::Finished`] after a run ended until it is resumed. A
/// divergence during this step is returned as [`StepOutcome::Diverged`].
pub fn step(simulation: &mut TimeIntegrator) -> Result<StepOutcome, SimulationError> {
    simulation.step().map(|report| report.outcome)
}

/// Lazily runs `n_steps` steps, yielding every `every_k`-th snapshot and the last one.
pub fn run(simulation: &mut TimeIntegrator, n_steps: usize, every_k: usize) -> SimulationRun<'_> {
    simulation.run(n_steps, every_k)
}

pub fn snapshot(simulation: &TimeIntegrator) -> Snapshot {
    simulation.snapshot()
}
