// src/integrator/state.rs

use crate::grid::{Grid, PressureField, ScalarField, VelocityField};
use crate::solver::PoissonReport;
use crate::utils::SimulationError;

/// The mutable state advanced by the time integrator.
///
/// # Fields
/// * `velocity` - Velocity at cell centres, ghost layer included
/// * `pressure` - Pressure correction from the most recent step
/// * `time` - Elapsed simulated time
/// * `step_count` - Number of completed steps
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationState {
    pub velocity: VelocityField,
    pub pressure: PressureField,
    pub time: f64,
    pub step_count: usize,
}

impl SimulationState {
    /// Creates a state from an initial condition `(x, y) -> (u0, v0)` evaluated at
    /// every interior cell centre. Pressure starts at zero.
    ///
    /// # Returns
    /// * `Ok(SimulationState)` - The initial state at `time = 0`
    /// * `Err(SimulationError::InvalidParameter)` - If the initial condition yields a non-finite value
    ///
    /// # Examples
    /// ```
    /// use rs_navier::grid::Grid;
    /// use rs_navier::integrator::SimulationState;
    ///
    /// let grid = Grid::new(4, 4, 0.25, 0.25).unwrap();
    /// let state = SimulationState::new(&grid, |x, _| (x, 0.0)).unwrap();
    /// assert_eq!(state.velocity.u[(1, 1)], 0.125);
    ///
    /// assert!(SimulationState::new(&grid, |_, _| (f64::NAN, 0.0)).is_err());
    /// ```
    pub fn new<F>(grid: &Grid, initial_condition: F) -> Result<Self, SimulationError>
    where
        F: Fn(f64, f64) -> (f64, f64),
    {
        let mut velocity = VelocityField::zeros(grid);
        for (i, j) in grid.interior_indices() {
            let (x, y) = grid.cell_center(i, j);
            let (u0, v0) = initial_condition(x, y);
            if !u0.is_finite() || !v0.is_finite() {
                return Err(SimulationError::InvalidParameter(format!(
                    "initial condition is not finite at ({}, {}): ({}, {})",
                    x, y, u0, v0
                )));
            }
            velocity.u[(i, j)] = u0;
            velocity.v[(i, j)] = v0;
        }
        Ok(Self {
            velocity,
            pressure: grid.scalar_field(),
            time: 0.0,
            step_count: 0,
        })
    }

    /// A fluid at rest.
    pub fn at_rest(grid: &Grid) -> Self {
        Self {
            velocity: VelocityField::zeros(grid),
            pressure: grid.scalar_field(),
            time: 0.0,
            step_count: 0,
        }
    }

    /// Wraps existing fields, checking that they fit `grid` and are finite.
    pub fn from_fields(grid: &Grid, velocity: VelocityField, pressure: ScalarField) -> Result<Self, SimulationError> {
        if !velocity.matches(grid) || !pressure.matches(grid) {
            return Err(SimulationError::InvalidParameter(format!(
                "field shape does not match a {}x{} grid",
                grid.nx(),
                grid.ny()
            )));
        }
        if !velocity.all_finite() || !pressure.all_finite() {
            return Err(SimulationError::InvalidParameter("initial fields contain non-finite values".to_string()));
        }
        Ok(Self { velocity, pressure, time: 0.0, step_count: 0 })
    }

    pub fn matches(&self, grid: &Grid) -> bool {
        self.velocity.matches(grid) && self.pressure.matches(grid)
    }
}

/// A deep, read-only copy of a [`SimulationState`] for plotting or export.
///
/// Arrays are indexed `[i - 1][j - 1]` over interior cells only.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub u: Vec<Vec<f64>>,
    pub v: Vec<Vec<f64>>,
    pub p: Vec<Vec<f64>>,
    pub time: f64,
    pub step_count: usize,
    /// Whether the pressure solve of the last step met its tolerance.
    pub converged: bool,
    /// Relative residual of the last pressure solve.
    pub residual: f64,
}

impl Snapshot {
    /// Copies `state`. Without a pressure solve yet, `converged` is `true` and `residual` zero.
    pub fn capture(state: &SimulationState, poisson: Option<&PoissonReport>) -> Self {
        let (converged, residual) = poisson.map_or((true, 0.0), |report| (report.converged, report.residual));
        Self {
            u: state.velocity.u.to_interior_array(),
            v: state.velocity.v.to_interior_array(),
            p: state.pressure.to_interior_array(),
            time: state.time,
            step_count: state.step_count,
            converged,
            residual,
        }
    }

    pub fn nx(&self) -> usize {
        self.u.len()
    }

    pub fn ny(&self) -> usize {
        self.u.first().map_or(0, |column| column.len())
    }

    /// Largest velocity magnitude `sqrt(u² + v²)` in the snapshot.
    pub fn max_speed(&self) -> f64 {
        self.u
            .iter()
            .flatten()
            .zip(self.v.iter().flatten())
            .fold(0.0, |acc: f64, (u, v)| acc.max((u * u + v * v).sqrt()))
    }
}
