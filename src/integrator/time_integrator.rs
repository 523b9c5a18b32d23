// src/integrator/time_integrator.rs

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{debug, error, info, warn};

use crate::boundary::{apply_velocity_ghosts, BoundaryConditionSpec, Component};
use crate::grid::{Grid, VelocityField};
use crate::integrator::{SimulationState, Snapshot};
use crate::solver::{poisson_rhs, project, AdvectionDiffusionStep, PoissonReport, PressureSolver};
use crate::utils::{PhysicalParameters, SimulationError, SolverConfig};

/// Lifecycle of a [`TimeIntegrator`].
///
/// `Converged`, `Diverged` and `StepLimitReached` end a run, and
/// [`TimeIntegrator::step`] refuses to advance from any of them.
/// [`TimeIntegrator::resume`] or a new [`TimeIntegrator::run`] moves a
/// converged or step-limited integrator back to `Stepping`; `Diverged` is final.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegratorStatus {
    /// No step taken yet.
    Idle,
    Stepping,
    /// The velocity stopped changing by more than the steady-state tolerance.
    Converged,
    /// A step produced a blown-up or non-finite field. Terminal.
    Diverged,
    /// The requested number of steps completed.
    StepLimitReached,
}

impl IntegratorStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            IntegratorStatus::Converged | IntegratorStatus::Diverged | IntegratorStatus::StepLimitReached
        )
    }
}

/// How a single step ended.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepOutcome {
    Continued,
    /// The step did not complete; the state is unchanged.
    Diverged,
    /// The step completed but the pressure solve stopped at `max_iterations`
    /// with the given relative residual.
    NumericalWarning { residual: f64 },
}

/// Pipeline stage whose output contained a non-finite value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DivergenceStage {
    AdvectionDiffusion,
    Projection,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DivergenceCause {
    BlowUp { max_magnitude: f64, threshold: f64 },
    NonFinite { stage: DivergenceStage },
}

/// Records the step at which the integrator diverged.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DivergenceReport {
    pub step: usize,
    pub cause: DivergenceCause,
}

impl DivergenceReport {
    pub fn error(&self) -> SimulationError {
        match self.cause {
            DivergenceCause::BlowUp { max_magnitude, threshold } => SimulationError::NumericalInstability {
                step: self.step,
                max_magnitude,
                threshold,
            },
            DivergenceCause::NonFinite { .. } => SimulationError::Diverged { step: self.step },
        }
    }
}

/// Result of one call to [`TimeIntegrator::step`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepReport {
    /// Index of the step attempted (1-based).
    pub step: usize,
    /// Time step after the stability clamp.
    pub dt_used: f64,
    /// `None` when the step diverged before the pressure solve.
    pub poisson: Option<PoissonReport>,
    pub outcome: StepOutcome,
}

/// Largest stable time step for `velocity`:
/// `0.5 · min(h²/(4ν), h/max(|u|, |v|))` with `h = min(dx, dy)`.
///
/// Either bound is infinite when its denominator vanishes, so a fluid at rest
/// with zero viscosity is unconstrained.
pub fn stability_bound(grid: &Grid, velocity: &VelocityField, nu: f64) -> f64 {
    let h = grid.min_spacing();
    let diffusive = if nu > 0.0 { h * h / (4.0 * nu) } else { f64::INFINITY };
    let speed = velocity.max_component_abs();
    let advective = if speed > 0.0 { h / speed } else { f64::INFINITY };
    0.5 * diffusive.min(advective)
}

/// The requested `dt` clamped to [`stability_bound`].
///
/// # Examples
/// ```
/// use rs_navier::grid::{Grid, VelocityField};
/// use rs_navier::integrator::stable_dt;
/// use rs_navier::utils::PhysicalParameters;
///
/// let grid = Grid::new(32, 32, 1.0 / 32.0, 1.0 / 32.0).unwrap();
/// let params = PhysicalParameters::new(0.1, 0.01, None, None).unwrap();
/// let dt = stable_dt(&grid, &VelocityField::zeros(&grid), &params);
/// assert!((dt - 0.5 * (1.0 / 1024.0) / 0.4).abs() < 1e-15);
/// ```
pub fn stable_dt(grid: &Grid, velocity: &VelocityField, params: &PhysicalParameters) -> f64 {
    params.dt.min(stability_bound(grid, velocity, params.nu))
}

/// Drives the projection pipeline over a [`SimulationState`] it exclusively owns.
///
/// Each step runs advection-diffusion, the pressure solve, the projection and
/// a ghost refresh. A step that diverges is not committed: the state stays at
/// the last valid step and the integrator refuses further steps.
#[derive(Debug, Clone)]
pub struct TimeIntegrator {
    grid: Grid,
    params: PhysicalParameters,
    config: SolverConfig,
    boundaries: BoundaryConditionSpec,
    state: SimulationState,
    status: IntegratorStatus,
    advection: AdvectionDiffusionStep,
    pressure_solver: PressureSolver,
    last_poisson: Option<PoissonReport>,
    divergence: Option<DivergenceReport>,
}

impl TimeIntegrator {
    /// Validates the configuration and takes ownership of `state`, filling its ghost cells.
    ///
    /// # Returns
    /// * `Ok(TimeIntegrator)` - An integrator in the `Idle` state
    /// * `Err(SimulationError::InvalidParameter)` - If parameters are out of range or the state does not fit `grid`
    pub fn new(
        grid: Grid,
        params: PhysicalParameters,
        config: SolverConfig,
        boundaries: BoundaryConditionSpec,
        mut state: SimulationState,
    ) -> Result<Self, SimulationError> {
        params.validate()?;
        config.validate()?;
        if !state.matches(&grid) {
            return Err(SimulationError::InvalidParameter(format!(
                "state does not match a {}x{} grid",
                grid.nx(),
                grid.ny()
            )));
        }
        apply_velocity_ghosts(&grid, &mut state.velocity, &boundaries);
        grid.apply_ghost(&mut state.pressure, boundaries.for_component(Component::Scalar), Component::Scalar);

        Ok(Self {
            grid,
            params,
            config,
            boundaries,
            state,
            status: IntegratorStatus::Idle,
            advection: AdvectionDiffusionStep::from_config(&config),
            pressure_solver: PressureSolver::from_config(&config),
            last_poisson: None,
            divergence: None,
        })
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn params(&self) -> &PhysicalParameters {
        &self.params
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    pub fn boundaries(&self) -> &BoundaryConditionSpec {
        &self.boundaries
    }

    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    pub fn status(&self) -> IntegratorStatus {
        self.status
    }

    pub fn divergence(&self) -> Option<&DivergenceReport> {
        self.divergence.as_ref()
    }

    pub fn last_poisson(&self) -> Option<&PoissonReport> {
        self.last_poisson.as_ref()
    }

    /// Deep copy of the current state for consumers outside the integrator.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(&self.state, self.last_poisson.as_ref())
    }

    /// Gives the state back, ending the integrator.
    pub fn into_state(self) -> SimulationState {
        self.state
    }

    /// Advances the state by one clamped time step.
    ///
    /// # Returns
    /// * `Ok(StepReport)` - The step ran; a divergence during it is reported as
    ///   [`StepOutcome::Diverged`] and moves the integrator to `Diverged`
    /// * `Err(SimulationError::Finished)` - If the run already converged or reached its step limit
    /// * `Err(SimulationError)` - The divergence error, if the integrator had already diverged
    ///
    /// # Examples
    /// ```
    /// use rs_navier::boundary::BoundaryConditionSpec;
    /// use rs_navier::grid::Grid;
    /// use rs_navier::integrator::{IntegratorStatus, SimulationState, StepOutcome, TimeIntegrator};
    /// use rs_navier::utils::{PhysicalParameters, SolverConfig};
    ///
    /// let grid = Grid::new(8, 8, 0.125, 0.125).unwrap();
    /// let state = SimulationState::at_rest(&grid);
    /// let params = PhysicalParameters::new(0.1, 0.01, None, None).unwrap();
    /// let mut integrator = TimeIntegrator::new(grid, params, SolverConfig::default(), BoundaryConditionSpec::no_slip_box(), state).unwrap();
    ///
    /// let report = integrator.step().unwrap();
    /// assert_eq!(report.outcome, StepOutcome::Continued);
    /// assert_eq!(integrator.status(), IntegratorStatus::Stepping);
    /// assert_eq!(integrator.state().step_count, 1);
    /// ```
    pub fn step(&mut self) -> Result<StepReport, SimulationError> {
        if let Some(report) = &self.divergence {
            return Err(report.error());
        }
        if self.status.is_terminal() {
            return Err(SimulationError::Finished { step: self.state.step_count });
        }
        self.status = IntegratorStatus::Stepping;

        let grid = self.grid;
        let step = self.state.step_count + 1;
        let dt = stable_dt(&grid, &self.state.velocity, &self.params);
        if dt < self.params.dt {
            debug!("Step {}: dt clamped from {:e} to {:e}", step, self.params.dt, dt);
        }

        let mut provisional = match self.advection.apply(&grid, &self.state.velocity, &self.params, dt) {
            Ok(provisional) => provisional,
            Err(SimulationError::NumericalInstability { max_magnitude, threshold, .. }) => {
                return Ok(self.diverge(step, dt, None, DivergenceCause::BlowUp { max_magnitude, threshold }));
            }
            Err(_) => {
                let cause = DivergenceCause::NonFinite { stage: DivergenceStage::AdvectionDiffusion };
                return Ok(self.diverge(step, dt, None, cause));
            }
        };
        apply_velocity_ghosts(&grid, &mut provisional, &self.boundaries);

        let density = self.params.density;
        let rhs = poisson_rhs(&grid, &provisional, dt, density);
        let mut pressure = self.state.pressure.clone();
        let poisson = self.pressure_solver.solve(&grid, &rhs, &mut pressure, &self.boundaries);

        let mut velocity = project(&grid, &provisional, &pressure, dt, density);
        let max_magnitude = velocity.max_component_abs();
        if !max_magnitude.is_finite() || !pressure.all_finite() {
            let cause = DivergenceCause::NonFinite { stage: DivergenceStage::Projection };
            return Ok(self.diverge(step, dt, Some(poisson), cause));
        }
        if max_magnitude > self.config.blowup_threshold {
            let cause = DivergenceCause::BlowUp { max_magnitude, threshold: self.config.blowup_threshold };
            return Ok(self.diverge(step, dt, Some(poisson), cause));
        }
        apply_velocity_ghosts(&grid, &mut velocity, &self.boundaries);

        let change_rate = velocity.max_abs_diff(&self.state.velocity) / dt;
        self.state.velocity = velocity;
        self.state.pressure = pressure;
        self.state.time += dt;
        self.state.step_count = step;
        self.last_poisson = Some(poisson);

        let outcome = if poisson.converged {
            StepOutcome::Continued
        } else {
            warn!(
                "Step {}: pressure solve stopped after {} iterations with relative residual {:e}",
                step, poisson.iterations, poisson.residual
            );
            StepOutcome::NumericalWarning { residual: poisson.residual }
        };

        if let Some(tolerance) = self.config.steady_state_tolerance {
            if change_rate < tolerance {
                info!("Steady state reached at step {} (max |du|/dt = {:e})", step, change_rate);
                self.status = IntegratorStatus::Converged;
            }
        }

        debug!(
            "Step {}: t = {:.6}, dt = {:e}, max |u| = {:.6}, Poisson iterations = {}",
            step, self.state.time, dt, max_magnitude, poisson.iterations
        );
        Ok(StepReport { step, dt_used: dt, poisson: Some(poisson), outcome })
    }

    /// Reopens a run that converged or reached its step limit.
    ///
    /// # Returns
    /// * `Ok(())` - The integrator accepts steps again
    /// * `Err(SimulationError)` - The divergence error, if the integrator diverged
    pub fn resume(&mut self) -> Result<(), SimulationError> {
        if let Some(report) = &self.divergence {
            return Err(report.error());
        }
        if self.status.is_terminal() {
            debug!("Resuming from {:?} at step {}", self.status, self.state.step_count);
            self.status = IntegratorStatus::Stepping;
        }
        Ok(())
    }

    fn diverge(&mut self, step: usize, dt: f64, poisson: Option<PoissonReport>, cause: DivergenceCause) -> StepReport {
        let report = DivergenceReport { step, cause };
        error!("Simulation diverged: {}", report.error());
        self.divergence = Some(report);
        self.status = IntegratorStatus::Diverged;
        StepReport { step, dt_used: dt, poisson, outcome: StepOutcome::Diverged }
    }

    /// Lazily runs up to `n_steps` steps, yielding a snapshot every `every_k`
    /// steps and after the last one.
    ///
    /// The run ends early on divergence or steady state. Reaching `n_steps`
    /// moves the integrator to `StepLimitReached`; a later call resumes and
    /// starts a new run.
    ///
    /// # Examples
    /// ```
    /// use rs_navier::boundary::BoundaryConditionSpec;
    /// use rs_navier::grid::Grid;
    /// use rs_navier::integrator::{IntegratorStatus, SimulationState, TimeIntegrator};
    /// use rs_navier::utils::{PhysicalParameters, SolverConfig};
    ///
    /// let grid = Grid::new(8, 8, 0.125, 0.125).unwrap();
    /// let state = SimulationState::new(&grid, |x, y| if x > 0.25 && x < 0.75 && y > 0.25 && y < 0.75 { (1.0, 0.0) } else { (0.0, 0.0) }).unwrap();
    /// let params = PhysicalParameters::new(0.1, 0.01, None, None).unwrap();
    /// let mut integrator = TimeIntegrator::new(grid, params, SolverConfig::default(), BoundaryConditionSpec::no_slip_box(), state).unwrap();
    ///
    /// let steps: Vec<usize> = integrator.run(10, 4).map(|(snapshot, _)| snapshot.step_count).collect();
    /// assert_eq!(steps, vec![4, 8, 10]);
    /// assert_eq!(integrator.status(), IntegratorStatus::StepLimitReached);
    /// ```
    pub fn run(&mut self, n_steps: usize, every_k: usize) -> SimulationRun<'_> {
        let finished = n_steps == 0 || self.resume().is_err();
        SimulationRun {
            integrator: self,
            n_steps,
            every_k: every_k.max(1),
            taken: 0,
            cancel: None,
            finished,
        }
    }
}

/// Lazy sequence of `(Snapshot, StepOutcome)` produced by [`TimeIntegrator::run`].
///
/// Steps are only taken as the iterator is advanced.
#[derive(Debug)]
pub struct SimulationRun<'a> {
    integrator: &'a mut TimeIntegrator,
    n_steps: usize,
    every_k: usize,
    taken: usize,
    cancel: Option<Arc<AtomicBool>>,
    finished: bool,
}

impl SimulationRun<'_> {
    /// Stops the run before the next step once `flag` is set. A step in
    /// progress always completes.
    pub fn with_cancellation(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Steps taken so far by this run.
    pub fn steps_taken(&self) -> usize {
        self.taken
    }

    fn cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(|flag| flag.load(Ordering::SeqCst))
    }
}

impl Iterator for SimulationRun<'_> {
    type Item = (Snapshot, StepOutcome);

    fn next(&mut self) -> Option<Self::Item> {
        while !self.finished {
            if self.cancelled() {
                info!("Run cancelled after {} steps", self.taken);
                self.finished = true;
                return None;
            }

            let report = match self.integrator.step() {
                Ok(report) => report,
                Err(_) => {
                    self.finished = true;
                    return None;
                }
            };
            self.taken += 1;

            if self.taken >= self.n_steps && self.integrator.status == IntegratorStatus::Stepping {
                self.integrator.status = IntegratorStatus::StepLimitReached;
            }
            let terminal = report.outcome == StepOutcome::Diverged || self.integrator.status.is_terminal();
            if terminal {
                self.finished = true;
                info!(
                    "Run finished with status {:?} after {} steps (t = {:.6})",
                    self.integrator.status,
                    self.integrator.state.step_count,
                    self.integrator.state.time
                );
                return Some((self.integrator.snapshot(), report.outcome));
            }
            if self.taken % self.every_k == 0 {
                return Some((self.integrator.snapshot(), report.outcome));
            }
        }
        None
    }
}
