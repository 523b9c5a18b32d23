// src/utils/solver_config.rs
use crate::utils::{
    DEFAULT_DENSITY,
    DEFAULT_SOLVER_CONFIG,
    errors::SimulationError
};

/// Finite-difference scheme used for the convective term `u·∇u`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConvectionScheme {
    /// First-order donor cell differencing.
    Upwind,
    /// Second-order centred differencing.
    Central,
    /// Centred where the cell Peclet number is at most 2, upwind elsewhere.
    Hybrid,
}

/// Relaxation scheme used by the pressure Poisson solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoissonMethod {
    /// Weighted Jacobi. Needs `omega < 1` on the projection operator.
    Jacobi,
    /// Gauss-Seidel in a nine-colour `(i mod 3, j mod 3)` ordering, over-relaxed by `omega`.
    GaussSeidel,
}

/// Immutable per-run physical configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicalParameters {
    /// Kinematic viscosity.
    pub nu: f64,
    /// Requested time step. The integrator may clamp it for stability.
    pub dt: f64,
    /// Constant body force `(fx, fy)` per unit mass.
    pub body_force: (f64, f64),
    /// Fluid density.
    pub density: f64,
}

impl Default for PhysicalParameters {
    fn default() -> Self {
        Self {
            nu: 0.1,
            dt: 0.01,
            body_force: (0.0, 0.0),
            density: DEFAULT_DENSITY,
        }
    }
}

impl PhysicalParameters {
    /// Creates validated physical parameters.
    ///
    /// # Arguments
    /// * `nu` - Kinematic viscosity (must be non-negative)
    /// * `dt` - Requested time step (must be positive)
    /// * `body_force` - Optional constant body force, zero when `None`
    /// * `density` - Optional fluid density, `1.0` when `None`
    ///
    /// # Examples
    /// ```
    /// use rs_navier::utils::PhysicalParameters;
    ///
    /// let params = PhysicalParameters::new(0.1, 0.01, None, None).unwrap();
    /// assert_eq!(params.density, 1.0);
    /// assert!(PhysicalParameters::new(-0.1, 0.01, None, None).is_err());
    /// ```
    pub fn new(
        nu: f64,
        dt: f64,
        body_force: Option<(f64, f64)>,
        density: Option<f64>,
    ) -> Result<Self, SimulationError> {
        let params = Self {
            nu,
            dt,
            body_force: body_force.unwrap_or((0.0, 0.0)),
            density: density.unwrap_or(DEFAULT_DENSITY),
        };
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<(), SimulationError> {
        if !self.nu.is_finite() || self.nu < 0.0 {
            return Err(SimulationError::InvalidParameter(format!("viscosity must be non-negative, got {}", self.nu)));
        }
        if !self.dt.is_finite() || self.dt <= 0.0 {
            return Err(SimulationError::InvalidParameter(format!("dt must be positive, got {}", self.dt)));
        }
        if !self.density.is_finite() || self.density <= 0.0 {
            return Err(SimulationError::InvalidParameter(format!("density must be positive, got {}", self.density)));
        }
        if !self.body_force.0.is_finite() || !self.body_force.1.is_finite() {
            return Err(SimulationError::InvalidParameter("body force must be finite".to_string()));
        }
        Ok(())
    }
}

/// Numerical settings shared by the solver stages.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverConfig {
    /// Over-relaxation factor for the Poisson sweeps, in `(0, 2)`.
    pub omega: f64,
    /// Poisson stopping tolerance, relative to the rhs L2 norm.
    pub tolerance: f64,
    /// Poisson iteration cap.
    pub max_iterations: usize,
    /// Magnitude above which a provisional velocity counts as blown up.
    pub blowup_threshold: f64,
    pub convection_scheme: ConvectionScheme,
    pub poisson_method: PoissonMethod,
    /// When set, the run stops as `Converged` once `max|Δu| / dt` drops below it.
    pub steady_state_tolerance: Option<f64>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        DEFAULT_SOLVER_CONFIG
    }
}

impl SolverConfig {
    /// Builds a solver configuration, filling every `None` from the defaults.
    ///
    /// # Examples
    /// ```
    /// use rs_navier::utils::{PoissonMethod, SolverConfig};
    ///
    /// let config = SolverConfig::new(Some(1.5), None, Some(2000), None, None, Some(PoissonMethod::Jacobi), None).unwrap();
    /// assert_eq!(config.max_iterations, 2000);
    /// assert_eq!(config.tolerance, 1e-4);
    ///
    /// // Over-relaxation outside (0, 2) diverges and is rejected.
    /// assert!(SolverConfig::new(Some(2.0), None, None, None, None, None, None).is_err());
    /// ```
    pub fn new(
        omega: Option<f64>,
        tolerance: Option<f64>,
        max_iterations: Option<usize>,
        blowup_threshold: Option<f64>,
        convection_scheme: Option<ConvectionScheme>,
        poisson_method: Option<PoissonMethod>,
        steady_state_tolerance: Option<f64>,
    ) -> Result<Self, SimulationError> {
        let default = DEFAULT_SOLVER_CONFIG;
        let config = Self {
            omega: omega.unwrap_or(default.omega),
            tolerance: tolerance.unwrap_or(default.tolerance),
            max_iterations: max_iterations.unwrap_or(default.max_iterations),
            blowup_threshold: blowup_threshold.unwrap_or(default.blowup_threshold),
            convection_scheme: convection_scheme.unwrap_or(default.convection_scheme),
            poisson_method: poisson_method.unwrap_or(default.poisson_method),
            steady_state_tolerance: steady_state_tolerance.or(default.steady_state_tolerance),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), SimulationError> {
        if !(self.omega > 0.0 && self.omega < 2.0) {
            return Err(SimulationError::InvalidParameter(format!("omega must lie in (0, 2), got {}", self.omega)));
        }
        if !self.tolerance.is_finite() || self.tolerance <= 0.0 {
            return Err(SimulationError::InvalidParameter(format!("tolerance must be positive, got {}", self.tolerance)));
        }
        if self.max_iterations == 0 {
            return Err(SimulationError::InvalidParameter("max_iterations must be at least 1".to_string()));
        }
        if self.blowup_threshold.is_nan() || self.blowup_threshold <= 0.0 {
            return Err(SimulationError::InvalidParameter(format!("blowup threshold must be positive, got {}", self.blowup_threshold)));
        }
        if let Some(tol) = self.steady_state_tolerance {
            if !tol.is_finite() || tol <= 0.0 {
                return Err(SimulationError::InvalidParameter(format!("steady-state tolerance must be positive, got {}", tol)));
            }
        }
        Ok(())
    }
}
