use crate::utils::{ConvectionScheme, PoissonMethod, SolverConfig};

/// Fluid density used when none is given.
pub const DEFAULT_DENSITY: f64 = 1.0;

/// Smallest grid accepted along either axis: one interior stencil plus a ghost layer per side.
pub const MIN_CELLS: usize = 3;

pub const DEFAULT_SOLVER_CONFIG: SolverConfig = SolverConfig {
    omega: 1.0,
    tolerance: 1e-4,
    max_iterations: 500,
    blowup_threshold: 1e6,
    convection_scheme: ConvectionScheme::Upwind,
    poisson_method: PoissonMethod::GaussSeidel,
    steady_state_tolerance: None,
};
