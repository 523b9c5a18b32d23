// src/utils/errors.rs

use std::fmt;
use std::error::Error;

/// Represents errors that can occur while building or advancing a simulation.
#[derive(Debug, Clone, PartialEq)]
pub enum SimulationError {
    /// Indicates grid parameters that cannot describe a valid domain
    /// (fewer than 3 cells per axis or non-positive spacing).
    InvalidGeometry(String),
    /// Indicates an invalid physical or solver parameter (e.g., negative viscosity).
    InvalidParameter(String),
    /// The provisional velocity exceeded the configured blow-up threshold.
    /// The time step must shrink for the run to continue.
    NumericalInstability {
        step: usize,
        max_magnitude: f64,
        threshold: f64,
    },
    /// Non-finite values were detected, or the integrator already diverged.
    Diverged { step: usize },
    /// A step was requested after the run ended by converging or reaching its
    /// step limit.
    Finished { step: usize },
}

impl fmt::Display for SimulationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SimulationError::InvalidGeometry(msg) => write!(f, "Invalid geometry: {}", msg),
            SimulationError::InvalidParameter(msg) => write!(f, "Invalid parameter: {}", msg),
            SimulationError::NumericalInstability { step, max_magnitude, threshold } => write!(
                f,
                "Numerical instability at step {}: |value| = {:e} exceeds threshold {:e}",
                step, max_magnitude, threshold
            ),
            SimulationError::Diverged { step } => write!(f, "Simulation diverged at step {}", step),
            SimulationError::Finished { step } => write!(f, "Run already finished at step {}", step),
        }
    }
}

impl SimulationError {
    /// Attaches the step index to errors raised by stage functions that do not know it.
    pub fn at_step(self, step: usize) -> Self {
        match self {
            SimulationError::NumericalInstability { max_magnitude, threshold, .. } => {
                SimulationError::NumericalInstability { step, max_magnitude, threshold }
            }
            SimulationError::Diverged { .. } => SimulationError::Diverged { step },
            other => other,
        }
    }
}

impl Error for SimulationError {}
