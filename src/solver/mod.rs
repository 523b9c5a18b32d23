mod operators;
mod advection_diffusion;
mod pressure_solver;
mod projection;

pub use operators::*;
pub use advection_diffusion::*;
pub use pressure_solver::*;
pub use projection::*;

#[cfg(test)]
mod advection_diffusion_tests;
#[cfg(test)]
mod projection_tests;
