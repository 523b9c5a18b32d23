mod state;
mod time_integrator;

pub use state::*;
pub use time_integrator::*;

#[cfg(test)]
mod state_tests;
