pub mod errors;
pub mod constants;
pub mod solver_config;
pub mod parallel;

pub use errors::*;
pub use constants::*;
pub use solver_config::*;
