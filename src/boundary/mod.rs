mod boundary_conditions;

pub use boundary_conditions::*;
