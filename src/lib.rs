//! Two-dimensional incompressible viscous flow on a fixed rectangular grid,
//! advanced with Chorin's projection method.
//!
//! A step advects and diffuses the velocity explicitly, solves a pressure
//! Poisson equation for the provisional field's divergence, subtracts the
//! pressure gradient and refreshes the ghost cells that encode the boundary
//! conditions. [`integrator::TimeIntegrator`] drives the pipeline; the
//! [`apis::easy_navier_stokes`] functions wrap it for front ends.
pub mod utils;
pub mod grid;
pub mod boundary;
pub mod solver;
pub mod integrator;
pub mod diagnostics;
pub mod initial_conditions;
pub mod apis;

/// ### General helper function
/// - Asserts that two floating point numbers are approximately equal.
///
/// ### Arguments
///
/// * `a` - The first floating point number.
/// * `b` - The second floating point number.
/// * `epsilon` - The maximum difference between `a` and `b` for them to be considered equal.
/// * `optional_message` - An optional message to display if the assertion fails.
///
pub fn assert_float_eq(a: f64, b: f64, epsilon: f64, optional_message: Option<&str>) {
    match optional_message {
        Some(message) => assert!((a - b).abs() < epsilon, "a: {:?},\nb: {:?},\nepsilon: {:?},\n message: {:?}", a, b, epsilon, message),
        None => assert!((a - b).abs() < epsilon, "Expected {} to be approximately equal to {} (epsilon: {})", a, b, epsilon),
    }
}
