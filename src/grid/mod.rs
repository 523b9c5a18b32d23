mod geometry;
mod fields;

pub use geometry::*;
pub use fields::*;

#[cfg(test)]
mod grid_tests;
