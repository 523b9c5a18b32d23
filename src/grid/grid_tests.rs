use crate::assert_float_eq;
use crate::grid::{Grid, ScalarField, VelocityField};
use crate::utils::SimulationError;

#[test]
fn test_grid_creation() {
    let grid = Grid::new(32, 16, 0.5, 0.25);
    assert!(grid.is_ok());

    let grid = grid.unwrap();
    assert_eq!(grid.nx(), 32);
    assert_eq!(grid.ny(), 16);
    assert_eq!(grid.dx(), 0.5);
    assert_eq!(grid.dy(), 0.25);
    assert_eq!(grid.row_len(), 34);
    assert_eq!(grid.storage_len(), 34 * 18);
    assert_eq!(grid.min_spacing(), 0.25);
    let (lx, ly) = grid.extent();
    assert_float_eq(lx, 16.0, 1e-12, Some("x extent"));
    assert_float_eq(ly, 4.0, 1e-12, Some("y extent"));
}

#[test]
fn test_invalid_geometry() {
    assert!(matches!(Grid::new(2, 32, 0.1, 0.1), Err(SimulationError::InvalidGeometry(_))));
    assert!(matches!(Grid::new(32, 2, 0.1, 0.1), Err(SimulationError::InvalidGeometry(_))));
    assert!(Grid::new(32, 32, 0.0, 0.1).is_err(), "Should fail with zero dx");
    assert!(Grid::new(32, 32, 0.1, -0.1).is_err(), "Should fail with negative dy");
    assert!(Grid::new(32, 32, f64::NAN, 0.1).is_err(), "Should fail with NaN dx");
    assert!(Grid::new(3, 3, 1.0, 1.0).is_ok(), "Smallest valid grid");
}

#[test]
fn test_interior_indices_cover_interior_once() {
    let grid = Grid::new(5, 4, 1.0, 1.0).unwrap();
    let cells: Vec<(usize, usize)> = grid.interior_indices().collect();
    assert_eq!(cells.len(), 20);
    assert_eq!(grid.interior_indices().len(), 20);
    for (i, j) in &cells {
        assert!((1..=5).contains(i) && (1..=4).contains(j));
    }
    let mut sorted = cells.clone();
    sorted.sort();
    sorted.dedup();
    assert_eq!(sorted.len(), 20);
}

#[test]
fn test_interior_indices_restartable() {
    let grid = Grid::new(4, 3, 1.0, 1.0).unwrap();
    let mut partial = grid.interior_indices();
    partial.next();
    partial.next();
    assert_eq!(partial.len(), 10);
    let first: Vec<_> = grid.interior_indices().collect();
    let second: Vec<_> = grid.interior_indices().collect();
    assert_eq!(first, second);
}

#[test]
fn test_cell_center() {
    let grid = Grid::new(32, 32, 1.0 / 32.0, 1.0 / 32.0).unwrap();
    let (x, y) = grid.cell_center(1, 1);
    assert_float_eq(x, 0.5 / 32.0, 1e-15, None);
    assert_float_eq(y, 0.5 / 32.0, 1e-15, None);
    let (x, _) = grid.cell_center(32, 1);
    assert_float_eq(x, 1.0 - 0.5 / 32.0, 1e-15, None);
}

#[test]
fn test_scalar_field_indexing_and_norms() {
    let grid = Grid::new(3, 3, 1.0, 1.0).unwrap();
    let mut field = ScalarField::from_fn(&grid, |i, j| (i + 10 * j) as f64);
    assert_eq!(field[(2, 3)], 32.0);
    assert_eq!(field.get(2, 3), 32.0);
    assert_eq!(field[(0, 0)], 0.0, "Ghost cells start at zero");

    field.set(1, 1, -50.0);
    assert_eq!(field.max_abs(), 50.0);
    // Ghost values never enter interior reductions.
    field[(4, 4)] = 1.0e9;
    assert_eq!(field.max_abs(), 50.0);

    let sum: f64 = grid.interior_indices().map(|(i, j)| field[(i, j)]).sum();
    assert_float_eq(field.sum(), sum, 1e-12, Some("interior sum"));
    assert_float_eq(field.mean(), sum / 9.0, 1e-12, Some("interior mean"));
    let sq: f64 = grid.interior_indices().map(|(i, j)| field[(i, j)].powi(2)).sum();
    assert_float_eq(field.l2_norm(), sq.sqrt(), 1e-9, Some("interior L2 norm"));
}

#[test]
fn test_scalar_field_finiteness() {
    let grid = Grid::new(3, 3, 1.0, 1.0).unwrap();
    let mut field = grid.scalar_field();
    assert!(field.all_finite());
    field[(0, 2)] = f64::NAN;
    assert!(field.all_finite(), "Ghost values are not part of the check");
    field[(2, 2)] = f64::INFINITY;
    assert!(!field.all_finite());
    field[(2, 2)] = f64::NAN;
    assert!(field.max_abs().is_nan());
}

#[test]
fn test_interior_array_is_deep_copy() {
    let grid = Grid::new(4, 3, 1.0, 1.0).unwrap();
    let mut field = ScalarField::from_fn(&grid, |i, j| (i * j) as f64);
    let array = field.to_interior_array();
    assert_eq!(array.len(), 4);
    assert_eq!(array[0].len(), 3);
    assert_eq!(array[3][2], 12.0);
    field.fill(0.0);
    assert_eq!(array[3][2], 12.0);
}

#[test]
fn test_velocity_field_max_component() {
    let grid = Grid::new(3, 3, 1.0, 1.0).unwrap();
    let mut velocity = VelocityField::zeros(&grid);
    assert_eq!(velocity.max_component_abs(), 0.0);
    velocity.u[(1, 2)] = -3.0;
    velocity.v[(3, 3)] = 2.0;
    assert_eq!(velocity.max_component_abs(), 3.0);
    assert!(velocity.matches(&grid));
    assert!(!velocity.matches(&Grid::new(4, 3, 1.0, 1.0).unwrap()));
}
