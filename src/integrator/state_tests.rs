use crate::grid::{Grid, ScalarField, VelocityField};
use crate::integrator::{SimulationState, Snapshot};
use crate::solver::PoissonReport;
use crate::utils::SimulationError;

#[test]
fn test_initial_condition_sampled_at_cell_centres() {
    let grid = Grid::new(4, 3, 0.5, 1.0).unwrap();
    let state = SimulationState::new(&grid, |x, y| (x, -y)).unwrap();
    assert_eq!(state.velocity.u[(1, 1)], 0.25);
    assert_eq!(state.velocity.u[(4, 2)], 1.75);
    assert_eq!(state.velocity.v[(2, 3)], -2.5);
    assert_eq!(state.velocity.u[(0, 1)], 0.0, "Ghosts are left for the boundary conditions");
    assert_eq!(state.time, 0.0);
    assert_eq!(state.step_count, 0);
    assert_eq!(state.pressure.max_abs(), 0.0);
}

#[test]
fn test_non_finite_initial_condition_rejected() {
    let grid = Grid::new(4, 4, 0.25, 0.25).unwrap();
    let result = SimulationState::new(&grid, |x, _| if x > 0.5 { (0.0, f64::INFINITY) } else { (0.0, 0.0) });
    assert!(matches!(result, Err(SimulationError::InvalidParameter(_))));
}

#[test]
fn test_from_fields_checks_shape() {
    let grid = Grid::new(4, 4, 0.25, 0.25).unwrap();
    let other = Grid::new(5, 4, 0.25, 0.25).unwrap();
    let result = SimulationState::from_fields(&grid, VelocityField::zeros(&other), ScalarField::zeros(&grid));
    assert!(matches!(result, Err(SimulationError::InvalidParameter(_))));

    let state = SimulationState::from_fields(&grid, VelocityField::zeros(&grid), ScalarField::zeros(&grid)).unwrap();
    assert_eq!(state, SimulationState::at_rest(&grid));
}

#[test]
fn test_snapshot_is_deep_copy() {
    let grid = Grid::new(3, 4, 0.1, 0.1).unwrap();
    let mut state = SimulationState::new(&grid, |x, y| (x + y, 2.0)).unwrap();
    let report = PoissonReport { converged: false, iterations: 500, residual: 3e-3 };
    let snapshot = Snapshot::capture(&state, Some(&report));

    state.velocity.u[(1, 1)] = 99.0;
    assert_eq!(snapshot.nx(), 3);
    assert_eq!(snapshot.ny(), 4);
    crate::assert_float_eq(snapshot.u[0][0], 0.1, 1e-12, None);
    assert!(!snapshot.converged);
    assert_eq!(snapshot.residual, 3e-3);
    approx::assert_relative_eq!(snapshot.max_speed(), (0.6f64.powi(2) + 4.0).sqrt(), epsilon = 1e-12);
}

#[test]
fn test_snapshot_before_any_solve() {
    let grid = Grid::new(3, 3, 0.1, 0.1).unwrap();
    let snapshot = Snapshot::capture(&SimulationState::at_rest(&grid), None);
    assert!(snapshot.converged);
    assert_eq!(snapshot.residual, 0.0);
    assert_eq!(snapshot.p, vec![vec![0.0; 3]; 3]);
}
