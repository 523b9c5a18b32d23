use crate::assert_float_eq;
use crate::boundary::{apply_velocity_ghosts, BoundaryConditionSpec};
use crate::diagnostics::{divergence_l2, kinetic_energy, max_speed, mean_speed, validate_state, vorticity};
use crate::grid::Grid;
use crate::initial_conditions::central_block;
use crate::integrator::SimulationState;
use crate::utils::SimulationError;

#[test]
fn test_uniform_flow_metrics() {
    let grid = Grid::new(4, 5, 0.5, 0.2).unwrap();
    let state = SimulationState::new(&grid, |_, _| (3.0, 4.0)).unwrap();
    assert_float_eq(kinetic_energy(&grid, &state.velocity), 0.5 * 25.0 * 20.0 * 0.1, 1e-12, Some("energy of uniform flow"));
    assert_float_eq(max_speed(&grid, &state.velocity), 5.0, 1e-12, None);
    assert_float_eq(mean_speed(&grid, &state.velocity), 5.0, 1e-12, None);
}

#[test]
fn test_central_block_metrics() {
    let grid = Grid::new(8, 8, 0.125, 0.125).unwrap();
    let state = SimulationState::new(&grid, central_block(1.0, 1.0, 2.0)).unwrap();
    assert_float_eq(max_speed(&grid, &state.velocity), 2.0, 1e-12, None);
    assert_float_eq(mean_speed(&grid, &state.velocity), 2.0 * 16.0 / 64.0, 1e-12, None);
    assert_float_eq(kinetic_energy(&grid, &state.velocity), 0.5 * 4.0 * 16.0 / 64.0, 1e-12, None);
}

#[test]
fn test_rest_has_no_divergence_or_vorticity() {
    let grid = Grid::new(5, 5, 0.2, 0.2).unwrap();
    let state = SimulationState::at_rest(&grid);
    assert_eq!(divergence_l2(&grid, &state.velocity), 0.0);
    assert_eq!(vorticity(&grid, &state.velocity).max_abs(), 0.0);
    assert_eq!(kinetic_energy(&grid, &state.velocity), 0.0);
}

#[test]
fn test_shear_layer_vorticity_sign() {
    let grid = Grid::new(6, 6, 1.0 / 6.0, 1.0 / 6.0).unwrap();
    let mut state = SimulationState::new(&grid, |_, y| (y, 0.0)).unwrap();
    apply_velocity_ghosts(&grid, &mut state.velocity, &BoundaryConditionSpec::lid_driven_cavity(1.0));
    let omega = vorticity(&grid, &state.velocity);
    // u = y gives ∂u/∂y = 1 away from the walls.
    approx::assert_relative_eq!(omega[(3, 3)], -1.0, epsilon = 1e-12);
    approx::assert_relative_eq!(omega[(5, 2)], -1.0, epsilon = 1e-12);
}

#[test]
fn test_validate_state() {
    let grid = Grid::new(4, 4, 0.25, 0.25).unwrap();
    let mut state = SimulationState::at_rest(&grid);
    state.step_count = 7;
    assert!(validate_state(&state).is_ok());
    state.pressure[(2, 2)] = f64::NAN;
    assert_eq!(validate_state(&state), Err(SimulationError::Diverged { step: 7 }));
}
