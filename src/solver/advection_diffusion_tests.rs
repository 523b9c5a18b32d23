use crate::boundary::{apply_velocity_ghosts, BoundaryConditionSpec, BoundaryKind, EdgeConditions};
use crate::grid::{Grid, ScalarField, VelocityField};
use crate::solver::AdvectionDiffusionStep;
use crate::utils::{ConvectionScheme, PhysicalParameters, SimulationError};

fn outflow_spec() -> BoundaryConditionSpec {
    BoundaryConditionSpec::new(EdgeConditions::uniform(BoundaryKind::ZeroGradientOutflow))
}

/// Uniform rightward flow carrying a step in `v` located between columns 4 and 5.
fn step_profile(grid: &Grid) -> VelocityField {
    let mut velocity = VelocityField {
        u: ScalarField::from_fn(grid, |_, _| 1.0),
        v: ScalarField::from_fn(grid, |i, _| if i <= 4 { 1.0 } else { 0.0 }),
    };
    apply_velocity_ghosts(grid, &mut velocity, &outflow_spec());
    velocity
}

#[test]
fn test_zero_field_is_fixed_point() {
    let grid = Grid::new(6, 6, 0.1, 0.1).unwrap();
    let params = PhysicalParameters::new(0.1, 0.01, None, None).unwrap();
    let stage = AdvectionDiffusionStep::new(ConvectionScheme::Upwind, 1e6);
    let velocity = VelocityField::zeros(&grid);
    let provisional = stage.apply(&grid, &velocity, &params, 0.001).unwrap();
    assert_eq!(provisional, velocity);
}

#[test]
fn test_input_not_mutated() {
    let grid = Grid::new(10, 10, 0.1, 0.1).unwrap();
    let params = PhysicalParameters::new(0.05, 0.01, None, None).unwrap();
    let stage = AdvectionDiffusionStep::new(ConvectionScheme::Central, 1e6);
    let velocity = step_profile(&grid);
    let before = velocity.clone();
    let provisional = stage.apply(&grid, &velocity, &params, 0.01).unwrap();
    assert_eq!(velocity, before);
    assert_ne!(provisional, before);
}

#[test]
fn test_uniform_flow_unchanged() {
    let grid = Grid::new(8, 5, 0.1, 0.2).unwrap();
    let params = PhysicalParameters::new(0.3, 0.01, None, None).unwrap();
    let mut velocity = VelocityField {
        u: ScalarField::from_fn(&grid, |_, _| 0.7),
        v: ScalarField::from_fn(&grid, |_, _| -0.2),
    };
    apply_velocity_ghosts(&grid, &mut velocity, &outflow_spec());
    for scheme in [ConvectionScheme::Upwind, ConvectionScheme::Central, ConvectionScheme::Hybrid] {
        let provisional = AdvectionDiffusionStep::new(scheme, 1e6).apply(&grid, &velocity, &params, 0.01).unwrap();
        for (i, j) in grid.interior_indices() {
            approx::assert_relative_eq!(provisional.u[(i, j)], 0.7, epsilon = 1e-12);
            approx::assert_relative_eq!(provisional.v[(i, j)], -0.2, epsilon = 1e-12);
        }
    }
}

#[test]
fn test_diffusion_smooths_spike() {
    let grid = Grid::new(9, 9, 0.1, 0.1).unwrap();
    let params = PhysicalParameters::new(0.1, 0.01, None, None).unwrap();
    let mut velocity = VelocityField::zeros(&grid);
    velocity.v[(5, 5)] = 1e-3;
    apply_velocity_ghosts(&grid, &mut velocity, &BoundaryConditionSpec::no_slip_box());

    let provisional = AdvectionDiffusionStep::new(ConvectionScheme::Upwind, 1e6)
        .apply(&grid, &velocity, &params, 0.01)
        .unwrap();
    assert!(provisional.v[(5, 5)] < 1e-3, "Spike should decay");
    assert!(provisional.v[(4, 5)] > 0.0, "Neighbours should gain momentum");
    assert!(provisional.v[(5, 6)] > 0.0, "Neighbours should gain momentum");
}

#[test]
fn test_upwind_is_monotone_central_overshoots() {
    let grid = Grid::new(8, 4, 0.1, 0.1).unwrap();
    let params = PhysicalParameters::new(0.0, 0.01, None, None).unwrap();
    let velocity = step_profile(&grid);
    let dt = 0.01;

    let upwind = AdvectionDiffusionStep::new(ConvectionScheme::Upwind, 1e6).apply(&grid, &velocity, &params, dt).unwrap();
    approx::assert_relative_eq!(upwind.v[(4, 2)], 1.0, epsilon = 1e-12);
    approx::assert_relative_eq!(upwind.v[(5, 2)], dt / grid.dx(), epsilon = 1e-12);
    assert!(upwind.v.max_abs() <= 1.0 + 1e-12, "Upwind must not overshoot");

    let central = AdvectionDiffusionStep::new(ConvectionScheme::Central, 1e6).apply(&grid, &velocity, &params, dt).unwrap();
    approx::assert_relative_eq!(central.v[(4, 2)], 1.0 + 0.5 * dt / grid.dx(), epsilon = 1e-12);

    // Without viscosity the cell Peclet number is unbounded, so hybrid falls back to upwind.
    let hybrid = AdvectionDiffusionStep::new(ConvectionScheme::Hybrid, 1e6).apply(&grid, &velocity, &params, dt).unwrap();
    assert_eq!(hybrid, upwind);
}

#[test]
fn test_hybrid_matches_central_when_viscous() {
    let grid = Grid::new(8, 4, 0.1, 0.1).unwrap();
    let params = PhysicalParameters::new(1.0, 0.01, None, None).unwrap();
    let velocity = step_profile(&grid);
    let central = AdvectionDiffusionStep::new(ConvectionScheme::Central, 1e6).apply(&grid, &velocity, &params, 0.001).unwrap();
    let hybrid = AdvectionDiffusionStep::new(ConvectionScheme::Hybrid, 1e6).apply(&grid, &velocity, &params, 0.001).unwrap();
    assert_eq!(hybrid, central);
}

#[test]
fn test_blowup_threshold() {
    let grid = Grid::new(8, 4, 0.1, 0.1).unwrap();
    let params = PhysicalParameters::new(0.0, 0.01, None, None).unwrap();
    let velocity = step_profile(&grid);
    let result = AdvectionDiffusionStep::new(ConvectionScheme::Upwind, 0.5).apply(&grid, &velocity, &params, 0.01);
    match result {
        Err(SimulationError::NumericalInstability { max_magnitude, threshold, .. }) => {
            assert!(max_magnitude > threshold);
            assert_eq!(threshold, 0.5);
        }
        other => panic!("Expected NumericalInstability, got {:?}", other),
    }
}

#[test]
fn test_non_finite_reported_as_divergence() {
    let grid = Grid::new(5, 5, 0.1, 0.1).unwrap();
    let params = PhysicalParameters::new(0.1, 0.01, None, None).unwrap();
    let mut velocity = VelocityField::zeros(&grid);
    velocity.u[(3, 3)] = f64::NAN;
    let result = AdvectionDiffusionStep::new(ConvectionScheme::Upwind, 1e6).apply(&grid, &velocity, &params, 0.01);
    assert!(matches!(result, Err(SimulationError::Diverged { .. })));
    assert_eq!(
        result.unwrap_err().at_step(12),
        SimulationError::Diverged { step: 12 }
    );
}
