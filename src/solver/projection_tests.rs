use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::boundary::{apply_velocity_ghosts, BoundaryConditionSpec, BoundaryKind, Component, EdgeConditions};
use crate::grid::{Grid, VelocityField};
use crate::solver::{divergence, poisson_rhs, project, PoissonOperator, PressureSolver};
use crate::utils::PoissonMethod;

fn random_provisional(grid: &Grid, seed: u64) -> VelocityField {
    random_provisional_with(grid, seed, &BoundaryConditionSpec::no_slip_box())
}

fn random_provisional_with(grid: &Grid, seed: u64, spec: &BoundaryConditionSpec) -> VelocityField {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut velocity = VelocityField::zeros(grid);
    for (i, j) in grid.interior_indices() {
        velocity.u[(i, j)] = rng.random_range(-1.0..1.0);
        velocity.v[(i, j)] = rng.random_range(-1.0..1.0);
    }
    apply_velocity_ghosts(grid, &mut velocity, spec);
    velocity
}

#[test]
fn test_projection_removes_divergence_up_to_solver_tolerance() {
    let grid = Grid::new(12, 10, 0.1, 0.12).unwrap();
    let spec = BoundaryConditionSpec::no_slip_box();
    let (dt, density, tolerance) = (0.01, 1.0, 1e-6);
    let provisional = random_provisional(&grid, 7);

    let rhs = poisson_rhs(&grid, &provisional, dt, density);
    let mut pressure = grid.scalar_field();
    let report = PressureSolver::new(PoissonMethod::GaussSeidel, 1.5, tolerance, 20_000).solve(&grid, &rhs, &mut pressure, &spec);
    assert!(report.converged, "report: {:?}", report);

    let mut corrected = project(&grid, &provisional, &pressure, dt, density);
    apply_velocity_ghosts(&grid, &mut corrected, &spec);

    let before = divergence(&grid, &provisional).l2_norm();
    let after = divergence(&grid, &corrected).l2_norm();
    assert!(before > 1.0, "Random field should be strongly divergent");
    assert!(
        after <= tolerance * before * (1.0 + 1e-6) + 1e-10,
        "Divergence {:e} after projection exceeds tolerance bound {:e}",
        after,
        tolerance * before
    );
}

#[test]
fn test_projected_divergence_is_scaled_operator_residual() {
    // Holds for any pressure, converged or not, on every kind of edge.
    let grid = Grid::new(7, 6, 0.1, 0.15).unwrap();
    let (dt, density) = (0.02, 1.3);
    let specs = [
        BoundaryConditionSpec::no_slip_box(),
        BoundaryConditionSpec::lid_driven_cavity(1.0),
        BoundaryConditionSpec::channel(1.0),
        BoundaryConditionSpec::new(EdgeConditions::uniform(BoundaryKind::FreeSlip)),
    ];
    let mut rng = StdRng::seed_from_u64(5);
    for (seed, spec) in specs.iter().enumerate() {
        let provisional = random_provisional_with(&grid, seed as u64, spec);
        let mut pressure = grid.scalar_field();
        for (i, j) in grid.interior_indices() {
            pressure[(i, j)] = rng.random_range(-1.0..1.0);
        }
        grid.apply_ghost(&mut pressure, &spec.pressure, Component::Scalar);

        let mut corrected = project(&grid, &provisional, &pressure, dt, density);
        apply_velocity_ghosts(&grid, &mut corrected, spec);

        let operator = PoissonOperator::new(&grid, spec);
        let before = divergence(&grid, &provisional);
        let after = divergence(&grid, &corrected);
        for (i, j) in grid.interior_indices() {
            let expected = before[(i, j)] - dt / density * operator.apply_at(&pressure, i, j);
            approx::assert_relative_eq!(after[(i, j)], expected, epsilon = 1e-10);
        }
    }
}

#[test]
fn test_zero_pressure_leaves_velocity_unchanged() {
    let grid = Grid::new(6, 7, 0.2, 0.1).unwrap();
    let provisional = random_provisional(&grid, 3);
    let corrected = project(&grid, &provisional, &grid.scalar_field(), 0.01, 1.0);
    assert_eq!(corrected, provisional);
}

#[test]
fn test_linear_pressure_gives_uniform_correction() {
    let grid = Grid::new(5, 5, 0.2, 0.2).unwrap();
    let (dt, density, gradient) = (0.05, 2.0, 3.0);
    // p = gradient * x, ghosts included so the centred difference is exact everywhere.
    let mut pressure = grid.scalar_field();
    for j in 0..grid.rows() {
        for i in 0..grid.row_len() {
            pressure[(i, j)] = gradient * (i as f64 - 0.5) * grid.dx();
        }
    }
    let provisional = VelocityField::zeros(&grid);
    let corrected = project(&grid, &provisional, &pressure, dt, density);
    for (i, j) in grid.interior_indices() {
        approx::assert_relative_eq!(corrected.u[(i, j)], -dt / density * gradient, epsilon = 1e-12);
        approx::assert_relative_eq!(corrected.v[(i, j)], 0.0, epsilon = 1e-12);
    }
}

#[test]
fn test_non_finite_pressure_propagates() {
    let grid = Grid::new(5, 5, 0.2, 0.2).unwrap();
    let mut pressure = grid.scalar_field();
    pressure[(3, 3)] = f64::INFINITY;
    let corrected = project(&grid, &VelocityField::zeros(&grid), &pressure, 0.01, 1.0);
    assert!(!corrected.all_finite());
}
