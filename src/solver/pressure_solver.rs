// src/solver/pressure_solver.rs

use log::debug;

use crate::boundary::{BoundaryConditionSpec, Component, EdgeConditions};
use crate::grid::{Grid, ScalarField, VelocityField};
use crate::solver::{divergence, PoissonOperator};
use crate::utils::parallel::for_each_row;
use crate::utils::{PoissonMethod, SolverConfig};

/// Outcome of one pressure solve.
///
/// Non-convergence is not an error: the best estimate after `max_iterations`
/// is kept and `converged` is `false`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoissonReport {
    pub converged: bool,
    pub iterations: usize,
    /// Final residual L2 norm relative to the rhs L2 norm.
    pub residual: f64,
}

/// Right-hand side `(ρ/dt)·div(u*)` of the pressure Poisson equation.
pub fn poisson_rhs(grid: &Grid, provisional: &VelocityField, dt: f64, density: f64) -> ScalarField {
    let mut rhs = divergence(grid, provisional);
    rhs.scale(density / dt);
    rhs
}

/// Iterative solver for `L(p) = rhs`, with `L` the [`PoissonOperator`]
/// matched to the centred projection.
///
/// Each sweep updates cells from a read-only copy of the field (one colour
/// at a time for Gauss-Seidel), so the result does not depend on how rows are
/// distributed across threads. The nine colours `(i mod 3, j mod 3)` never
/// couple a cell to another of its own colour, so a colour sweep is an exact
/// Gauss-Seidel update.
#[derive(Debug, Clone)]
pub struct PressureSolver {
    pub method: PoissonMethod,
    pub omega: f64,
    pub tolerance: f64,
    pub max_iterations: usize,
    scratch: Vec<f64>,
}

impl PressureSolver {
    pub fn new(method: PoissonMethod, omega: f64, tolerance: f64, max_iterations: usize) -> Self {
        Self {
            method,
            omega,
            tolerance,
            max_iterations,
            scratch: Vec::new(),
        }
    }

    pub fn from_config(config: &SolverConfig) -> Self {
        Self::new(config.poisson_method, config.omega, config.tolerance, config.max_iterations)
    }

    /// Relaxes `pressure` towards the solution of `L(p) = rhs`.
    ///
    /// `pressure` is the initial guess (typically the previous step's pressure)
    /// and holds the result, ghost cells included. Pressure ghosts follow
    /// `boundaries.pressure`; the velocity conditions shape the operator rows
    /// next to each edge. When every pressure edge is of Neumann type the
    /// problem is only defined up to a constant: the rhs mean is removed before
    /// solving and the pressure mean afterwards.
    ///
    /// # Examples
    /// ```
    /// use rs_navier::boundary::BoundaryConditionSpec;
    /// use rs_navier::grid::{Grid, ScalarField};
    /// use rs_navier::solver::PressureSolver;
    /// use rs_navier::utils::PoissonMethod;
    ///
    /// let grid = Grid::new(8, 8, 0.125, 0.125).unwrap();
    /// let rhs = ScalarField::from_fn(&grid, |i, j| if (i, j) == (2, 2) { 1.0 } else if (i, j) == (6, 6) { -1.0 } else { 0.0 });
    /// let mut pressure = grid.scalar_field();
    /// let mut solver = PressureSolver::new(PoissonMethod::GaussSeidel, 1.5, 1e-8, 5000);
    /// let report = solver.solve(&grid, &rhs, &mut pressure, &BoundaryConditionSpec::no_slip_box());
    ///
    /// assert!(report.converged);
    /// assert!(report.residual <= 1e-8);
    /// assert!(pressure.mean().abs() < 1e-12);
    /// ```
    pub fn solve(
        &mut self,
        grid: &Grid,
        rhs: &ScalarField,
        pressure: &mut ScalarField,
        boundaries: &BoundaryConditionSpec,
    ) -> PoissonReport {
        let edges = &boundaries.pressure;
        let operator = PoissonOperator::new(grid, boundaries);
        let singular = edges.all_neumann();
        let adjusted;
        let rhs = if singular {
            let mut centred = rhs.clone();
            centred.shift(-rhs.mean());
            adjusted = centred;
            &adjusted
        } else {
            rhs
        };

        let rhs_norm = rhs.l2_norm();
        if singular && rhs_norm == 0.0 {
            pressure.fill(0.0);
            grid.apply_ghost(pressure, edges, Component::Scalar);
            return PoissonReport { converged: true, iterations: 0, residual: 0.0 };
        }

        // With a vanishing rhs and pinned edges the tolerance is taken as absolute.
        let reference = if rhs_norm > 0.0 { rhs_norm } else { 1.0 };
        let target = self.tolerance * reference;

        if self.scratch.len() != grid.storage_len() {
            self.scratch = vec![0.0; grid.storage_len()];
        }

        grid.apply_ghost(pressure, edges, Component::Scalar);
        let mut residual = operator.residual_norm(grid, pressure, rhs);
        let mut iterations = 0;
        while residual > target && iterations < self.max_iterations {
            match self.method {
                PoissonMethod::Jacobi => self.jacobi_sweep(grid, &operator, pressure, rhs, edges),
                PoissonMethod::GaussSeidel => self.colored_sweep(grid, &operator, pressure, rhs, edges),
            }
            iterations += 1;
            residual = operator.residual_norm(grid, pressure, rhs);
        }

        if singular {
            let mean = pressure.mean();
            pressure.shift(-mean);
            grid.apply_ghost(pressure, edges, Component::Scalar);
        }

        let report = PoissonReport {
            converged: residual <= target,
            iterations,
            residual: residual / reference,
        };
        debug!(
            "Poisson solve: {} iterations, relative residual {:.3e}, converged={}",
            report.iterations, report.residual, report.converged
        );
        report
    }

    /// One weighted Jacobi sweep over the whole interior.
    fn jacobi_sweep(
        &mut self,
        grid: &Grid,
        operator: &PoissonOperator,
        pressure: &mut ScalarField,
        rhs: &ScalarField,
        edges: &EdgeConditions,
    ) {
        let omega = self.omega;
        let nx = grid.nx();
        let ny = grid.ny();
        {
            let p: &ScalarField = pressure;
            for_each_row(&mut self.scratch, grid.row_len(), |j, row| {
                if j == 0 || j > ny {
                    return;
                }
                for i in 1..=nx {
                    row[i] = relax(operator, p, rhs, i, j, omega);
                }
            });
        }
        pressure.swap_data(&mut self.scratch);
        grid.apply_ghost(pressure, edges, Component::Scalar);
    }

    /// One over-relaxed Gauss-Seidel pass, colour by colour.
    fn colored_sweep(
        &mut self,
        grid: &Grid,
        operator: &PoissonOperator,
        pressure: &mut ScalarField,
        rhs: &ScalarField,
        edges: &EdgeConditions,
    ) {
        let omega = self.omega;
        let nx = grid.nx();
        let ny = grid.ny();
        let row_len = grid.row_len();

        for row_class in 0..COLOR_STRIDE {
            for column_class in 0..COLOR_STRIDE {
                let in_class = |j: usize| j >= 1 && j <= ny && j % COLOR_STRIDE == row_class;
                let first = first_in_class(column_class);
                {
                    let p: &ScalarField = pressure;
                    for_each_row(&mut self.scratch, row_len, |j, row| {
                        if !in_class(j) {
                            return;
                        }
                        for i in (first..=nx).step_by(COLOR_STRIDE) {
                            row[i] = relax(operator, p, rhs, i, j, omega);
                        }
                    });
                }
                {
                    let updated: &[f64] = &self.scratch;
                    for_each_row(pressure.data_mut(), row_len, |j, row| {
                        if !in_class(j) {
                            return;
                        }
                        for i in (first..=nx).step_by(COLOR_STRIDE) {
                            row[i] = updated[j * row_len + i];
                        }
                    });
                }
                // Edge ghosts depend on the cells just written.
                grid.apply_ghost(pressure, edges, Component::Scalar);
            }
        }
    }
}

/// The operator reaches two cells along each axis.
const COLOR_STRIDE: usize = 3;

/// First interior index `k >= 1` with `k % 3 == class`.
#[inline]
fn first_in_class(class: usize) -> usize {
    if class == 0 { COLOR_STRIDE } else { class }
}

/// Over-relaxed point update of cell `(i, j)`.
#[inline]
fn relax(operator: &PoissonOperator, p: &ScalarField, rhs: &ScalarField, i: usize, j: usize, omega: f64) -> f64 {
    let old = p[(i, j)];
    let diag = operator.diagonal(i, j);
    if diag == 0.0 {
        return old;
    }
    old + omega * (rhs[(i, j)] - operator.apply_at(p, i, j)) / diag
}
