//! Runs the central "vortex patch" in a closed box and prints a summary every
//! ten steps. Set `RUST_LOG=debug` to follow individual steps.

use log::{error, info};
use rs_navier::apis::easy_navier_stokes::{create_simulation, run};
use rs_navier::boundary::BoundaryConditionSpec;
use rs_navier::diagnostics::{divergence_l2, kinetic_energy};
use rs_navier::initial_conditions::central_block;
use rs_navier::integrator::StepOutcome;

const CELLS: usize = 32;
const STEPS: usize = 50;
const VISCOSITY: f64 = 0.1;
const TIME_STEP: f64 = 0.01;

fn main() {
    env_logger::init();

    let h = 1.0 / CELLS as f64;
    let mut sim = match create_simulation(
        CELLS,
        CELLS,
        h,
        h,
        VISCOSITY,
        TIME_STEP,
        BoundaryConditionSpec::no_slip_box(),
        central_block(1.0, 1.0, 1.0),
    ) {
        Ok(sim) => sim,
        Err(e) => {
            error!("Could not create simulation: {}", e);
            std::process::exit(1);
        }
    };

    for (snapshot, outcome) in run(&mut sim, STEPS, 10) {
        println!(
            "step {:>3}  t = {:.5}  max |u| = {:.5}  poisson converged = {}  residual = {:.2e}",
            snapshot.step_count,
            snapshot.time,
            snapshot.max_speed(),
            snapshot.converged,
            snapshot.residual
        );
        if outcome == StepOutcome::Diverged {
            error!("Simulation diverged");
        }
    }

    let grid = *sim.grid();
    let velocity = &sim.state().velocity;
    info!("Final status: {:?}", sim.status());
    println!(
        "kinetic energy = {:.6e}, divergence L2 = {:.3e}",
        kinetic_energy(&grid, velocity),
        divergence_l2(&grid, velocity)
    );
}
