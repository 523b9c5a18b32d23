// src/solver/advection_diffusion.rs

use crate::grid::{Grid, ScalarField, VelocityField};
use crate::solver::laplacian_at;
use crate::utils::parallel::for_each_row_pair;
use crate::utils::{ConvectionScheme, PhysicalParameters, SimulationError, SolverConfig};

/// Explicit advection-diffusion predictor.
///
/// Produces the provisional velocity
/// `u* = u + dt·(-(u·∇)u + nu·∇²u + f)` at every interior cell. The input
/// field must have valid ghost cells; the output's ghost layer is copied from
/// the input and has to be refreshed by the caller.
#[derive(Debug, Clone, Copy)]
pub struct AdvectionDiffusionStep {
    pub scheme: ConvectionScheme,
    pub blowup_threshold: f64,
}

impl AdvectionDiffusionStep {
    pub fn new(scheme: ConvectionScheme, blowup_threshold: f64) -> Self {
        Self { scheme, blowup_threshold }
    }

    pub fn from_config(config: &SolverConfig) -> Self {
        Self::new(config.convection_scheme, config.blowup_threshold)
    }

    /// Computes the provisional velocity field without touching `velocity`.
    ///
    /// # Returns
    /// * `Ok(VelocityField)` - The provisional field
    /// * `Err(SimulationError::Diverged)` - If any provisional value is non-finite
    /// * `Err(SimulationError::NumericalInstability)` - If a value exceeds the blow-up threshold
    ///
    /// The `step` in the returned error is left at zero; callers attach their step index with
    /// [`SimulationError::at_step`].
    ///
    /// # Examples
    /// ```
    /// use rs_navier::grid::{Grid, VelocityField};
    /// use rs_navier::solver::AdvectionDiffusionStep;
    /// use rs_navier::utils::{ConvectionScheme, PhysicalParameters};
    ///
    /// let grid = Grid::new(8, 8, 0.125, 0.125).unwrap();
    /// let params = PhysicalParameters::new(0.1, 0.001, Some((1.0, 0.0)), None).unwrap();
    /// let stage = AdvectionDiffusionStep::new(ConvectionScheme::Upwind, 1e6);
    ///
    /// // A fluid at rest only feels the body force.
    /// let provisional = stage.apply(&grid, &VelocityField::zeros(&grid), &params, 0.001).unwrap();
    /// assert!((provisional.u[(4, 4)] - 0.001).abs() < 1e-15);
    /// ```
    pub fn apply(
        &self,
        grid: &Grid,
        velocity: &VelocityField,
        params: &PhysicalParameters,
        dt: f64,
    ) -> Result<VelocityField, SimulationError> {
        let mut provisional = velocity.clone();
        let nx = grid.nx();
        let ny = grid.ny();
        let stencil = Stencil::new(grid, params.nu, self.scheme);
        let (fx, fy) = params.body_force;
        let nu = params.nu;
        let (u, v) = (&velocity.u, &velocity.v);

        for_each_row_pair(
            provisional.u.data_mut(),
            provisional.v.data_mut(),
            grid.row_len(),
            |j, u_row, v_row| {
                if j == 0 || j > ny {
                    return;
                }
                for i in 1..=nx {
                    let uc = u[(i, j)];
                    let vc = v[(i, j)];

                    let conv_u = uc * stencil.ddx(u, i, j, uc) + vc * stencil.ddy(u, i, j, vc);
                    let conv_v = uc * stencil.ddx(v, i, j, uc) + vc * stencil.ddy(v, i, j, vc);
                    let diff_u = laplacian_at(u, i, j, stencil.inv_dx2, stencil.inv_dy2);
                    let diff_v = laplacian_at(v, i, j, stencil.inv_dx2, stencil.inv_dy2);

                    u_row[i] = uc + dt * (-conv_u + nu * diff_u + fx);
                    v_row[i] = vc + dt * (-conv_v + nu * diff_v + fy);
                }
            },
        );

        let max_magnitude = provisional.max_component_abs();
        if !max_magnitude.is_finite() || !provisional.all_finite() {
            return Err(SimulationError::Diverged { step: 0 });
        }
        if max_magnitude > self.blowup_threshold {
            return Err(SimulationError::NumericalInstability {
                step: 0,
                max_magnitude,
                threshold: self.blowup_threshold,
            });
        }
        Ok(provisional)
    }
}

/// First derivatives for the convective term.
struct Stencil {
    inv_dx: f64,
    inv_dy: f64,
    inv_dx2: f64,
    inv_dy2: f64,
    dx: f64,
    dy: f64,
    nu: f64,
    scheme: ConvectionScheme,
}

impl Stencil {
    fn new(grid: &Grid, nu: f64, scheme: ConvectionScheme) -> Self {
        let (dx, dy) = (grid.dx(), grid.dy());
        Self {
            inv_dx: 1.0 / dx,
            inv_dy: 1.0 / dy,
            inv_dx2: 1.0 / (dx * dx),
            inv_dy2: 1.0 / (dy * dy),
            dx,
            dy,
            nu,
            scheme,
        }
    }

    /// Whether the centred difference is used for advecting speed `speed` across spacing `h`.
    #[inline]
    fn centred(&self, speed: f64, h: f64) -> bool {
        match self.scheme {
            ConvectionScheme::Central => true,
            ConvectionScheme::Upwind => false,
            // Cell Peclet number |u|h/nu <= 2 keeps the centred scheme monotone.
            ConvectionScheme::Hybrid => speed.abs() * h <= 2.0 * self.nu,
        }
    }

    #[inline]
    fn ddx(&self, f: &ScalarField, i: usize, j: usize, speed: f64) -> f64 {
        let (w, c, e) = (f[(i - 1, j)], f[(i, j)], f[(i + 1, j)]);
        if self.centred(speed, self.dx) {
            0.5 * (e - w) * self.inv_dx
        } else if speed > 0.0 {
            (c - w) * self.inv_dx
        } else {
            (e - c) * self.inv_dx
        }
    }

    #[inline]
    fn ddy(&self, f: &ScalarField, i: usize, j: usize, speed: f64) -> f64 {
        let (s, c, n) = (f[(i, j - 1)], f[(i, j)], f[(i, j + 1)]);
        if self.centred(speed, self.dy) {
            0.5 * (n - s) * self.inv_dy
        } else if speed > 0.0 {
            (c - s) * self.inv_dy
        } else {
            (n - c) * self.inv_dy
        }
    }
}
