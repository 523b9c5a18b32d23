// src/boundary/boundary_conditions.rs

use crate::grid::{Grid, ScalarField};

/// Condition applied along one edge of the domain.
///
/// Each variant maps the nearest interior value to the ghost value beyond the
/// edge. For velocity, `normal` tells whether the field is the component
/// normal to that edge (`u` on left/right, `v` on bottom/top).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BoundaryKind {
    /// Solid wall. Both velocity components are mirrored about `wall_value`,
    /// so the face value equals `wall_value`; set a per-component override to
    /// move a wall tangentially only. On scalars it pins the face value.
    NoSlipWall { wall_value: f64 },
    /// Zero gradient for the tangential component, mirrored-to-zero normal component.
    FreeSlip,
    /// Ghost holds a prescribed constant.
    FixedInflow { value: f64 },
    /// Ghost copies the interior value (extrapolation).
    ZeroGradientOutflow,
}

impl BoundaryKind {
    /// A stationary no-slip wall.
    pub const fn no_slip() -> Self {
        BoundaryKind::NoSlipWall { wall_value: 0.0 }
    }

    /// Ghost value for a field whose nearest interior value is `interior`.
    #[inline]
    pub fn ghost_value(&self, interior: f64, normal: bool) -> f64 {
        match *self {
            BoundaryKind::NoSlipWall { wall_value } => 2.0 * wall_value - interior,
            BoundaryKind::FreeSlip => {
                if normal { -interior } else { interior }
            }
            BoundaryKind::FixedInflow { value } => value,
            BoundaryKind::ZeroGradientOutflow => interior,
        }
    }

    /// Derivative of [`ghost_value`](Self::ghost_value) with respect to `interior`.
    ///
    /// Every rule is affine in the interior value, so this is the whole
    /// homogeneous part of the condition.
    pub fn ghost_slope(&self, normal: bool) -> f64 {
        match *self {
            BoundaryKind::NoSlipWall { .. } => -1.0,
            BoundaryKind::FreeSlip => {
                if normal { -1.0 } else { 1.0 }
            }
            BoundaryKind::FixedInflow { .. } => 0.0,
            BoundaryKind::ZeroGradientOutflow => 1.0,
        }
    }

    /// True for conditions that impose a zero normal gradient on a scalar.
    pub fn is_neumann(&self) -> bool {
        matches!(self, BoundaryKind::FreeSlip | BoundaryKind::ZeroGradientOutflow)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Left,
    Right,
    Bottom,
    Top,
}

/// Which field a ghost update is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Component {
    U,
    V,
    Scalar,
}

impl Component {
    pub fn is_normal_to(&self, edge: Edge) -> bool {
        match self {
            Component::U => matches!(edge, Edge::Left | Edge::Right),
            Component::V => matches!(edge, Edge::Bottom | Edge::Top),
            Component::Scalar => false,
        }
    }
}

/// One condition per domain edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeConditions {
    pub left: BoundaryKind,
    pub right: BoundaryKind,
    pub bottom: BoundaryKind,
    pub top: BoundaryKind,
}

impl EdgeConditions {
    pub const fn uniform(kind: BoundaryKind) -> Self {
        Self { left: kind, right: kind, bottom: kind, top: kind }
    }

    pub fn get(&self, edge: Edge) -> BoundaryKind {
        match edge {
            Edge::Left => self.left,
            Edge::Right => self.right,
            Edge::Bottom => self.bottom,
            Edge::Top => self.top,
        }
    }

    pub fn with(mut self, edge: Edge, kind: BoundaryKind) -> Self {
        match edge {
            Edge::Left => self.left = kind,
            Edge::Right => self.right = kind,
            Edge::Bottom => self.bottom = kind,
            Edge::Top => self.top = kind,
        }
        self
    }

    /// True when no edge pins the value, so a Poisson problem with these
    /// conditions is only determined up to a constant.
    pub fn all_neumann(&self) -> bool {
        self.left.is_neumann() && self.right.is_neumann() && self.bottom.is_neumann() && self.top.is_neumann()
    }
}

/// Boundary conditions for the whole simulation.
///
/// `velocity` applies to both components unless `u_override` / `v_override`
/// is set. Pressure defaults to zero gradient on every edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundaryConditionSpec {
    pub velocity: EdgeConditions,
    pub u_override: Option<EdgeConditions>,
    pub v_override: Option<EdgeConditions>,
    pub pressure: EdgeConditions,
}

impl Default for BoundaryConditionSpec {
    fn default() -> Self {
        Self::no_slip_box()
    }
}

impl BoundaryConditionSpec {
    pub fn new(velocity: EdgeConditions) -> Self {
        Self {
            velocity,
            u_override: None,
            v_override: None,
            pressure: EdgeConditions::uniform(BoundaryKind::ZeroGradientOutflow),
        }
    }

    /// Stationary no-slip walls on every edge.
    pub fn no_slip_box() -> Self {
        Self::new(EdgeConditions::uniform(BoundaryKind::no_slip()))
    }

    /// Closed box whose top wall slides horizontally at `lid_speed`.
    ///
    /// # Examples
    /// ```
    /// use rs_navier::boundary::{BoundaryConditionSpec, BoundaryKind, Component};
    ///
    /// let spec = BoundaryConditionSpec::lid_driven_cavity(1.0);
    /// assert_eq!(spec.for_component(Component::U).top, BoundaryKind::NoSlipWall { wall_value: 1.0 });
    /// // The lid slides tangentially, so `v` sees a stationary wall.
    /// assert_eq!(spec.for_component(Component::V).top, BoundaryKind::no_slip());
    /// assert_eq!(spec.for_component(Component::V).top.ghost_value(0.3, true), -0.3);
    /// ```
    pub fn lid_driven_cavity(lid_speed: f64) -> Self {
        let walls = EdgeConditions::uniform(BoundaryKind::no_slip());
        Self {
            v_override: Some(walls),
            ..Self::new(walls.with(Edge::Top, BoundaryKind::NoSlipWall { wall_value: lid_speed }))
        }
    }

    /// Channel flow: inflow of `speed` on the left, outflow on the right,
    /// no-slip top and bottom, pressure pinned to zero at the outlet.
    pub fn channel(speed: f64) -> Self {
        let velocity = EdgeConditions::uniform(BoundaryKind::no_slip())
            .with(Edge::Left, BoundaryKind::FixedInflow { value: speed })
            .with(Edge::Right, BoundaryKind::ZeroGradientOutflow);
        let v_override = velocity.with(Edge::Left, BoundaryKind::FixedInflow { value: 0.0 });
        let pressure = EdgeConditions::uniform(BoundaryKind::ZeroGradientOutflow)
            .with(Edge::Right, BoundaryKind::no_slip());
        Self {
            velocity,
            u_override: None,
            v_override: Some(v_override),
            pressure,
        }
    }

    pub fn with_pressure(mut self, pressure: EdgeConditions) -> Self {
        self.pressure = pressure;
        self
    }

    pub fn with_u_override(mut self, edges: EdgeConditions) -> Self {
        self.u_override = Some(edges);
        self
    }

    pub fn with_v_override(mut self, edges: EdgeConditions) -> Self {
        self.v_override = Some(edges);
        self
    }

    /// Edge conditions in force for `component`.
    pub fn for_component(&self, component: Component) -> &EdgeConditions {
        match component {
            Component::U => self.u_override.as_ref().unwrap_or(&self.velocity),
            Component::V => self.v_override.as_ref().unwrap_or(&self.velocity),
            Component::Scalar => &self.pressure,
        }
    }
}

/// Writes the ghost layer of `field` from its interior.
///
/// Edge ghosts depend only on interior values and corners are the mean of
/// their two edge neighbours, so applying this twice leaves the field unchanged.
pub fn apply_ghost(grid: &Grid, field: &mut ScalarField, edges: &EdgeConditions, component: Component) {
    let nx = grid.nx();
    let ny = grid.ny();

    let left_normal = component.is_normal_to(Edge::Left);
    let right_normal = component.is_normal_to(Edge::Right);
    for j in 1..=ny {
        let west = field[(1, j)];
        let east = field[(nx, j)];
        field[(0, j)] = edges.left.ghost_value(west, left_normal);
        field[(nx + 1, j)] = edges.right.ghost_value(east, right_normal);
    }

    let bottom_normal = component.is_normal_to(Edge::Bottom);
    let top_normal = component.is_normal_to(Edge::Top);
    for i in 1..=nx {
        let south = field[(i, 1)];
        let north = field[(i, ny)];
        field[(i, 0)] = edges.bottom.ghost_value(south, bottom_normal);
        field[(i, ny + 1)] = edges.top.ghost_value(north, top_normal);
    }

    // Corners are never read by the solver stencils.
    field[(0, 0)] = 0.5 * (field[(1, 0)] + field[(0, 1)]);
    field[(nx + 1, 0)] = 0.5 * (field[(nx, 0)] + field[(nx + 1, 1)]);
    field[(0, ny + 1)] = 0.5 * (field[(1, ny + 1)] + field[(0, ny)]);
    field[(nx + 1, ny + 1)] = 0.5 * (field[(nx, ny + 1)] + field[(nx + 1, ny)]);
}

/// Refreshes the ghost layer of both velocity components.
pub fn apply_velocity_ghosts(grid: &Grid, velocity: &mut crate::grid::VelocityField, spec: &BoundaryConditionSpec) {
    apply_ghost(grid, &mut velocity.u, spec.for_component(Component::U), Component::U);
    apply_ghost(grid, &mut velocity.v, spec.for_component(Component::V), Component::V);
}
