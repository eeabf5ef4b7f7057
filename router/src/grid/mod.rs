pub mod dense;
pub mod dump;
pub mod footprint;
pub mod plane;
pub mod rules;

pub use dense::{BoardGrid, StampCosts};
pub use footprint::{Footprint, StampTargets};
pub use plane::{CostPlane, CostPlanes, FlagPlane, GridDims, StampPlane};
pub use rules::DesignRules;

use crate::error::Result;
use pcb_common::geom::coord::GridCoord;

/// Read-only view of the persistent cost planes, as seen by the search.
pub trait RoutingGrid {
    fn dims(&self) -> GridDims;

    fn base_cost_at(&self, c: GridCoord) -> Result<f32>;
    fn via_cost_at(&self, c: GridCoord) -> Result<f32>;
    fn is_via_forbidden(&self, c: GridCoord) -> Result<bool>;

    fn width(&self) -> i32 {
        self.dims().width
    }
    fn height(&self) -> i32 {
        self.dims().height
    }
    fn layers(&self) -> i32 {
        self.dims().layers
    }

    fn validate_location(&self, c: GridCoord) -> bool {
        self.dims().contains(c)
    }
}

/// Movement part of an edge weight, before the entered cell's costs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepCosts {
    pub orthogonal: f32,
    pub diagonal: f32,
    pub vertical: f32,
}

impl Default for StepCosts {
    fn default() -> Self {
        Self {
            orthogonal: 1.0,
            diagonal: std::f32::consts::SQRT_2,
            vertical: 10.0,
        }
    }
}
