use super::footprint::{Footprint, StampTargets};
use super::plane::{CostPlanes, GridDims};
use super::rules::DesignRules;
use super::{RoutingGrid, StepCosts};
use crate::algo::scratch::SearchScratch;
use crate::error::Result;
use pcb_common::geom::coord::GridCoord;
use pcb_common::geom::rect::GridRect;
use pcb_common::util::config::RoutingConfig;

/// Per-cell deltas a committed route stamps into the persistent planes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StampCosts {
    pub trace: f32,
    pub via: f32,
}

impl Default for StampCosts {
    fn default() -> Self {
        Self {
            trace: 10.0,
            via: 10.0,
        }
    }
}

/// `stamp_footprint` or `unstamp_footprint`.
pub(crate) type StampFn = fn(&mut BoardGrid, &Footprint, &[i32], f32, StampTargets) -> usize;

/// Routing session state: the persistent planes, the per-search scratch,
/// and the design rules of the net currently being routed.
pub struct BoardGrid {
    pub(crate) planes: CostPlanes,
    pub(crate) scratch: SearchScratch,
    pub(crate) rules: DesignRules,
    pub(crate) steps: StepCosts,
    pub(crate) stamp_costs: StampCosts,
}

impl BoardGrid {
    pub fn new(width: i32, height: i32, layers: i32) -> Result<Self> {
        let dims = GridDims::new(width, height, layers)?;
        let cells = dims.len();
        if cells > 200_000_000 {
            log::warn!(
                "Allocating large BoardGrid: {} cells. Ensure sufficient RAM.",
                cells
            );
        }

        Ok(Self {
            planes: CostPlanes::new(dims)?,
            scratch: SearchScratch::new(dims)?,
            rules: DesignRules::default(),
            steps: StepCosts::default(),
            stamp_costs: StampCosts::default(),
        })
    }

    pub fn from_config(width: i32, height: i32, layers: i32, config: &RoutingConfig) -> Result<Self> {
        let mut grid = Self::new(width, height, layers)?;
        grid.steps.vertical = config.layer_change_cost;
        grid.stamp_costs = StampCosts {
            trace: config.trace_cost,
            via: config.via_cost,
        };
        Ok(grid)
    }

    /// Reallocates every plane for a new board, dropping all costs. Step and
    /// stamp costs are kept.
    pub fn initialize(&mut self, width: i32, height: i32, layers: i32) -> Result<()> {
        let dims = GridDims::new(width, height, layers)?;
        let planes = CostPlanes::new(dims)?;
        let scratch = SearchScratch::new(dims)?;
        self.planes = planes;
        self.scratch = scratch;
        self.rules = DesignRules::default();
        Ok(())
    }

    pub fn dims(&self) -> GridDims {
        self.planes.dims
    }

    pub fn planes(&self) -> &CostPlanes {
        &self.planes
    }

    pub fn set_step_costs(&mut self, steps: StepCosts) {
        self.steps = steps;
    }

    pub fn validate_location(&self, c: GridCoord) -> bool {
        self.planes.dims.contains(c)
    }

    // Fill, set and add write the caller-owned layer. Reads include the
    // stamps of pads and committed routes.

    pub fn base_cost_fill(&mut self, value: f32) {
        self.planes.base_cost.fill(value);
    }

    pub fn base_cost_at(&self, c: GridCoord) -> Result<f32> {
        self.planes.base_cost_at(c)
    }

    pub fn base_cost_set(&mut self, value: f32, c: GridCoord) -> Result<()> {
        self.planes.base_cost.set(value, c)
    }

    pub fn base_cost_add(&mut self, delta: f32, c: GridCoord) -> Result<()> {
        self.planes.base_cost.add(delta, c)
    }

    pub fn via_cost_fill(&mut self, value: f32) {
        self.planes.via_cost.fill(value);
    }

    pub fn via_cost_at(&self, c: GridCoord) -> Result<f32> {
        self.planes.via_cost_at(c)
    }

    pub fn via_cost_set(&mut self, value: f32, c: GridCoord) -> Result<()> {
        self.planes.via_cost.set(value, c)
    }

    pub fn via_cost_add(&mut self, delta: f32, c: GridCoord) -> Result<()> {
        self.planes.via_cost.add(delta, c)
    }

    pub fn set_via_forbidden(&mut self, c: GridCoord) -> Result<()> {
        self.planes.via_forbidden.set(c)
    }

    pub fn is_via_forbidden(&self, c: GridCoord) -> Result<bool> {
        self.planes.via_forbidden.is_set(c)
    }

    /// Best known cost to `c` from the most recent search.
    pub fn working_cost_at(&self, c: GridCoord) -> Result<f32> {
        self.scratch.working().at(c)
    }

    pub fn set_current_design_rules(&mut self, clearance: i32, trace_width: i32, via_diameter: i32) {
        self.rules = DesignRules::new(clearance, trace_width, via_diameter);
    }

    pub fn current_design_rules(&self) -> DesignRules {
        self.rules
    }

    /// Stamps `value` on every in-bounds cell of `footprint` on each of
    /// `layers`, in the planes selected by `targets`. Off-grid cells are
    /// skipped. Returns the number of cells touched.
    pub fn stamp_footprint(
        &mut self,
        footprint: &Footprint,
        layers: &[i32],
        value: f32,
        targets: StampTargets,
    ) -> usize {
        self.for_each_footprint_cell(footprint, layers, |planes, idx| {
            if targets.base {
                planes.base_stamps.push(idx, value);
            }
            if targets.via {
                planes.via_stamps.push(idx, value);
            }
            if targets.via_forbidden {
                planes.via_forbidden.set_index(idx);
            }
        })
    }

    /// Removes a stamp previously made with the same arguments. Via
    /// forbidding is permanent and is not undone.
    pub fn unstamp_footprint(
        &mut self,
        footprint: &Footprint,
        layers: &[i32],
        value: f32,
        targets: StampTargets,
    ) -> usize {
        self.for_each_footprint_cell(footprint, layers, |planes, idx| {
            if targets.base {
                planes.base_stamps.pop(idx, value);
            }
            if targets.via {
                planes.via_stamps.pop(idx, value);
            }
        })
    }

    fn for_each_footprint_cell(
        &mut self,
        footprint: &Footprint,
        layers: &[i32],
        mut f: impl FnMut(&mut CostPlanes, usize),
    ) -> usize {
        let dims = self.planes.dims;
        let window = GridRect::new((0, 0), (dims.width, dims.height));
        let mut touched = 0;
        for &z in layers {
            if z < 0 || z >= dims.layers {
                continue;
            }
            footprint.for_each_cell_within(window, |x, y| {
                f(&mut self.planes, dims.index(GridCoord::new(x, y, z)));
                touched += 1;
            });
        }
        touched
    }
}

impl RoutingGrid for BoardGrid {
    fn dims(&self) -> GridDims {
        self.planes.dims
    }

    fn base_cost_at(&self, c: GridCoord) -> Result<f32> {
        self.planes.base_cost_at(c)
    }

    fn via_cost_at(&self, c: GridCoord) -> Result<f32> {
        self.planes.via_cost_at(c)
    }

    fn is_via_forbidden(&self, c: GridCoord) -> Result<bool> {
        self.planes.is_via_forbidden(c)
    }
}
