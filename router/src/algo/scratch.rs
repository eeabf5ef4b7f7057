use super::came_from::CameFrom;
use crate::error::Result;
use crate::grid::plane::allocate;
use crate::grid::{CostPlane, GridDims};

const NO_PARENT: u32 = u32::MAX;

/// Per-search state, allocated once per grid and reused by every search:
/// the working cost and a dense parent offset per cell, indexed like the
/// cost planes.
#[derive(Clone, Debug)]
pub struct SearchScratch {
    working: CostPlane,
    parents: Vec<u32>,
    /// Cells given a finite cost by the current search, in first-reach order.
    touched: Vec<u32>,
}

impl SearchScratch {
    pub fn new(dims: GridDims) -> Result<Self> {
        Ok(Self {
            working: CostPlane::new("working cost", dims, f32::INFINITY)?,
            parents: allocate("parents", dims.len(), NO_PARENT)?,
            touched: Vec::new(),
        })
    }

    pub fn working(&self) -> &CostPlane {
        &self.working
    }

    /// Forgets the previous search. Parents are not cleared: a cell's parent
    /// is always written when the cell is first reached.
    pub(crate) fn reset(&mut self) {
        self.working.fill(f32::INFINITY);
        self.touched.clear();
    }

    #[inline(always)]
    pub(crate) fn cost(&self, idx: usize) -> f32 {
        self.working.at_index(idx)
    }

    #[inline(always)]
    pub(crate) fn reach_source(&mut self, idx: usize) {
        self.reach(idx, 0.0, NO_PARENT);
    }

    #[inline(always)]
    pub(crate) fn reach(&mut self, idx: usize, cost: f32, parent: u32) {
        if self.working.at_index(idx).is_infinite() {
            self.touched.push(idx as u32);
        }
        self.working.set_index(cost, idx);
        self.parents[idx] = parent;
    }

    pub(crate) fn reached_count(&self) -> usize {
        self.touched.len()
    }

    /// Snapshot of the parent pointers of every cell this search reached.
    pub(crate) fn came_from(&self) -> CameFrom {
        let dims = self.working.dims();
        CameFrom::from_entries(self.touched.iter().map(|&idx| {
            let parent = self.parents[idx as usize];
            let parent = (parent != NO_PARENT).then(|| dims.coord(parent as usize));
            (dims.coord(idx as usize), parent)
        }))
    }
}
