use crate::grid::{RoutingGrid, StepCosts};
use pcb_common::geom::coord::GridCoord;

pub const MAX_NEIGHBORS: usize = 10;

// Orthogonal moves first, then diagonals; the order fixes tie-breaking.
const PLANAR_MOVES: [(i32, i32); 8] = [
    (1, 0),
    (-1, 0),
    (0, 1),
    (0, -1),
    (1, 1),
    (1, -1),
    (-1, 1),
    (-1, -1),
];

/// Weighted out-edges of one cell: up to 8 planar moves and 2 layer changes.
#[derive(Clone, Copy)]
pub struct Neighbors {
    items: [(f32, GridCoord); MAX_NEIGHBORS],
    len: usize,
}

impl Neighbors {
    fn empty() -> Self {
        Self {
            items: [(0.0, GridCoord::default()); MAX_NEIGHBORS],
            len: 0,
        }
    }

    #[inline(always)]
    fn push(&mut self, weight: f32, c: GridCoord) {
        self.items[self.len] = (weight, c);
        self.len += 1;
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = &(f32, GridCoord)> {
        self.items[..self.len].iter()
    }
}

/// Edge weight = movement + base cost of the entered cell, plus its via cost
/// for layer changes. Off-grid cells and layer changes into via-forbidden
/// cells produce no edge. Negative plane values count as zero so weights
/// stay non-negative.
pub fn neighbors<G: RoutingGrid + ?Sized>(grid: &G, c: GridCoord, steps: &StepCosts) -> Neighbors {
    let mut out = Neighbors::empty();

    for (i, &(dx, dy)) in PLANAR_MOVES.iter().enumerate() {
        let n = c.offset(dx, dy, 0);
        let Ok(base) = grid.base_cost_at(n) else {
            continue;
        };
        let step = if i < 4 { steps.orthogonal } else { steps.diagonal };
        out.push(step + base.max(0.0), n);
    }

    for dz in [-1, 1] {
        let n = c.offset(0, 0, dz);
        if !matches!(grid.is_via_forbidden(n), Ok(false)) {
            continue;
        }
        let (Ok(base), Ok(via)) = (grid.base_cost_at(n), grid.via_cost_at(n)) else {
            continue;
        };
        out.push(steps.vertical + base.max(0.0) + via.max(0.0), n);
    }

    out
}
