use super::came_from::CameFrom;
use super::neighbors::neighbors;
use super::scratch::SearchScratch;
use crate::error::{Result, RouterError};
use crate::grid::{BoardGrid, GridDims, RoutingGrid, StepCosts};
use pcb_common::geom::coord::GridCoord;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Queue entry. The heap pops the lowest cost first; among equal costs the
/// entry pushed first wins.
#[derive(Copy, Clone, Debug)]
struct State {
    cost: f32,
    seq: u64,
    index: u32,
}

impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for State {}

/// When a search may stop.
#[derive(Clone, Copy, Debug)]
pub enum SearchGoal<'a> {
    /// Settle every reachable cell.
    Exhaustive,
    /// Stop once this cell is settled.
    Target(GridCoord),
    /// Stop at the first of these cells to be settled, which is the cheapest.
    AnyOf(&'a [GridCoord]),
}

#[derive(Debug)]
pub struct SearchOutcome {
    pub came_from: CameFrom,
    /// The goal cell that stopped the search, if any.
    pub reached: Option<GridCoord>,
    /// Cost of `reached`, infinite when nothing was reached.
    pub cost: f32,
    pub expansions: usize,
}

impl SearchOutcome {
    fn unreached(came_from: CameFrom, expansions: usize) -> Self {
        Self {
            came_from,
            reached: None,
            cost: f32::INFINITY,
            expansions,
        }
    }

    pub fn path(&self) -> Option<Result<Vec<GridCoord>>> {
        self.reached.map(|c| self.came_from.path_to(c))
    }
}

/// Validates sources and goal cells and returns the goal cell offsets,
/// sorted and deduplicated.
pub(crate) fn prepare_goal(
    dims: GridDims,
    sources: &[GridCoord],
    goal: SearchGoal,
) -> Result<Vec<u32>> {
    for &s in sources {
        dims.checked_index(s)?;
    }
    let targets: &[GridCoord] = match goal {
        SearchGoal::Exhaustive => &[],
        SearchGoal::Target(ref t) => std::slice::from_ref(t),
        SearchGoal::AnyOf(ts) => ts,
    };
    let mut offsets = Vec::with_capacity(targets.len());
    for &t in targets {
        offsets.push(dims.checked_index(t)? as u32);
    }
    offsets.sort_unstable();
    offsets.dedup();
    Ok(offsets)
}

/// Multi-source label-setting shortest path over the grid.
///
/// The scratch is reset, every source starts at cost zero, and each settled
/// cell relaxes its neighbor edges. Stale queue entries are skipped instead
/// of decreased in place.
pub fn dijkstra<G: RoutingGrid + ?Sized>(
    grid: &G,
    scratch: &mut SearchScratch,
    sources: &[GridCoord],
    goal: SearchGoal,
    steps: &StepCosts,
) -> Result<SearchOutcome> {
    let dims = grid.dims();
    let targets = prepare_goal(dims, sources, goal)?;
    let stop_early = !matches!(goal, SearchGoal::Exhaustive);

    scratch.reset();
    let mut heap = BinaryHeap::new();
    let mut seq = 0u64;

    for &start in sources {
        let idx = dims.index(start);
        if scratch.cost(idx) == 0.0 {
            continue;
        }
        scratch.reach_source(idx);
        heap.push(State {
            cost: 0.0,
            seq,
            index: idx as u32,
        });
        seq += 1;
    }

    let mut expansions = 0;
    while let Some(State { cost, index, .. }) = heap.pop() {
        let curr = index as usize;
        if cost > scratch.cost(curr) {
            continue;
        }
        let position = dims.coord(curr);
        if stop_early && targets.binary_search(&index).is_ok() {
            log::trace!(
                "dijkstra reached {} at cost {:.3} after {} expansions ({} cells labelled)",
                position,
                cost,
                expansions,
                scratch.reached_count()
            );
            return Ok(SearchOutcome {
                came_from: scratch.came_from(),
                reached: Some(position),
                cost,
                expansions,
            });
        }
        expansions += 1;

        for &(weight, neighbor) in neighbors(grid, position, steps).iter() {
            let tentative = cost + weight;
            let next = dims.index(neighbor);
            if tentative < scratch.cost(next) {
                scratch.reach(next, tentative, index);
                heap.push(State {
                    cost: tentative,
                    seq,
                    index: next as u32,
                });
                seq += 1;
            }
        }
    }

    if stop_early {
        log::debug!(
            "dijkstra exhausted {} cells without reaching any of {} goal cells",
            expansions,
            targets.len()
        );
    }
    Ok(SearchOutcome::unreached(scratch.came_from(), expansions))
}

impl BoardGrid {
    pub fn dijkstra(&mut self, sources: &[GridCoord], goal: SearchGoal) -> Result<SearchOutcome> {
        dijkstra(&self.planes, &mut self.scratch, sources, goal, &self.steps)
    }

    /// Cheapest path from any of `sources` to `target`, with its cost.
    pub fn shortest_path(
        &mut self,
        sources: &[GridCoord],
        target: GridCoord,
    ) -> Result<(f32, Vec<GridCoord>)> {
        let outcome = self.dijkstra(sources, SearchGoal::Target(target))?;
        match outcome.reached {
            Some(end) => Ok((outcome.cost, outcome.came_from.path_to(end)?)),
            None => Err(RouterError::TargetUnreachable(target)),
        }
    }

    /// After an exhaustive search: the candidate with the lowest finite
    /// working cost, earliest in `candidates` on ties.
    pub fn nearest_reached(&self, candidates: &[GridCoord]) -> Option<(GridCoord, f32)> {
        let mut best: Option<(GridCoord, f32)> = None;
        for &c in candidates {
            let Ok(cost) = self.scratch.working().at(c) else {
                continue;
            };
            if cost.is_finite() && best.is_none_or(|(_, b)| cost < b) {
                best = Some((c, cost));
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn c(x: i32, y: i32, z: i32) -> GridCoord {
        GridCoord::new(x, y, z)
    }

    #[test]
    fn state_ordering_is_min_cost_then_fifo() {
        let mut heap = BinaryHeap::new();
        heap.push(State { cost: 2.0, seq: 0, index: 0 });
        heap.push(State { cost: 1.0, seq: 2, index: 1 });
        heap.push(State { cost: 1.0, seq: 1, index: 2 });
        let order: Vec<u32> = std::iter::from_fn(|| heap.pop().map(|s| s.index)).collect();
        assert_eq!(order, vec![2, 1, 0]);
    }

    #[test]
    fn straight_run_on_empty_grid() {
        let mut grid = BoardGrid::new(5, 5, 1).unwrap();
        let (cost, path) = grid.shortest_path(&[c(0, 0, 0)], c(4, 0, 0)).unwrap();
        assert_abs_diff_eq!(cost, 4.0, epsilon = 1e-5);
        assert_eq!(path.len(), 5);
        assert_eq!(path.first(), Some(&c(0, 0, 0)));
        assert_eq!(path.last(), Some(&c(4, 0, 0)));
    }

    #[test]
    fn diagonal_run_on_empty_grid() {
        let mut grid = BoardGrid::new(5, 5, 1).unwrap();
        let (cost, path) = grid.shortest_path(&[c(0, 0, 0)], c(3, 3, 0)).unwrap();
        assert_abs_diff_eq!(cost, 3.0 * std::f32::consts::SQRT_2, epsilon = 1e-4);
        assert_eq!(path, vec![c(0, 0, 0), c(1, 1, 0), c(2, 2, 0), c(3, 3, 0)]);
    }

    #[test]
    fn routes_around_expensive_cell() {
        let mut grid = BoardGrid::new(5, 5, 1).unwrap();
        let (clear_cost, _) = grid.shortest_path(&[c(0, 2, 0)], c(4, 2, 0)).unwrap();

        grid.base_cost_set(1000.0, c(2, 2, 0)).unwrap();
        let (cost, path) = grid.shortest_path(&[c(0, 2, 0)], c(4, 2, 0)).unwrap();
        assert!(!path.contains(&c(2, 2, 0)));
        assert!(cost > clear_cost);
        assert!(cost < 1000.0);
        assert_abs_diff_eq!(cost, 2.0 + 2.0 * std::f32::consts::SQRT_2, epsilon = 1e-4);
    }

    #[test]
    fn isolated_target_is_unreachable() {
        let mut grid = BoardGrid::new(1, 1, 2).unwrap();
        let target = c(0, 0, 1);
        grid.set_via_forbidden(target).unwrap();

        let outcome = grid.dijkstra(&[c(0, 0, 0)], SearchGoal::Target(target)).unwrap();
        assert!(outcome.reached.is_none());
        assert!(outcome.cost.is_infinite());
        assert!(grid.working_cost_at(target).unwrap().is_infinite());
        assert_eq!(
            grid.shortest_path(&[c(0, 0, 0)], target),
            Err(RouterError::TargetUnreachable(target))
        );
    }

    #[test]
    fn layer_change_pays_step_and_via_cost() {
        let mut grid = BoardGrid::new(3, 1, 2).unwrap();
        grid.via_cost_set(5.0, c(0, 0, 1)).unwrap();
        let (cost, path) = grid.shortest_path(&[c(0, 0, 0)], c(0, 0, 1)).unwrap();
        assert_abs_diff_eq!(cost, 10.0 + 5.0, epsilon = 1e-5);
        assert_eq!(path, vec![c(0, 0, 0), c(0, 0, 1)]);
    }

    #[test]
    fn sources_start_at_zero_and_costs_stay_non_negative() {
        let mut grid = BoardGrid::new(6, 4, 2).unwrap();
        grid.base_cost_set(-50.0, c(3, 3, 0)).unwrap();
        let sources = [c(0, 0, 0), c(5, 3, 1)];
        grid.dijkstra(&sources, SearchGoal::Exhaustive).unwrap();
        for &s in &sources {
            assert_eq!(grid.working_cost_at(s).unwrap(), 0.0);
        }
        assert!(grid.scratch.working().as_slice().iter().all(|&v| v >= 0.0 && v.is_finite()));
        assert_eq!(grid.scratch.reached_count(), 6 * 4 * 2);
    }

    #[test]
    fn identical_searches_are_identical() {
        let mut grid = BoardGrid::new(8, 8, 2).unwrap();
        grid.base_cost_set(3.0, c(4, 4, 0)).unwrap();
        grid.base_cost_set(3.0, c(3, 4, 0)).unwrap();
        let first = grid.shortest_path(&[c(0, 0, 0), c(7, 0, 0)], c(4, 7, 0)).unwrap();
        let second = grid.shortest_path(&[c(0, 0, 0), c(7, 0, 0)], c(4, 7, 0)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn equal_cost_ties_follow_source_order() {
        let mut grid = BoardGrid::new(5, 1, 1).unwrap();
        let (_, path) = grid.shortest_path(&[c(0, 0, 0), c(4, 0, 0)], c(2, 0, 0)).unwrap();
        assert_eq!(path.first(), Some(&c(0, 0, 0)));
        let (_, path) = grid.shortest_path(&[c(4, 0, 0), c(0, 0, 0)], c(2, 0, 0)).unwrap();
        assert_eq!(path.first(), Some(&c(4, 0, 0)));
    }

    #[test]
    fn any_of_agrees_with_exhaustive_nearest() {
        let mut grid = BoardGrid::new(10, 10, 2).unwrap();
        grid.base_cost_set(20.0, c(2, 2, 0)).unwrap();
        let candidates = [c(9, 9, 0), c(3, 3, 0), c(0, 6, 1)];

        let outcome = grid
            .dijkstra(&[c(0, 0, 0)], SearchGoal::AnyOf(&candidates))
            .unwrap();
        grid.dijkstra(&[c(0, 0, 0)], SearchGoal::Exhaustive).unwrap();
        let (nearest, cost) = grid.nearest_reached(&candidates).unwrap();

        assert_eq!(outcome.reached, Some(nearest));
        assert_abs_diff_eq!(outcome.cost, cost, epsilon = 1e-4);
    }

    #[test]
    fn out_of_bounds_sources_and_targets_are_rejected() {
        let mut grid = BoardGrid::new(3, 3, 1).unwrap();
        assert!(matches!(
            grid.dijkstra(&[c(3, 0, 0)], SearchGoal::Exhaustive),
            Err(RouterError::OutOfBounds { .. })
        ));
        assert!(matches!(
            grid.dijkstra(&[c(0, 0, 0)], SearchGoal::Target(c(0, 0, 1))),
            Err(RouterError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn came_from_holds_only_reached_cells() {
        let mut grid = BoardGrid::new(4, 1, 1).unwrap();
        grid.base_cost_set(f32::INFINITY, c(2, 0, 0)).unwrap();
        let outcome = grid.dijkstra(&[c(0, 0, 0), c(0, 0, 0)], SearchGoal::Exhaustive).unwrap();
        assert_eq!(outcome.came_from.len(), 2);
        assert!(outcome.came_from.is_source(c(0, 0, 0)));
        assert_eq!(outcome.came_from.parent(c(1, 0, 0)), Some(c(0, 0, 0)));
        assert!(!outcome.came_from.contains(c(3, 0, 0)));
    }

    #[test]
    fn source_that_is_target_costs_nothing() {
        let mut grid = BoardGrid::new(3, 3, 1).unwrap();
        let (cost, path) = grid.shortest_path(&[c(1, 1, 0)], c(1, 1, 0)).unwrap();
        assert_eq!(cost, 0.0);
        assert_eq!(path, vec![c(1, 1, 0)]);
    }
}
