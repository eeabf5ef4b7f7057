use super::dijkstra::{SearchGoal, SearchOutcome, prepare_goal};
use super::neighbors::neighbors;
use super::scratch::SearchScratch;
use crate::error::Result;
use crate::grid::{BoardGrid, RoutingGrid, StepCosts};
use pcb_common::geom::coord::GridCoord;
use std::collections::VecDeque;

/// Uniform-cost connectivity search. Uses the same edges as [`dijkstra`]
/// (bounds and via-forbidden cells respected) but ignores their weights:
/// the working cost of a cell is its hop count from the nearest source.
///
/// [`dijkstra`]: super::dijkstra::dijkstra
pub fn breadth_first_search<G: RoutingGrid + ?Sized>(
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
    let mut frontier = VecDeque::new();

    for &start in sources {
        let idx = dims.index(start);
        if scratch.cost(idx) == 0.0 {
            continue;
        }
        scratch.reach_source(idx);
        frontier.push_back(idx as u32);
    }

    let mut expansions = 0;
    while let Some(index) = frontier.pop_front() {
        let hops = scratch.cost(index as usize);
        let position = dims.coord(index as usize);
        if stop_early && targets.binary_search(&index).is_ok() {
            return Ok(SearchOutcome {
                came_from: scratch.came_from(),
                reached: Some(position),
                cost: hops,
                expansions,
            });
        }
        expansions += 1;

        for &(_, neighbor) in neighbors(grid, position, steps).iter() {
            let next = dims.index(neighbor);
            if scratch.cost(next).is_infinite() {
                scratch.reach(next, hops + 1.0, index);
                frontier.push_back(next as u32);
            }
        }
    }

    Ok(SearchOutcome {
        came_from: scratch.came_from(),
        reached: None,
        cost: f32::INFINITY,
        expansions,
    })
}

impl BoardGrid {
    pub fn breadth_first_search(
        &mut self,
        sources: &[GridCoord],
        goal: SearchGoal,
    ) -> Result<SearchOutcome> {
        breadth_first_search(&self.planes, &mut self.scratch, sources, goal, &self.steps)
    }
}
