//! Multi-pin connection and the commit / rip-up of a route's footprint.

use crate::algo::SearchGoal;
use crate::error::{Result, RouterError};
use crate::grid::dense::StampFn;
use crate::grid::{BoardGrid, Footprint, StampTargets};
use crate::route::{CommitRecord, Route};
use pcb_common::geom::coord::GridCoord;
use std::collections::HashSet;

impl BoardGrid {
    /// Connects every pin of `route` into one tree, greedily attaching the
    /// cheapest unconnected pin to everything routed so far.
    ///
    /// Replaces `features`, `path_starts` and `came_from`. On failure they
    /// are left empty; the cost planes are never touched.
    pub fn route_pins(&mut self, route: &mut Route) -> Result<()> {
        let net = route.net_id;
        if route.pins.is_empty() {
            return Err(RouterError::EmptyRoute(net));
        }
        for (i, pin) in route.pins.iter().enumerate() {
            if pin.alternatives.is_empty() {
                return Err(RouterError::EmptyPin { net, pin: i });
            }
            for &alt in &pin.alternatives {
                self.dims().checked_index(alt)?;
            }
        }

        route.features.clear();
        route.path_starts.clear();
        route.came_from.clear();

        let mut remaining: Vec<usize> = (1..route.pins.len()).collect();
        if remaining.is_empty() {
            route.features.push(route.pins[0].alternatives[0]);
            route.path_starts.push(0);
            return Ok(());
        }

        let mut sources: Vec<GridCoord> = route.pins[0].alternatives.clone();
        while !remaining.is_empty() {
            let targets: Vec<GridCoord> = remaining
                .iter()
                .flat_map(|&p| route.pins[p].alternatives.iter().copied())
                .collect();

            let outcome = self.dijkstra(&sources, SearchGoal::AnyOf(&targets))?;
            let Some(reached) = outcome.reached else {
                let pin = remaining[0];
                log::debug!(
                    "Net {}: {} pins unreachable after {} expansions",
                    net,
                    remaining.len(),
                    outcome.expansions
                );
                route.features.clear();
                route.path_starts.clear();
                route.came_from.clear();
                return Err(RouterError::Unreachable { net, pin });
            };

            let path = outcome.came_from.path_to(reached)?;
            let slot = remaining
                .iter()
                .position(|&p| route.pins[p].contains(reached))
                .unwrap_or(0);
            let pin = remaining.remove(slot);
            log::debug!(
                "Net {}: pin {} reached at {} (cost {:.3}, {} cells, {} expansions)",
                net,
                pin,
                reached,
                outcome.cost,
                path.len(),
                outcome.expansions
            );

            route.path_starts.push(route.features.len());
            route.features.extend_from_slice(&path);
            route.came_from.push(outcome.came_from);
            sources.clone_from(&route.features);
        }
        Ok(())
    }

    /// Connects the route's pins and commits the result into the planes.
    pub fn add_route(&mut self, route: &mut Route) -> Result<()> {
        self.route_pins(route)?;
        self.commit_route(route)
    }

    /// Stamps the route's current features into base cost, and its vias into
    /// via cost, sized by the current design rules. Commits stack: every
    /// call adds another layer of cost.
    pub fn commit_route(&mut self, route: &mut Route) -> Result<()> {
        for &f in &route.features {
            self.dims().checked_index(f)?;
        }
        // Branch paths repeat their junction cell; stamp it once.
        let mut seen = HashSet::new();
        let features: Vec<GridCoord> = route
            .features
            .iter()
            .copied()
            .filter(|f| seen.insert(*f))
            .collect();
        let record = CommitRecord {
            features,
            vias: via_sites(route),
            trace_radius: self.rules.trace_radius(),
            via_radius: self.rules.via_radius(),
            trace_cost: self.stamp_costs.trace,
            via_cost: self.stamp_costs.via,
        };
        let touched = self.apply_commit(&record, false);
        log::debug!(
            "Net {}: committed {} features, {} vias ({} cells)",
            route.net_id,
            record.features.len(),
            record.vias.len(),
            touched
        );
        route.commits.push(record);
        Ok(())
    }

    /// Removes the most recent commit of `route`, taking back exactly the
    /// stamps it made.
    pub fn ripup_route(&mut self, route: &mut Route) -> Result<()> {
        let record = route
            .commits
            .pop()
            .ok_or(RouterError::NotCommitted(route.net_id))?;
        let touched = self.apply_commit(&record, true);
        log::debug!("Net {}: ripped up ({} cells)", route.net_id, touched);
        Ok(())
    }

    fn apply_commit(&mut self, record: &CommitRecord, ripup: bool) -> usize {
        let stamp: StampFn = if ripup {
            Self::unstamp_footprint
        } else {
            Self::stamp_footprint
        };
        let mut touched = 0;
        for f in &record.features {
            let footprint = Footprint::disc(f.x, f.y, record.trace_radius);
            touched += stamp(self, &footprint, &[f.z], record.trace_cost, StampTargets::BASE);
        }

        let all_layers: Vec<i32> = (0..self.dims().layers).collect();
        for &(x, y) in &record.vias {
            let footprint = Footprint::disc(x, y, record.via_radius);
            touched += stamp(self, &footprint, &all_layers, record.via_cost, StampTargets::VIA);
        }
        touched
    }
}

/// Planar positions of every layer change along the route's paths.
fn via_sites(route: &Route) -> Vec<(i32, i32)> {
    let mut sites = Vec::new();
    for path in route.paths() {
        for pair in path.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if a.x == b.x && a.y == b.y && a.z != b.z {
                sites.push((a.x, a.y));
            }
        }
    }
    sites
}
