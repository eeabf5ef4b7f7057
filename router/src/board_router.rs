//! Board-level driver: seeds the grid from pads and routes nets in board order.

use crate::error::{Result, RouterError};
use crate::grid::dense::StampFn;
use crate::grid::{BoardGrid, Footprint, StampTargets};
use crate::route::{Pin, Route};
use pcb_common::db::board::{Board, NetclassData};
use pcb_common::db::indices::NetId;
use pcb_common::util::config::RoutingConfig;
use pcb_common::util::profiler::ScopedTimer;

/// A net that was not routed, and why.
#[derive(Clone, Debug, PartialEq)]
pub struct NetFailure {
    pub net_id: NetId,
    pub error: RouterError,
}

#[derive(Clone, Debug, Default)]
pub struct RoutingReport {
    pub routed: Vec<Route>,
    /// Nets whose search failed. Routing continued past them.
    pub failed: Vec<NetFailure>,
    /// Nets rejected before routing, e.g. for an unknown netclass.
    pub skipped: Vec<NetFailure>,
    /// Nets with fewer than two pads.
    pub trivial: usize,
}

impl RoutingReport {
    pub fn total_wirelength(&self) -> f64 {
        self.routed.iter().map(|r| r.stats().wirelength).sum()
    }

    pub fn total_vias(&self) -> usize {
        self.routed.iter().map(|r| r.stats().vias).sum()
    }
}

pub struct BoardRouter {
    grid: BoardGrid,
    layers: i32,
    pin_cost: f32,
}

impl BoardRouter {
    /// Allocates the grid for `board` and stamps every pad as an obstacle.
    pub fn new(board: &Board, config: &RoutingConfig) -> Result<Self> {
        let mut grid = BoardGrid::from_config(board.width, board.height, board.layers, config)?;
        let targets = StampTargets {
            via_forbidden: config.forbid_vias_under_pads,
            ..StampTargets::BASE_AND_VIA
        };
        let mut cells = 0;
        for pad in &board.pads {
            let footprint = Footprint::Rect(pad.outline());
            cells += grid.stamp_footprint(
                &footprint,
                &pad.grid_layers(board.layers),
                config.pin_cost,
                targets,
            );
        }
        log::info!(
            "Grid {}x{}x{}: {} pads stamped over {} cells, {} via-forbidden",
            board.width,
            board.height,
            board.layers,
            board.pads.len(),
            cells,
            grid.planes().via_forbidden().count()
        );

        Ok(Self {
            grid,
            layers: board.layers,
            pin_cost: config.pin_cost,
        })
    }

    pub fn grid(&self) -> &BoardGrid {
        &self.grid
    }

    pub fn grid_mut(&mut self) -> &mut BoardGrid {
        &mut self.grid
    }

    /// Routes and commits one net. Fails without touching the planes when
    /// the net or its netclass is unknown.
    pub fn route_net(&mut self, board: &Board, net_id: NetId) -> Result<Route> {
        let netclass = lookup_netclass(board, net_id)?;
        let mut route = self.route_of(board, net_id);
        self.grid.set_current_design_rules(
            netclass.clearance,
            netclass.trace_width,
            netclass.via_diameter,
        );
        self.with_own_pads_released(board, net_id, |grid| grid.add_route(&mut route))?;
        Ok(route)
    }

    /// Removes a committed net from the planes.
    pub fn ripup_net(&mut self, route: &mut Route) -> Result<()> {
        self.grid.ripup_route(route)
    }

    /// Rips up `route` if committed, then routes and commits it again
    /// against the current planes.
    pub fn reroute_net(&mut self, board: &Board, route: &mut Route) -> Result<()> {
        let netclass = lookup_netclass(board, route.net_id)?;
        if route.is_committed() {
            self.grid.ripup_route(route)?;
        }
        self.grid.set_current_design_rules(
            netclass.clearance,
            netclass.trace_width,
            netclass.via_diameter,
        );
        let net_id = route.net_id;
        self.with_own_pads_released(board, net_id, |grid| grid.add_route(route))
    }

    /// Routes every net in board order. Per-net problems are collected in
    /// the report; nothing here is fatal.
    pub fn route_all(&mut self, board: &Board) -> RoutingReport {
        let _timer = ScopedTimer::new("Routing");
        let mut report = RoutingReport::default();
        let total = board.nets.len();

        for (i, net) in board.nets.iter().enumerate() {
            if let Err(error) = lookup_netclass(board, net.id) {
                log::warn!("Skipping net {} ({}): {}", net.id, net.name, error);
                report.skipped.push(NetFailure {
                    net_id: net.id,
                    error,
                });
                continue;
            }
            if board.pads_of(net.id).nth(1).is_none() {
                log::debug!("Net {} ({}) has fewer than two pads", net.id, net.name);
                report.trivial += 1;
                continue;
            }

            let _net_timer =
                ScopedTimer::with_level(format!("Net {} ({})", net.id, net.name), log::Level::Debug);
            match self.route_net(board, net.id) {
                Ok(route) => {
                    let stats = route.stats();
                    log::info!(
                        "[{}/{}] Routed net {} ({}): WL {:.2}, {} vias",
                        i + 1,
                        total,
                        net.id,
                        net.name,
                        stats.wirelength,
                        stats.vias
                    );
                    report.routed.push(route);
                }
                Err(error) => {
                    log::error!("[{}/{}] Net {} ({}): {}", i + 1, total, net.id, net.name, error);
                    report.failed.push(NetFailure {
                        net_id: net.id,
                        error,
                    });
                }
            }
        }

        log::info!(
            "Routed {}/{} nets ({} failed, {} skipped, {} trivial). WL {:.2}, {} vias",
            report.routed.len(),
            total,
            report.failed.len(),
            report.skipped.len(),
            report.trivial,
            report.total_wirelength(),
            report.total_vias()
        );
        report
    }

    fn route_of(&self, board: &Board, net_id: NetId) -> Route {
        let mut route = Route::new(net_id);
        for (_, pad) in board.pads_of(net_id) {
            let (x, y) = pad.center();
            route.add_pin(Pin::with_layers(x, y, &pad.grid_layers(self.layers)));
        }
        route
    }

    /// Runs `f` with the net's own pad cost lifted from base and via cost, so
    /// the search can enter its pins. The cost is put back whatever `f`
    /// returns.
    fn with_own_pads_released<T>(
        &mut self,
        board: &Board,
        net_id: NetId,
        f: impl FnOnce(&mut BoardGrid) -> Result<T>,
    ) -> Result<T> {
        self.stamp_own_pads(board, net_id, BoardGrid::unstamp_footprint);
        let result = f(&mut self.grid);
        self.stamp_own_pads(board, net_id, BoardGrid::stamp_footprint);
        result
    }

    fn stamp_own_pads(&mut self, board: &Board, net_id: NetId, stamp: StampFn) {
        for (_, pad) in board.pads_of(net_id) {
            let footprint = Footprint::Rect(pad.outline());
            stamp(
                &mut self.grid,
                &footprint,
                &pad.grid_layers(self.layers),
                self.pin_cost,
                StampTargets::BASE_AND_VIA,
            );
        }
    }
}

fn lookup_netclass(board: &Board, net_id: NetId) -> Result<&NetclassData> {
    let net = board.net(net_id).ok_or(RouterError::InvalidNet(net_id))?;
    board
        .netclass(net.netclass)
        .ok_or(RouterError::InvalidNetclass {
            net: net_id,
            netclass: net.netclass,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use pcb_common::geom::coord::GridCoord;

    const BOARD: &str = r#"
width = 16
height = 8
layers = 2

[[netclasses]]
id = 0
name = "Default"
clearance = 0
trace_width = 0
via_diameter = 0

[[nets]]
id = 0
name = "A"
netclass = 0

[[nets]]
id = 1
name = "B"
netclass = 0

[[nets]]
id = 2
name = "BAD"
netclass = 7

[[nets]]
id = 3
name = "LONELY"
netclass = 0

[[pads]]
name = "A1"
net = 0
x = 1.5
y = 1.5
width = 1.0
height = 1.0
layers = [0]

[[pads]]
name = "A2"
net = 0
x = 12.5
y = 1.5
width = 1.0
height = 1.0
layers = [0]

[[pads]]
name = "B1"
net = 1
x = 1.5
y = 5.5
width = 1.0
height = 1.0
through_hole = true

[[pads]]
name = "B2"
net = 1
x = 12.5
y = 5.5
width = 1.0
height = 1.0
through_hole = true

[[pads]]
name = "BAD1"
net = 2
x = 7.5
y = 6.5
width = 1.0
height = 1.0
layers = [0]

[[pads]]
name = "BAD2"
net = 2
x = 9.5
y = 6.5
width = 1.0
height = 1.0
layers = [0]

[[pads]]
name = "L1"
net = 3
x = 14.5
y = 7.5
width = 1.0
height = 1.0
layers = [1]
"#;

    fn board() -> Board {
        toml::from_str(BOARD).unwrap()
    }

    fn base(router: &BoardRouter) -> Vec<f32> {
        router.grid().planes().base_cost().as_slice().to_vec()
    }

    fn via(router: &BoardRouter) -> Vec<f32> {
        router.grid().planes().via_cost().as_slice().to_vec()
    }

    #[test]
    fn pads_are_stamped_on_their_layers() {
        let board = board();
        let router = BoardRouter::new(&board, &RoutingConfig::default()).unwrap();
        let grid = router.grid();
        let smd = GridCoord::new(1, 1, 0);
        assert_eq!(grid.base_cost_at(smd).unwrap(), 1000.0);
        assert_eq!(grid.via_cost_at(smd).unwrap(), 1000.0);
        assert!(grid.is_via_forbidden(smd).unwrap());
        assert_eq!(grid.base_cost_at(GridCoord::new(1, 1, 1)).unwrap(), 0.0);

        for z in 0..2 {
            assert_eq!(grid.base_cost_at(GridCoord::new(12, 5, z)).unwrap(), 1000.0);
        }
    }

    #[test]
    fn via_forbidding_follows_config() {
        let board = board();
        let config = RoutingConfig {
            forbid_vias_under_pads: false,
            ..Default::default()
        };
        let router = BoardRouter::new(&board, &config).unwrap();
        assert_eq!(router.grid().planes().via_forbidden().count(), 0);
    }

    #[test]
    fn route_all_collects_routed_skipped_and_trivial_nets() {
        let board = board();
        let (router, report) = crate::route_board(&board, &RoutingConfig::default()).unwrap();

        let routed: Vec<NetId> = report.routed.iter().map(|r| r.net_id).collect();
        assert_eq!(routed, vec![NetId(0), NetId(1)]);
        assert!(report.failed.is_empty());
        assert_eq!(
            report.skipped,
            vec![NetFailure {
                net_id: NetId(2),
                error: RouterError::InvalidNetclass {
                    net: NetId(2),
                    netclass: pcb_common::db::indices::NetclassId(7),
                },
            }]
        );
        assert_eq!(report.trivial, 1);

        for route in &report.routed {
            assert!(route.is_committed());
            assert!(route.connects_all_pins());
        }
        assert_abs_diff_eq!(report.total_wirelength(), 22.0);
        assert_eq!(report.total_vias(), 0);

        // Own pad cost is restored once each net is done.
        let grid = router.grid();
        assert_eq!(grid.base_cost_at(GridCoord::new(1, 1, 0)).unwrap(), 1010.0);
    }

    #[test]
    fn invalid_ids_leave_planes_unchanged() {
        let board = board();
        let mut router = BoardRouter::new(&board, &RoutingConfig::default()).unwrap();
        let (b, v) = (base(&router), via(&router));

        assert_eq!(
            router.route_net(&board, NetId(42)).unwrap_err(),
            RouterError::InvalidNet(NetId(42))
        );
        assert!(matches!(
            router.route_net(&board, NetId(2)),
            Err(RouterError::InvalidNetclass { .. })
        ));
        assert_eq!(base(&router), b);
        assert_eq!(via(&router), v);
    }

    #[test]
    fn unreachable_net_fails_and_routing_continues() {
        let board = board();
        let mut router = BoardRouter::new(&board, &RoutingConfig::default()).unwrap();
        // Pad A2 sits on layer 0 only and forbids vias; wall it in on that layer.
        for (x, y) in [(11, 0), (12, 0), (13, 0), (11, 1), (13, 1), (11, 2), (12, 2), (13, 2)] {
            router
                .grid_mut()
                .base_cost_set(f32::INFINITY, GridCoord::new(x, y, 0))
                .unwrap();
        }
        let before = base(&router);
        let report = router.route_all(&board);

        assert_eq!(
            report.failed,
            vec![NetFailure {
                net_id: NetId(0),
                error: RouterError::Unreachable {
                    net: NetId(0),
                    pin: 1
                },
            }]
        );
        assert_eq!(report.routed.len(), 1);
        assert_eq!(report.routed[0].net_id, NetId(1));

        // Only net B left a footprint; net A's pads carry their full cost again.
        let after = base(&router);
        let a1 = router.grid().dims().index(GridCoord::new(1, 1, 0));
        assert_eq!(after[a1], before[a1]);
    }

    #[test]
    fn fractional_pin_cost_survives_release_and_ripup() {
        let board = board();
        let config = RoutingConfig {
            pin_cost: 0.1,
            ..Default::default()
        };
        let mut router = BoardRouter::new(&board, &config).unwrap();
        let (b, v) = (base(&router), via(&router));

        let mut route = router.route_net(&board, NetId(0)).unwrap();
        let a1 = GridCoord::new(1, 1, 0);
        assert_eq!(router.grid().base_cost_at(a1).unwrap(), 0.1 + 10.0);
        router.ripup_net(&mut route).unwrap();
        assert_eq!(base(&router), b);
        assert_eq!(via(&router), v);
        assert_eq!(router.grid().base_cost_at(a1).unwrap(), 0.1);
    }

    #[test]
    fn ripup_and_reroute_restore_the_same_route() {
        let board = board();
        let mut router = BoardRouter::new(&board, &RoutingConfig::default()).unwrap();
        let seeded = base(&router);

        let mut route = router.route_net(&board, NetId(1)).unwrap();
        let first = route.features.clone();
        router.ripup_net(&mut route).unwrap();
        assert_eq!(base(&router), seeded);

        router.reroute_net(&board, &mut route).unwrap();
        assert_eq!(route.features, first);
        assert_eq!(route.commit_count(), 1);

        // Rerouting a committed route replaces its footprint.
        router.reroute_net(&board, &mut route).unwrap();
        assert_eq!(route.commit_count(), 1);
        router.ripup_net(&mut route).unwrap();
        assert_eq!(base(&router), seeded);
    }
}
