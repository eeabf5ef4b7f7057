use crate::algo::CameFrom;
use pcb_common::db::indices::NetId;
use pcb_common::geom::coord::GridCoord;
use std::collections::{HashSet, VecDeque};

/// One physical pin. A pad reachable on several layers lists one cell per
/// layer; reaching any of them connects the pin.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pin {
    pub alternatives: Vec<GridCoord>,
}

impl Pin {
    pub fn new(alternatives: Vec<GridCoord>) -> Self {
        Self { alternatives }
    }

    pub fn at(c: GridCoord) -> Self {
        Self {
            alternatives: vec![c],
        }
    }

    pub fn with_layers(x: i32, y: i32, layers: &[i32]) -> Self {
        Self {
            alternatives: layers.iter().map(|&z| GridCoord::new(x, y, z)).collect(),
        }
    }

    pub fn contains(&self, c: GridCoord) -> bool {
        self.alternatives.contains(&c)
    }
}

/// Exactly what one commit stamped, so rip-up can negate it even after the
/// route or the design rules change.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct CommitRecord {
    pub features: Vec<GridCoord>,
    pub vias: Vec<(i32, i32)>,
    pub trace_radius: i32,
    pub via_radius: i32,
    pub trace_cost: f32,
    pub via_cost: f32,
}

/// A net's unit of work: its pins, the search trees that connected them,
/// and the resulting geometry.
#[derive(Clone, Debug, Default)]
pub struct Route {
    pub net_id: NetId,
    pub pins: Vec<Pin>,
    /// One map per connection step.
    pub came_from: Vec<CameFrom>,
    /// Concatenated connection paths, each in source-to-pin order.
    pub features: Vec<GridCoord>,
    /// Index into `features` where each connection path begins. Empty means
    /// the features are a single path.
    pub path_starts: Vec<usize>,
    pub(crate) commits: Vec<CommitRecord>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RouteSegment {
    /// Straight run on one layer between two cells.
    Wire {
        start: GridCoord,
        end: GridCoord,
    },
    /// Layer change at (x, y).
    Via { x: i32, y: i32, from: i32, to: i32 },
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RouteStats {
    pub wirelength: f64,
    pub vias: usize,
}

impl Route {
    pub fn new(net_id: NetId) -> Self {
        Self {
            net_id,
            ..Self::default()
        }
    }

    pub fn with_pins(net_id: NetId, pins: Vec<Pin>) -> Self {
        Self {
            net_id,
            pins,
            ..Self::default()
        }
    }

    /// Single source, single sink.
    pub fn two_pin(net_id: NetId, start: GridCoord, end: GridCoord) -> Self {
        Self::with_pins(net_id, vec![Pin::at(start), Pin::at(end)])
    }

    pub fn add_pin(&mut self, pin: Pin) {
        self.pins.push(pin);
    }

    pub fn is_committed(&self) -> bool {
        !self.commits.is_empty()
    }

    pub fn commit_count(&self) -> usize {
        self.commits.len()
    }

    /// The connection paths making up `features`.
    pub fn paths(&self) -> Vec<&[GridCoord]> {
        if self.path_starts.is_empty() {
            return vec![&self.features[..]];
        }
        let mut paths = Vec::with_capacity(self.path_starts.len());
        for (i, &start) in self.path_starts.iter().enumerate() {
            let end = self
                .path_starts
                .get(i + 1)
                .copied()
                .unwrap_or(self.features.len())
                .min(self.features.len());
            if start < end {
                paths.push(&self.features[start..end]);
            }
        }
        paths
    }

    /// Wire segments and vias along each path. Collinear steps on one layer
    /// merge into one wire; consecutive cells more than one step apart are
    /// skipped.
    pub fn segments(&self) -> Vec<RouteSegment> {
        let mut segments = Vec::new();
        for path in self.paths() {
            let mut local: Vec<RouteSegment> = Vec::new();
            for pair in path.windows(2) {
                let (prev, curr) = (pair[0], pair[1]);
                if !prev.is_adjacent_or_same(&curr) {
                    continue;
                }
                if prev.z != curr.z {
                    local.push(RouteSegment::Via {
                        x: prev.x,
                        y: prev.y,
                        from: prev.z,
                        to: curr.z,
                    });
                }
                if prev.x == curr.x && prev.y == curr.y {
                    continue;
                }
                let start = prev.with_layer(curr.z);
                let dir = ((curr.x - prev.x).signum(), (curr.y - prev.y).signum());
                if let Some(RouteSegment::Wire { start: s, end }) = local.last_mut() {
                    let last_dir = ((end.x - s.x).signum(), (end.y - s.y).signum());
                    if *end == start && last_dir == dir {
                        *end = curr;
                        continue;
                    }
                }
                local.push(RouteSegment::Wire { start, end: curr });
            }
            segments.extend(local);
        }
        segments
    }

    pub fn stats(&self) -> RouteStats {
        let mut stats = RouteStats::default();
        for path in self.paths() {
            for pair in path.windows(2) {
                let (prev, curr) = (pair[0], pair[1]);
                if !prev.is_adjacent_or_same(&curr) {
                    continue;
                }
                if prev.z != curr.z {
                    stats.vias += 1;
                }
                stats.wirelength += prev.distance_2d(&curr);
            }
        }
        stats
    }

    /// True when the features form one component under planar 8-adjacency
    /// plus same-cell layer changes.
    pub fn is_connected(&self) -> bool {
        let cells: HashSet<GridCoord> = self.features.iter().copied().collect();
        let Some(&first) = self.features.first() else {
            return true;
        };
        let mut seen = HashSet::from([first]);
        let mut queue = VecDeque::from([first]);
        while let Some(c) = queue.pop_front() {
            let planar = (-1..=1).flat_map(|dx| (-1..=1).map(move |dy| c.offset(dx, dy, 0)));
            let vertical = [c.offset(0, 0, -1), c.offset(0, 0, 1)];
            for n in planar.chain(vertical) {
                if cells.contains(&n) && seen.insert(n) {
                    queue.push_back(n);
                }
            }
        }
        seen.len() == cells.len()
    }

    /// Whether some alternative of every pin is part of the features.
    pub fn connects_all_pins(&self) -> bool {
        let cells: HashSet<GridCoord> = self.features.iter().copied().collect();
        self.pins
            .iter()
            .all(|p| p.alternatives.iter().any(|a| cells.contains(a)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(x: i32, y: i32, z: i32) -> GridCoord {
        GridCoord::new(x, y, z)
    }

    fn with_features(features: Vec<GridCoord>) -> Route {
        Route {
            features,
            ..Route::new(NetId(1))
        }
    }

    #[test]
    fn collinear_steps_merge() {
        let route = with_features(vec![c(0, 0, 0), c(1, 0, 0), c(2, 0, 0), c(3, 1, 0), c(4, 2, 0)]);
        assert_eq!(
            route.segments(),
            vec![
                RouteSegment::Wire {
                    start: c(0, 0, 0),
                    end: c(2, 0, 0)
                },
                RouteSegment::Wire {
                    start: c(2, 0, 0),
                    end: c(4, 2, 0)
                },
            ]
        );
    }

    #[test]
    fn layer_change_is_a_via() {
        let route = with_features(vec![c(0, 0, 0), c(1, 0, 0), c(1, 0, 1), c(2, 0, 1)]);
        assert_eq!(
            route.segments(),
            vec![
                RouteSegment::Wire {
                    start: c(0, 0, 0),
                    end: c(1, 0, 0)
                },
                RouteSegment::Via {
                    x: 1,
                    y: 0,
                    from: 0,
                    to: 1
                },
                RouteSegment::Wire {
                    start: c(1, 0, 1),
                    end: c(2, 0, 1)
                },
            ]
        );
        let stats = route.stats();
        assert_eq!(stats.vias, 1);
        assert_eq!(stats.wirelength, 2.0);
    }

    #[test]
    fn branches_are_split_at_path_starts() {
        // Second path starts back at the trunk.
        let mut route = with_features(vec![c(0, 0, 0), c(1, 0, 0), c(2, 0, 0), c(1, 0, 0), c(1, 1, 0)]);
        route.path_starts = vec![0, 3];
        assert_eq!(route.paths().len(), 2);
        assert_eq!(
            route.segments(),
            vec![
                RouteSegment::Wire {
                    start: c(0, 0, 0),
                    end: c(2, 0, 0)
                },
                RouteSegment::Wire {
                    start: c(1, 0, 0),
                    end: c(1, 1, 0)
                },
            ]
        );
        assert!(route.is_connected());
        assert_eq!(route.stats().wirelength, 3.0);
    }

    #[test]
    fn distant_consecutive_cells_are_skipped() {
        let route = with_features(vec![c(0, 0, 0), c(1, 0, 0), c(5, 5, 0), c(5, 6, 0)]);
        assert_eq!(route.segments().len(), 2);
        assert_eq!(route.stats().wirelength, 2.0);
    }

    #[test]
    fn connectivity_detects_gaps() {
        assert!(with_features(vec![]).is_connected());
        assert!(with_features(vec![c(0, 0, 0), c(0, 0, 1), c(1, 1, 1)]).is_connected());
        assert!(!with_features(vec![c(0, 0, 0), c(2, 0, 0)]).is_connected());
        assert!(!with_features(vec![c(0, 0, 0), c(0, 0, 2)]).is_connected());
    }

    #[test]
    fn pins_are_satisfied_by_any_alternative() {
        let mut route = with_features(vec![c(0, 0, 1), c(1, 0, 1)]);
        route.pins = vec![Pin::with_layers(0, 0, &[0, 1]), Pin::at(c(1, 0, 1))];
        assert!(route.connects_all_pins());
        route.add_pin(Pin::at(c(5, 5, 0)));
        assert!(!route.connects_all_pins());
    }

    #[test]
    fn two_pin_route_has_two_pins() {
        let route = Route::two_pin(NetId(4), c(0, 0, 0), c(3, 0, 0));
        assert_eq!(route.pins.len(), 2);
        assert!(route.features.is_empty());
        assert!(!route.is_committed());
    }
}
