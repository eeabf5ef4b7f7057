use pcb_common::db::indices::{NetId, NetclassId};
use pcb_common::geom::coord::GridCoord;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RouterError {
    #[error("invalid grid dimensions {width}x{height}x{layers}")]
    InvalidDimensions { width: i32, height: i32, layers: i32 },

    #[error("could not allocate {cells} cells for the {plane} plane")]
    Allocation { plane: &'static str, cells: usize },

    #[error("grid coordinate {coord} is outside the {width}x{height}x{layers} grid")]
    OutOfBounds {
        coord: GridCoord,
        width: i32,
        height: i32,
        layers: i32,
    },

    #[error("no path from the sources reaches {0}")]
    TargetUnreachable(GridCoord),

    #[error("net {net}: pin {pin} cannot be reached from the routed tree")]
    Unreachable { net: NetId, pin: usize },

    #[error("coordinate {0} was never reached by the search")]
    NotReached(GridCoord),

    #[error("came-from map loops back on itself at {0}")]
    CameFromCycle(GridCoord),

    #[error("route for net {0} has no pins")]
    EmptyRoute(NetId),

    #[error("net {net}: pin {pin} has no location on the grid")]
    EmptyPin { net: NetId, pin: usize },

    #[error("route for net {0} has no committed footprint to rip up")]
    NotCommitted(NetId),

    #[error("unknown net id {0}")]
    InvalidNet(NetId),

    #[error("net {net} refers to unknown netclass {netclass}")]
    InvalidNetclass { net: NetId, netclass: NetclassId },
}

pub type Result<T> = std::result::Result<T, RouterError>;
