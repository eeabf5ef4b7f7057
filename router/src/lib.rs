pub mod algo;
pub mod board_router;
pub mod error;
pub mod grid;
pub mod net_router;
pub mod route;

pub use board_router::{BoardRouter, NetFailure, RoutingReport};
pub use error::{Result, RouterError};
pub use grid::BoardGrid;
pub use route::{Pin, Route};

use pcb_common::db::board::Board;
use pcb_common::util::config::RoutingConfig;

/// Routes every net of `board` in board order on a freshly seeded grid.
pub fn route_board(board: &Board, config: &RoutingConfig) -> Result<(BoardRouter, RoutingReport)> {
    let mut router = BoardRouter::new(board, config)?;
    let report = router.route_all(board);
    Ok((router, report))
}
