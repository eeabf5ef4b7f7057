pub mod bfs;
pub mod came_from;
pub mod dijkstra;
pub mod neighbors;
pub mod scratch;

pub use came_from::CameFrom;
pub use dijkstra::{SearchGoal, SearchOutcome};
pub use scratch::SearchScratch;
