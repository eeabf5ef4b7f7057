pub mod board;
pub mod indices;
