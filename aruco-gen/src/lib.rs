pub mod types;
pub mod render;
pub mod board;
