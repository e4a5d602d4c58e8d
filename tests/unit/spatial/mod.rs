pub mod buffer;
pub mod tiles;
