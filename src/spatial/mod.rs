//! Spatial data structures for frame tiling and temporal buffering

/// Temporal frame buffering into bit volumes
pub mod buffer;
/// Tile partitioning of frames
pub mod tiles;

pub use buffer::FrameBuffer;
pub use tiles::TileGrid;
