/// Hashed pre-filter over allowed pattern codes
pub mod prefilter;
/// Bandwidth- and count-bounded selection strategies
pub mod selection;
/// Tile-level pattern matching that produces sketch videos
pub mod sketch;
