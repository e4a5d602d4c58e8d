//! Spatiotemporal binary motion patterns: catalogs, bounded selection and sketch videos
//!
//! Binary `T×S×S` windows cut from binarized video are encoded as 64-bit pattern
//! codes. Catalogs of codes with measured or estimated probabilities are reduced
//! to subsets under bandwidth, count and entropy constraints, and a sketch video
//! keeps only the tiles whose code belongs to the selected subset.

/// Selection strategies and sketch matching
pub mod algorithm;
/// Pattern catalogs, counting, velocity and frame thresholding
pub mod analysis;
/// Input/output operations, configuration and error handling
pub mod io;
/// Pattern codec and probability utilities
pub mod math;
/// Frame tiling and temporal buffering
pub mod spatial;

pub use io::error::{PatternError, Result};
