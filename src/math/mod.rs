//! Mathematical utilities for pattern coding and statistics

/// Bijective pattern encoding between binary windows and integer codes
pub mod codec;
/// Entropy contributions, probability estimation and order statistics
pub mod probability;
