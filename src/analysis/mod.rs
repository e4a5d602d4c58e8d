//! Pattern statistics, catalogs and frame preprocessing

/// Grayscale to binary frame thresholding
pub mod binarize;
/// Pattern catalog records, selection mask and aggregate queries
pub mod catalog;
/// Sliding-window pattern counting over binarized videos
pub mod counting;
/// Temporal change metrics of pattern windows
pub mod velocity;
