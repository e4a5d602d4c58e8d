//! Pattern constants and runtime configuration defaults

/// Number of bits in a pattern code
pub const MAX_CODE_BITS: usize = 64;

/// Default temporal depth of a spatiotemporal window
pub const DEFAULT_TIME_FILTER: usize = 3;
/// Default spatial side of a spatiotemporal window
pub const DEFAULT_SPACE_FILTER: usize = 3;

/// Pixel value marking a set bit in binarized frames
pub const FOREGROUND_VALUE: u8 = 255;
/// Pixel value marking a cleared bit in binarized frames
pub const BACKGROUND_VALUE: u8 = 0;
/// Fill value for tiles that do not match any allowed pattern
pub const NEUTRAL_GRAY: u8 = 128;

// Slot count of the modulo hash table used to pre-filter tile codes
/// Size of the pre-filter hash table
pub const PREFILTER_TABLE_SIZE: usize = 500_000;

// Bounds the rounding of a running sum, not real overshoots
/// ULPs of slack per summed term in bandwidth and entropy cap comparisons
pub const CAP_ROUNDING_ULPS: f64 = 4.0;

/// Tolerance when checking that measured probabilities sum to one
pub const PROBABILITY_SUM_TOLERANCE: f64 = 1e-6;

/// Default estimator parameter for level-count tables
pub const DEFAULT_ESTIMATOR_P: f64 = 0.999;

/// Field separator used by pattern tables
pub const TABLE_SEPARATOR: char = ';';
/// Prefix marking comment lines in pattern tables
pub const TABLE_COMMENT: char = '#';

// Clip splitting defaults
/// Number of frames in a sketch clip
pub const DEFAULT_SKETCH_LENGTH: usize = 3;
/// Frames of context added on each side of the sketch clip
pub const DEFAULT_CLIP_EXTRA: usize = 2;
/// Neutral frames written before and after each clip
pub const DEFAULT_CLIP_PADDING: usize = 15;

/// Fixed seed for reproducible clip placement
pub const DEFAULT_SEED: u64 = 42;

// Progress bar display settings
/// Threshold for switching to batch progress mode
pub const MAX_INDIVIDUAL_PROGRESS_BARS: usize = 5;
/// Width of progress bars in characters
pub const PROGRESS_BAR_WIDTH: u16 = 50;

// Output settings
/// Prefix of frame files written by the frame writer
pub const FRAME_PREFIX: &str = "frame_";
/// Suffix added to sketch output directories
pub const SKETCH_SUFFIX: &str = "_sketch";
/// Delay between GIF animation frames
pub const GIF_FRAME_DELAY_MS: u32 = 40;
/// Pixel scale used when rendering a pattern to PNG
pub const DEFAULT_RENDER_SCALE: u32 = 16;

// Binarization

/// Default neighbourhood side for adaptive thresholding
pub const DEFAULT_ADAPTIVE_BLOCK: usize = 11;
/// Default constant subtracted from the adaptive local mean
pub const DEFAULT_ADAPTIVE_C: i32 = 2;
