/// Paired clip extraction from binarized and sketch videos
pub mod clips;
/// Command-line interface and subcommand orchestration
pub mod cli;
/// Pattern constants and runtime configuration defaults
pub mod configuration;
/// Error types and result alias
pub mod error;
/// PNG rendering of pattern windows
pub mod image;
/// Terminal progress display
pub mod progress;
/// Pattern table import and export
pub mod table;
/// Frame directory reading and writing
pub mod video;
