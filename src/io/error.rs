//! Error types for pattern cataloguing, selection and sketch generation

use std::fmt;
use std::path::PathBuf;

/// Main error type for all pattern operations
#[derive(Debug)]
pub enum PatternError {
    /// A parameter or a pair of parameters is not acceptable
    ///
    /// Covers invalid bandwidth/count caps, non-positive window dimensions and
    /// window geometry that disagrees with the catalog or table header.
    Configuration {
        /// Name of the offending parameter
        parameter: &'static str,
        /// Provided value that failed validation
        value: String,
        /// Explanation of why the value is invalid
        reason: String,
    },

    /// Window geometry does not fit the 64-bit pattern code
    WindowTooLarge {
        /// Temporal depth of the window
        time: usize,
        /// Spatial side of the window
        space: usize,
        /// Bits the window would need (`time * space * space`)
        bits: usize,
    },

    /// Paired clip identifiers do not match between the two collections
    Alignment {
        /// Identifiers present on the right side but missing on the left
        missing_left: Vec<String>,
        /// Identifiers present on the left side but missing on the right
        missing_right: Vec<String>,
    },

    /// Input data doesn't meet requirements (empty video, mismatched frames, ...)
    InvalidSourceData {
        /// Description of what's wrong with the source data
        reason: String,
    },

    /// A pattern table could not be parsed
    TableParse {
        /// Path to the table
        path: PathBuf,
        /// One-based line number, zero when the problem is not tied to a line
        line: usize,
        /// Description of the problem
        reason: String,
    },

    /// Failed to load a frame image from the filesystem
    ImageLoad {
        /// Path to the image file
        path: PathBuf,
        /// Underlying image loading error
        source: image::ImageError,
    },

    /// Failed to save an image or animation to disk
    ImageExport {
        /// Path where export was attempted
        path: PathBuf,
        /// Underlying image export error
        source: image::ImageError,
    },

    /// General file system operation failure
    FileSystem {
        /// Path involved in the operation
        path: PathBuf,
        /// Description of the operation that failed
        operation: &'static str,
        /// Underlying I/O error
        source: std::io::Error,
    },
}

impl fmt::Display for PatternError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration {
                parameter,
                value,
                reason,
            } => {
                write!(
                    f,
                    "Invalid configuration '{parameter}' = '{value}': {reason}"
                )
            }
            Self::WindowTooLarge { time, space, bits } => {
                write!(
                    f,
                    "Window {time}x{space}x{space} needs {bits} bits, at most 64 fit a pattern code"
                )
            }
            Self::Alignment {
                missing_left,
                missing_right,
            } => {
                write!(
                    f,
                    "Clip identifiers are not aligned: missing on the left {missing_left:?}, missing on the right {missing_right:?}"
                )
            }
            Self::InvalidSourceData { reason } => {
                write!(f, "Invalid source data: {reason}")
            }
            Self::TableParse { path, line, reason } => {
                write!(
                    f,
                    "Failed to parse table '{}' at line {line}: {reason}",
                    path.display()
                )
            }
            Self::ImageLoad { path, source } => {
                write!(f, "Failed to load image '{}': {source}", path.display())
            }
            Self::ImageExport { path, source } => {
                write!(
                    f,
                    "Failed to export image to '{}': {source}",
                    path.display()
                )
            }
            Self::FileSystem {
                path,
                operation,
                source,
            } => {
                write!(
                    f,
                    "File system error during {operation} on '{}': {source}",
                    path.display()
                )
            }
        }
    }
}

impl std::error::Error for PatternError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ImageLoad { source, .. } | Self::ImageExport { source, .. } => Some(source),
            Self::FileSystem { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Convenience type alias for pattern results
pub type Result<T> = std::result::Result<T, PatternError>;

impl From<image::ImageError> for PatternError {
    fn from(err: image::ImageError) -> Self {
        Self::ImageLoad {
            path: PathBuf::from("<unknown>"),
            source: err,
        }
    }
}

impl From<std::io::Error> for PatternError {
    fn from(err: std::io::Error) -> Self {
        Self::FileSystem {
            path: PathBuf::from("<unknown>"),
            operation: "unknown",
            source: err,
        }
    }
}

/// Create a configuration error
pub fn configuration_error(
    parameter: &'static str,
    value: &impl ToString,
    reason: &impl ToString,
) -> PatternError {
    PatternError::Configuration {
        parameter,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Create an invalid source data error
pub fn invalid_source(reason: &impl ToString) -> PatternError {
    PatternError::InvalidSourceData {
        reason: reason.to_string(),
    }
}

/// Attach a path and operation to a bare I/O error
pub fn file_system_error(
    path: impl Into<PathBuf>,
    operation: &'static str,
) -> impl FnOnce(std::io::Error) -> PatternError {
    let path = path.into();
    move |source| PatternError::FileSystem {
        path,
        operation,
        source,
    }
}
