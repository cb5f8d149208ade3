//! Error types for the transform engine.

use std::path::PathBuf;
use thiserror::Error;

use crate::format::OutputFormat;

/// Pre-flight errors that abort a batch run before any file is touched.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// The input path list was empty.
    #[error("no input files selected")]
    NoInputs,

    /// No output folder was supplied.
    #[error("no output folder selected")]
    NoOutputFolder,

    /// Resize percentage outside 1-500.
    #[error("percent must be between 1 and 500, got {0}")]
    PercentOutOfRange(u32),

    /// Only one of the target dimensions was set.
    #[error("width and height must be given together")]
    DimensionsIncomplete,

    /// A target dimension of zero was requested.
    #[error("target dimensions {0}x{1} must both be at least 1")]
    DimensionsOutOfRange(u32, u32),

    /// Encoder quality outside 1-100.
    #[error("quality must be between 1 and 100, got {0}")]
    QualityOutOfRange(u8),

    /// Watermark opacity below 50.
    #[error("watermark opacity must be between 50 and 255, got {0}")]
    OpacityOutOfRange(u8),
}

/// Per-file errors. These are counted and logged by the batch processor and
/// never abort the enclosing run.
#[derive(Debug, Error)]
pub enum TransformError {
    /// The input file could not be read or parsed as a supported image.
    #[error("cannot decode {}: {reason}", path.display())]
    Decode {
        /// Input path that failed to decode.
        path: PathBuf,
        /// Underlying decode failure.
        reason: String,
    },

    /// Resizing produced a zero-sized image (tiny input at a very low percent).
    #[error("resizing {} by {percent}% yields an empty image", path.display())]
    EmptyResize {
        /// Input path being resized.
        path: PathBuf,
        /// Requested resize percentage.
        percent: u32,
    },

    /// The image could not be encoded in the target format.
    #[error("cannot encode {} as {format}: {reason}", path.display())]
    Encode {
        /// Input path being encoded.
        path: PathBuf,
        /// Target output format.
        format: OutputFormat,
        /// Underlying encode failure.
        reason: String,
    },

    /// The output file or directory could not be written.
    #[error("cannot write {}", path.display())]
    Write {
        /// Output path that failed.
        path: PathBuf,
        /// Underlying filesystem error.
        #[source]
        source: std::io::Error,
    },
}

/// Error returned when parsing an enumerated setting from a string.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown {kind} {value:?} (expected one of: {expected})")]
pub struct ParseError {
    pub(crate) kind: &'static str,
    pub(crate) value: String,
    pub(crate) expected: &'static str,
}

/// Result type alias for per-file transform operations.
pub type Result<T> = std::result::Result<T, TransformError>;

/// Exit codes for CLI commands.
pub mod exit_codes {
    /// Every file processed successfully.
    pub const SUCCESS: i32 = 0;
    /// At least one file failed, or an internal error occurred.
    pub const FAILURE: i32 = 1;
    /// Arguments or settings were rejected before the run started.
    pub const VALIDATION_ERROR: i32 = 2;
}
