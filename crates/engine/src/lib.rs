//! Image transformation engine for pixmill.
//!
//! This crate provides:
//! - Resizing by percentage or to fixed dimensions, and format conversion
//! - Text watermarking with anchored placement
//! - Per-format encoding (WebP, PNG, JPEG, AVIF, BMP, TIFF)
//! - EXIF and ICC profile carry-over
//! - Sequential batch runs with progress reporting and cancellation
//! - Output naming from user-supplied patterns
//!
//! The engine has no interactive surface of its own; front-ends drive it
//! through [`run_batch`] (or [`TransformEngine`] for single files) and
//! observe it through a [`ProgressSink`].

#![warn(missing_docs)]

mod batch;
mod encode;
mod error;
mod format;
mod metadata;
mod naming;
mod settings;
mod transform;
mod watermark;

pub use batch::{BatchResult, CancelFlag, ProgressEvent, ProgressSink, run_batch, validate_run};
pub use error::exit_codes;
pub use error::{ParseError, Result, TransformError, ValidationError};
pub use format::OutputFormat;
pub use metadata::MetadataBlob;
pub use settings::{
    DEFAULT_NAMING_PATTERN, DEFAULT_QUALITY, Mode, OPACITY_MIN, PERCENT_MAX, PERCENT_MIN,
    ProcessingSettings, QUALITY_MAX, QUALITY_MIN, WatermarkPosition,
};
pub use transform::TransformEngine;
pub use watermark::apply_watermark;
