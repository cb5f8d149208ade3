//! Batch run configuration.
//!
//! A [`ProcessingSettings`] value is built once per run from user input,
//! validated up front, and treated as immutable for the run's duration.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ParseError, ValidationError};
use crate::format::OutputFormat;

/// Lowest accepted resize percentage.
pub const PERCENT_MIN: u32 = 1;
/// Highest accepted resize percentage.
pub const PERCENT_MAX: u32 = 500;
/// Lowest accepted encoder quality.
pub const QUALITY_MIN: u8 = 1;
/// Highest accepted encoder quality.
pub const QUALITY_MAX: u8 = 100;
/// Lowest accepted watermark opacity (the upper bound is `u8::MAX`).
pub const OPACITY_MIN: u8 = 50;
/// Quality used when the caller has not chosen one.
pub const DEFAULT_QUALITY: u8 = 80;
/// Naming pattern used when the caller has not chosen one.
pub const DEFAULT_NAMING_PATTERN: &str = "{filename}_{operation}";

/// The operation a batch run performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Scale both dimensions by `percent`.
    Resize,
    /// Re-encode without touching dimensions.
    Convert,
}

impl Mode {
    /// Name used for the `{operation}` placeholder.
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Resize => "resize",
            Mode::Convert => "convert",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = ParseError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "resize" => Ok(Mode::Resize),
            "convert" => Ok(Mode::Convert),
            _ => Err(ParseError {
                kind: "mode",
                value: s.to_string(),
                expected: "resize, convert",
            }),
        }
    }
}

/// Where the watermark text is anchored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WatermarkPosition {
    /// 20px from the top and left edges.
    TopLeft,
    /// 20px from the top and right edges.
    TopRight,
    /// 20px from the bottom and left edges.
    BottomLeft,
    /// 20px from the bottom and right edges.
    BottomRight,
    /// Centered on both axes.
    Center,
}

impl WatermarkPosition {
    /// Kebab-case name as accepted on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            WatermarkPosition::TopLeft => "top-left",
            WatermarkPosition::TopRight => "top-right",
            WatermarkPosition::BottomLeft => "bottom-left",
            WatermarkPosition::BottomRight => "bottom-right",
            WatermarkPosition::Center => "center",
        }
    }
}

impl fmt::Display for WatermarkPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WatermarkPosition {
    type Err = ParseError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "top-left" => Ok(WatermarkPosition::TopLeft),
            "top-right" => Ok(WatermarkPosition::TopRight),
            "bottom-left" => Ok(WatermarkPosition::BottomLeft),
            "bottom-right" => Ok(WatermarkPosition::BottomRight),
            "center" => Ok(WatermarkPosition::Center),
            _ => Err(ParseError {
                kind: "watermark position",
                value: s.to_string(),
                expected: "top-left, top-right, bottom-left, bottom-right, center",
            }),
        }
    }
}

/// Configuration for one batch run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProcessingSettings {
    /// Operation to perform on each file.
    pub mode: Mode,
    /// Resize scale factor in percent (1-500). Ignored in convert mode and
    /// when target dimensions are set.
    pub percent: u32,
    /// Exact target width in pixels. Set together with `height` to resize
    /// every image to fixed dimensions instead of by `percent`.
    pub width: Option<u32>,
    /// Exact target height in pixels. Set together with `width`.
    pub height: Option<u32>,
    /// Encoder quality (1-100) for lossy formats.
    pub quality: u8,
    /// Target encode format.
    pub format: OutputFormat,
    /// Watermark text; empty or whitespace-only means no watermark.
    pub watermark_text: String,
    /// Watermark anchor position.
    pub watermark_position: WatermarkPosition,
    /// Watermark text alpha (50-255).
    pub watermark_opacity: u8,
    /// Carry EXIF/ICC metadata over to the output when the target can hold it.
    pub preserve_metadata: bool,
    /// Spend extra lossless effort when encoding (JPEG Huffman optimization).
    pub optimize_compression: bool,
    /// Output base-name template. Recognized placeholders: `{filename}`,
    /// `{operation}`, `{timestamp}`, `{format}`.
    pub naming_pattern: String,
}

impl Default for ProcessingSettings {
    fn default() -> Self {
        Self {
            mode: Mode::Resize,
            percent: 100,
            width: None,
            height: None,
            quality: DEFAULT_QUALITY,
            format: OutputFormat::Webp,
            watermark_text: String::new(),
            watermark_position: WatermarkPosition::BottomRight,
            watermark_opacity: 128,
            preserve_metadata: false,
            optimize_compression: false,
            naming_pattern: DEFAULT_NAMING_PATTERN.to_string(),
        }
    }
}

impl ProcessingSettings {
    /// Check every numeric field against its accepted range.
    ///
    /// Called once before a batch run starts; an out-of-range value aborts
    /// the whole run before any file is touched.
    pub fn validate(&self) -> std::result::Result<(), ValidationError> {
        if !(PERCENT_MIN..=PERCENT_MAX).contains(&self.percent) {
            return Err(ValidationError::PercentOutOfRange(self.percent));
        }
        match (self.width, self.height) {
            (Some(width), Some(height)) => {
                if width == 0 || height == 0 {
                    return Err(ValidationError::DimensionsOutOfRange(width, height));
                }
            }
            (None, None) => {}
            _ => return Err(ValidationError::DimensionsIncomplete),
        }
        if !(QUALITY_MIN..=QUALITY_MAX).contains(&self.quality) {
            return Err(ValidationError::QualityOutOfRange(self.quality));
        }
        if self.watermark_opacity < OPACITY_MIN {
            return Err(ValidationError::OpacityOutOfRange(self.watermark_opacity));
        }
        Ok(())
    }

    /// The exact resize target, when both dimensions are set. Takes
    /// precedence over `percent`.
    pub fn target_dimensions(&self) -> Option<(u32, u32)> {
        self.width.zip(self.height)
    }
}
