//! Output format selection.

use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;

/// Target encode formats.
///
/// `Jpeg` and `Jpg` share an encoder and differ only in the file extension
/// they produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// WebP image
    Webp,
    /// PNG image
    Png,
    /// JPEG image (".jpeg")
    Jpeg,
    /// JPEG image (".jpg")
    Jpg,
    /// AVIF image (encode only)
    Avif,
    /// BMP image
    Bmp,
    /// TIFF image
    Tiff,
}

impl OutputFormat {
    /// Every supported output format, in presentation order.
    pub const ALL: [OutputFormat; 7] = [
        OutputFormat::Webp,
        OutputFormat::Png,
        OutputFormat::Jpeg,
        OutputFormat::Jpg,
        OutputFormat::Avif,
        OutputFormat::Bmp,
        OutputFormat::Tiff,
    ];

    /// Lowercase file extension for this format (also the `{format}`
    /// placeholder value).
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Webp => "webp",
            OutputFormat::Png => "png",
            OutputFormat::Jpeg => "jpeg",
            OutputFormat::Jpg => "jpg",
            OutputFormat::Avif => "avif",
            OutputFormat::Bmp => "bmp",
            OutputFormat::Tiff => "tiff",
        }
    }

    /// The corresponding `image` crate format.
    pub fn image_format(&self) -> image::ImageFormat {
        match self {
            OutputFormat::Webp => image::ImageFormat::WebP,
            OutputFormat::Png => image::ImageFormat::Png,
            OutputFormat::Jpeg | OutputFormat::Jpg => image::ImageFormat::Jpeg,
            OutputFormat::Avif => image::ImageFormat::Avif,
            OutputFormat::Bmp => image::ImageFormat::Bmp,
            OutputFormat::Tiff => image::ImageFormat::Tiff,
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = ParseError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "webp" => Ok(OutputFormat::Webp),
            "png" => Ok(OutputFormat::Png),
            "jpeg" => Ok(OutputFormat::Jpeg),
            "jpg" => Ok(OutputFormat::Jpg),
            "avif" => Ok(OutputFormat::Avif),
            "bmp" => Ok(OutputFormat::Bmp),
            "tiff" | "tif" => Ok(OutputFormat::Tiff),
            _ => Err(ParseError {
                kind: "format",
                value: s.to_string(),
                expected: "webp, png, jpeg, jpg, avif, bmp, tiff",
            }),
        }
    }
}
