//! Per-format encode policy.
//!
//! - JPEG/JPG: alpha flattened, `quality` applied, optional optimized
//!   Huffman tables when `optimize_compression` is set.
//! - WEBP: `quality` only. 100 is a plain lossless encode; lower values
//!   quantize the color channels first, keeping the encoder pure Rust.
//! - PNG: fixed compression level, ignoring `quality` and
//!   `optimize_compression` by design.
//! - AVIF/BMP/TIFF: default encoder behavior.

use std::io::Cursor;

use image::codecs::avif::AvifEncoder;
use image::codecs::png::{CompressionType, FilterType as PngFilterType, PngEncoder};
use image::codecs::webp::WebPEncoder;
use image::{DynamicImage, ExtendedColorType, ImageEncoder};
use thiserror::Error;

use crate::format::OutputFormat;

/// JPEG dimensions are 16-bit on the wire.
const JPEG_MAX_DIMENSION: u32 = u16::MAX as u32;

#[derive(Debug, Error)]
pub(crate) enum EncodeError {
    #[error(transparent)]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Jpeg(#[from] jpeg_encoder::EncodingError),

    #[error("image {width}x{height} exceeds the JPEG dimension limit of {JPEG_MAX_DIMENSION}")]
    JpegTooLarge { width: u32, height: u32 },
}

/// Encode `image` into an in-memory buffer in the target format.
pub(crate) fn encode_image(
    image: &DynamicImage,
    format: OutputFormat,
    quality: u8,
    optimize: bool,
) -> Result<Vec<u8>, EncodeError> {
    let mut buffer = Vec::new();
    match format {
        OutputFormat::Jpeg | OutputFormat::Jpg => {
            let rgb = image.to_rgb8();
            let (width, height) = rgb.dimensions();
            if width > JPEG_MAX_DIMENSION || height > JPEG_MAX_DIMENSION {
                return Err(EncodeError::JpegTooLarge { width, height });
            }
            let mut encoder = jpeg_encoder::Encoder::new(&mut buffer, quality);
            encoder.set_optimized_huffman_tables(optimize);
            encoder.encode(
                rgb.as_raw(),
                width as u16,
                height as u16,
                jpeg_encoder::ColorType::Rgb,
            )?;
        }
        OutputFormat::Webp => {
            let mut rgba = image.to_rgba8();
            if quality < 100 {
                quantize_for_webp(rgba.as_mut(), quality);
            }
            let (width, height) = rgba.dimensions();
            let encoder = WebPEncoder::new_lossless(Cursor::new(&mut buffer));
            encoder.encode(rgba.as_raw(), width, height, ExtendedColorType::Rgba8)?;
        }
        OutputFormat::Png => {
            let encoder = PngEncoder::new_with_quality(
                Cursor::new(&mut buffer),
                CompressionType::Default,
                PngFilterType::Adaptive,
            );
            encoder.write_image(
                image.as_bytes(),
                image.width(),
                image.height(),
                image.color().into(),
            )?;
        }
        OutputFormat::Avif => {
            let rgba = image.to_rgba8();
            let (width, height) = rgba.dimensions();
            let encoder = AvifEncoder::new(Cursor::new(&mut buffer));
            encoder.write_image(rgba.as_raw(), width, height, ExtendedColorType::Rgba8)?;
        }
        OutputFormat::Bmp | OutputFormat::Tiff => {
            image.write_to(&mut Cursor::new(&mut buffer), format.image_format())?;
        }
    }
    Ok(buffer)
}

/// Reduce each color channel to a quality-dependent number of levels so the
/// lossless WebP encoder still shrinks the file. Alpha is left untouched.
fn quantize_for_webp(data: &mut [u8], quality: u8) {
    let levels = webp_levels(quality);
    let step = 255.0 / (levels as f32 - 1.0);
    for pixel in data.chunks_exact_mut(4) {
        for channel in pixel.iter_mut().take(3) {
            let bucket = (f32::from(*channel) / step).round();
            *channel = (bucket * step).round().clamp(0.0, 255.0) as u8;
        }
    }
}

/// Map quality 1-99 to a channel level count, quadratic so high qualities
/// stay near-lossless while low qualities get aggressively coarse.
fn webp_levels(quality: u8) -> u16 {
    let normalized = f32::from(quality.clamp(1, 99)) / 100.0;
    (2.0 + normalized * normalized * 254.0).round() as u16
}
