//! The per-image transform pipeline.
//!
//! One engine is built per batch run from validated settings; it captures
//! the run timestamp so every output of the run substitutes the same
//! `{timestamp}` value. Processing a file decodes it, resizes (resize mode
//! only; to fixed target dimensions when set, otherwise by percent),
//! composites the optional watermark, encodes per the format policy, carries
//! metadata over when asked, and writes exactly one output file.

use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::imageops::FilterType;
use image::{DynamicImage, ImageReader};
use tracing::debug;

use crate::encode::encode_image;
use crate::error::{TransformError, ValidationError};
use crate::metadata::{self, MetadataBlob};
use crate::naming;
use crate::settings::{Mode, ProcessingSettings};
use crate::watermark::apply_watermark;

/// Applies one batch run's settings to individual files.
#[derive(Debug)]
pub struct TransformEngine {
    settings: ProcessingSettings,
    timestamp: String,
}

impl TransformEngine {
    /// Validate `settings` and capture the run timestamp.
    pub fn new(settings: ProcessingSettings) -> Result<Self, ValidationError> {
        settings.validate()?;
        Ok(Self {
            timestamp: naming::run_timestamp(),
            settings,
        })
    }

    /// The settings this engine was built with.
    pub fn settings(&self) -> &ProcessingSettings {
        &self.settings
    }

    /// Transform a single file and write the result into `output_dir`.
    ///
    /// Returns the written path. Every failure is scoped to this file; the
    /// caller decides whether to keep going.
    pub fn process_one(&self, input: &Path, output_dir: &Path) -> Result<PathBuf, TransformError> {
        let bytes = fs::read(input).map_err(|err| TransformError::Decode {
            path: input.to_path_buf(),
            reason: err.to_string(),
        })?;

        let source_metadata = if self.settings.preserve_metadata {
            metadata::extract(&bytes)
        } else {
            MetadataBlob::default()
        };

        let decoded = decode(input, &bytes)?;
        debug!(
            input = %input.display(),
            width = decoded.width(),
            height = decoded.height(),
            "decoded"
        );

        let image = match self.settings.mode {
            Mode::Resize => match self.settings.target_dimensions() {
                Some((width, height)) => {
                    decoded.resize_exact(width, height, FilterType::Lanczos3)
                }
                None => {
                    let (new_width, new_height) = scaled_dimensions(
                        decoded.width(),
                        decoded.height(),
                        self.settings.percent,
                    );
                    if new_width == 0 || new_height == 0 {
                        return Err(TransformError::EmptyResize {
                            path: input.to_path_buf(),
                            percent: self.settings.percent,
                        });
                    }
                    decoded.resize_exact(new_width, new_height, FilterType::Lanczos3)
                }
            },
            Mode::Convert => decoded,
        };

        let image = if self.settings.watermark_text.trim().is_empty() {
            image
        } else {
            apply_watermark(
                &image,
                &self.settings.watermark_text,
                self.settings.watermark_position,
                self.settings.watermark_opacity,
            )
        };

        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let file_name = naming::output_file_name(
            &self.settings.naming_pattern,
            &stem,
            self.settings.mode,
            &self.timestamp,
            self.settings.format,
        );

        let encoded = encode_image(
            &image,
            self.settings.format,
            self.settings.quality,
            self.settings.optimize_compression,
        )
        .map_err(|err| TransformError::Encode {
            path: input.to_path_buf(),
            format: self.settings.format,
            reason: err.to_string(),
        })?;

        let encoded = if self.settings.preserve_metadata {
            metadata::attach(encoded, self.settings.format, &source_metadata)
        } else {
            encoded
        };

        fs::create_dir_all(output_dir).map_err(|err| TransformError::Write {
            path: output_dir.to_path_buf(),
            source: err,
        })?;
        let output_path = output_dir.join(file_name);
        fs::write(&output_path, &encoded).map_err(|err| TransformError::Write {
            path: output_path.clone(),
            source: err,
        })?;
        debug!(output = %output_path.display(), bytes = encoded.len(), "written");
        Ok(output_path)
    }
}

fn decode(input: &Path, bytes: &[u8]) -> Result<DynamicImage, TransformError> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|err| TransformError::Decode {
            path: input.to_path_buf(),
            reason: err.to_string(),
        })?;
    reader.decode().map_err(|err| TransformError::Decode {
        path: input.to_path_buf(),
        reason: err.to_string(),
    })
}

/// Both dimensions floor-scaled by `percent`.
pub(crate) fn scaled_dimensions(width: u32, height: u32, percent: u32) -> (u32, u32) {
    (
        ((width as u64 * percent as u64) / 100) as u32,
        ((height as u64 * percent as u64) / 100) as u32,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::OutputFormat;
    use proptest::prelude::*;
    use tempfile::TempDir;

    fn checkerboard(width: u32, height: u32) -> DynamicImage {
        let buffer = image::RgbImage::from_fn(width, height, |x, y| {
            if (x + y) % 2 == 0 {
                image::Rgb([200, 30, 60])
            } else {
                image::Rgb([20, 180, 90])
            }
        });
        DynamicImage::ImageRgb8(buffer)
    }

    fn write_png(dir: &TempDir, name: &str, width: u32, height: u32) -> PathBuf {
        let path = dir.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        checkerboard(width, height).save(&path).unwrap();
        path
    }

    fn settings(mode: Mode, percent: u32, format: OutputFormat) -> ProcessingSettings {
        ProcessingSettings {
            mode,
            percent,
            format,
            ..ProcessingSettings::default()
        }
    }

    #[test]
    fn test_resize_halves_dimensions() {
        let dir = TempDir::new().unwrap();
        let input = write_png(&dir, "photo.png", 40, 30);
        let out_dir = dir.path().join("out");

        let engine = TransformEngine::new(settings(Mode::Resize, 50, OutputFormat::Png)).unwrap();
        let written = engine.process_one(&input, &out_dir).unwrap();

        assert_eq!(written.file_name().unwrap(), "photo_resize.png");
        let decoded = image::open(&written).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (20, 15));
    }

    #[test]
    fn test_resize_floors_odd_dimensions() {
        let dir = TempDir::new().unwrap();
        let input = write_png(&dir, "photo.png", 33, 21);
        let out_dir = dir.path().join("out");

        let engine = TransformEngine::new(settings(Mode::Resize, 50, OutputFormat::Png)).unwrap();
        let written = engine.process_one(&input, &out_dir).unwrap();
        let decoded = image::open(&written).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (16, 10));
    }

    #[test]
    fn test_resize_to_fixed_dimensions() {
        let dir = TempDir::new().unwrap();
        let input = write_png(&dir, "photo.png", 40, 30);
        let out_dir = dir.path().join("out");

        let mut fixed = settings(Mode::Resize, 100, OutputFormat::Png);
        fixed.width = Some(25);
        fixed.height = Some(75);
        let engine = TransformEngine::new(fixed).unwrap();
        let written = engine.process_one(&input, &out_dir).unwrap();

        let decoded = image::open(&written).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (25, 75));
    }

    #[test]
    fn test_fixed_dimensions_take_precedence_over_percent() {
        let dir = TempDir::new().unwrap();
        let input = write_png(&dir, "photo.png", 40, 30);
        let out_dir = dir.path().join("out");

        let mut fixed = settings(Mode::Resize, 50, OutputFormat::Png);
        fixed.width = Some(10);
        fixed.height = Some(12);
        let engine = TransformEngine::new(fixed).unwrap();
        let written = engine.process_one(&input, &out_dir).unwrap();

        let decoded = image::open(&written).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (10, 12));
    }

    #[test]
    fn test_lone_dimension_rejected_at_construction() {
        let mut lone = settings(Mode::Resize, 100, OutputFormat::Png);
        lone.height = Some(600);
        let err = TransformEngine::new(lone).unwrap_err();
        assert_eq!(err, ValidationError::DimensionsIncomplete);
    }

    #[test]
    fn test_convert_preserves_dimensions() {
        let dir = TempDir::new().unwrap();
        let input = write_png(&dir, "photo.png", 37, 23);
        let out_dir = dir.path().join("out");

        let engine = TransformEngine::new(settings(Mode::Convert, 100, OutputFormat::Webp)).unwrap();
        let written = engine.process_one(&input, &out_dir).unwrap();

        assert_eq!(written.file_name().unwrap(), "photo_convert.webp");
        let decoded = image::open(&written).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (37, 23));
    }

    #[test]
    fn test_unreadable_input_is_a_decode_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope.png");
        let engine = TransformEngine::new(ProcessingSettings::default()).unwrap();
        let err = engine.process_one(&missing, dir.path()).unwrap_err();
        assert!(matches!(err, TransformError::Decode { .. }));
    }

    #[test]
    fn test_garbage_input_is_a_decode_error() {
        let dir = TempDir::new().unwrap();
        let garbage = dir.path().join("broken.jpg");
        fs::write(&garbage, b"definitely not an image").unwrap();
        let engine = TransformEngine::new(ProcessingSettings::default()).unwrap();
        let err = engine.process_one(&garbage, dir.path()).unwrap_err();
        assert!(matches!(err, TransformError::Decode { .. }));
    }

    #[test]
    fn test_degenerate_resize_is_reported() {
        let dir = TempDir::new().unwrap();
        let input = write_png(&dir, "tiny.png", 10, 10);
        let engine = TransformEngine::new(settings(Mode::Resize, 5, OutputFormat::Png)).unwrap();
        let err = engine.process_one(&input, dir.path()).unwrap_err();
        assert!(matches!(err, TransformError::EmptyResize { percent: 5, .. }));
    }

    #[test]
    fn test_invalid_settings_rejected_at_construction() {
        let err = TransformEngine::new(settings(Mode::Resize, 501, OutputFormat::Png)).unwrap_err();
        assert_eq!(err, ValidationError::PercentOutOfRange(501));
    }

    #[test]
    fn test_name_collision_last_write_wins() {
        let dir = TempDir::new().unwrap();
        let first = write_png(&dir, "a/photo.png", 16, 16);
        let second = write_png(&dir, "b/photo.png", 32, 32);
        let out_dir = dir.path().join("out");

        let engine = TransformEngine::new(settings(Mode::Convert, 100, OutputFormat::Png)).unwrap();
        let path_a = engine.process_one(&first, &out_dir).unwrap();
        let path_b = engine.process_one(&second, &out_dir).unwrap();

        assert_eq!(path_a, path_b);
        assert_eq!(fs::read_dir(&out_dir).unwrap().count(), 1);
        let decoded = image::open(&path_b).unwrap();
        assert_eq!(decoded.width(), 32);
    }

    #[test]
    fn test_watermark_applies_during_processing() {
        let dir = TempDir::new().unwrap();
        let input = write_png(&dir, "photo.png", 120, 90);
        let out_dir = dir.path().join("out");

        let mut with_mark = settings(Mode::Convert, 100, OutputFormat::Png);
        with_mark.watermark_text = "demo".to_string();
        with_mark.watermark_opacity = 255;
        let marked = TransformEngine::new(with_mark)
            .unwrap()
            .process_one(&input, &out_dir)
            .unwrap();

        let plain_dir = dir.path().join("plain");
        let plain = TransformEngine::new(settings(Mode::Convert, 100, OutputFormat::Png))
            .unwrap()
            .process_one(&input, &plain_dir)
            .unwrap();

        assert_ne!(fs::read(&marked).unwrap(), fs::read(&plain).unwrap());
    }

    #[test]
    fn test_metadata_carried_to_jpeg_output() {
        use bytes::Bytes;

        let dir = TempDir::new().unwrap();
        let plain_jpeg =
            crate::encode::encode_image(&checkerboard(24, 24), OutputFormat::Jpeg, 90, false)
                .unwrap();
        let blob = MetadataBlob {
            exif: Some(Bytes::from_static(b"II*\x00carried")),
            icc: None,
        };
        let tagged = metadata::attach(plain_jpeg, OutputFormat::Jpeg, &blob);
        let input = dir.path().join("tagged.jpg");
        fs::write(&input, &tagged).unwrap();
        let out_dir = dir.path().join("out");

        let mut preserve = settings(Mode::Convert, 100, OutputFormat::Jpeg);
        preserve.preserve_metadata = true;
        let written = TransformEngine::new(preserve)
            .unwrap()
            .process_one(&input, &out_dir)
            .unwrap();

        let extracted = metadata::extract(&fs::read(&written).unwrap());
        assert_eq!(extracted.exif, blob.exif);
    }

    #[test]
    fn test_naming_pattern_with_format_placeholder() {
        let dir = TempDir::new().unwrap();
        let input = write_png(&dir, "photo.png", 16, 16);
        let out_dir = dir.path().join("out");

        let mut custom = settings(Mode::Convert, 100, OutputFormat::Jpg);
        custom.naming_pattern = "{filename}.{format}.out".to_string();
        let written = TransformEngine::new(custom)
            .unwrap()
            .process_one(&input, &out_dir)
            .unwrap();
        assert_eq!(written.file_name().unwrap(), "photo.jpg.out.jpg");
    }

    #[test]
    fn test_scaled_dimensions_floor() {
        assert_eq!(scaled_dimensions(100, 50, 50), (50, 25));
        assert_eq!(scaled_dimensions(33, 21, 50), (16, 10));
        assert_eq!(scaled_dimensions(10, 10, 5), (0, 0));
        assert_eq!(scaled_dimensions(100, 100, 500), (500, 500));
    }

    proptest! {
        #[test]
        fn test_scaled_dimensions_match_floor_formula(
            width in 1u32..4000,
            height in 1u32..4000,
            percent in 1u32..=500,
        ) {
            let (w, h) = scaled_dimensions(width, height, percent);
            prop_assert_eq!(w as u64, width as u64 * percent as u64 / 100);
            prop_assert_eq!(h as u64, height as u64 * percent as u64 / 100);
        }
    }
}
