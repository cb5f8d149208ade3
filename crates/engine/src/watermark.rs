//! Watermark compositing.
//!
//! Renders text onto a transparent overlay the same size as the image,
//! then alpha-composites the overlay onto the image. Text uses a built-in
//! 8x8 bitmap font scaled up to the computed size, so no system font is
//! ever loaded and rendering cannot fail; characters missing from the font
//! fall back to a placeholder glyph.

use font8x8::{BASIC_FONTS, UnicodeFonts};
use image::{DynamicImage, Rgba, RgbaImage};

use crate::settings::WatermarkPosition;

/// Distance in pixels between the text box and the anchored edge(s).
const MARGIN: u32 = 20;

/// Side length of one unscaled font glyph.
const GLYPH_SIZE: u32 = 8;

/// Glyph used for characters the font does not cover. Rendered blank if the
/// font somehow lacks it too.
const FALLBACK_GLYPH: char = '?';

/// Overlay `text` onto `image` at `position` with the given alpha.
///
/// Returns the input unchanged (pixel-identical) when `text` is empty or
/// whitespace-only. The result is converted back to the input's pixel mode.
pub fn apply_watermark(
    image: &DynamicImage,
    text: &str,
    position: WatermarkPosition,
    opacity: u8,
) -> DynamicImage {
    if text.trim().is_empty() {
        return image.clone();
    }

    let (width, height) = (image.width(), image.height());
    let scale = glyph_scale(width, height);
    let (text_w, text_h) = text_box(text, scale);
    let (origin_x, origin_y) = anchor(position, width, height, text_w, text_h);

    let mut overlay = RgbaImage::new(width, height);
    draw_text(&mut overlay, text, origin_x, origin_y, scale, opacity);

    let mut canvas = image.to_rgba8();
    composite_over(&mut canvas, &overlay);
    restore_mode(image, canvas)
}

/// Font size in pixels: `max(16, min(width, height) / 30)`.
fn font_size(width: u32, height: u32) -> u32 {
    (width.min(height) / 30).max(16)
}

/// Integer scale factor applied to the 8x8 glyphs. The 16px floor on the
/// font size keeps this at 2 or more.
fn glyph_scale(width: u32, height: u32) -> u32 {
    (font_size(width, height) / GLYPH_SIZE).max(1)
}

/// Bounding box of the rendered text, before anchoring.
fn text_box(text: &str, scale: u32) -> (u32, u32) {
    let cell = GLYPH_SIZE * scale;
    let chars = text.chars().count() as u32;
    (chars * cell, cell)
}

/// Top-left corner of the text box for the given anchor. Saturates toward
/// the image edge when the box plus margin does not fit.
fn anchor(
    position: WatermarkPosition,
    width: u32,
    height: u32,
    text_w: u32,
    text_h: u32,
) -> (u32, u32) {
    let right = width.saturating_sub(text_w + MARGIN);
    let bottom = height.saturating_sub(text_h + MARGIN);
    match position {
        WatermarkPosition::TopLeft => (MARGIN, MARGIN),
        WatermarkPosition::TopRight => (right, MARGIN),
        WatermarkPosition::BottomLeft => (MARGIN, bottom),
        WatermarkPosition::BottomRight => (right, bottom),
        WatermarkPosition::Center => (
            width.saturating_sub(text_w) / 2,
            height.saturating_sub(text_h) / 2,
        ),
    }
}

/// Draw `text` in white at the given alpha, scaling each 8x8 glyph up by
/// `scale`. Pixels falling outside the overlay are skipped.
fn draw_text(
    overlay: &mut RgbaImage,
    text: &str,
    origin_x: u32,
    origin_y: u32,
    scale: u32,
    alpha: u8,
) {
    let cell = GLYPH_SIZE * scale;
    let white = Rgba([255, 255, 255, alpha]);

    for (index, ch) in text.chars().enumerate() {
        let glyph = BASIC_FONTS
            .get(ch)
            .or_else(|| BASIC_FONTS.get(FALLBACK_GLYPH))
            .unwrap_or([0u8; 8]);
        let glyph_x = origin_x + index as u32 * cell;

        for (row, bits) in glyph.iter().enumerate() {
            for col in 0..GLYPH_SIZE {
                if (bits >> col) & 1 == 0 {
                    continue;
                }
                let base_x = glyph_x + col * scale;
                let base_y = origin_y + row as u32 * scale;
                for dy in 0..scale {
                    for dx in 0..scale {
                        let x = base_x + dx;
                        let y = base_y + dy;
                        if x < overlay.width() && y < overlay.height() {
                            overlay.put_pixel(x, y, white);
                        }
                    }
                }
            }
        }
    }
}

/// Standard "over" alpha blend of `overlay` onto `base`.
fn composite_over(base: &mut RgbaImage, overlay: &RgbaImage) {
    for (dst, src) in base.pixels_mut().zip(overlay.pixels()) {
        let alpha = src[3] as u16;
        if alpha == 0 {
            continue;
        }
        let inv = 255 - alpha;
        for channel in 0..3 {
            dst[channel] = ((src[channel] as u16 * alpha + dst[channel] as u16 * inv) / 255) as u8;
        }
        let out_alpha = alpha + (dst[3] as u16 * inv + 127) / 255;
        dst[3] = out_alpha.min(255) as u8;
    }
}

/// Convert the composited canvas back to the input's pixel mode.
fn restore_mode(original: &DynamicImage, canvas: RgbaImage) -> DynamicImage {
    let composited = DynamicImage::ImageRgba8(canvas);
    match original.color() {
        image::ColorType::L8 => DynamicImage::ImageLuma8(composited.to_luma8()),
        image::ColorType::La8 => DynamicImage::ImageLumaA8(composited.to_luma_alpha8()),
        image::ColorType::Rgb8 => DynamicImage::ImageRgb8(composited.to_rgb8()),
        image::ColorType::Rgba8 => composited,
        image::ColorType::L16 => DynamicImage::ImageLuma16(composited.to_luma16()),
        image::ColorType::La16 => DynamicImage::ImageLumaA16(composited.to_luma_alpha16()),
        image::ColorType::Rgb16 => DynamicImage::ImageRgb16(composited.to_rgb16()),
        image::ColorType::Rgba16 => DynamicImage::ImageRgba16(composited.to_rgba16()),
        image::ColorType::Rgb32F => DynamicImage::ImageRgb32F(composited.to_rgb32f()),
        image::ColorType::Rgba32F => DynamicImage::ImageRgba32F(composited.to_rgba32f()),
        _ => composited,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::GenericImageView;

    fn black_rgb(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(image::RgbImage::new(width, height))
    }

    fn inked_box(image: &DynamicImage) -> Option<(u32, u32, u32, u32)> {
        let mut bounds: Option<(u32, u32, u32, u32)> = None;
        for (x, y, pixel) in image.pixels() {
            if pixel[0] > 0 || pixel[1] > 0 || pixel[2] > 0 {
                bounds = Some(match bounds {
                    None => (x, y, x, y),
                    Some((min_x, min_y, max_x, max_y)) => {
                        (min_x.min(x), min_y.min(y), max_x.max(x), max_y.max(y))
                    }
                });
            }
        }
        bounds
    }

    #[test]
    fn test_empty_text_is_a_pixel_identical_noop() {
        let image = black_rgb(64, 48);
        let out = apply_watermark(&image, "", WatermarkPosition::Center, 255);
        assert_eq!(image.as_bytes(), out.as_bytes());
    }

    #[test]
    fn test_whitespace_text_is_a_noop() {
        let image = black_rgb(64, 48);
        let out = apply_watermark(&image, "  \t ", WatermarkPosition::TopLeft, 255);
        assert_eq!(image.as_bytes(), out.as_bytes());
    }

    #[test]
    fn test_nonempty_text_changes_pixels() {
        let image = black_rgb(200, 150);
        let out = apply_watermark(&image, "MK", WatermarkPosition::Center, 255);
        assert_ne!(image.as_bytes(), out.as_bytes());
    }

    #[test]
    fn test_font_size_floor() {
        assert_eq!(font_size(200, 150), 16);
        assert_eq!(font_size(3000, 2400), 80);
        assert_eq!(font_size(2400, 3000), 80);
    }

    #[test]
    fn test_anchored_box_respects_margin() {
        // 400x300 keeps the font at its 16px floor: scale 2, 16px cells.
        let (width, height) = (400u32, 300u32);
        let text = "MK";
        let scale = glyph_scale(width, height);
        let (text_w, text_h) = text_box(text, scale);
        assert_eq!((text_w, text_h), (32, 16));

        let cases = [
            (WatermarkPosition::TopLeft, MARGIN, MARGIN),
            (WatermarkPosition::TopRight, width - MARGIN - text_w, MARGIN),
            (WatermarkPosition::BottomLeft, MARGIN, height - MARGIN - text_h),
            (
                WatermarkPosition::BottomRight,
                width - MARGIN - text_w,
                height - MARGIN - text_h,
            ),
            (
                WatermarkPosition::Center,
                (width - text_w) / 2,
                (height - text_h) / 2,
            ),
        ];

        for (position, box_x, box_y) in cases {
            let out = apply_watermark(&black_rgb(width, height), text, position, 255);
            let (min_x, min_y, max_x, max_y) =
                inked_box(&out).expect("watermark should ink at least one pixel");
            assert!(min_x >= box_x, "{position}: ink left of box");
            assert!(min_y >= box_y, "{position}: ink above box");
            assert!(max_x < box_x + text_w, "{position}: ink right of box");
            assert!(max_y < box_y + text_h, "{position}: ink below box");
        }
    }

    #[test]
    fn test_full_opacity_renders_white() {
        let out = apply_watermark(&black_rgb(400, 300), "I", WatermarkPosition::TopLeft, 255);
        let (min_x, min_y, _, _) = inked_box(&out).unwrap();
        let pixel = out.get_pixel(min_x, min_y);
        assert_eq!((pixel[0], pixel[1], pixel[2]), (255, 255, 255));
    }

    #[test]
    fn test_half_opacity_blends() {
        // 128/255 alpha of white over black lands mid-gray.
        let out = apply_watermark(&black_rgb(400, 300), "I", WatermarkPosition::TopLeft, 128);
        let (min_x, min_y, _, _) = inked_box(&out).unwrap();
        let pixel = out.get_pixel(min_x, min_y);
        assert_eq!(pixel[0], (255u16 * 128 / 255) as u8);
    }

    #[test]
    fn test_pixel_mode_is_preserved() {
        let rgb = black_rgb(100, 80);
        let out = apply_watermark(&rgb, "X", WatermarkPosition::Center, 200);
        assert_eq!(out.color(), image::ColorType::Rgb8);

        let luma = DynamicImage::ImageLuma8(image::GrayImage::new(100, 80));
        let out = apply_watermark(&luma, "X", WatermarkPosition::Center, 200);
        assert_eq!(out.color(), image::ColorType::L8);

        let rgba = DynamicImage::ImageRgba8(RgbaImage::new(100, 80));
        let out = apply_watermark(&rgba, "X", WatermarkPosition::Center, 200);
        assert_eq!(out.color(), image::ColorType::Rgba8);
    }

    #[test]
    fn test_tiny_image_does_not_panic() {
        let out =
            apply_watermark(&black_rgb(24, 16), "LONG TEXT", WatermarkPosition::BottomRight, 255);
        assert_eq!((out.width(), out.height()), (24, 16));
    }
}
