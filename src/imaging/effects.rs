//! Masked blur/pixelate compositing.
//!
//! [`composite`] is the one entry point for both the live preview and the
//! saved file. It takes a raster (the full source, or a display-sized copy of
//! it) together with the *source* dimensions, and derives every effect size
//! from the source via [`raster_scale`]. Running it on a downscaled copy and
//! on the original therefore produces the same picture at two resolutions.
//!
//! Steps:
//!
//! 1. transform the whole raster (Gaussian blur, or pixelate via a Triangle
//!    downsample followed by a Nearest upsample);
//! 2. build a mask that is 255 everywhere and 0 inside the crop rectangle;
//! 3. feather the mask with a Gaussian blur;
//! 4. alpha-blend original and transformed through the mask.
//!
//! Without a crop rectangle the mask is skipped and the transform covers the
//! whole image.

use image::imageops::{self, FilterType};
use image::{GrayImage, Luma, RgbImage};

use super::calculations::{blur_sigma, feather_radius, pixelate_block, raster_scale};
use super::params::{EffectKind, EffectParams, EffectState};
use crate::types::{Size, SourceRect};

/// Apply the effect to the whole of `raster`.
pub fn transform(
    raster: &RgbImage,
    source: Size,
    effect: &EffectState,
    params: &EffectParams,
) -> RgbImage {
    let scale = raster_scale(raster.width(), source);
    match effect.kind() {
        EffectKind::None => raster.clone(),
        EffectKind::Blur => {
            let sigma = blur_sigma(effect.strength(), params, source) * scale;
            if sigma <= 0.0 {
                raster.clone()
            } else {
                imageops::blur(raster, sigma as f32)
            }
        }
        EffectKind::Pixelate => {
            let block = (pixelate_block(effect.strength()) * scale).max(1.0);
            pixelate(raster, block)
        }
    }
}

fn pixelate(raster: &RgbImage, block: f64) -> RgbImage {
    let (w, h) = raster.dimensions();
    if w == 0 || h == 0 {
        return raster.clone();
    }
    let small_w = ((w as f64 / block).ceil() as u32).max(1);
    let small_h = ((h as f64 / block).ceil() as u32).max(1);
    let small = imageops::resize(raster, small_w, small_h, FilterType::Triangle);
    imageops::resize(&small, w, h, FilterType::Nearest)
}

/// Feathered selection mask for `raster_size`: 0 inside `crop`, 255 outside.
pub fn feather_mask(raster_size: (u32, u32), source: Size, crop: &SourceRect) -> GrayImage {
    let (w, h) = raster_size;
    let scale = raster_scale(w, source);
    let mut mask = GrayImage::from_pixel(w, h, Luma([255]));

    let scaled = SourceRect::new(
        crop.x0() * scale,
        crop.y0() * scale,
        crop.x1() * scale,
        crop.y1() * scale,
    );
    let (x, y, cw, ch) = scaled.pixel_box(w, h);
    for py in y..y + ch {
        for px in x..x + cw {
            mask.put_pixel(px, py, Luma([0]));
        }
    }

    let sigma = feather_radius(source) * scale;
    if sigma > 0.0 {
        imageops::blur(&mask, sigma as f32)
    } else {
        mask
    }
}

/// Blend `original` and `transformed` through `mask` (255 = transformed).
pub fn blend(original: &RgbImage, transformed: &RgbImage, mask: &GrayImage) -> RgbImage {
    RgbImage::from_fn(original.width(), original.height(), |x, y| {
        let a = mask.get_pixel(x, y).0[0] as f32 / 255.0;
        let o = original.get_pixel(x, y).0;
        let t = transformed.get_pixel(x, y).0;
        image::Rgb(std::array::from_fn(|c| {
            (o[c] as f32 * (1.0 - a) + t[c] as f32 * a).round() as u8
        }))
    })
}

/// Composite the effect over `raster`, sparing the inside of `crop`.
///
/// `crop` is in source pixels; `source` is the size of the full-resolution
/// image `raster` was derived from (equal to the raster size when saving).
pub fn composite(
    raster: &RgbImage,
    source: Size,
    crop: Option<&SourceRect>,
    effect: &EffectState,
    params: &EffectParams,
) -> RgbImage {
    if !effect.is_active() {
        return raster.clone();
    }
    let transformed = transform(raster, source, effect, params);
    match crop {
        None => transformed,
        Some(rect) => {
            let mask = feather_mask(raster.dimensions(), source, rect);
            blend(raster, &transformed, &mask)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{checker_raster, gradient_raster};

    fn channels_close(a: [u8; 3], b: [u8; 3]) -> bool {
        a.iter().zip(b).all(|(x, y)| x.abs_diff(y) <= 1)
    }

    /// Width of the left-edge transition band along row `y`, in raster pixels.
    fn band_width(mask: &GrayImage, y: u32, x_end: u32) -> u32 {
        (0..x_end)
            .filter(|&x| {
                let v = mask.get_pixel(x, y).0[0];
                (10..=245).contains(&v)
            })
            .count() as u32
    }

    // =========================================================================
    // Determinism
    // =========================================================================

    #[test]
    fn composite_is_deterministic() {
        let src = gradient_raster(120, 90);
        let crop = SourceRect::new(30.0, 20.0, 90.0, 70.0);
        for kind in [EffectKind::Blur, EffectKind::Pixelate] {
            let effect = EffectState::new(kind, 12);
            let a = composite(src.pixels(), src.size(), Some(&crop), &effect, &EffectParams::default());
            let b = composite(src.pixels(), src.size(), Some(&crop), &effect, &EffectParams::default());
            assert_eq!(a, b);
        }
    }

    #[test]
    fn inactive_effect_is_identity() {
        let src = gradient_raster(50, 40);
        let effect = EffectState::new(EffectKind::Blur, 0);
        let out = composite(src.pixels(), src.size(), None, &effect, &EffectParams::default());
        assert_eq!(&out, src.pixels());
    }

    // =========================================================================
    // Masking
    // =========================================================================

    #[test]
    fn crop_interior_keeps_original_and_outside_is_transformed() {
        let src = checker_raster(300, 300, 8);
        let crop = SourceRect::new(100.0, 100.0, 200.0, 200.0);
        let effect = EffectState::new(EffectKind::Pixelate, 10);
        let params = EffectParams::default();

        let out = composite(src.pixels(), src.size(), Some(&crop), &effect, &params);
        let transformed = transform(src.pixels(), src.size(), &effect, &params);

        // Feather sigma is 5px; 50px from every mask edge both sides are settled.
        assert!(channels_close(out.get_pixel(150, 150).0, src.pixels().get_pixel(150, 150).0));
        assert!(channels_close(out.get_pixel(30, 30).0, transformed.get_pixel(30, 30).0));
        assert!(channels_close(out.get_pixel(270, 150).0, transformed.get_pixel(270, 150).0));
    }

    #[test]
    fn no_crop_transforms_everything() {
        let src = checker_raster(64, 64, 4);
        let effect = EffectState::new(EffectKind::Pixelate, 4);
        let params = EffectParams::default();
        let out = composite(src.pixels(), src.size(), None, &effect, &params);
        assert_eq!(out, transform(src.pixels(), src.size(), &effect, &params));
    }

    #[test]
    fn pixelate_produces_flat_blocks() {
        let src = gradient_raster(64, 64);
        // Strength 4 → 8px blocks at full resolution.
        let out = transform(
            src.pixels(),
            src.size(),
            &EffectState::new(EffectKind::Pixelate, 4),
            &EffectParams::default(),
        );
        let first = out.get_pixel(0, 0);
        for y in 0..8 {
            for x in 0..8 {
                assert_eq!(out.get_pixel(x, y), first);
            }
        }
    }

    // =========================================================================
    // Preview = save
    // =========================================================================

    #[test]
    fn feather_band_matches_across_resolutions() {
        let source = Size::new(400.0, 300.0);
        let crop = SourceRect::new(100.0, 80.0, 300.0, 220.0);

        let full = feather_mask((400, 300), source, &crop);
        let half = feather_mask((200, 150), source, &crop);

        let full_band = band_width(&full, 150, 200) as f64;
        let half_band_in_source = band_width(&half, 75, 100) as f64 * 2.0;
        assert!(full_band > 0.0);
        assert!(
            (full_band - half_band_in_source).abs() <= (full_band * 0.35).max(6.0),
            "full {full_band} vs half {half_band_in_source}"
        );
    }

    #[test]
    fn preview_pixelation_matches_saved_block_size() {
        let source = gradient_raster(400, 400);
        let preview = imageops::resize(source.pixels(), 100, 100, FilterType::Triangle);
        let effect = EffectState::new(EffectKind::Pixelate, 8);
        let params = EffectParams::default();

        let saved = transform(source.pixels(), source.size(), &effect, &params);
        let shown = transform(&preview, source.size(), &effect, &params);

        // 16 source px blocks → 4 preview px blocks.
        assert_eq!(saved.get_pixel(0, 0), saved.get_pixel(15, 15));
        assert_eq!(shown.get_pixel(0, 0), shown.get_pixel(3, 3));
        assert_ne!(shown.get_pixel(0, 0), shown.get_pixel(4, 0));
    }
}
