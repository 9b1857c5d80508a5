//! Pure calculation functions for effect strength and output dimensions.
//!
//! All functions here are pure and testable without any I/O or images.
//!
//! ## Resolution-aware strengths
//!
//! Every effect size is expressed in **source** pixels and then scaled by
//! `raster_width / source_width` for whatever raster is actually being
//! composited. The preview (a display-sized copy) and the save (the full
//! source) therefore blur, pixelate and feather the same fraction of the
//! image.

use super::params::EffectParams;
use crate::types::Size;

/// Gaussian sigma of the blur effect, in source pixels.
///
/// `strength × k × max(W, H) / reference`
pub fn blur_sigma(strength: u32, params: &EffectParams, source: Size) -> f64 {
    if params.reference_dimension <= 0.0 {
        return 0.0;
    }
    strength as f64 * params.blur_per_strength * source.width.max(source.height)
        / params.reference_dimension
}

/// Pixelate block edge in source pixels: `max(2, strength × 2)`.
pub fn pixelate_block(strength: u32) -> f64 {
    (strength as f64 * 2.0).max(2.0)
}

/// Mask feather sigma in source pixels: `max(5, 1% of the short edge)`.
pub fn feather_radius(source: Size) -> f64 {
    (0.01 * source.width.min(source.height)).max(5.0)
}

/// Factor that maps source pixels onto a raster `raster_width` wide.
pub fn raster_scale(raster_width: u32, source: Size) -> f64 {
    if source.width <= 0.0 {
        1.0
    } else {
        raster_width as f64 / source.width
    }
}

/// Largest size with the source aspect that fits in `bounds`, at least 1×1.
///
/// # Examples
/// ```
/// # use cropper::imaging::calculate_fit_dimensions;
/// assert_eq!(calculate_fit_dimensions((4000, 3000), (800, 800)), (800, 600));
/// assert_eq!(calculate_fit_dimensions((1000, 2000), (800, 600)), (300, 600));
/// ```
pub fn calculate_fit_dimensions(source: (u32, u32), bounds: (u32, u32)) -> (u32, u32) {
    let (src_w, src_h) = source;
    let (max_w, max_h) = bounds;
    if src_w == 0 || src_h == 0 {
        return (max_w.max(1), max_h.max(1));
    }
    let ratio = (max_w as f64 / src_w as f64).min(max_h as f64 / src_h as f64);
    (
        ((src_w as f64 * ratio) as u32).max(1),
        ((src_h as f64 * ratio) as u32).max(1),
    )
}

/// Export canvas for a block of the given size, scaled so its long edge is `long_edge`.
pub fn export_scale(block: Size, long_edge: u32) -> f64 {
    let longest = block.width.max(block.height);
    if longest <= 0.0 {
        1.0
    } else {
        long_edge as f64 / longest
    }
}
