//! Shared test utilities: synthetic rasters and geometry assertions.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let raster = gradient_raster(400, 300);
//! let layout = solve(&request);
//! assert_no_overlap(&layout.regions());
//! assert_centered(layout.block(), 800, 600);
//! ```

use image::{Rgb, RgbImage};

use crate::layout::Region;
use crate::types::{RasterImage, Rect, SourceRect};

// =========================================================================
// Synthetic rasters
// =========================================================================

/// Horizontal red ramp, vertical green ramp, constant blue.
pub fn gradient_raster(width: u32, height: u32) -> RasterImage {
    RasterImage::new(RgbImage::from_fn(width, height, |x, y| {
        Rgb([
            (x * 255 / width.max(1)) as u8,
            (y * 255 / height.max(1)) as u8,
            128,
        ])
    }))
}

/// Black/white checkerboard with `cell`-pixel squares.
pub fn checker_raster(width: u32, height: u32, cell: u32) -> RasterImage {
    let cell = cell.max(1);
    RasterImage::new(RgbImage::from_fn(width, height, |x, y| {
        if (x / cell + y / cell) % 2 == 0 {
            Rgb([0, 0, 0])
        } else {
            Rgb([255, 255, 255])
        }
    }))
}

pub fn solid_raster(width: u32, height: u32, color: [u8; 3]) -> RasterImage {
    RasterImage::new(RgbImage::from_pixel(width, height, Rgb(color)))
}

// =========================================================================
// Geometry assertions: panic with the offending rectangles
// =========================================================================

/// No two regions share interior area.
pub fn assert_no_overlap(regions: &[(Region, Rect)]) {
    for (i, (ra, a)) in regions.iter().enumerate() {
        for (rb, b) in &regions[i + 1..] {
            assert!(
                !a.overlaps(b),
                "{} {a:?} overlaps {} {b:?}",
                ra.name(),
                rb.name()
            );
        }
    }
}

/// The block is centered in a `width`×`height` container to within 1px.
pub fn assert_centered(block: Rect, width: u32, height: u32) {
    let left = block.x;
    let right = width as i32 - block.right();
    let top = block.y;
    let bottom = height as i32 - block.bottom();
    assert!(
        (left - right).abs() <= 1 && (top - bottom).abs() <= 1,
        "block {block:?} not centered in {width}x{height}"
    );
}

pub fn assert_rect_close(actual: &SourceRect, expected: (f64, f64, f64, f64), tol: f64) {
    let a = actual.as_tuple();
    let close = (a.0 - expected.0).abs() <= tol
        && (a.1 - expected.1).abs() <= tol
        && (a.2 - expected.2).abs() <= tol
        && (a.3 - expected.3).abs() <= tol;
    assert!(close, "rect {a:?} differs from {expected:?} by more than {tol}");
}
