//! Image processing in pure Rust, built on the `image` crate.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode** | `image::ImageReader` → RGB8 |
//! | **Preview** | Lanczos3 fit to the displayed size |
//! | **Effect** | `imageops::blur` / Triangle + Nearest pixelate, feathered mask |
//! | **Compose** | viewport-driven crop + Lanczos3 paste |
//! | **Encode** | JPEG (quality 98), PNG, TIFF, lossless WebP |
//!
//! The module is split into:
//! - **Calculations**: pure functions for strength and dimension math
//! - **Parameters**: effect selection, quality, output format
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Effects**: the masked compositor shared by preview and save
//! - **Compose**: crops, banner frames, collages
//! - **Operations**: load, preview, no-clobber save

pub mod backend;
mod calculations;
pub mod compose;
pub mod effects;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{ImageBackend, ImagingError};
pub use calculations::{
    blur_sigma, calculate_fit_dimensions, export_scale, feather_radius,
    pixelate_block, raster_scale,
};
pub use effects::composite;
pub use operations::{load, preview, save_with_increment};
pub use params::{EffectKind, EffectParams, EffectState, MAX_STRENGTH, OutputFormat, Quality};
pub use rust_backend::{RustBackend, is_supported_input, supported_input_extensions};
