//! Pure Rust image backend built on the `image` crate.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, TIFF, WebP) | `image::ImageReader` + `to_rgb8` |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` (quality from [`Quality`]) |
//! | Encode → PNG | `image::codecs::png::PngEncoder` |
//! | Encode → TIFF | `image::codecs::tiff::TiffEncoder` (needs `Seek`, so via a cursor) |
//! | Encode → WebP | `image::codecs::webp::WebPEncoder::new_lossless` |

use super::backend::{ImageBackend, ImagingError};
use super::params::{OutputFormat, Quality};
use crate::types::RasterImage;
use image::{ExtendedColorType, ImageEncoder, ImageFormat, ImageReader, RgbImage};
use std::io::Cursor;
use std::path::Path;
use std::sync::LazyLock;
use tracing::debug;

const PHOTO_CANDIDATES: &[(&str, ImageFormat)] = &[
    ("jpg", ImageFormat::Jpeg),
    ("jpeg", ImageFormat::Jpeg),
    ("png", ImageFormat::Png),
    ("tif", ImageFormat::Tiff),
    ("tiff", ImageFormat::Tiff),
    ("webp", ImageFormat::WebP),
];

static SUPPORTED_EXTENSIONS: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    PHOTO_CANDIDATES
        .iter()
        .filter(|(_, fmt)| fmt.reading_enabled())
        .map(|(ext, _)| *ext)
        .collect()
});

/// Image file extensions with a decoder compiled in.
pub fn supported_input_extensions() -> &'static [&'static str] {
    &SUPPORTED_EXTENSIONS
}

pub fn is_supported_input(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| {
            supported_input_extensions()
                .iter()
                .any(|s| s.eq_ignore_ascii_case(e))
        })
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

fn decode_error(path: &Path, source: image::ImageError) -> ImagingError {
    ImagingError::Decode {
        path: path.to_path_buf(),
        source,
    }
}

fn encode_error(format: OutputFormat, e: image::ImageError) -> ImagingError {
    ImagingError::Encode(format!("{}: {e}", format.extension()))
}

impl ImageBackend for RustBackend {
    fn decode(&self, path: &Path) -> Result<RasterImage, ImagingError> {
        let reader = ImageReader::open(path)
            .and_then(|r| r.with_guessed_format())
            .map_err(|e| decode_error(path, image::ImageError::IoError(e)))?;
        let decoded = reader.decode().map_err(|e| decode_error(path, e))?;
        debug!(
            path = %path.display(),
            width = decoded.width(),
            height = decoded.height(),
            "decoded image"
        );
        Ok(RasterImage::new(decoded.to_rgb8()))
    }

    fn encode(
        &self,
        image: &RgbImage,
        format: OutputFormat,
        quality: Quality,
    ) -> Result<Vec<u8>, ImagingError> {
        let (w, h) = image.dimensions();
        let mut buf = Cursor::new(Vec::new());
        let result = match format {
            OutputFormat::Jpeg => {
                image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, quality.value() as u8)
                    .write_image(image.as_raw(), w, h, ExtendedColorType::Rgb8)
            }
            OutputFormat::Png => image::codecs::png::PngEncoder::new(&mut buf).write_image(
                image.as_raw(),
                w,
                h,
                ExtendedColorType::Rgb8,
            ),
            OutputFormat::Tiff => image::codecs::tiff::TiffEncoder::new(&mut buf).write_image(
                image.as_raw(),
                w,
                h,
                ExtendedColorType::Rgb8,
            ),
            OutputFormat::WebP => image::codecs::webp::WebPEncoder::new_lossless(&mut buf)
                .write_image(image.as_raw(), w, h, ExtendedColorType::Rgb8),
        };
        result.map_err(|e| encode_error(format, e))?;
        Ok(buf.into_inner())
    }
}
