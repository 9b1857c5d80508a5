//! High-level image operations combining the backend with pure pixel work.
//!
//! - [`load`] decodes through the backend (always 3-channel RGB).
//! - [`preview`] downsizes a source to its on-screen size.
//! - [`save_with_increment`] encodes once and writes under the first free
//!   auto-incremented name.
//!
//! ## No-clobber saves
//!
//! Encoded bytes go to a temporary file in the destination directory, which is
//! then persisted with `persist_noclobber`. If another file already holds the
//! name, the next candidate is tried. An existing file is never overwritten and
//! a failed save leaves no partial file: the temporary is removed when dropped.

use image::RgbImage;
use image::imageops::{self, FilterType};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use super::backend::{ImageBackend, ImagingError};
use super::calculations::calculate_fit_dimensions;
use super::params::{OutputFormat, Quality};
use crate::naming::OutputName;
use crate::types::RasterImage;

/// How many numbered names to try before giving up.
const MAX_CANDIDATES: u32 = 10_000;

pub fn load(backend: &dyn ImageBackend, path: &Path) -> Result<RasterImage, ImagingError> {
    let raster = backend.decode(path)?;
    info!(
        path = %path.display(),
        width = raster.width(),
        height = raster.height(),
        "loaded image"
    );
    Ok(raster)
}

/// Lanczos3 copy of `source` fitted into `bounds`.
pub fn preview(source: &RasterImage, bounds: (u32, u32)) -> RgbImage {
    let (w, h) = calculate_fit_dimensions((source.width(), source.height()), bounds);
    if (w, h) == (source.width(), source.height()) {
        return source.pixels().clone();
    }
    imageops::resize(source.pixels(), w, h, FilterType::Lanczos3)
}

/// Encode `image` and write it to the first free name from `name`.
///
/// A name without a recognised extension is written as PNG and given a
/// `.png` extension. Returns the path actually written.
pub fn save_with_increment(
    backend: &dyn ImageBackend,
    image: &RgbImage,
    name: &OutputName,
    quality: Quality,
) -> Result<PathBuf, ImagingError> {
    let (format, name) = match OutputFormat::from_path(&name.candidate(0)) {
        Some(format) => (format, name.clone()),
        None => (
            OutputFormat::Png,
            name.clone().with_extension(OutputFormat::Png.extension()),
        ),
    };
    let bytes = backend.encode(image, format, quality)?;

    let dir = if name.dir().as_os_str().is_empty() {
        Path::new(".")
    } else {
        name.dir()
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(&bytes)?;
    tmp.as_file().sync_all()?;

    for n in 0..MAX_CANDIDATES {
        let candidate = name.candidate(n);
        match tmp.persist_noclobber(&candidate) {
            Ok(_) => {
                info!(path = %candidate.display(), bytes = bytes.len(), "saved image");
                return Ok(candidate);
            }
            Err(e) if e.error.kind() == std::io::ErrorKind::AlreadyExists => {
                debug!(path = %candidate.display(), "name taken, trying next");
                tmp = e.file;
            }
            Err(e) => return Err(ImagingError::Io(e.error)),
        }
    }
    Err(ImagingError::Io(std::io::Error::new(
        std::io::ErrorKind::AlreadyExists,
        format!("no free output name after {MAX_CANDIDATES} attempts"),
    )))
}
