//! Image backend trait and the imaging error type.
//!
//! The [`ImageBackend`] trait covers the two operations that touch codecs:
//! decoding a file into an RGB raster and encoding a raster into bytes.
//! Everything between (cropping, compositing, collage assembly) is pure pixel
//! work on [`RasterImage`] and lives outside the backend.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend).

use super::params::{OutputFormat, Quality};
use crate::types::RasterImage;
use image::RgbImage;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImagingError {
    #[error("failed to decode {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("encode failed: {0}")]
    Encode(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("unsupported image type: {0}")]
    UnsupportedFormat(String),
}

pub trait ImageBackend {
    /// Decode a file into a 3-channel raster.
    fn decode(&self, path: &Path) -> Result<RasterImage, ImagingError>;

    /// Encode a raster into the bytes of `format`.
    fn encode(
        &self,
        image: &RgbImage,
        format: OutputFormat,
        quality: Quality,
    ) -> Result<Vec<u8>, ImagingError>;
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::test_helpers::gradient_raster;
    use std::sync::Mutex;

    /// Mock backend that records operations without touching codecs.
    #[derive(Default)]
    pub struct MockBackend {
        pub decode_results: Mutex<Vec<RasterImage>>,
        pub operations: Mutex<Vec<RecordedOp>>,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub enum RecordedOp {
        Decode(String),
        Encode {
            format: OutputFormat,
            quality: u32,
            width: u32,
            height: u32,
        },
    }

    impl MockBackend {
        pub fn new() -> Self {
            Self::default()
        }

        /// Rasters handed out by `decode`, last first.
        pub fn with_rasters(rasters: Vec<RasterImage>) -> Self {
            Self {
                decode_results: Mutex::new(rasters),
                operations: Mutex::new(Vec::new()),
            }
        }

        pub fn get_operations(&self) -> Vec<RecordedOp> {
            self.operations.lock().unwrap().clone()
        }

        pub fn encoded_sizes(&self) -> Vec<(u32, u32)> {
            self.get_operations()
                .into_iter()
                .filter_map(|op| match op {
                    RecordedOp::Encode { width, height, .. } => Some((width, height)),
                    _ => None,
                })
                .collect()
        }
    }

    impl ImageBackend for MockBackend {
        fn decode(&self, path: &Path) -> Result<RasterImage, ImagingError> {
            self.operations
                .lock()
                .unwrap()
                .push(RecordedOp::Decode(path.to_string_lossy().to_string()));

            self.decode_results.lock().unwrap().pop().ok_or_else(|| {
                ImagingError::Decode {
                    path: path.to_path_buf(),
                    source: image::ImageError::IoError(std::io::Error::new(
                        std::io::ErrorKind::NotFound,
                        "no mock raster",
                    )),
                }
            })
        }

        fn encode(
            &self,
            image: &RgbImage,
            format: OutputFormat,
            quality: Quality,
        ) -> Result<Vec<u8>, ImagingError> {
            self.operations.lock().unwrap().push(RecordedOp::Encode {
                format,
                quality: quality.value(),
                width: image.width(),
                height: image.height(),
            });
            Ok(b"mock".to_vec())
        }
    }

    #[test]
    fn mock_records_decode() {
        let backend = MockBackend::with_rasters(vec![gradient_raster(80, 60)]);

        let raster = backend.decode(Path::new("/test/image.jpg")).unwrap();
        assert_eq!((raster.width(), raster.height()), (80, 60));

        let ops = backend.get_operations();
        assert_eq!(ops.len(), 1);
        assert!(matches!(&ops[0], RecordedOp::Decode(p) if p == "/test/image.jpg"));
    }

    #[test]
    fn mock_decode_without_raster_is_decode_error() {
        let backend = MockBackend::new();
        let err = backend.decode(Path::new("/missing.png")).unwrap_err();
        assert!(matches!(err, ImagingError::Decode { .. }));
        assert!(err.to_string().contains("/missing.png"));
    }

    #[test]
    fn mock_records_encode() {
        let backend = MockBackend::new();
        let raster = gradient_raster(30, 20);
        let bytes = backend
            .encode(raster.pixels(), OutputFormat::Jpeg, Quality::new(98))
            .unwrap();
        assert_eq!(bytes, b"mock");
        assert_eq!(
            backend.get_operations(),
            vec![RecordedOp::Encode {
                format: OutputFormat::Jpeg,
                quality: 98,
                width: 30,
                height: 20,
            }]
        );
    }
}
