//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the four operations the deriver needs:
//! identify, resize, measure and crop. Crop includes encoding and writing the
//! derivative, since every crop is written exactly once.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! crate. The raster type is associated so a mock can stand in with plain
//! dimensions instead of pixel buffers.

use super::params::{CropParams, ResizeParams};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to decode {path}: {message}")]
    Decode { path: String, message: String },
    #[error("Encode failed: {0}")]
    Encode(String),
    #[error("Crop {width}x{height} at top {top} exceeds {actual_width}x{actual_height} image")]
    InvalidCrop {
        top: u32,
        width: u32,
        height: u32,
        actual_width: u32,
        actual_height: u32,
    },
}

/// Width and height of an image or raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Trait for image processing backends.
pub trait ImageBackend {
    /// In-memory resized image, owned by one (file, width) iteration.
    type Raster;

    /// Read image dimensions without resizing.
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError>;

    /// Decode the source and resize it to the requested width, keeping its
    /// aspect ratio.
    fn resize(&self, params: &ResizeParams) -> Result<Self::Raster, BackendError>;

    /// Actual dimensions of a resized raster.
    fn dimensions(&self, raster: &Self::Raster) -> Dimensions;

    /// Crop a region out of the raster, encode it and write it to
    /// `params.output`.
    fn crop(&self, raster: &Self::Raster, params: &CropParams) -> Result<(), BackendError>;
}

/// Reject crop rectangles that do not fit inside `actual`.
pub(crate) fn check_crop_bounds(actual: Dimensions, params: &CropParams) -> Result<(), BackendError> {
    let fits_x = params.left as u64 + params.width as u64 <= actual.width as u64;
    let fits_y = params.top as u64 + params.height as u64 <= actual.height as u64;
    if fits_x && fits_y && params.width > 0 && params.height > 0 {
        Ok(())
    } else {
        Err(BackendError::InvalidCrop {
            top: params.top,
            width: params.width,
            height: params.height,
            actual_width: actual.width,
            actual_height: actual.height,
        })
    }
}
