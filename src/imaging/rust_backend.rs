//! Pure Rust image processing backend.
//!
//! Everything is statically linked into the binary.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Identify | `image::image_dimensions` (header only) |
//! | Decode (JPEG, PNG) | `image::ImageReader` with content sniffing |
//! | Resize | `DynamicImage::resize_exact` with `Lanczos3`, height from [`resized_height`] |
//! | Crop | `DynamicImage::crop_imm` |
//! | Encode → AVIF | `image::codecs::avif::AvifEncoder` (rav1e) |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` |
//!
//! Encoded bytes are produced in memory, written to a hidden `.partial`
//! sibling and renamed over the final path.

use super::backend::{BackendError, Dimensions, ImageBackend, check_crop_bounds};
use super::calculations::resized_height;
use super::params::{CropParams, Encoding, OutputFormat, ResizeParams};
use image::codecs::avif::AvifEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageReader};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Extensions accepted as sources, compared case-insensitively.
pub const SOURCE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn decode_error(path: &Path, err: impl std::fmt::Display) -> BackendError {
    BackendError::Decode {
        path: path.display().to_string(),
        message: err.to_string(),
    }
}

/// Load and decode an image from disk.
fn load_image(path: &Path) -> Result<DynamicImage, BackendError> {
    ImageReader::open(path)?
        .with_guessed_format()?
        .decode()
        .map_err(|e| decode_error(path, e))
}

/// Cut the crop rectangle out of the raster after validating its bounds.
fn crop_region(raster: &DynamicImage, params: &CropParams) -> Result<DynamicImage, BackendError> {
    let (width, height) = raster.dimensions();
    check_crop_bounds(Dimensions { width, height }, params)?;
    Ok(raster.crop_imm(params.left, params.top, params.width, params.height))
}

/// Encode an image into memory in the requested format.
fn encode(img: &DynamicImage, encoding: &Encoding) -> Result<Vec<u8>, BackendError> {
    let quality = encoding.quality.value() as u8;
    let mut bytes = Vec::new();

    match encoding.format {
        OutputFormat::Avif => {
            let pixels = if img.color().has_alpha() {
                DynamicImage::ImageRgba8(img.to_rgba8())
            } else {
                DynamicImage::ImageRgb8(img.to_rgb8())
            };
            let encoder =
                AvifEncoder::new_with_speed_quality(&mut bytes, encoding.speed, quality);
            pixels
                .write_with_encoder(encoder)
                .map_err(|e| BackendError::Encode(format!("AVIF encode failed: {}", e)))?;
        }
        OutputFormat::Jpeg => {
            let pixels = DynamicImage::ImageRgb8(img.to_rgb8());
            let encoder = JpegEncoder::new_with_quality(&mut bytes, quality);
            pixels
                .write_with_encoder(encoder)
                .map_err(|e| BackendError::Encode(format!("JPEG encode failed: {}", e)))?;
        }
    }

    Ok(bytes)
}

fn partial_path(path: &Path) -> Result<PathBuf, BackendError> {
    let name = path.file_name().ok_or_else(|| {
        BackendError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("output path has no file name: {}", path.display()),
        ))
    })?;
    Ok(path.with_file_name(format!(".{}.partial", name.to_string_lossy())))
}

/// Write bytes so that `path` either holds the full file or is untouched.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), BackendError> {
    let partial = partial_path(path)?;
    let result = fs::write(&partial, bytes).and_then(|_| fs::rename(&partial, path));
    if result.is_err() {
        let _ = fs::remove_file(&partial);
    }
    result.map_err(BackendError::Io)
}

impl ImageBackend for RustBackend {
    type Raster = DynamicImage;

    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError> {
        let (width, height) = image::image_dimensions(path).map_err(|e| decode_error(path, e))?;
        Ok(Dimensions { width, height })
    }

    fn resize(&self, params: &ResizeParams) -> Result<DynamicImage, BackendError> {
        let img = load_image(&params.source)?;
        let source = Dimensions {
            width: img.width(),
            height: img.height(),
        };
        let height = resized_height(source, params.width);
        debug!(
            source = %params.source.display(),
            from_width = source.width,
            from_height = source.height,
            width = params.width,
            height,
            "resizing"
        );
        Ok(img.resize_exact(params.width, height, FilterType::Lanczos3))
    }

    fn dimensions(&self, raster: &DynamicImage) -> Dimensions {
        Dimensions {
            width: raster.width(),
            height: raster.height(),
        }
    }

    fn crop(&self, raster: &DynamicImage, params: &CropParams) -> Result<(), BackendError> {
        let region = crop_region(raster, params)?;
        let bytes = encode(&region, &params.encoding)?;
        debug!(
            output = %params.output.display(),
            top = params.top,
            bytes = bytes.len(),
            "encoded crop"
        );
        write_atomic(&params.output, &bytes)
    }
}
