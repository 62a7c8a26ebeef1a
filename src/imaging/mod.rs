//! Image processing in pure Rust, no system libraries.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `image::image_dimensions` |
//! | **Resize** | Lanczos3, width fixed, height from the source ratio |
//! | **Crop → AVIF** | `crop_imm` + rav1e encoder |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for crop geometry (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: Crop planning combining calculations + parameters

pub mod backend;
mod calculations;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend};
pub use calculations::{bottom_offset, resized_height, target_height};
pub use operations::{
    DerivativeConfig, GeometryRow, PlannedCrop, WidthPlan, get_dimensions, plan_source,
    plan_width,
};
pub use params::{CropParams, Encoding, OutputFormat, Quality, ResizeParams};
pub use rust_backend::{RustBackend, SOURCE_EXTENSIONS};
