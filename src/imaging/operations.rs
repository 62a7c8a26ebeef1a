//! High-level crop planning.
//!
//! These functions combine calculations with crop parameters. They take the
//! measured intermediate and the configuration and decide which derivatives a
//! width yields; the caller hands the resulting [`CropParams`] to the backend.

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::calculations::{bottom_offset, resized_height, target_height};
use super::params::{CropParams, Encoding};
use crate::naming::{Anchor, derivative_file_name};
use std::path::Path;

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// Get image dimensions using the backend.
pub fn get_dimensions(backend: &impl ImageBackend, path: &Path) -> Result<(u32, u32)> {
    let dims = backend.identify(path)?;
    Ok((dims.width, dims.height))
}

/// Configuration for derivative generation.
#[derive(Debug, Clone)]
pub struct DerivativeConfig {
    /// Crop aspect ratio as (width, height).
    pub aspect: (u32, u32),
    pub encoding: Encoding,
}

/// One crop to execute, with the side it is anchored to.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedCrop {
    pub anchor: Anchor,
    pub params: CropParams,
}

/// What a single width yields for one source.
#[derive(Debug, Clone, PartialEq)]
pub enum WidthPlan {
    /// The intermediate is shorter than the crop; nothing is produced.
    Infeasible {
        target_height: u32,
        actual_height: u32,
    },
    /// The top crop is always planned. `bottom` is `None` only when the
    /// bottom offset is negative.
    Feasible {
        target_height: u32,
        top: PlannedCrop,
        bottom: Option<PlannedCrop>,
    },
}

/// Plan the crops for one width, given the resized intermediate's actual size.
pub fn plan_width(
    output_dir: &Path,
    base_name: &str,
    width: u32,
    actual: Dimensions,
    config: &DerivativeConfig,
) -> WidthPlan {
    let target = target_height(width, config.aspect);
    if actual.height < target {
        return WidthPlan::Infeasible {
            target_height: target,
            actual_height: actual.height,
        };
    }

    let crop_at = |anchor: Anchor, top: u32| PlannedCrop {
        anchor,
        params: CropParams {
            output: output_dir.join(derivative_file_name(
                base_name,
                width,
                anchor,
                config.encoding.format.extension(),
            )),
            left: 0,
            top,
            width,
            height: target,
            encoding: config.encoding,
        },
    };

    let top = crop_at(Anchor::Top, 0);
    // Checked on its own even though the height gate above already implies it.
    let offset = bottom_offset(actual.height, target);
    let bottom = u32::try_from(offset)
        .ok()
        .map(|top| crop_at(Anchor::Bottom, top));

    WidthPlan::Feasible {
        target_height: target,
        top,
        bottom,
    }
}

/// Geometry of one width for a dry-run plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeometryRow {
    pub width: u32,
    pub resized_height: u32,
    pub target_height: u32,
    pub feasible: bool,
}

/// Predict the geometry of every width from the source's natural dimensions.
///
/// Uses the same rounding as the resize path, so a feasible row here is a
/// width that yields both crops.
pub fn plan_source(source: Dimensions, widths: &[u32], aspect: (u32, u32)) -> Vec<GeometryRow> {
    widths
        .iter()
        .map(|&width| {
            let resized = resized_height(source, width);
            let target = target_height(width, aspect);
            GeometryRow {
                width,
                resized_height: resized,
                target_height: target,
                feasible: resized >= target,
            }
        })
        .collect()
}
