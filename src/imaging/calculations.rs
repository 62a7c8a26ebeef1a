//! Pure calculation functions for crop geometry.
//!
//! All functions here are pure and testable without any I/O or images.
//! Rounding is half-up throughout and done in integer arithmetic so results
//! are identical on every platform.

use super::backend::Dimensions;

/// Divide rounding half up. `denominator` must be non-zero.
fn div_round(numerator: u64, denominator: u64) -> u64 {
    (numerator * 2 + denominator) / (denominator * 2)
}

/// Height a crop must have at `width` to match the aspect ratio.
///
/// # Arguments
/// * `width` - Target width in pixels
/// * `aspect` - Aspect ratio as (width, height)
///
/// # Examples
/// ```
/// # use dualcrop::imaging::target_height;
/// assert_eq!(target_height(1366, (1500, 719)), 655);
/// assert_eq!(target_height(3840, (1500, 719)), 1841);
/// ```
pub fn target_height(width: u32, aspect: (u32, u32)) -> u32 {
    let (aspect_w, aspect_h) = aspect;
    div_round(width as u64 * aspect_h as u64, aspect_w as u64) as u32
}

/// Height of a source resized to `width` with its aspect ratio preserved.
///
/// Never less than one pixel, however extreme the source ratio.
pub fn resized_height(source: Dimensions, width: u32) -> u32 {
    let h = div_round(source.height as u64 * width as u64, source.width.max(1) as u64);
    h.clamp(1, u32::MAX as u64) as u32
}

/// Vertical offset of a bottom-anchored crop.
///
/// Signed: negative when the crop is taller than the intermediate.
pub fn bottom_offset(actual_height: u32, target_height: u32) -> i64 {
    actual_height as i64 - target_height as i64
}
