//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how* to do it. They sit between
//! the [`operations`](super::operations) planner (which decides which crops a
//! width yields) and the [`backend`](super::backend) (which does the pixel
//! work), so the pipeline can run against a mock backend unchanged.
//!
//! ## Types
//!
//! - [`Quality`]: Lossy encoding quality (1–100, default 50). Clamped on construction.
//! - [`OutputFormat`]: Encoded output format and its file extension.
//! - [`Encoding`]: Format + quality + encoder speed, shared by every crop of a run.
//! - [`ResizeParams`]: Source path and the width to resize it to.
//! - [`CropParams`]: Output path, crop rectangle and encoding for one derivative.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(50)
    }
}

/// Encoded output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Avif,
    Jpeg,
}

impl OutputFormat {
    /// File extension used in derivative names.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Avif => "avif",
            OutputFormat::Jpeg => "jpg",
        }
    }

    /// Human-readable codec name for the completion banner.
    pub fn label(self) -> &'static str {
        match self {
            OutputFormat::Avif => "AVIF",
            OutputFormat::Jpeg => "JPEG",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// How every derivative of a run gets encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Encoding {
    pub format: OutputFormat,
    pub quality: Quality,
    /// AVIF encoder speed (1 = slowest/best, 10 = fastest). Ignored for JPEG.
    pub speed: u8,
}

impl Default for Encoding {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            quality: Quality::default(),
            speed: 6,
        }
    }
}

/// Parameters for resizing a source to a target width.
///
/// Height is not forced; the backend keeps the source aspect ratio.
#[derive(Debug, Clone, PartialEq)]
pub struct ResizeParams {
    pub source: PathBuf,
    pub width: u32,
}

/// Parameters for cropping one derivative out of a resized intermediate.
#[derive(Debug, Clone, PartialEq)]
pub struct CropParams {
    pub output: PathBuf,
    pub left: u32,
    pub top: u32,
    pub width: u32,
    pub height: u32,
    pub encoding: Encoding,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quality_clamps_to_valid_range() {
        assert_eq!(Quality::new(0).value(), 1);
        assert_eq!(Quality::new(50).value(), 50);
        assert_eq!(Quality::new(150).value(), 100);
    }

    #[test]
    fn quality_from_config_value_is_clamped() {
        let encoding = Encoding {
            quality: Quality::new(250),
            ..Encoding::default()
        };
        assert_eq!(encoding.quality, Quality::new(100));
    }

    #[test]
    fn quality_default_is_50() {
        assert_eq!(Quality::default().value(), 50);
    }

    #[test]
    fn output_format_extensions() {
        assert_eq!(OutputFormat::Avif.extension(), "avif");
        assert_eq!(OutputFormat::Jpeg.extension(), "jpg");
        assert_eq!(OutputFormat::default(), OutputFormat::Avif);
    }

    #[test]
    fn output_format_deserializes_lowercase() {
        #[derive(Deserialize)]
        struct Wrapper {
            format: OutputFormat,
        }
        let w: Wrapper = toml::from_str(r#"format = "jpeg""#).unwrap();
        assert_eq!(w.format, OutputFormat::Jpeg);
    }
}
