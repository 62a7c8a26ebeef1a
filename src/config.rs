//! Derivation configuration.
//!
//! Handles loading, validating, and merging a `dualcrop.toml` file over the
//! stock defaults. The file is optional and sparse: override just the values
//! you want. Unknown keys are rejected to catch typos early.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [crop]
//! aspect_ratio = [1500, 719]   # width:height of every derivative
//!
//! [output]
//! widths = [3840, 3440, 2560, 2048, 1920, 1680, 1600, 1536, 1440, 1366, 1360,
//!           1280, 1024, 960, 800, 768, 720, 640, 480, 425, 375, 360, 320]
//! quality = 50                 # 1-100
//! format = "avif"              # "avif" or "jpeg"
//! speed = 6                    # AVIF encoder speed, 1 (best) - 10 (fastest)
//! ```
//!
//! The loaded [`DeriveConfig`] is immutable for the whole run and passed into
//! [`process::run`](crate::process::run).

use crate::imaging::{DerivativeConfig, Encoding, OutputFormat, Quality};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Stock target widths, largest first.
pub const DEFAULT_WIDTHS: &[u32] = &[
    3840, 3440, 2560, 2048, 1920, 1680, 1600, 1536, 1440, 1366, 1360, 1280, 1024, 960, 800, 768,
    720, 640, 480, 425, 375, 360, 320,
];

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DeriveConfig {
    /// Crop geometry.
    pub crop: CropConfig,
    /// Target widths and encoding.
    pub output: OutputConfig,
}

/// Crop geometry settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CropConfig {
    /// Aspect ratio as `[width, height]`.
    pub aspect_ratio: [u32; 2],
}

impl Default for CropConfig {
    fn default() -> Self {
        Self {
            aspect_ratio: [1500, 719],
        }
    }
}

/// Derivative output settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Pixel widths to derive, in processing order.
    pub widths: Vec<u32>,
    /// Encoding quality (1 = worst, 100 = best).
    pub quality: u32,
    pub format: OutputFormat,
    /// AVIF encoder speed (1 = slowest/best, 10 = fastest).
    pub speed: u8,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            widths: DEFAULT_WIDTHS.to_vec(),
            quality: 50,
            format: OutputFormat::Avif,
            speed: 6,
        }
    }
}

impl DeriveConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let [ratio_w, ratio_h] = self.crop.aspect_ratio;
        if ratio_w == 0 || ratio_h == 0 {
            return Err(ConfigError::Validation(
                "crop.aspect_ratio values must be non-zero".into(),
            ));
        }
        if self.output.widths.is_empty() {
            return Err(ConfigError::Validation(
                "output.widths must not be empty".into(),
            ));
        }
        if self.output.widths.contains(&0) {
            return Err(ConfigError::Validation(
                "output.widths values must be non-zero".into(),
            ));
        }
        if !(1..=100).contains(&self.output.quality) {
            return Err(ConfigError::Validation(
                "output.quality must be 1-100".into(),
            ));
        }
        if !(1..=10).contains(&self.output.speed) {
            return Err(ConfigError::Validation("output.speed must be 1-10".into()));
        }
        Ok(())
    }

    /// Aspect ratio as `(width, height)`.
    pub fn aspect(&self) -> (u32, u32) {
        let [w, h] = self.crop.aspect_ratio;
        (w, h)
    }

    /// Encoding shared by every derivative of the run.
    pub fn encoding(&self) -> Encoding {
        Encoding {
            format: self.output.format,
            quality: Quality::new(self.output.quality),
            speed: self.output.speed,
        }
    }

    /// Parameters handed to the crop planner.
    pub fn derivative_config(&self) -> DerivativeConfig {
        DerivativeConfig {
            aspect: self.aspect(),
            encoding: self.encoding(),
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the base layer user overrides are merged on top of.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(DeriveConfig::default())
        .map_err(|e| ConfigError::Validation(format!("default config must serialize: {e}")))
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Merge an optional overlay onto the stock defaults, then deserialize and validate.
pub fn resolve_config(overlay: Option<toml::Value>) -> Result<DeriveConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: DeriveConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from an optional TOML file.
///
/// `None` yields the stock defaults. A given path must exist and parse.
pub fn load_config(path: Option<&Path>) -> Result<DeriveConfig, ConfigError> {
    let overlay = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            Some(toml::from_str::<toml::Value>(&content)?)
        }
        None => None,
    };
    resolve_config(overlay)
}

/// Returns a fully-commented stock `dualcrop.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# dualcrop configuration
# ======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys cause an error.

# ---------------------------------------------------------------------------
# Crop geometry
# ---------------------------------------------------------------------------
[crop]
# Aspect ratio as [width, height] of every derivative. Each width w is cropped
# to a height of round(w * height / width).
aspect_ratio = [1500, 719]

# ---------------------------------------------------------------------------
# Derivative output
# ---------------------------------------------------------------------------
[output]
# Pixel widths to derive, processed in this order. Each source is resized to
# every width (upscaling if needed) and cropped from the top and the bottom.
widths = [
    3840, 3440, 2560, 2048, 1920, 1680, 1600, 1536, 1440, 1366, 1360,
    1280, 1024, 960, 800, 768, 720, 640, 480, 425, 375, 360, 320,
]

# Lossy encoding quality (1 = worst, 100 = best).
quality = 50

# Output format: "avif" or "jpeg".
format = "avif"

# AVIF encoder speed, 1 (slowest, smallest files) to 10 (fastest).
speed = 6
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_values() {
        let config = DeriveConfig::default();
        assert_eq!(config.crop.aspect_ratio, [1500, 719]);
        assert_eq!(config.output.widths.len(), 23);
        assert_eq!(config.output.widths.first(), Some(&3840));
        assert_eq!(config.output.widths.last(), Some(&320));
        assert_eq!(config.output.quality, 50);
        assert_eq!(config.output.format, OutputFormat::Avif);
        assert_eq!(config.output.speed, 6);
    }

    #[test]
    fn default_widths_are_descending() {
        assert!(DEFAULT_WIDTHS.windows(2).all(|w| w[0] > w[1]));
    }

    #[test]
    fn parse_partial_config() {
        let config: DeriveConfig = toml::from_str(
            r#"
            [output]
            quality = 70
            "#,
        )
        .unwrap();
        assert_eq!(config.output.quality, 70);
        assert_eq!(config.output.widths, DEFAULT_WIDTHS);
        assert_eq!(config.crop.aspect_ratio, [1500, 719]);
    }

    #[test]
    fn load_config_without_file_is_default() {
        let config = load_config(None).unwrap();
        assert_eq!(config, DeriveConfig::default());
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("dualcrop.toml");
        fs::write(
            &path,
            r#"
            [crop]
            aspect_ratio = [16, 9]

            [output]
            widths = [1280, 640]
            format = "jpeg"
            "#,
        )
        .unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.aspect(), (16, 9));
        assert_eq!(config.output.widths, vec![1280, 640]);
        assert_eq!(config.output.format, OutputFormat::Jpeg);
        assert_eq!(config.output.quality, 50);
    }

    #[test]
    fn load_config_missing_file_is_error() {
        let tmp = TempDir::new().unwrap();
        let result = load_config(Some(&tmp.path().join("absent.toml")));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("dualcrop.toml");
        fs::write(&path, "this is not [valid toml").unwrap();
        assert!(matches!(
            load_config(Some(&path)),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn unknown_key_rejected() {
        let overlay: toml::Value = toml::from_str("[output]\nqualty = 40").unwrap();
        assert!(resolve_config(Some(overlay)).is_err());
    }

    #[test]
    fn unknown_section_rejected() {
        let overlay: toml::Value = toml::from_str("[thumbnails]\nsize = 4").unwrap();
        assert!(resolve_config(Some(overlay)).is_err());
    }

    #[test]
    fn validation_rejects_bad_values() {
        let cases = [
            "[crop]\naspect_ratio = [0, 719]",
            "[output]\nwidths = []",
            "[output]\nwidths = [320, 0]",
            "[output]\nquality = 0",
            "[output]\nquality = 101",
            "[output]\nspeed = 11",
        ];
        for case in cases {
            let overlay: toml::Value = toml::from_str(case).unwrap();
            assert!(
                matches!(resolve_config(Some(overlay)), Err(ConfigError::Validation(_))),
                "expected validation failure for {case:?}"
            );
        }
    }

    #[test]
    fn merge_toml_scalar_override() {
        let base: toml::Value = toml::from_str("a = 1\nb = 2").unwrap();
        let overlay: toml::Value = toml::from_str("b = 3").unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged["a"].as_integer(), Some(1));
        assert_eq!(merged["b"].as_integer(), Some(3));
    }

    #[test]
    fn merge_toml_replaces_arrays_wholesale() {
        let base: toml::Value = toml::from_str("[output]\nwidths = [3, 2, 1]\nquality = 5").unwrap();
        let overlay: toml::Value = toml::from_str("[output]\nwidths = [9]").unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged["output"]["widths"].as_array().unwrap().len(), 1);
        assert_eq!(merged["output"]["quality"].as_integer(), Some(5));
    }

    #[test]
    fn stock_config_toml_matches_defaults() {
        let config: DeriveConfig = toml::from_str(stock_config_toml()).unwrap();
        assert_eq!(config, DeriveConfig::default());
    }

    #[test]
    fn derivative_config_carries_encoding() {
        let mut config = DeriveConfig::default();
        config.output.quality = 80;
        config.output.format = OutputFormat::Jpeg;
        let derived = config.derivative_config();
        assert_eq!(derived.aspect, (1500, 719));
        assert_eq!(derived.encoding.quality.value(), 80);
        assert_eq!(derived.encoding.format, OutputFormat::Jpeg);
    }
}
