//! Derivative file naming.
//!
//! Every derivative is named `{base}-{width}-{anchor}.{ext}`:
//! - `hero.jpg` at 1920 top, AVIF → `hero-1920-top.avif`
//! - `IMG_0042.PNG` at 320 bottom, JPEG → `IMG_0042-320-bottom.jpg`
//!
//! The base name is the source file name without its final extension, so
//! names are deterministic and distinct per (base, width, anchor) triple.
//! Two sources sharing a base name (`a.jpg`, `a.png`) write the same derivative
//! paths; the later one overwrites.

use serde::Serialize;
use std::fmt;
use std::path::Path;

/// Vertical alignment of a crop within the resized intermediate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Anchor {
    Top,
    Bottom,
}

impl Anchor {
    pub fn as_str(self) -> &'static str {
        match self {
            Anchor::Top => "top",
            Anchor::Bottom => "bottom",
        }
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Base name of a source path: its file name with the final extension removed.
///
/// `photo.final.jpg` → `photo.final`. Non-UTF-8 names are lossily converted.
pub fn base_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// File name of one derivative.
pub fn derivative_file_name(base: &str, width: u32, anchor: Anchor, extension: &str) -> String {
    format!("{}-{}-{}.{}", base, width, anchor, extension)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn top_and_bottom_names() {
        assert_eq!(
            derivative_file_name("hero", 3840, Anchor::Top, "avif"),
            "hero-3840-top.avif"
        );
        assert_eq!(
            derivative_file_name("hero", 3840, Anchor::Bottom, "avif"),
            "hero-3840-bottom.avif"
        );
    }

    #[test]
    fn base_name_strips_extension() {
        assert_eq!(base_name(Path::new("/in/hero.jpg")), "hero");
        assert_eq!(base_name(Path::new("IMG_0042.PNG")), "IMG_0042");
    }

    #[test]
    fn base_name_keeps_inner_dots() {
        assert_eq!(base_name(Path::new("photo.final.jpeg")), "photo.final");
    }

    #[test]
    fn base_name_of_dashed_name() {
        let base = base_name(Path::new("001-dawn.jpg"));
        assert_eq!(
            derivative_file_name(&base, 320, Anchor::Top, "jpg"),
            "001-dawn-320-top.jpg"
        );
    }

    #[test]
    fn anchor_display() {
        assert_eq!(Anchor::Top.to_string(), "top");
        assert_eq!(Anchor::Bottom.to_string(), "bottom");
    }
}
