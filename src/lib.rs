//! # dualcrop
//!
//! Batch-derives responsive image crops. Every source image in a directory is
//! resized to each configured width and cut twice at a fixed aspect ratio,
//! once anchored to the top and once to the bottom, then encoded as AVIF:
//!
//! ```text
//! input/hero.jpg  →  output/hero-3840-top.avif
//!                    output/hero-3840-bottom.avif
//!                    ...
//!                    output/hero-320-bottom.avif
//! ```
//!
//! The result is a ready-made `srcset` matrix with two focal variants per width.
//!
//! # Pipeline
//!
//! ```text
//! 1. Scan      input/   →  sorted SourceImage list   (extension filter)
//! 2. Derive    per file × per width: resize → measure → plan → crop ×2 → encode
//! 3. Report    events → console transcript, RunReport → optional JSON manifest
//! ```
//!
//! Each (file, width) pair is processed independently. Widths whose resized
//! height is below the crop height are skipped; failures are reported and the
//! run continues.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`scan`] | Lists source images (`.jpg`, `.jpeg`, `.png`) in the input directory |
//! | [`process`] | The derivation loop, progress events and run report |
//! | [`config`] | `dualcrop.toml` loading over stock defaults, validation |
//! | [`naming`] | `{base}-{width}-{top,bottom}.{ext}` naming contract |
//! | [`imaging`] | Crop geometry, backend trait, `image`-crate backend |
//! | [`output`] | CLI output formatting |
//!
//! # Geometry
//!
//! For width `w` and aspect ratio `rw:rh` the crop height is
//! `round(w * rh / rw)`, rounded half up in integer arithmetic. With the stock
//! ratio of `1500:719`, 1366 becomes 655 and 3840 becomes 1841. The top
//! crop starts at `y = 0`, the bottom crop at `y = h - crop_height`.

pub mod config;
pub mod imaging;
pub mod naming;
pub mod output;
pub mod process;
pub mod scan;

#[cfg(test)]
pub(crate) mod test_helpers;
