//! Source discovery.
//!
//! Lists the images in the input directory. Only regular files directly in the
//! directory are considered (no recursion); a file qualifies when its name
//! ends in `.` plus one of [`SOURCE_EXTENSIONS`], compared case-insensitively.
//! A bare `.jpg` counts, even though [`Path::extension`] sees no extension there.
//! Everything else is ignored silently.
//!
//! The result is sorted by path so runs are reproducible regardless of the
//! order the filesystem returns entries in.

use crate::imaging::SOURCE_EXTENSIONS;
use crate::naming::base_name;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Input directory not found: {0}")]
    NotFound(PathBuf),
    #[error("Input path is not a directory: {0}")]
    NotADirectory(PathBuf),
    #[error("Failed to read input directory {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// A source image on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceImage {
    pub path: PathBuf,
    /// File name without extension, used to name derivatives.
    pub base_name: String,
}

impl SourceImage {
    pub fn new(path: PathBuf) -> Self {
        let base_name = base_name(&path);
        Self { path, base_name }
    }

    /// File name for display, falling back to the full path.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|f| f.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// Whether a path's file name ends in one of the accepted source extensions.
pub fn has_source_extension(path: &Path) -> bool {
    let Some(name) = path.file_name() else {
        return false;
    };
    let name = name.to_string_lossy().to_lowercase();
    SOURCE_EXTENSIONS.iter().any(|ext| {
        name.strip_suffix(ext)
            .is_some_and(|stem| stem.ends_with('.'))
    })
}

/// List the source images in `input_dir`, sorted by path.
pub fn list_source_images(input_dir: &Path) -> Result<Vec<SourceImage>, ScanError> {
    if !input_dir.exists() {
        return Err(ScanError::NotFound(input_dir.to_path_buf()));
    }
    if !input_dir.is_dir() {
        return Err(ScanError::NotADirectory(input_dir.to_path_buf()));
    }

    let io_err = |source| ScanError::Io {
        path: input_dir.to_path_buf(),
        source,
    };

    let mut paths = Vec::new();
    for entry in fs::read_dir(input_dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        if path.is_file() && has_source_extension(&path) {
            paths.push(path);
        }
    }
    paths.sort();

    Ok(paths.into_iter().map(SourceImage::new).collect())
}
