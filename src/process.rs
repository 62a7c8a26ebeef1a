//! Batch derivation.
//!
//! Takes every source image from the [`scan`](crate::scan) stage and, for each
//! configured width, produces a top-anchored and a bottom-anchored crop at the
//! configured aspect ratio.
//!
//! ## Per-width pipeline
//!
//! ```text
//! decode + resize to w ─► measure h ─► h < target? ── yes ─► Skipped
//!                                          │
//!                                          no
//!                                          ▼
//!                              crop top ─► encode ─► write ─► Created
//!                                          ▼
//!                       h - target >= 0? ── no ─► BottomSkipped
//!                                          │
//!                                          yes
//!                                          ▼
//!                            crop bottom ─► encode ─► write ─► Created
//! ```
//!
//! ## Output Structure
//!
//! ```text
//! output/
//! ├── hero-3840-top.avif
//! ├── hero-3840-bottom.avif
//! ├── ...
//! ├── hero-320-top.avif
//! └── hero-320-bottom.avif
//! ```
//!
//! ## Failure isolation
//!
//! Each (file, width) pair is one unit of work. A decode, crop, encode or
//! write failure ends that unit with a [`ProcessEvent::Failed`] and the loop
//! moves on to the next width. Only startup failures (unreadable input
//! directory, uncreatable output directory) abort the run.
//!
//! ## Sequential Processing
//!
//! Units run one after another on the calling thread. Every width decodes the
//! source again rather than reusing an earlier intermediate.

use crate::config::{ConfigError, DeriveConfig};
use crate::imaging::{
    BackendError, DerivativeConfig, Dimensions, GeometryRow, ImageBackend, PlannedCrop,
    ResizeParams, RustBackend, WidthPlan, get_dimensions, plan_source, plan_width,
};
use crate::naming::Anchor;
use crate::scan::{ScanError, SourceImage, list_source_images};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Scan(#[from] ScanError),
    #[error("Failed to create output directory {path}: {source}")]
    OutputDir {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Progress events emitted as each unit of work completes.
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessEvent {
    /// A source file is about to be processed.
    SourceStarted {
        file: String,
        index: usize,
        total: usize,
    },
    /// A derivative was written.
    Created {
        path: PathBuf,
        width: u32,
        anchor: Anchor,
    },
    /// The resized height is below the crop height; no derivatives for this width.
    Skipped {
        base_name: String,
        width: u32,
        target_height: u32,
        actual_height: u32,
    },
    /// The bottom crop would start above the image.
    BottomSkipped { base_name: String, width: u32 },
    /// Processing this (file, width) unit failed.
    Failed {
        file: String,
        width: u32,
        error: String,
    },
}

/// One derivative written during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DerivativeRecord {
    pub source: PathBuf,
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub anchor: Anchor,
}

/// Summary of a whole run, serializable as a manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub sources: usize,
    pub derivatives: Vec<DerivativeRecord>,
    pub skipped: usize,
    pub failed: usize,
}

/// Collects outcomes into the report and forwards them as events.
struct Reporter {
    report: RunReport,
    events: Option<Sender<ProcessEvent>>,
}

impl Reporter {
    fn emit(&mut self, event: ProcessEvent) {
        match &event {
            ProcessEvent::Skipped { .. } | ProcessEvent::BottomSkipped { .. } => {
                self.report.skipped += 1
            }
            ProcessEvent::Failed { .. } => self.report.failed += 1,
            ProcessEvent::SourceStarted { .. } | ProcessEvent::Created { .. } => {}
        }
        if let Some(tx) = &self.events {
            // A dropped receiver only means nobody is listening.
            let _ = tx.send(event);
        }
    }
}

/// Derive every source in `input_dir` into `output_dir` with the production backend.
pub fn run(
    input_dir: &Path,
    output_dir: &Path,
    config: &DeriveConfig,
    events: Option<Sender<ProcessEvent>>,
) -> Result<RunReport, ProcessError> {
    run_with_backend(&RustBackend::new(), input_dir, output_dir, config, events)
}

/// Derive using a specific backend (allows testing with mock).
pub fn run_with_backend<B: ImageBackend>(
    backend: &B,
    input_dir: &Path,
    output_dir: &Path,
    config: &DeriveConfig,
    events: Option<Sender<ProcessEvent>>,
) -> Result<RunReport, ProcessError> {
    config.validate()?;
    let sources = list_source_images(input_dir)?;
    std::fs::create_dir_all(output_dir).map_err(|source| ProcessError::OutputDir {
        path: output_dir.to_path_buf(),
        source,
    })?;
    let output_dir = &absolute_output_dir(output_dir)?;

    info!(
        input = %input_dir.display(),
        output = %output_dir.display(),
        sources = sources.len(),
        widths = config.output.widths.len(),
        "starting derivation"
    );

    let derivative_config = config.derivative_config();
    let mut reporter = Reporter {
        report: RunReport {
            sources: sources.len(),
            ..RunReport::default()
        },
        events,
    };

    for (index, source) in sources.iter().enumerate() {
        reporter.emit(ProcessEvent::SourceStarted {
            file: source.file_name(),
            index: index + 1,
            total: sources.len(),
        });

        for &width in &config.output.widths {
            if let Err(e) = derive_width(
                backend,
                source,
                output_dir,
                width,
                &derivative_config,
                &mut reporter,
            ) {
                warn!(file = %source.path.display(), width, error = %e, "derivation failed");
                reporter.emit(ProcessEvent::Failed {
                    file: source.file_name(),
                    width,
                    error: e.to_string(),
                });
            }
        }
    }

    let report = reporter.report;
    info!(
        created = report.derivatives.len(),
        skipped = report.skipped,
        failed = report.failed,
        "derivation finished"
    );
    Ok(report)
}

/// Absolute form of `output_dir`, so `Created` lines and the report name full paths.
///
/// Symlinks are left unresolved.
fn absolute_output_dir(output_dir: &Path) -> Result<PathBuf, ProcessError> {
    std::path::absolute(output_dir).map_err(|source| ProcessError::OutputDir {
        path: output_dir.to_path_buf(),
        source,
    })
}

/// Run one (file, width) unit to completion, skip, or first error.
fn derive_width<B: ImageBackend>(
    backend: &B,
    source: &SourceImage,
    output_dir: &Path,
    width: u32,
    config: &DerivativeConfig,
    reporter: &mut Reporter,
) -> Result<(), BackendError> {
    let raster = backend.resize(&ResizeParams {
        source: source.path.clone(),
        width,
    })?;
    let actual = backend.dimensions(&raster);
    debug!(file = %source.path.display(), width, height = actual.height, "resized");

    match plan_width(output_dir, &source.base_name, width, actual, config) {
        WidthPlan::Infeasible {
            target_height,
            actual_height,
        } => {
            reporter.emit(ProcessEvent::Skipped {
                base_name: source.base_name.clone(),
                width,
                target_height,
                actual_height,
            });
        }
        WidthPlan::Feasible { top, bottom, .. } => {
            write_crop(backend, &raster, source, top, reporter)?;
            match bottom {
                Some(bottom) => write_crop(backend, &raster, source, bottom, reporter)?,
                None => reporter.emit(ProcessEvent::BottomSkipped {
                    base_name: source.base_name.clone(),
                    width,
                }),
            }
        }
    }
    Ok(())
}

fn write_crop<B: ImageBackend>(
    backend: &B,
    raster: &B::Raster,
    source: &SourceImage,
    crop: PlannedCrop,
    reporter: &mut Reporter,
) -> Result<(), BackendError> {
    backend.crop(raster, &crop.params)?;
    let PlannedCrop { anchor, params } = crop;
    reporter.report.derivatives.push(DerivativeRecord {
        source: source.path.clone(),
        path: params.output.clone(),
        width: params.width,
        height: params.height,
        anchor,
    });
    reporter.emit(ProcessEvent::Created {
        path: params.output,
        width: params.width,
        anchor,
    });
    Ok(())
}

/// Dry-run geometry for one source.
#[derive(Debug, Clone, PartialEq)]
pub struct SourcePlan {
    pub source: SourceImage,
    /// Natural dimensions and per-width rows, or the identify error.
    pub geometry: Result<(Dimensions, Vec<GeometryRow>), String>,
}

/// Predict, without decoding pixels or writing anything, what a run would produce.
pub fn plan(input_dir: &Path, config: &DeriveConfig) -> Result<Vec<SourcePlan>, ProcessError> {
    plan_with_backend(&RustBackend::new(), input_dir, config)
}

/// Plan using a specific backend (allows testing with mock).
pub fn plan_with_backend(
    backend: &impl ImageBackend,
    input_dir: &Path,
    config: &DeriveConfig,
) -> Result<Vec<SourcePlan>, ProcessError> {
    config.validate()?;
    let sources = list_source_images(input_dir)?;
    Ok(sources
        .into_iter()
        .map(|source| {
            let geometry = get_dimensions(backend, &source.path)
                .map(|(width, height)| {
                    let dims = Dimensions { width, height };
                    let rows = plan_source(dims, &config.output.widths, config.aspect());
                    (dims, rows)
                })
                .map_err(|e| e.to_string());
            SourcePlan { source, geometry }
        })
        .collect())
}
