//! CLI output formatting.
//!
//! The console transcript is the user-facing record of a run: one line per
//! created derivative, per skip and per error, then a completion banner.
//!
//! # Output Format
//!
//! ## Derive
//!
//! ```text
//! [1/2] hero.jpg
//! Created out/hero-3840-top.avif
//! Created out/hero-3840-bottom.avif
//! ...
//! [2/2] strip.png
//! Skipping strip at width 3840: target height 1841 exceeds resized image height 192
//! ...
//! Image resizing, dual cropping, and AVIF conversion completed: 46 created, 23 skipped, 0 failed
//! ```
//!
//! ## Plan
//!
//! ```text
//! hero.jpg (4000x2000)
//!     3840px: 3840x1920 → crop 3840x1841 (offset 79)
//!      320px: 320x160 → crop 320x153 (offset 7)
//! strip.png (1000x50)
//!     3840px: 3840x192 → skip (needs 1841)
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>` or `String`)
//! for testability; `main` does the printing. Format functions are pure:
//! no I/O, no side effects.

use crate::imaging::OutputFormat;
use crate::process::{ProcessEvent, RunReport, SourcePlan};

/// Whether an event belongs on stderr rather than stdout.
pub fn is_error_event(event: &ProcessEvent) -> bool {
    matches!(event, ProcessEvent::Failed { .. })
}

/// Format a single progress event as a display line.
pub fn format_process_event(event: &ProcessEvent) -> String {
    match event {
        ProcessEvent::SourceStarted { file, index, total } => {
            format!("[{}/{}] {}", index, total, file)
        }
        ProcessEvent::Created { path, .. } => format!("Created {}", path.display()),
        ProcessEvent::Skipped {
            base_name,
            width,
            target_height,
            actual_height,
        } => format!(
            "Skipping {} at width {}: target height {} exceeds resized image height {}",
            base_name, width, target_height, actual_height
        ),
        ProcessEvent::BottomSkipped { base_name, width } => format!(
            "Skipping bottom crop for {} at width {}: invalid top position",
            base_name, width
        ),
        ProcessEvent::Failed { file, width, error } => {
            format!("Error processing {} at width {}: {}", file, width, error)
        }
    }
}

/// Completion banner with run totals.
pub fn format_summary(report: &RunReport, format: OutputFormat) -> String {
    format!(
        "Image resizing, dual cropping, and {} conversion completed: {} created, {} skipped, {} failed",
        format.label(),
        report.derivatives.len(),
        report.skipped,
        report.failed
    )
}

/// Format the dry-run geometry table.
pub fn format_plan(plans: &[SourcePlan]) -> Vec<String> {
    let mut lines = Vec::new();

    for plan in plans {
        let file = plan.source.file_name();
        match &plan.geometry {
            Err(error) => lines.push(format!("{}: {}", file, error)),
            Ok((dims, rows)) => {
                lines.push(format!("{} ({}x{})", file, dims.width, dims.height));
                for row in rows {
                    let detail = if row.feasible {
                        format!(
                            "crop {}x{} (offset {})",
                            row.width,
                            row.target_height,
                            row.resized_height - row.target_height
                        )
                    } else {
                        format!("skip (needs {})", row.target_height)
                    };
                    lines.push(format!(
                        "    {:>4}px: {}x{} \u{2192} {}",
                        row.width, row.width, row.resized_height, detail
                    ));
                }
            }
        }
    }

    if plans.is_empty() {
        lines.push("No source images found".to_string());
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::{Dimensions, GeometryRow};
    use crate::naming::Anchor;
    use crate::process::DerivativeRecord;
    use crate::scan::SourceImage;
    use std::path::PathBuf;

    #[test]
    fn created_line_shows_full_path() {
        let line = format_process_event(&ProcessEvent::Created {
            path: PathBuf::from("/out/hero-320-top.avif"),
            width: 320,
            anchor: Anchor::Top,
        });
        assert_eq!(line, "Created /out/hero-320-top.avif");
    }

    #[test]
    fn skip_line_names_file_width_and_heights() {
        let line = format_process_event(&ProcessEvent::Skipped {
            base_name: "strip".into(),
            width: 3840,
            target_height: 1841,
            actual_height: 192,
        });
        assert_eq!(
            line,
            "Skipping strip at width 3840: target height 1841 exceeds resized image height 192"
        );
    }

    #[test]
    fn bottom_skip_line() {
        let line = format_process_event(&ProcessEvent::BottomSkipped {
            base_name: "hero".into(),
            width: 320,
        });
        assert_eq!(
            line,
            "Skipping bottom crop for hero at width 320: invalid top position"
        );
    }

    #[test]
    fn error_line_and_routing() {
        let event = ProcessEvent::Failed {
            file: "broken.jpg".into(),
            width: 640,
            error: "Encode failed: boom".into(),
        };
        assert_eq!(
            format_process_event(&event),
            "Error processing broken.jpg at width 640: Encode failed: boom"
        );
        assert!(is_error_event(&event));
        assert!(!is_error_event(&ProcessEvent::BottomSkipped {
            base_name: "x".into(),
            width: 1
        }));
    }

    #[test]
    fn source_started_line() {
        let line = format_process_event(&ProcessEvent::SourceStarted {
            file: "hero.jpg".into(),
            index: 1,
            total: 3,
        });
        assert_eq!(line, "[1/3] hero.jpg");
    }

    #[test]
    fn summary_counts() {
        let report = RunReport {
            sources: 1,
            derivatives: vec![DerivativeRecord {
                source: "in/hero.jpg".into(),
                path: "out/hero-320-top.avif".into(),
                width: 320,
                height: 153,
                anchor: Anchor::Top,
            }],
            skipped: 2,
            failed: 3,
        };
        assert_eq!(
            format_summary(&report, OutputFormat::Avif),
            "Image resizing, dual cropping, and AVIF conversion completed: 1 created, 2 skipped, 3 failed"
        );
    }

    #[test]
    fn plan_lines_for_feasible_and_infeasible_rows() {
        let plans = vec![
            SourcePlan {
                source: SourceImage::new("in/hero.jpg".into()),
                geometry: Ok((
                    Dimensions {
                        width: 4000,
                        height: 2000,
                    },
                    vec![GeometryRow {
                        width: 320,
                        resized_height: 160,
                        target_height: 153,
                        feasible: true,
                    }],
                )),
            },
            SourcePlan {
                source: SourceImage::new("in/strip.png".into()),
                geometry: Ok((
                    Dimensions {
                        width: 1000,
                        height: 50,
                    },
                    vec![GeometryRow {
                        width: 3840,
                        resized_height: 192,
                        target_height: 1841,
                        feasible: false,
                    }],
                )),
            },
            SourcePlan {
                source: SourceImage::new("in/broken.jpg".into()),
                geometry: Err("bad header".into()),
            },
        ];

        let lines = format_plan(&plans);
        assert_eq!(
            lines,
            vec![
                "hero.jpg (4000x2000)",
                "     320px: 320x160 \u{2192} crop 320x153 (offset 7)",
                "strip.png (1000x50)",
                "    3840px: 3840x192 \u{2192} skip (needs 1841)",
                "broken.jpg: bad header",
            ]
        );
    }

    #[test]
    fn plan_with_no_sources() {
        assert_eq!(format_plan(&[]), vec!["No source images found"]);
    }
}
