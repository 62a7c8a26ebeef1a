use clap::{Parser, Subcommand};
use dualcrop::imaging::OutputFormat;
use dualcrop::{config, output, process};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Shared flags for commands that read the config.
#[derive(clap::Args, Clone)]
struct ConfigArgs {
    /// Path to a dualcrop.toml (stock defaults when omitted)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Parser)]
#[command(name = "dualcrop")]
#[command(about = "Derive top/bottom aspect-ratio crops at responsive widths")]
#[command(long_about = "\
Derive top/bottom aspect-ratio crops at responsive widths

Every .jpg/.jpeg/.png file in INPUT is resized to each configured width and
cropped twice at a fixed aspect ratio (1500:719 by default), once from the
top and once from the bottom:

  INPUT/hero.jpg → OUTPUT/hero-3840-top.avif
                   OUTPUT/hero-3840-bottom.avif
                   ...
                   OUTPUT/hero-320-bottom.avif

Widths whose resized image is shorter than the crop are skipped.

Run 'dualcrop gen-config' to generate a documented dualcrop.toml.")]
#[command(version)]
struct Cli {
    /// Log diagnostics to stderr (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Derive crops for every source image
    Derive {
        /// Directory of source images
        input: PathBuf,
        /// Directory for derivatives (created if missing)
        output: PathBuf,
        #[command(flatten)]
        config: ConfigArgs,
        /// Override output.quality (1-100)
        #[arg(long)]
        quality: Option<u32>,
        /// Override output.format
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,
        /// Write a JSON manifest of the run to this path
        #[arg(long)]
        manifest: Option<PathBuf>,
    },
    /// Show crop geometry per width without encoding anything
    Plan {
        /// Directory of source images
        input: PathBuf,
        #[command(flatten)]
        config: ConfigArgs,
    },
    /// Print a stock dualcrop.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Derive {
            input,
            output: output_dir,
            config: config_args,
            quality,
            format,
            manifest,
        } => {
            let mut derive_config = config::load_config(config_args.config.as_deref())?;
            if let Some(quality) = quality {
                derive_config.output.quality = quality;
            }
            if let Some(format) = format {
                derive_config.output.format = format;
            }
            derive_config.validate()?;

            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    let line = output::format_process_event(&event);
                    if output::is_error_event(&event) {
                        eprintln!("{}", line);
                    } else {
                        println!("{}", line);
                    }
                }
            });
            let result = process::run(&input, &output_dir, &derive_config, Some(tx));
            printer
                .join()
                .map_err(|_| "console printer thread panicked")?;
            let report = result?;

            if let Some(manifest_path) = manifest {
                write_manifest(&manifest_path, &report)?;
            }
            println!(
                "{}",
                output::format_summary(&report, derive_config.output.format)
            );
        }
        Command::Plan {
            input,
            config: config_args,
        } => {
            let derive_config = config::load_config(config_args.config.as_deref())?;
            let plans = process::plan(&input, &derive_config)?;
            for line in output::format_plan(&plans) {
                println!("{}", line);
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Install the stderr `tracing` subscriber.
///
/// `--verbose` forces `debug`; otherwise `RUST_LOG` applies, defaulting to `warn`.
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("warn,dualcrop=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn write_manifest(path: &Path, report: &process::RunReport) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(path, json)?;
    Ok(())
}
