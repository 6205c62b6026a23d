use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::{info, warn};

use member_cleaner::{OutputFormat, PipelineConfig, ReferenceData, WriteOutcome, run_month};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    Xlsx,
    Parquet,
}

impl From<FormatArg> for OutputFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Xlsx => Self::Xlsx,
            FormatArg::Parquet => Self::Parquet,
        }
    }
}

#[derive(Parser)]
#[command(name = "member-cleaner")]
#[command(version)]
#[command(about = "Clean one month of student-membership exports into a validated member table")]
#[command(long_about = None)]
struct Cli {
    /// Run configuration file (TOML)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Reference data file (TOML or JSON); the bundled copy is used when absent
    #[arg(short, long, value_name = "FILE")]
    reference: Option<PathBuf>,

    /// Month to clean, as YYYY-MM (overrides the config file)
    #[arg(short, long, value_name = "YYYY-MM")]
    month: Option<String>,

    /// Root folder of monthly input folders
    #[arg(long, value_name = "DIR")]
    input_dir: Option<PathBuf>,

    /// Root folder of monthly output folders
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Output file format
    #[arg(short, long, value_enum)]
    format: Option<FormatArg>,
}

fn main() -> Result<()> {
    // Setup logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => PipelineConfig::from_toml_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => PipelineConfig::default(),
    };
    if let Some(month) = cli.month {
        config.month = month;
    }
    if let Some(input_dir) = cli.input_dir {
        config.input_dir = input_dir;
    }
    if let Some(output_dir) = cli.output_dir {
        config.output_dir = output_dir;
    }
    if let Some(format) = cli.format {
        config.output_format = format.into();
    }
    info!("{config}");

    let reference = match &cli.reference {
        Some(path) => ReferenceData::from_path(path)
            .with_context(|| format!("Failed to load reference data from {}", path.display()))?,
        None => {
            let reference = ReferenceData::bundled().context("Failed to load bundled reference data")?;
            if reference.consultant_center_count() == 0 {
                warn!(
                    "Using the bundled reference skeleton: no consultant centers are mapped, \
                     pass --reference with the maintained tables"
                );
            }
            reference
        }
    };
    info!(
        "Reference data: {} CPT consultants, {} consultant centers",
        reference.cpt_consultant_count(),
        reference.consultant_center_count()
    );

    let start = Instant::now();
    let outcome = run_month(&config, Arc::new(reference))
        .with_context(|| format!("Cleaning failed for month {}", config.month))?;

    match outcome.write {
        WriteOutcome::Written { path, rows } => {
            info!("Wrote {rows} records to {} in {:?}", path.display(), start.elapsed());
            println!("File saved.");
        }
        WriteOutcome::AlreadyExists(path) => {
            warn!("{} already exists; nothing written", path.display());
            println!("File already exists.");
        }
    }

    Ok(())
}
