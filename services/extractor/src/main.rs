//! Station extractor service.
//!
//! Samples directories of gridded GeoTIFFs at station coordinates and writes
//! one table per raster, or regrids coarse source rasters onto the station
//! grid.

mod config_loader;
mod pipeline;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use config_loader::load_extraction_config;
use extraction::RegridRequest;
use pipeline::{regrid_file, ExtractionPipeline};

#[derive(Parser, Debug)]
#[command(name = "extractor")]
#[command(about = "Station value extraction from gridded rasters")]
struct Args {
    /// Log level
    #[arg(long, global = true, default_value = "info", env = "EXTRACTOR_LOG_LEVEL")]
    log_level: String,

    /// Log output format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run extraction jobs
    Extract {
        /// Configuration file path
        #[arg(short, long, env = "EXTRACTOR_CONFIG")]
        config: PathBuf,

        /// Specific job to run (default: all configured)
        #[arg(short, long)]
        job: Option<String>,

        /// Exit non-zero when any raster fails
        #[arg(long)]
        strict: bool,
    },
    /// Resample a source raster onto the station grid
    Regrid {
        /// Configuration file path
        #[arg(short, long, env = "EXTRACTOR_CONFIG")]
        config: PathBuf,

        /// Source GeoTIFF
        #[arg(short, long)]
        input: PathBuf,

        /// Date of the field, in one of the configured regrid date formats
        #[arg(long)]
        date: String,

        /// Dataset tag written into the output name
        #[arg(long)]
        dataset: String,

        /// Variable name written into the output name
        #[arg(long)]
        variable: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

fn parse_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

fn init_tracing(level: Level, format: LogFormat) -> Result<()> {
    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_thread_ids(true);

    match format {
        LogFormat::Json => tracing::subscriber::set_global_default(builder.json().finish())?,
        LogFormat::Text => tracing::subscriber::set_global_default(builder.finish())?,
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(parse_level(&args.log_level), args.log_format)?;

    match args.command {
        Command::Extract {
            config,
            job,
            strict,
        } => {
            info!(config = %config.display(), "Starting station extraction");
            let config = load_extraction_config(&config)?;
            info!(
                jobs = ?config.jobs.iter().map(|j| j.name.as_str()).collect::<Vec<_>>(),
                sampler = config.sampler.name(),
                parallel = config.parallel,
                "Loaded configuration"
            );

            let pipeline = ExtractionPipeline::new(config)?;
            let (summaries, failed_jobs) = match job {
                Some(name) => (vec![pipeline.run_job(&name)?], Vec::new()),
                None => pipeline.run_all(),
            };

            let failed: usize = summaries.iter().map(|s| s.failed()).sum();
            let written: usize = summaries.iter().map(|s| s.succeeded()).sum();
            info!(
                jobs = summaries.len(),
                failed_jobs = failed_jobs.len(),
                written = written,
                failed = failed,
                "Extraction finished"
            );

            if failed > 0 {
                warn!(failed = failed, "Some rasters were skipped");
            }
            if !failed_jobs.is_empty() {
                let reasons: Vec<String> = failed_jobs
                    .iter()
                    .map(|f| format!("{}: {:#}", f.job, f.error))
                    .collect();
                anyhow::bail!("{} job(s) failed: {}", reasons.len(), reasons.join("; "));
            }
            anyhow::ensure!(!(strict && failed > 0), "{} raster(s) failed", failed);
        }
        Command::Regrid {
            config,
            input,
            date,
            dataset,
            variable,
        } => {
            let config = load_extraction_config(&config)?;
            let request = RegridRequest {
                input,
                date,
                dataset,
                variable,
            };
            regrid_file(&config, &request)?;
        }
    }

    Ok(())
}
