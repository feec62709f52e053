//! Extraction pipeline running the configured jobs.

use anyhow::{anyhow, Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, instrument};

use extraction::{
    run_regrid, BatchExtractor, BatchSummary, ExtractionConfig, RegridRequest, StationTable,
};

/// A job that stopped before processing its rasters.
#[derive(Debug)]
pub struct JobFailure {
    pub job: String,
    pub error: anyhow::Error,
}

/// Runs extraction jobs against one shared station table.
pub struct ExtractionPipeline {
    config: ExtractionConfig,
    stations: Arc<StationTable>,
}

impl ExtractionPipeline {
    /// Load the station table; failing here aborts before any raster is read.
    pub fn new(config: ExtractionConfig) -> Result<Self> {
        let stations = StationTable::from_csv(&config.stations)
            .with_context(|| format!("Failed to load stations from {:?}", config.stations))?;
        anyhow::ensure!(!stations.is_empty(), "Station table {:?} is empty", config.stations);

        Ok(Self {
            config,
            stations: Arc::new(stations),
        })
    }

    /// Run every configured job. A failing job is logged and the rest still run.
    ///
    /// Returns the summaries of the jobs that ran and the jobs that could not.
    pub fn run_all(&self) -> (Vec<BatchSummary>, Vec<JobFailure>) {
        let mut summaries = Vec::with_capacity(self.config.jobs.len());
        let mut failures = Vec::new();
        for job in &self.config.jobs {
            match self.run_job(&job.name) {
                Ok(summary) => summaries.push(summary),
                Err(e) => {
                    error!(job = %job.name, error = %format!("{:#}", e), "Job failed");
                    failures.push(JobFailure {
                        job: job.name.clone(),
                        error: e,
                    });
                }
            }
        }
        (summaries, failures)
    }

    /// Run a single job by name.
    #[instrument(skip(self))]
    pub fn run_job(&self, name: &str) -> Result<BatchSummary> {
        let job = self
            .config
            .job(name)
            .ok_or_else(|| anyhow!("Unknown job: {}", name))?;

        let extractor = BatchExtractor::from_config(&self.config, job, self.stations.clone())?;
        let summary = extractor.run()?;
        Ok(summary)
    }
}

/// Resample one source raster using the config's regrid section.
pub fn regrid_file(config: &ExtractionConfig, request: &RegridRequest) -> Result<PathBuf> {
    let regrid = config
        .regrid
        .as_ref()
        .ok_or_else(|| anyhow!("Config has no regrid section"))?;

    let out = run_regrid(&config.grid, regrid, request)
        .with_context(|| format!("Failed to regrid {:?}", request.input))?;
    info!(output = %out.display(), "Regrid complete");
    Ok(out)
}
