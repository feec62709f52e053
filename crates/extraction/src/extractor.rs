//! Batch extraction of station values from a directory of rasters.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use rayon::prelude::*;
use station_grid::{
    censor, codec, to_grid_layout, GridConfig, PointSampler, SamplerConfig, UniformGrid,
};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::config::{ExtractionConfig, JobConfig};
use crate::error::{ExtractionError, Result};
use crate::metadata::{has_extension, parse_raster_filename, RasterFileInfo};
use crate::output::{output_path, write_table, ExtractionResult};
use crate::stations::StationTable;

/// Geotransforms closer than this (degrees) are considered the same grid.
const TRANSFORM_TOLERANCE: f64 = 1e-6;

/// A file that could not be processed.
#[derive(Debug)]
pub struct FileFailure {
    pub path: PathBuf,
    pub error: ExtractionError,
}

/// Outcome of one job.
#[derive(Debug, Default)]
pub struct BatchSummary {
    pub job: String,
    /// Matching raster files found
    pub files_seen: usize,
    /// Tables written, in input order
    pub written: Vec<PathBuf>,
    pub failures: Vec<FileFailure>,
}

impl BatchSummary {
    pub fn succeeded(&self) -> usize {
        self.written.len()
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Runs one job: every raster under the job's input root becomes one table.
///
/// Each worker fills its own copy of the grid; the station table and
/// sampler are shared read-only.
pub struct BatchExtractor {
    job: JobConfig,
    grid: UniformGrid,
    stations: Arc<StationTable>,
    sampler: Box<dyn PointSampler>,
    parallel: bool,
}

impl BatchExtractor {
    /// Create an extractor, validating the job and building its sampler.
    pub fn new(
        grid: &GridConfig,
        sampler: &SamplerConfig,
        stations: Arc<StationTable>,
        job: JobConfig,
    ) -> Result<Self> {
        job.validate()?;
        Ok(Self {
            grid: UniformGrid::from_config(grid)?,
            sampler: sampler.build()?,
            stations,
            job,
            parallel: false,
        })
    }

    /// Create the extractor for `job` with the shared settings of `config`.
    pub fn from_config(
        config: &ExtractionConfig,
        job: &JobConfig,
        stations: Arc<StationTable>,
    ) -> Result<Self> {
        Ok(Self::new(&config.grid, config.sampler_for(job), stations, job.clone())?
            .with_parallel(config.parallel))
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn job(&self) -> &JobConfig {
        &self.job
    }

    /// Raster files under the input root, sorted by path.
    pub fn list_inputs(&self) -> Result<Vec<PathBuf>> {
        let root = &self.job.input_root;
        if !root.is_dir() {
            return Err(ExtractionError::walk(root, "input root is not a directory"));
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(root)
            .min_depth(1)
            .max_depth(self.job.max_depth)
            .sort_by_file_name()
        {
            let entry = entry?;
            if entry.file_type().is_file() && has_extension(entry.path(), &self.job.extension) {
                files.push(entry.into_path());
            }
        }
        files.sort();
        Ok(files)
    }

    /// Decode one raster into `grid` and sample every station.
    pub fn extract_file(
        &self,
        grid: &mut UniformGrid,
        path: &Path,
    ) -> Result<(RasterFileInfo, ExtractionResult)> {
        let info = parse_raster_filename(path, &self.job.date_formats)?;
        let raster = codec::decode(path)?;

        if let Some(transform) = raster.transform {
            if !transform.approx_eq(&grid.geo_transform(), TRANSFORM_TOLERANCE) {
                warn!(
                    file = %path.display(),
                    file_transform = ?transform.coefficients(),
                    grid_transform = ?grid.geo_transform().coefficients(),
                    "Raster geotransform differs from grid geometry"
                );
            }
        }

        let mut data = raster.data;
        let censored = censor(&mut data, self.job.missing_value_threshold);
        let layout = to_grid_layout(
            data,
            grid.shape(),
            self.job.axis_orientation,
            self.job.latitude_order,
        )?;
        grid.fill_owned(layout)?;

        let values = self.sampler.sample(grid, self.stations.points());
        let result = ExtractionResult {
            date: info.date,
            column: self.job.column_name(&info.variable),
            values,
        };
        debug!(
            file = %path.display(),
            censored = censored,
            valid = result.valid_count(),
            stations = self.stations.len(),
            "Sampled raster"
        );
        Ok((info, result))
    }

    /// Where the table for `path` goes, mirroring subdirectories of the input root.
    pub fn output_for(&self, path: &Path, stem: &str) -> PathBuf {
        let relative = path
            .parent()
            .and_then(|p| p.strip_prefix(&self.job.input_root).ok())
            .unwrap_or_else(|| Path::new(""));
        output_path(
            &self.job.output_root.join(relative),
            stem,
            &self.job.output_suffix,
        )
    }

    /// Extract one raster and write its table.
    pub fn process_file(&self, grid: &mut UniformGrid, path: &Path) -> Result<PathBuf> {
        let (info, result) = self.extract_file(grid, path)?;
        let out = self.output_for(path, &info.stem);
        write_table(&out, &self.stations, &result)?;
        Ok(out)
    }

    /// Process every input file. Per-file errors are collected, not raised.
    ///
    /// Fails only when the input root cannot be listed or the output root
    /// cannot be created.
    pub fn run(&self) -> Result<BatchSummary> {
        let files = self.list_inputs()?;
        std::fs::create_dir_all(&self.job.output_root)?;

        info!(
            job = %self.job.name,
            files = files.len(),
            stations = self.stations.len(),
            sampler = self.sampler.name(),
            parallel = self.parallel,
            "Starting extraction"
        );

        let outcomes: Vec<(PathBuf, Result<PathBuf>)> = if self.parallel {
            files
                .par_iter()
                .map_init(
                    || self.grid.clone(),
                    |grid, path| (path.clone(), self.process_file(grid, path)),
                )
                .collect()
        } else {
            let mut grid = self.grid.clone();
            files
                .iter()
                .map(|path| (path.clone(), self.process_file(&mut grid, path)))
                .collect()
        };

        let mut summary = BatchSummary {
            job: self.job.name.clone(),
            files_seen: files.len(),
            ..Default::default()
        };
        for (path, outcome) in outcomes {
            match outcome {
                Ok(out) => {
                    debug!(file = %path.display(), output = %out.display(), "Wrote table");
                    summary.written.push(out);
                }
                Err(error) => {
                    warn!(file = %path.display(), error = %error, "Skipping raster");
                    summary.failures.push(FileFailure { path, error });
                }
            }
        }

        info!(
            job = %summary.job,
            succeeded = summary.succeeded(),
            failed = summary.failed(),
            "Extraction complete"
        );
        Ok(summary)
    }
}
