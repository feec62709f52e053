//! Batch extraction configuration.
//!
//! One [`ExtractionConfig`] holds the shared grid geometry, station table and
//! default sampler, plus any number of [`JobConfig`]s, one per product
//! directory.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use station_grid::{
    AxisOrientation, GridConfig, LatitudeOrder, PixelAnchor, SamplerConfig,
    DEFAULT_MISSING_THRESHOLD, WGS84_PROJ4,
};

use crate::error::{ExtractionError, Result};
use crate::metadata::ISO_DATE;

fn default_extension() -> String {
    "tif".to_string()
}

fn default_date_formats() -> Vec<String> {
    vec![ISO_DATE.to_string()]
}

fn default_missing_threshold() -> f32 {
    DEFAULT_MISSING_THRESHOLD
}

fn default_max_depth() -> usize {
    1
}

fn default_projection() -> String {
    WGS84_PROJ4.to_string()
}

/// Top-level extraction settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Target grid geometry shared by every job; `GRID_*` variables apply when omitted
    #[serde(default = "GridConfig::from_env")]
    pub grid: GridConfig,

    /// CSV with `id, long, lat` columns
    pub stations: PathBuf,

    /// Sampler used by jobs that do not name their own
    #[serde(default)]
    pub sampler: SamplerConfig,

    /// Process files of a job in parallel
    #[serde(default)]
    pub parallel: bool,

    #[serde(default)]
    pub jobs: Vec<JobConfig>,

    /// Settings for the `regrid` command
    #[serde(default)]
    pub regrid: Option<RegridConfig>,
}

/// One product directory to extract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobConfig {
    /// Job name used in logs and for `--job`
    pub name: String,

    pub input_root: PathBuf,
    pub output_root: PathBuf,

    /// Raster extension to pick up, without the dot
    #[serde(default = "default_extension")]
    pub extension: String,

    /// Directory depth searched below `input_root` (1 = direct children)
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Output column name; defaults to the variable parsed from the filename
    #[serde(default)]
    pub variable: Option<String>,

    /// Appended to the column name, e.g. `_kernel`
    #[serde(default)]
    pub column_suffix: String,

    /// Appended to the output file stem, e.g. `-kernel`
    #[serde(default)]
    pub output_suffix: String,

    #[serde(default)]
    pub axis_orientation: AxisOrientation,

    /// Row order of latitude inside the files. Standard north-up GeoTIFFs
    /// use the default `north_first`. Rasters written with rows running
    /// south to north (as by earlier numpy-based exporters) need
    /// `south_first`, otherwise extractions come out mirrored north-south.
    #[serde(default)]
    pub latitude_order: LatitudeOrder,

    /// Raw values below this are treated as missing
    #[serde(default = "default_missing_threshold")]
    pub missing_value_threshold: f32,

    /// Overrides the top-level sampler
    #[serde(default)]
    pub sampler: Option<SamplerConfig>,

    /// Accepted filename date formats, tried in order
    #[serde(default = "default_date_formats")]
    pub date_formats: Vec<String>,
}

impl JobConfig {
    /// A job with default settings for the given directories.
    pub fn new(name: impl Into<String>, input_root: PathBuf, output_root: PathBuf) -> Self {
        Self {
            name: name.into(),
            input_root,
            output_root,
            extension: default_extension(),
            max_depth: default_max_depth(),
            variable: None,
            column_suffix: String::new(),
            output_suffix: String::new(),
            axis_orientation: AxisOrientation::default(),
            latitude_order: LatitudeOrder::default(),
            missing_value_threshold: default_missing_threshold(),
            sampler: None,
            date_formats: default_date_formats(),
        }
    }

    /// Column header for a raster whose filename names `variable`.
    pub fn column_name(&self, variable: &str) -> String {
        let base = self.variable.as_deref().unwrap_or(variable);
        format!("{}{}", base, self.column_suffix)
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(ExtractionError::invalid_config("job name cannot be empty"));
        }
        if self.extension.trim_start_matches('.').is_empty() {
            return Err(ExtractionError::invalid_config(format!(
                "job {}: extension cannot be empty",
                self.name
            )));
        }
        if self.max_depth == 0 {
            return Err(ExtractionError::invalid_config(format!(
                "job {}: max_depth must be at least 1",
                self.name
            )));
        }
        if self.missing_value_threshold.is_nan() {
            return Err(ExtractionError::invalid_config(format!(
                "job {}: missing_value_threshold cannot be NaN",
                self.name
            )));
        }
        if self.date_formats.is_empty() {
            return Err(ExtractionError::invalid_config(format!(
                "job {}: at least one date format is required",
                self.name
            )));
        }
        if self.input_root == self.output_root && self.output_suffix.is_empty() {
            // tables would land next to rasters with colliding stems
            return Err(ExtractionError::invalid_config(format!(
                "job {}: output_root equals input_root without an output_suffix",
                self.name
            )));
        }
        Ok(())
    }
}

/// Settings for resampling a source raster onto the grid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegridConfig {
    pub output_root: PathBuf,

    /// Where source values sit within their pixels
    #[serde(default)]
    pub source_anchor: PixelAnchor,

    /// Format of the `--date` argument
    #[serde(default = "default_date_formats")]
    pub date_formats: Vec<String>,

    #[serde(default = "default_missing_threshold")]
    pub missing_value_threshold: f32,

    /// Projection string written into output rasters
    #[serde(default = "default_projection")]
    pub projection: String,

    #[serde(default = "default_extension")]
    pub extension: String,
}

impl RegridConfig {
    pub fn new(output_root: PathBuf) -> Self {
        Self {
            output_root,
            source_anchor: PixelAnchor::default(),
            date_formats: default_date_formats(),
            missing_value_threshold: default_missing_threshold(),
            projection: default_projection(),
            extension: default_extension(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.date_formats.is_empty() {
            return Err(ExtractionError::invalid_config(
                "regrid: at least one date format is required",
            ));
        }
        if self.projection.trim().is_empty() {
            return Err(ExtractionError::invalid_config("regrid: projection cannot be empty"));
        }
        Ok(())
    }
}

impl ExtractionConfig {
    /// Validate the grid, samplers and every job.
    pub fn validate(&self) -> Result<()> {
        self.grid
            .validate()
            .map_err(|e| ExtractionError::invalid_config(format!("grid: {}", e)))?;
        self.sampler.build()?;

        let mut names = std::collections::HashSet::new();
        for job in &self.jobs {
            job.validate()?;
            if let Some(sampler) = &job.sampler {
                sampler.build()?;
            }
            if !names.insert(job.name.as_str()) {
                return Err(ExtractionError::invalid_config(format!(
                    "duplicate job name: {}",
                    job.name
                )));
            }
        }
        if let Some(regrid) = &self.regrid {
            regrid.validate()?;
        }
        Ok(())
    }

    /// Sampler for `job`, falling back to the top-level one.
    pub fn sampler_for<'a>(&'a self, job: &'a JobConfig) -> &'a SamplerConfig {
        job.sampler.as_ref().unwrap_or(&self.sampler)
    }

    pub fn job(&self, name: &str) -> Option<&JobConfig> {
        self.jobs.iter().find(|j| j.name == name)
    }
}
