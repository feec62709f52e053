//! Regrid jobs: resample a source raster onto the station grid and write it
//! out under the raster naming convention so extraction jobs can pick it up.

use std::path::PathBuf;

use station_grid::{censor, codec, regrid, GridConfig, SourceGrid, UniformGrid};
use tracing::{info, warn};

use crate::config::RegridConfig;
use crate::error::{ExtractionError, Result};
use crate::metadata::{parse_date, raster_filename};

/// One source raster to resample.
#[derive(Debug, Clone)]
pub struct RegridRequest {
    pub input: PathBuf,
    /// Date as written in the source, parsed with the configured formats
    pub date: String,
    pub dataset: String,
    pub variable: String,
}

impl RegridRequest {
    fn validate(&self) -> Result<()> {
        if self.dataset.is_empty() || self.dataset.contains('_') {
            return Err(ExtractionError::invalid_config(format!(
                "dataset must be non-empty without underscores, got {:?}",
                self.dataset
            )));
        }
        if self.variable.is_empty() {
            return Err(ExtractionError::invalid_config("variable cannot be empty"));
        }
        Ok(())
    }
}

/// Resample `request.input` onto the grid and write the result.
///
/// Returns the path of the written raster.
pub fn run_regrid(
    grid: &GridConfig,
    config: &RegridConfig,
    request: &RegridRequest,
) -> Result<PathBuf> {
    request.validate()?;
    let date = parse_date(&request.date, &config.date_formats)?;

    let raster = codec::decode(&request.input)?;
    let transform = raster.transform.ok_or_else(|| {
        ExtractionError::parse(request.input.display().to_string(), "raster has no geotransform")
    })?;
    let mut data = raster.data;
    censor(&mut data, config.missing_value_threshold);

    let source = SourceGrid::new(data, transform, config.source_anchor)?;
    let mut target = UniformGrid::from_config(grid)?;
    let valid = regrid(&source, &mut target)?;
    if valid == 0 {
        warn!(
            input = %request.input.display(),
            "Source raster does not overlap the grid; output is all missing"
        );
    }

    std::fs::create_dir_all(&config.output_root)?;
    let name = raster_filename(date, &request.dataset, &request.variable, &config.extension);
    let out = config.output_root.join(name);
    codec::encode(
        &out,
        target.to_north_up().view(),
        &target.geo_transform(),
        &config.projection,
    )?;

    info!(
        input = %request.input.display(),
        output = %out.display(),
        valid = valid,
        "Regridded raster"
    );
    Ok(out)
}
