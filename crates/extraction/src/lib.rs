//! Station extraction library.
//!
//! Turns directories of daily gridded rasters into per-day station tables.
//!
//! # Architecture
//!
//! This crate is used by the `extractor` service. It handles:
//!
//! - Raster filename parsing (`<date>_<dataset>_<variable>.tif`)
//! - Station table loading (`id, long, lat`)
//! - Batch extraction with per-file error isolation
//! - Half-precision CSV output
//! - Regridding coarse source rasters onto the station grid

pub mod config;
pub mod error;
mod extractor;
pub mod metadata;
pub mod output;
mod regrid;
pub mod stations;

// Re-exports
pub use config::{ExtractionConfig, JobConfig, RegridConfig};
pub use error::{ExtractionError, Result};
pub use extractor::{BatchExtractor, BatchSummary, FileFailure};
pub use metadata::{has_extension, parse_date, parse_raster_filename, raster_filename, RasterFileInfo};
pub use output::{format_half, to_half, write_table, ExtractionResult};
pub use regrid::{run_regrid, RegridRequest};
pub use stations::{Station, StationTable};
