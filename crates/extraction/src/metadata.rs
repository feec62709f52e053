//! Metadata extraction from raster filenames.
//!
//! Raster products are named `<date>_<dataset>_<variable>.<ext>`, e.g.
//! `2020-01-01_GWRPM25_PM25.tif`. Only the first two underscores split the
//! stem, so variable names may themselves contain underscores.

use std::path::Path;

use chrono::NaiveDate;

use crate::error::{ExtractionError, Result};

/// Date format used when writing dates and output names.
pub const ISO_DATE: &str = "%Y-%m-%d";

/// Information parsed from a raster filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterFileInfo {
    /// Filename without extension
    pub stem: String,
    /// Observation date
    pub date: NaiveDate,
    /// Product or dataset tag (e.g., "GWRPM25", "MERRA2")
    pub dataset: String,
    /// Variable name (e.g., "PM25", "BCSMASS")
    pub variable: String,
}

impl RasterFileInfo {
    /// The date in `%Y-%m-%d` form.
    pub fn iso_date(&self) -> String {
        self.date.format(ISO_DATE).to_string()
    }
}

/// Whether `path` ends in `.<extension>`, case-insensitively.
pub fn has_extension(path: &Path, extension: &str) -> bool {
    let wanted = extension.trim_start_matches('.');
    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| ext.eq_ignore_ascii_case(wanted))
        .unwrap_or(false)
}

/// Parse a date with the first format that accepts it.
pub fn parse_date(text: &str, formats: &[String]) -> Result<NaiveDate> {
    if formats.is_empty() {
        return NaiveDate::parse_from_str(text, ISO_DATE)
            .map_err(|e| ExtractionError::parse(text, e.to_string()));
    }
    formats
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
        .ok_or_else(|| {
            ExtractionError::parse(text, format!("date matches none of {:?}", formats))
        })
}

/// Parse `<date>_<dataset>_<variable>` out of a raster path.
pub fn parse_raster_filename(path: &Path, date_formats: &[String]) -> Result<RasterFileInfo> {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| ExtractionError::parse(path.display().to_string(), "no file stem"))?;

    let mut tokens = stem.splitn(3, '_');
    let (date, dataset, variable) = match (tokens.next(), tokens.next(), tokens.next()) {
        (Some(d), Some(s), Some(v)) if !d.is_empty() && !s.is_empty() && !v.is_empty() => {
            (d, s, v)
        }
        _ => {
            return Err(ExtractionError::parse(
                stem,
                "expected <date>_<dataset>_<variable>",
            ))
        }
    };

    Ok(RasterFileInfo {
        stem: stem.to_string(),
        date: parse_date(date, date_formats)?,
        dataset: dataset.to_string(),
        variable: variable.to_string(),
    })
}

/// Output raster name for a regridded field.
pub fn raster_filename(date: NaiveDate, dataset: &str, variable: &str, extension: &str) -> String {
    format!(
        "{}_{}_{}.{}",
        date.format(ISO_DATE),
        dataset,
        variable,
        extension.trim_start_matches('.')
    )
}
