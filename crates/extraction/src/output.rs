//! Per-raster station tables.
//!
//! Values are stored at half precision, matching the precision of the
//! published station datasets. Missing values are written as empty fields.

use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use half::f16;

use crate::error::{ExtractionError, Result};
use crate::metadata::ISO_DATE;
use crate::stations::StationTable;

/// Sampled values for one raster, one per station in station order.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionResult {
    pub date: NaiveDate,
    /// Output column name
    pub column: String,
    pub values: Vec<f32>,
}

impl ExtractionResult {
    /// Number of stations that received a value.
    pub fn valid_count(&self) -> usize {
        self.values.iter().filter(|v| !v.is_nan()).count()
    }
}

/// Round to the nearest half-precision value, `None` for NaN.
pub fn to_half(value: f32) -> Option<f16> {
    if value.is_nan() {
        None
    } else {
        Some(f16::from_f32(value))
    }
}

/// Shortest decimal text that reads back as the same half-precision value.
///
/// `f16`'s own `Display` widens to `f32` first, which writes 0.1 as
/// `0.099975586`; this writes `0.1`.
pub fn format_half(value: f16) -> String {
    if value.is_finite() {
        // five significant digits always identify an f16
        for precision in 0..5 {
            let text = format!("{:.*e}", precision, value.to_f32());
            if let Ok(parsed) = text.parse::<f32>() {
                if f16::from_f32(parsed) == value {
                    return parsed.to_string();
                }
            }
        }
    }
    value.to_f32().to_string()
}

/// `<output_root>/<stem><suffix>.csv`
pub fn output_path(output_root: &Path, stem: &str, suffix: &str) -> PathBuf {
    output_root.join(format!("{}{}.csv", stem, suffix))
}

/// Write `id, date, <column>` rows to any writer.
pub fn write_table_to<W: Write>(
    writer: W,
    stations: &StationTable,
    result: &ExtractionResult,
) -> Result<()> {
    if result.values.len() != stations.len() {
        return Err(ExtractionError::invalid_config(format!(
            "{} values for {} stations",
            result.values.len(),
            stations.len()
        )));
    }

    let date = result.date.format(ISO_DATE).to_string();
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(["id", "date", result.column.as_str()])?;
    for (station, value) in stations.stations().iter().zip(&result.values) {
        let field = to_half(*value).map(format_half).unwrap_or_default();
        csv.write_record([station.id.as_str(), date.as_str(), field.as_str()])?;
    }
    csv.flush()?;
    Ok(())
}

/// Write the table to `path`, creating parent directories as needed.
pub fn write_table(path: &Path, stations: &StationTable, result: &ExtractionResult) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::File::create(path)?;
    write_table_to(file, stations, result)
}
