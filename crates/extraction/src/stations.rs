//! Station coordinate table.

use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use station_grid::Point;
use tracing::info;

use crate::error::{ExtractionError, Result};

/// A named monitoring site.
#[derive(Debug, Clone, PartialEq)]
pub struct Station {
    pub id: String,
    pub point: Point,
}

#[derive(Debug, Deserialize)]
struct StationRecord {
    id: String,
    long: f64,
    lat: f64,
}

/// Stations in input order.
#[derive(Debug, Clone, Default)]
pub struct StationTable {
    stations: Vec<Station>,
    points: Vec<Point>,
}

impl StationTable {
    pub fn new(stations: Vec<Station>) -> Self {
        let points = stations.iter().map(|s| s.point).collect();
        Self { stations, points }
    }

    /// Read a CSV with at least the columns `id`, `long`, `lat`.
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(path.as_ref())?;
        let table = Self::from_reader(file)?;
        info!(
            path = %path.as_ref().display(),
            stations = table.len(),
            "Loaded station table"
        );
        Ok(table)
    }

    /// Read station CSV from any reader. Extra columns are ignored.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv = csv::Reader::from_reader(reader);
        let mut stations = Vec::new();
        for record in csv.deserialize::<StationRecord>() {
            let record = record?;
            if !(record.long.is_finite() && record.lat.is_finite()) {
                return Err(ExtractionError::parse(
                    record.id,
                    "station coordinates must be finite",
                ));
            }
            stations.push(Station {
                id: record.id,
                point: Point::new(record.long, record.lat),
            });
        }
        Ok(Self::new(stations))
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    pub fn stations(&self) -> &[Station] {
        &self.stations
    }

    /// Coordinates in station order, ready for a sampler.
    pub fn points(&self) -> &[Point] {
        &self.points
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_extra_columns_in_order() {
        let data = "name,id,lat,long,city\nA,1001A,39.9,116.4,Beijing\nB,1141A,31.2,121.4,Shanghai\n";
        let table = StationTable::from_reader(data.as_bytes()).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.stations()[0].id, "1001A");
        assert_eq!(table.points()[1], Point::new(121.4, 31.2));
    }

    #[test]
    fn test_missing_column_is_csv_error() {
        let data = "id,lat\n1,2\n";
        let err = StationTable::from_reader(data.as_bytes()).unwrap_err();
        assert!(matches!(err, ExtractionError::Csv(_)));
    }

    #[test]
    fn test_bad_number_is_csv_error() {
        let data = "id,long,lat\n1,east,2\n";
        assert!(matches!(
            StationTable::from_reader(data.as_bytes()),
            Err(ExtractionError::Csv(_))
        ));
    }

    #[test]
    fn test_non_finite_coordinate_rejected() {
        let data = "id,long,lat\n1,NaN,2\n";
        assert!(matches!(
            StationTable::from_reader(data.as_bytes()),
            Err(ExtractionError::Parse { .. })
        ));
    }

    #[test]
    fn test_empty_table() {
        let table = StationTable::from_reader("id,long,lat\n".as_bytes()).unwrap();
        assert!(table.is_empty());
    }
}
