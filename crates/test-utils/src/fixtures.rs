//! Common test fixtures for station extraction tests.
//!
//! Grid geometries, station lists and on-disk layouts that mirror the
//! production setup.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// Common grid specifications for testing.
pub mod grid {
    /// Grid geometry as `(lat_upper, lon_lower, lat_step, lon_step, lat_count, lon_count)`.
    #[derive(Debug, Clone, Copy, PartialEq)]
    pub struct GridSpec {
        pub lat_upper: f64,
        pub lon_lower: f64,
        pub lat_step: f64,
        pub lon_step: f64,
        pub lat_count: usize,
        pub lon_count: usize,
    }

    impl GridSpec {
        /// `(lon_count, lat_count)`, the grid buffer shape.
        pub fn shape(&self) -> (usize, usize) {
            (self.lon_count, self.lat_count)
        }
    }

    /// 0.1 degree China grid, cell centres from 72.05E / 55.95N.
    pub const CHINA_01: GridSpec = GridSpec {
        lat_upper: 55.95,
        lon_lower: 72.05,
        lat_step: 0.1,
        lon_step: 0.1,
        lat_count: 400,
        lon_count: 650,
    };

    /// Same extent anchored on whole tenths, handy for exact index checks.
    pub const CHINA_01_ALIGNED: GridSpec = GridSpec {
        lat_upper: 56.0,
        lon_lower: 72.0,
        lat_step: 0.1,
        lon_step: 0.1,
        lat_count: 400,
        lon_count: 650,
    };

    /// Simple 10x10 unit grid with nodes at 0..=9.
    pub const SIMPLE_10X10: GridSpec = GridSpec {
        lat_upper: 9.0,
        lon_lower: 0.0,
        lat_step: 1.0,
        lon_step: 1.0,
        lat_count: 10,
        lon_count: 10,
    };
}

/// Station rows as `(id, lon, lat)`.
pub mod stations {
    /// A handful of real monitoring sites inside the China grid.
    pub const CITY_SITES: &[(&str, f64, f64)] = &[
        ("1001A", 116.366, 39.8673),
        ("1141A", 121.4, 31.2),
        ("1345A", 113.2612, 23.1317),
        ("2327A", 104.0431, 30.6414),
    ];

    /// Site outside every test grid.
    pub const OUTSIDE: (&str, f64, f64) = ("9999X", 10.0, -40.0);
}

/// Render station rows as CSV with the `id,long,lat` header.
pub fn stations_csv(rows: &[(&str, f64, f64)]) -> String {
    let mut out = String::from("id,long,lat\n");
    for (id, lon, lat) in rows {
        out.push_str(&format!("{},{},{}\n", id, lon, lat));
    }
    out
}

/// Write a station CSV into `dir` and return its path.
pub fn write_stations_csv(dir: &Path, name: &str, rows: &[(&str, f64, f64)]) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, stations_csv(rows)).expect("write station csv");
    path
}

/// Temporary input/output roots for a batch run.
pub struct BatchDirs {
    pub root: TempDir,
    pub input: PathBuf,
    pub output: PathBuf,
}

impl BatchDirs {
    /// Create `<tmp>/input` and `<tmp>/output`.
    pub fn new() -> Self {
        let root = tempfile::tempdir().expect("create temp dir");
        let input = root.path().join("input");
        let output = root.path().join("output");
        fs::create_dir_all(&input).expect("create input dir");
        fs::create_dir_all(&output).expect("create output dir");
        Self {
            root,
            input,
            output,
        }
    }

    /// Create (if needed) and return `input/<relative>`.
    pub fn input_subdir(&self, relative: &str) -> PathBuf {
        let dir = self.input.join(relative);
        fs::create_dir_all(&dir).expect("create input subdir");
        dir
    }
}

impl Default for BatchDirs {
    fn default() -> Self {
        Self::new()
    }
}
