//! Resampling a coarser regular lon/lat raster onto a [`UniformGrid`].
//!
//! Used to bring reanalysis fields (e.g. 0.5 x 0.625 degree global model
//! output) onto the station grid before they are written as GeoTIFFs and
//! extracted like any other product.

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{GridError, Result};
use crate::grid::UniformGrid;
use crate::interpolation::bilinear_interpolate;
use crate::types::GeoTransform;

/// Where a source value sits within its pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PixelAnchor {
    /// Value describes the pixel centre (GeoTIFF PixelIsArea).
    #[default]
    Center,
    /// Value sits on the pixel's upper-left corner (PixelIsPoint).
    Corner,
}

impl PixelAnchor {
    fn offset(self) -> f64 {
        match self {
            Self::Center => 0.5,
            Self::Corner => 0.0,
        }
    }
}

/// A north-up source raster with its georeferencing.
#[derive(Debug, Clone)]
pub struct SourceGrid {
    data: Array2<f32>,
    transform: GeoTransform,
    anchor: PixelAnchor,
}

impl SourceGrid {
    /// Wrap a north-up `(rows, cols)` array.
    pub fn new(data: Array2<f32>, transform: GeoTransform, anchor: PixelAnchor) -> Result<Self> {
        let (rows, cols) = data.dim();
        if rows == 0 || cols == 0 {
            return Err(GridError::shape_mismatch((1, 1), (rows, cols)));
        }
        if !(transform.pixel_lat_width > 0.0 && transform.pixel_lon_width > 0.0) {
            return Err(GridError::invalid_geometry("source pixel widths must be positive"));
        }
        Ok(Self {
            data,
            transform,
            anchor,
        })
    }

    /// Fractional `(row, col)` of a coordinate, `None` outside the node extent.
    fn position(&self, lon: f64, lat: f64) -> Option<(f64, f64)> {
        let (rows, cols) = self.data.dim();
        let a = self.anchor.offset();
        let col = (lon - self.transform.origin_lon) / self.transform.pixel_lon_width - a;
        let row = (self.transform.origin_lat - lat) / self.transform.pixel_lat_width - a;

        const SLACK: f64 = 1e-9;
        let inside = |pos: f64, len: usize| pos >= -SLACK && pos <= (len - 1) as f64 + SLACK;
        if inside(row, rows) && inside(col, cols) {
            Some((row, col))
        } else {
            None
        }
    }
}

/// Bilinearly resample `source` onto every node of `target`, replacing its values.
///
/// Target nodes outside the source extent become NaN. Returns the number of
/// nodes that received a finite value.
pub fn regrid(source: &SourceGrid, target: &mut UniformGrid) -> Result<usize> {
    let lon = target.lon().to_vec();
    let lat = target.lat().to_vec();

    let values = Array2::from_shape_fn(target.shape(), |(i, j)| {
        match source.position(lon[i], lat[j]) {
            Some((row, col)) => bilinear_interpolate(source.data.view(), row, col),
            None => f32::NAN,
        }
    });
    let valid = values.iter().filter(|v| !v.is_nan()).count();
    target.fill_owned(values)?;

    debug!(
        valid = valid,
        total = target.lon_count() * target.lat_count(),
        "Regridded source onto target grid"
    );
    Ok(valid)
}
