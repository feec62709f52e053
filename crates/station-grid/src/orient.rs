//! Axis-order detection for decoded raster arrays.
//!
//! Grids store values as `(lon, lat)`; raster files arrive either in that
//! order or transposed as `(lat, lon)`. Detection compares the array shape
//! against the grid's `(lon_count, lat_count)`.

use ndarray::{s, Array2};
use serde::{Deserialize, Serialize};

use crate::error::{GridError, Result};

/// How a decoded array's axes relate to the grid's `(lon, lat)` order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// Already `(lon_count, lat_count)`.
    AsIs,
    /// `(lat_count, lon_count)`; needs a transpose.
    Transposed,
    /// Matches neither order.
    Unrecognized,
}

/// Orientation handling requested by configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AxisOrientation {
    /// Detect from the array shape; a square grid counts as `AsIs`.
    #[default]
    Auto,
    /// Always treat the array as `(lon, lat)`.
    AsIs,
    /// Always treat the array as `(lat, lon)`.
    Transposed,
}

/// Order of the latitude axis inside raster files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LatitudeOrder {
    /// First latitude entry is the northernmost (standard GeoTIFF).
    #[default]
    NorthFirst,
    /// First latitude entry is the southernmost. Never inferred from the
    /// geotransform; it has to be configured.
    SouthFirst,
}

/// Compare an array shape with the grid's `(lon_count, lat_count)`.
pub fn detect_orientation(shape: (usize, usize), grid_shape: (usize, usize)) -> Orientation {
    let (lon_count, lat_count) = grid_shape;
    if shape == (lon_count, lat_count) {
        Orientation::AsIs
    } else if shape == (lat_count, lon_count) {
        Orientation::Transposed
    } else {
        Orientation::Unrecognized
    }
}

/// Reorder a decoded array into the grid's `(lon, lat ascending)` layout.
///
/// Fails with `ShapeMismatch` when the array fits the grid in neither axis
/// order, or when a forced orientation disagrees with its shape.
pub fn to_grid_layout(
    array: Array2<f32>,
    grid_shape: (usize, usize),
    axes: AxisOrientation,
    latitude: LatitudeOrder,
) -> Result<Array2<f32>> {
    let shape = array.dim();
    let orientation = match axes {
        AxisOrientation::Auto => detect_orientation(shape, grid_shape),
        AxisOrientation::AsIs if shape == grid_shape => Orientation::AsIs,
        AxisOrientation::Transposed if shape == (grid_shape.1, grid_shape.0) => {
            Orientation::Transposed
        }
        _ => Orientation::Unrecognized,
    };

    let lon_lat = match orientation {
        Orientation::AsIs => array,
        Orientation::Transposed => array.reversed_axes(),
        Orientation::Unrecognized => {
            return Err(GridError::shape_mismatch(grid_shape, shape));
        }
    };

    Ok(match latitude {
        LatitudeOrder::SouthFirst => lon_lat,
        LatitudeOrder::NorthFirst => lon_lat.slice(s![.., ..;-1]).to_owned(),
    })
}
