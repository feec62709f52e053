//! Raster file encoding and decoding.
//!
//! Rasters are single-band Float32 GeoTIFFs laid out north-up: row 0 is
//! the northernmost row and the geotransform origin is the outer
//! upper-left corner. Use [`UniformGrid::fill_north_up`] and
//! [`UniformGrid::to_north_up`] to move between this layout and a grid.
//!
//! [`UniformGrid::fill_north_up`]: crate::UniformGrid::fill_north_up
//! [`UniformGrid::to_north_up`]: crate::UniformGrid::to_north_up

mod geotiff;

pub use geotiff::{decode, encode, DecodedRaster};

use ndarray::Array2;

/// Projection written when the caller does not name one.
pub const WGS84_PROJ4: &str = "+proj=longlat +datum=WGS84";

/// Raw values below this are missing-data sentinels.
pub const DEFAULT_MISSING_THRESHOLD: f32 = -1e10;

/// Recode every value below `threshold` as NaN. Returns how many were recoded.
pub fn censor(array: &mut Array2<f32>, threshold: f32) -> usize {
    let mut recoded = 0;
    array.mapv_inplace(|v| {
        if v < threshold {
            recoded += 1;
            f32::NAN
        } else {
            v
        }
    });
    recoded
}
