//! Point sampling strategies.
//!
//! Every sampler maps one [`Point`] to one value read from a filled
//! [`UniformGrid`]. Samplers hold no per-call state, so one instance can
//! serve many grids and threads.
//!
//! | Sampler | Footprint | Missing data |
//! |---------|-----------|--------------|
//! | [`BlockMeanSampler`] | 2x2 nodes at the point | mean of non-NaN nodes |
//! | [`KernelMeanSampler`] | kernel-sized window | kernel renormalised per point |
//! | [`BilinearSampler`] | 4 surrounding nodes | NaN if a weighted node is NaN |

mod bilinear;
mod block;
mod kernel_mean;

pub use bilinear::BilinearSampler;
pub use block::BlockMeanSampler;
pub use kernel_mean::KernelMeanSampler;

use ndarray::{s, ArrayView2};
use tracing::{debug, warn};

use crate::error::Result;
use crate::grid::UniformGrid;
use crate::types::Point;

/// A strategy for estimating a grid value at an arbitrary point.
pub trait PointSampler: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Estimate the value at a single point.
    ///
    /// Fails with `OutOfBounds` when the point's footprint leaves the grid.
    fn sample_point(&self, grid: &UniformGrid, point: Point) -> Result<f32>;

    /// Estimate values for every point, in order.
    ///
    /// Points that cannot be sampled come back as NaN.
    fn sample(&self, grid: &UniformGrid, points: &[Point]) -> Vec<f32> {
        points
            .iter()
            .map(|&point| match self.sample_point(grid, point) {
                Ok(value) => value,
                Err(e) if e.is_out_of_bounds() => {
                    debug!(sampler = self.name(), point = %point, "Point outside grid, using NaN");
                    f32::NAN
                }
                Err(e) => {
                    warn!(sampler = self.name(), point = %point, error = %e, "Sampling failed, using NaN");
                    f32::NAN
                }
            })
            .collect()
    }
}

/// Borrow the `len_lon x len_lat` window starting at signed node indices.
///
/// Fails with `OutOfBounds` unless the whole window lies inside the grid.
pub(crate) fn window<'a>(
    grid: &'a UniformGrid,
    point: Point,
    lon_start: i64,
    lat_start: i64,
    len_lon: usize,
    len_lat: usize,
) -> Result<ArrayView2<'a, f32>> {
    let (lon_count, lat_count) = grid.shape();
    let fits = |start: i64, len: usize, count: usize| {
        start >= 0 && (start as usize).saturating_add(len) <= count
    };
    if !fits(lon_start, len_lon, lon_count) || !fits(lat_start, len_lat, lat_count) {
        return Err(grid.out_of_bounds(point));
    }
    let (i, j) = (lon_start as usize, lat_start as usize);
    Ok(grid.values().slice_move(s![i..i + len_lon, j..j + len_lat]))
}
