//! Bilinear interpolation over the grid's lon/lat axes.

use super::PointSampler;
use crate::error::Result;
use crate::grid::UniformGrid;
use crate::interpolation::bilinear_interpolate;
use crate::types::{ExtrapolationPolicy, Point};

/// Interpolates between the four nodes surrounding a point.
#[derive(Debug, Clone, Copy, Default)]
pub struct BilinearSampler {
    extrapolation: ExtrapolationPolicy,
}

impl BilinearSampler {
    pub fn new(extrapolation: ExtrapolationPolicy) -> Self {
        Self { extrapolation }
    }

    pub fn extrapolation(&self) -> ExtrapolationPolicy {
        self.extrapolation
    }
}

impl PointSampler for BilinearSampler {
    fn name(&self) -> &'static str {
        "bilinear"
    }

    fn sample_point(&self, grid: &UniformGrid, point: Point) -> Result<f32> {
        if !point.is_finite() {
            return Err(grid.out_of_bounds(point));
        }
        let point = if grid.contains(point) {
            point
        } else {
            match self.extrapolation {
                ExtrapolationPolicy::Fail => return Err(grid.out_of_bounds(point)),
                ExtrapolationPolicy::NearestEdge => grid.bbox().clamp(point),
            }
        };

        let (x, y) = grid.fractional_index(point);
        Ok(bilinear_interpolate(grid.values(), x, y))
    }
}
