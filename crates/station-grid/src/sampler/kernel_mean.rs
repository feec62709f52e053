//! Kernel-weighted mean around a point.

use super::{window, PointSampler};
use crate::error::Result;
use crate::grid::UniformGrid;
use crate::kernel::Kernel;
use crate::types::Point;

/// Weighted mean of the kernel-sized window around the point.
///
/// The kernel is shared read-only; missing cells are dropped from a
/// per-point working copy that is renormalised before weighting.
#[derive(Debug, Clone)]
pub struct KernelMeanSampler {
    kernel: Kernel,
}

impl KernelMeanSampler {
    pub fn new(kernel: Kernel) -> Self {
        Self { kernel }
    }

    pub fn kernel(&self) -> &Kernel {
        &self.kernel
    }
}

impl PointSampler for KernelMeanSampler {
    fn name(&self) -> &'static str {
        "kernel_mean"
    }

    fn sample_point(&self, grid: &UniformGrid, point: Point) -> Result<f32> {
        let (i, j) = grid.index_of(point)?;
        let side = self.kernel.side();
        let cells = window(
            grid,
            point,
            self.kernel.window_start(i),
            self.kernel.window_start(j),
            side,
            side,
        )?;
        Ok(self.kernel.weighted_mean(cells) as f32)
    }
}
