//! Configuration for grid geometry and point sampling.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::kernel::Kernel;
use crate::sampler::{BilinearSampler, BlockMeanSampler, KernelMeanSampler, PointSampler};
use crate::types::ExtrapolationPolicy;

/// Geometry of the target grid.
///
/// Defaults to the 0.1 degree China grid: node centres from 72.05E and
/// 55.95N, 650 columns by 400 rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Latitude of the northernmost node row.
    pub lat_upper: f64,

    /// Longitude of the westernmost node column.
    pub lon_lower: f64,

    /// Latitude spacing in degrees.
    pub lat_step: f64,

    /// Longitude spacing in degrees.
    pub lon_step: f64,

    /// Number of latitude nodes.
    pub lat_count: usize,

    /// Number of longitude nodes.
    pub lon_count: usize,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            lat_upper: 56.0 - 0.1 / 2.0,
            lon_lower: 72.0 + 0.1 / 2.0,
            lat_step: 0.1,
            lon_step: 0.1,
            lat_count: 400,
            lon_count: 650,
        }
    }
}

impl GridConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("GRID_LAT_UPPER") {
            if let Ok(v) = val.parse() {
                config.lat_upper = v;
            }
        }

        if let Ok(val) = std::env::var("GRID_LON_LOWER") {
            if let Ok(v) = val.parse() {
                config.lon_lower = v;
            }
        }

        if let Ok(val) = std::env::var("GRID_LAT_STEP") {
            if let Ok(v) = val.parse() {
                config.lat_step = v;
            }
        }

        if let Ok(val) = std::env::var("GRID_LON_STEP") {
            if let Ok(v) = val.parse() {
                config.lon_step = v;
            }
        }

        if let Ok(val) = std::env::var("GRID_LAT_COUNT") {
            if let Ok(v) = val.parse() {
                config.lat_count = v;
            }
        }

        if let Ok(val) = std::env::var("GRID_LON_COUNT") {
            if let Ok(v) = val.parse() {
                config.lon_count = v;
            }
        }

        config
    }

    /// Validate the configuration.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if !(self.lat_step > 0.0) || !(self.lon_step > 0.0) {
            return Err("lat_step and lon_step must be > 0".to_string());
        }

        if self.lat_count == 0 || self.lon_count == 0 {
            return Err("lat_count and lon_count must be > 0".to_string());
        }

        Ok(())
    }
}

/// Shape of the weighting kernel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum KernelSpec {
    /// Square of ones.
    Ones { side: usize },
    /// Ones inside a circle of `radius` cells.
    BinaryDisc { radius: f64 },
    /// `r^2 - d^2` weights, clipped at zero.
    QuadraticDisc { side: usize },
}

impl KernelSpec {
    /// Build the kernel described by this spec.
    pub fn build(&self) -> Result<Kernel> {
        match self {
            Self::Ones { side } => Kernel::ones(*side),
            Self::BinaryDisc { radius } => Kernel::binary_disc(*radius),
            Self::QuadraticDisc { side } => Kernel::quadratic_disc(*side),
        }
    }
}

/// Which sampling strategy to run against each raster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum SamplerConfig {
    /// Mean of the 2x2 block at the point.
    BlockMean,
    /// Kernel-weighted mean around the point.
    KernelMean { kernel: KernelSpec },
    /// Bilinear interpolation between the surrounding nodes.
    Bilinear {
        #[serde(default)]
        extrapolation: ExtrapolationPolicy,
    },
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self::Bilinear {
            extrapolation: ExtrapolationPolicy::Fail,
        }
    }
}

impl SamplerConfig {
    /// Build the configured sampler.
    pub fn build(&self) -> Result<Box<dyn PointSampler>> {
        Ok(match self {
            Self::BlockMean => Box::new(BlockMeanSampler),
            Self::KernelMean { kernel } => Box::new(KernelMeanSampler::new(kernel.build()?)),
            Self::Bilinear { extrapolation } => Box::new(BilinearSampler::new(*extrapolation)),
        })
    }

    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::BlockMean => "block_mean",
            Self::KernelMean { .. } => "kernel_mean",
            Self::Bilinear { .. } => "bilinear",
        }
    }
}
