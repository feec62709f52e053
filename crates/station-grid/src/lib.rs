//! Station-point sampling of gridded lon/lat rasters.
//!
//! This crate holds one variable's field on a regular lon/lat grid and
//! aggregates it onto arbitrary station coordinates:
//!
//! - **UniformGrid**: fixed geometry, `(lon, lat)` value buffer, index math
//! - **Samplers**: 2x2 block mean, kernel-weighted mean, bilinear
//! - **Codec**: single-band Float32 GeoTIFF read/write
//! - **Regrid**: resample a coarser raster onto the grid
//!
//! # Architecture
//!
//! ```text
//! GeoTIFF file
//!      │
//!      ▼
//! codec::decode ──► censor sentinels ──► to_grid_layout
//!                                              │
//!                                              ▼
//!                                  UniformGrid::fill_owned
//!                                              │
//!                                              ▼
//!                            PointSampler::sample(&grid, &stations)
//!                                              │
//!                                              ▼
//!                                   one f32 per station (NaN = none)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use station_grid::{codec, BilinearSampler, Point, PointSampler, UniformGrid};
//!
//! let mut grid = UniformGrid::new(55.95, 72.05, 0.1, 0.1, 400, 650)?;
//! let raster = codec::decode("2020-01-01_GWRPM25_PM25.tif")?;
//! grid.fill_north_up(raster.data.view())?;
//!
//! let stations = [Point::new(116.40, 39.90), Point::new(121.47, 31.23)];
//! let values = BilinearSampler::default().sample(&grid, &stations);
//! ```

pub mod codec;
pub mod config;
pub mod error;
pub mod grid;
pub mod interpolation;
pub mod kernel;
pub mod orient;
pub mod regrid;
pub mod sampler;
pub mod types;

// Re-export commonly used types at crate root
pub use codec::{censor, DecodedRaster, DEFAULT_MISSING_THRESHOLD, WGS84_PROJ4};
pub use config::{GridConfig, KernelSpec, SamplerConfig};
pub use error::{GridError, Result};
pub use grid::UniformGrid;
pub use interpolation::bilinear_interpolate;
pub use kernel::Kernel;
pub use orient::{detect_orientation, to_grid_layout, AxisOrientation, LatitudeOrder, Orientation};
pub use regrid::{regrid, PixelAnchor, SourceGrid};
pub use sampler::{BilinearSampler, BlockMeanSampler, KernelMeanSampler, PointSampler};
pub use types::{BoundingBox, ExtrapolationPolicy, GeoTransform, Point};
