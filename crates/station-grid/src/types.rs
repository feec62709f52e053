//! Core types shared by the grid, samplers and codec.

use serde::{Deserialize, Serialize};

/// A query location in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub lon: f64,
    pub lat: f64,
}

impl Point {
    /// Create a new point from longitude and latitude.
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// Whether both coordinates are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.lon.is_finite() && self.lat.is_finite()
    }
}

impl std::fmt::Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.4}, {:.4})", self.lon, self.lat)
    }
}

/// A geographic bounding box in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl BoundingBox {
    /// Create a new bounding box.
    pub fn new(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Self {
        Self {
            min_lon,
            min_lat,
            max_lon,
            max_lat,
        }
    }

    /// Check if a point lies inside the box (edges included).
    pub fn contains(&self, point: Point) -> bool {
        point.lon >= self.min_lon
            && point.lon <= self.max_lon
            && point.lat >= self.min_lat
            && point.lat <= self.max_lat
    }

    /// Grow the box by independent margins on each axis.
    pub fn expand(&self, lon_margin: f64, lat_margin: f64) -> Self {
        Self {
            min_lon: self.min_lon - lon_margin,
            min_lat: self.min_lat - lat_margin,
            max_lon: self.max_lon + lon_margin,
            max_lat: self.max_lat + lat_margin,
        }
    }

    /// Clamp a point onto the box.
    pub fn clamp(&self, point: Point) -> Point {
        Point::new(
            point.lon.clamp(self.min_lon, self.max_lon),
            point.lat.clamp(self.min_lat, self.max_lat),
        )
    }
}

impl std::fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "lon [{:.4}, {:.4}] lat [{:.4}, {:.4}]",
            self.min_lon, self.max_lon, self.min_lat, self.max_lat
        )
    }
}

/// North-up affine geotransform of a raster.
///
/// Maps pixel `(col, row)` to `(origin_lon + col * pixel_lon_width,
/// origin_lat - row * pixel_lat_width)`. Both widths are positive; the
/// origin is the outer corner of the upper-left pixel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoTransform {
    pub origin_lon: f64,
    pub origin_lat: f64,
    pub pixel_lon_width: f64,
    pub pixel_lat_width: f64,
}

impl GeoTransform {
    /// Create a new geotransform.
    pub fn new(origin_lat: f64, origin_lon: f64, pixel_lat_width: f64, pixel_lon_width: f64) -> Self {
        Self {
            origin_lon,
            origin_lat,
            pixel_lon_width,
            pixel_lat_width,
        }
    }

    /// The six GDAL-style coefficients.
    pub fn coefficients(&self) -> [f64; 6] {
        [
            self.origin_lon,
            self.pixel_lon_width,
            0.0,
            self.origin_lat,
            0.0,
            -self.pixel_lat_width,
        ]
    }

    /// Coordinates of the centre of pixel `(col, row)`.
    pub fn pixel_center(&self, col: usize, row: usize) -> Point {
        Point::new(
            self.origin_lon + (col as f64 + 0.5) * self.pixel_lon_width,
            self.origin_lat - (row as f64 + 0.5) * self.pixel_lat_width,
        )
    }

    /// Whether two transforms agree within `tolerance` degrees.
    pub fn approx_eq(&self, other: &GeoTransform, tolerance: f64) -> bool {
        self.coefficients()
            .iter()
            .zip(other.coefficients().iter())
            .all(|(a, b)| (a - b).abs() <= tolerance)
    }
}

/// What bilinear sampling does with a point outside the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtrapolationPolicy {
    /// Report the point as out of bounds.
    #[default]
    Fail,
    /// Clamp the point onto the nearest grid edge.
    NearestEdge,
}

impl std::fmt::Display for ExtrapolationPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fail => write!(f, "fail"),
            Self::NearestEdge => write!(f, "nearest_edge"),
        }
    }
}
