//! Uniform latitude/longitude grid with a replaceable value buffer.
//!
//! The buffer is indexed `values[[lon_idx, lat_idx]]` with both axes
//! ascending: `[[0, 0]]` is the south-western node. Geometry is fixed at
//! construction; only the values change between raster files.

use ndarray::{s, Array2, ArrayView2};
use tracing::trace;

use crate::config::GridConfig;
use crate::error::{GridError, Result};
use crate::types::{BoundingBox, GeoTransform, Point};

/// Quotients this close to an integer snap onto it when mapping to indices.
const INDEX_EPSILON: f64 = 1e-9;

/// A regular lon/lat grid of cell-centre nodes.
#[derive(Debug, Clone)]
pub struct UniformGrid {
    lat_upper: f64,
    lon_lower: f64,
    lat_step: f64,
    lon_step: f64,
    lat_count: usize,
    lon_count: usize,
    lat_lower: f64,
    lon_upper: f64,
    lat: Vec<f64>,
    lon: Vec<f64>,
    values: Array2<f32>,
}

impl UniformGrid {
    /// Create a grid from its upper-left node, steps and node counts.
    ///
    /// The value buffer starts out all-NaN.
    pub fn new(
        lat_upper: f64,
        lon_lower: f64,
        lat_step: f64,
        lon_step: f64,
        lat_count: usize,
        lon_count: usize,
    ) -> Result<Self> {
        if !(lat_step.is_finite() && lat_step > 0.0) {
            return Err(GridError::invalid_geometry(format!(
                "lat_step must be positive, got {}",
                lat_step
            )));
        }
        if !(lon_step.is_finite() && lon_step > 0.0) {
            return Err(GridError::invalid_geometry(format!(
                "lon_step must be positive, got {}",
                lon_step
            )));
        }
        if lat_count == 0 || lon_count == 0 {
            return Err(GridError::invalid_geometry(format!(
                "counts must be positive, got lat_count={} lon_count={}",
                lat_count, lon_count
            )));
        }
        if !(lat_upper.is_finite() && lon_lower.is_finite()) {
            return Err(GridError::invalid_geometry("corner must be finite"));
        }

        let lat_lower = lat_upper - lat_step * (lat_count - 1) as f64;
        let lon_upper = lon_lower + lon_step * (lon_count - 1) as f64;
        let lat = (0..lat_count)
            .map(|i| lat_lower + lat_step * i as f64)
            .collect();
        let lon = (0..lon_count)
            .map(|j| lon_lower + lon_step * j as f64)
            .collect();

        Ok(Self {
            lat_upper,
            lon_lower,
            lat_step,
            lon_step,
            lat_count,
            lon_count,
            lat_lower,
            lon_upper,
            lat,
            lon,
            values: Array2::from_elem((lon_count, lat_count), f32::NAN),
        })
    }

    /// Create a grid from configuration.
    pub fn from_config(config: &GridConfig) -> Result<Self> {
        Self::new(
            config.lat_upper,
            config.lon_lower,
            config.lat_step,
            config.lon_step,
            config.lat_count,
            config.lon_count,
        )
    }

    pub fn lat_upper(&self) -> f64 {
        self.lat_upper
    }

    pub fn lat_lower(&self) -> f64 {
        self.lat_lower
    }

    pub fn lon_lower(&self) -> f64 {
        self.lon_lower
    }

    pub fn lon_upper(&self) -> f64 {
        self.lon_upper
    }

    pub fn lat_step(&self) -> f64 {
        self.lat_step
    }

    pub fn lon_step(&self) -> f64 {
        self.lon_step
    }

    pub fn lat_count(&self) -> usize {
        self.lat_count
    }

    pub fn lon_count(&self) -> usize {
        self.lon_count
    }

    /// Ascending latitude of every node row.
    pub fn lat(&self) -> &[f64] {
        &self.lat
    }

    /// Ascending longitude of every node column.
    pub fn lon(&self) -> &[f64] {
        &self.lon
    }

    /// Expected buffer shape, `(lon_count, lat_count)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.lon_count, self.lat_count)
    }

    /// The current value buffer.
    pub fn values(&self) -> ArrayView2<'_, f32> {
        self.values.view()
    }

    /// Extent covered by the grid nodes.
    pub fn bbox(&self) -> BoundingBox {
        BoundingBox::new(self.lon_lower, self.lat_lower, self.lon_upper, self.lat_upper)
    }

    /// Geotransform of the grid written as a north-up raster, one pixel per node.
    pub fn geo_transform(&self) -> GeoTransform {
        GeoTransform::new(
            self.lat_upper + self.lat_step / 2.0,
            self.lon_lower - self.lon_step / 2.0,
            self.lat_step,
            self.lon_step,
        )
    }

    /// Replace the buffer with a copy of `array`.
    ///
    /// On a shape mismatch the previous buffer is left untouched.
    pub fn fill(&mut self, array: ArrayView2<'_, f32>) -> Result<()> {
        self.check_shape(array.dim())?;
        self.values = array.to_owned();
        trace!(shape = ?self.shape(), "Filled grid");
        Ok(())
    }

    /// Replace the buffer, taking ownership of `array`.
    pub fn fill_owned(&mut self, array: Array2<f32>) -> Result<()> {
        self.check_shape(array.dim())?;
        self.values = array;
        trace!(shape = ?self.shape(), "Filled grid");
        Ok(())
    }

    /// Fill from a north-up raster array shaped `(lat_count, lon_count)`.
    ///
    /// Row 0 of the raster is the northernmost latitude.
    pub fn fill_north_up(&mut self, raster: ArrayView2<'_, f32>) -> Result<()> {
        let (rows, cols) = raster.dim();
        if (rows, cols) != (self.lat_count, self.lon_count) {
            return Err(GridError::shape_mismatch(
                (self.lat_count, self.lon_count),
                (rows, cols),
            ));
        }
        let reoriented = raster.t().slice(s![.., ..;-1]).to_owned();
        self.fill_owned(reoriented)
    }

    /// The buffer as a north-up raster array shaped `(lat_count, lon_count)`.
    pub fn to_north_up(&self) -> Array2<f32> {
        self.values.slice(s![.., ..;-1]).t().to_owned()
    }

    /// Map a point to `(lon_idx, lat_idx)` without any range check.
    pub fn raw_index(&self, point: Point) -> (i64, i64) {
        let lon_q = (point.lon - self.lon_lower) / self.lon_step;
        let lat_q = (point.lat - self.lat_lower) / self.lat_step;
        (snapped_floor(lon_q) as i64, snapped_floor(lat_q) as i64)
    }

    /// Map a point to the `(lon_idx, lat_idx)` of the node at or below it.
    ///
    /// Non-finite coordinates are out of bounds.
    pub fn index_of(&self, point: Point) -> Result<(usize, usize)> {
        if !point.is_finite() {
            return Err(self.out_of_bounds(point));
        }
        let (i, j) = self.raw_index(point);
        if i < 0 || j < 0 || i as usize >= self.lon_count || j as usize >= self.lat_count {
            return Err(self.out_of_bounds(point));
        }
        Ok((i as usize, j as usize))
    }

    /// Fractional node position of a point, `(lon_pos, lat_pos)`.
    pub fn fractional_index(&self, point: Point) -> (f64, f64) {
        (
            (point.lon - self.lon_lower) / self.lon_step,
            (point.lat - self.lat_lower) / self.lat_step,
        )
    }

    /// Whether a point lies within the node extent, allowing rounding slack.
    pub fn contains(&self, point: Point) -> bool {
        self.bbox()
            .expand(self.lon_step * INDEX_EPSILON, self.lat_step * INDEX_EPSILON)
            .contains(point)
    }

    /// Value of node `(lon_idx, lat_idx)`, if it exists.
    pub fn get(&self, lon_idx: usize, lat_idx: usize) -> Option<f32> {
        self.values.get((lon_idx, lat_idx)).copied()
    }

    pub(crate) fn out_of_bounds(&self, point: Point) -> GridError {
        GridError::out_of_bounds(point.to_string(), self.bbox().to_string())
    }

    fn check_shape(&self, actual: (usize, usize)) -> Result<()> {
        if actual != self.shape() {
            return Err(GridError::shape_mismatch(self.shape(), actual));
        }
        Ok(())
    }
}

fn snapped_floor(q: f64) -> f64 {
    let nearest = q.round();
    if (q - nearest).abs() < INDEX_EPSILON {
        nearest
    } else {
        q.floor()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    fn small_grid() -> UniformGrid {
        // 4 lon nodes x 3 lat nodes, 1 degree apart
        UniformGrid::new(12.0, 100.0, 1.0, 1.0, 3, 4).unwrap()
    }

    #[test]
    fn test_derived_geometry() {
        let grid = UniformGrid::new(56.0, 72.0, 0.1, 0.1, 400, 650).unwrap();
        assert!((grid.lat_lower() - 16.1).abs() < 1e-9);
        assert!((grid.lon_upper() - 136.9).abs() < 1e-9);
        assert_eq!(grid.lat().len(), 400);
        assert_eq!(grid.lon().len(), 650);
        assert!((grid.lat()[399] - 56.0).abs() < 1e-9);
        assert!((grid.lon()[0] - 72.0).abs() < 1e-12);
        assert_eq!(grid.shape(), (650, 400));
        assert!(grid.values().iter().all(|v| v.is_nan()));
    }

    #[test]
    fn test_rejects_bad_geometry() {
        assert!(matches!(
            UniformGrid::new(10.0, 0.0, 0.0, 1.0, 2, 2),
            Err(GridError::InvalidGeometry(_))
        ));
        assert!(matches!(
            UniformGrid::new(10.0, 0.0, 1.0, -1.0, 2, 2),
            Err(GridError::InvalidGeometry(_))
        ));
        assert!(matches!(
            UniformGrid::new(10.0, 0.0, 1.0, 1.0, 0, 2),
            Err(GridError::InvalidGeometry(_))
        ));
    }

    #[test]
    fn test_index_of_inverts_coordinates() {
        let grid = UniformGrid::new(56.0, 72.0, 0.1, 0.1, 400, 650).unwrap();
        for i in (0..grid.lat_count()).step_by(7) {
            for j in (0..grid.lon_count()).step_by(11) {
                let point = Point::new(grid.lon()[j], grid.lat()[i]);
                assert_eq!(grid.index_of(point).unwrap(), (j, i));
            }
        }
        let last = Point::new(grid.lon()[649], grid.lat()[399]);
        assert_eq!(grid.index_of(last).unwrap(), (649, 399));
    }

    #[test]
    fn test_index_of_floors_between_nodes() {
        let grid = small_grid();
        assert_eq!(grid.index_of(Point::new(101.7, 10.2)).unwrap(), (1, 0));
        assert_eq!(grid.index_of(Point::new(102.999, 11.5)).unwrap(), (2, 1));
    }

    #[test]
    fn test_index_of_out_of_bounds() {
        let grid = small_grid();
        assert!(grid.index_of(Point::new(99.5, 11.0)).unwrap_err().is_out_of_bounds());
        assert!(grid.index_of(Point::new(101.0, 13.0)).unwrap_err().is_out_of_bounds());
        assert!(grid.index_of(Point::new(104.0, 11.0)).unwrap_err().is_out_of_bounds());
    }

    #[test]
    fn test_index_of_non_finite_point() {
        let grid = small_grid();
        assert!(grid.index_of(Point::new(f64::NAN, f64::NAN)).unwrap_err().is_out_of_bounds());
        assert!(grid.index_of(Point::new(101.0, f64::NAN)).unwrap_err().is_out_of_bounds());
        assert!(grid.index_of(Point::new(f64::INFINITY, 11.0)).unwrap_err().is_out_of_bounds());
        assert!(!grid.contains(Point::new(f64::NAN, 11.0)));
    }

    #[test]
    fn test_fill_copies_array() {
        let mut grid = small_grid();
        let mut array = Array2::from_elem((4, 3), 1.5f32);
        grid.fill(array.view()).unwrap();
        array[[0, 0]] = 99.0;
        assert_eq!(grid.get(0, 0), Some(1.5));
    }

    #[test]
    fn test_fill_wrong_shape_keeps_previous_values() {
        let mut grid = small_grid();
        grid.fill(Array2::from_elem((4, 3), 2.0f32).view()).unwrap();

        let err = grid.fill(Array2::from_elem((3, 4), 7.0f32).view()).unwrap_err();
        match err {
            GridError::ShapeMismatch { expected, actual } => {
                assert_eq!(expected, (4, 3));
                assert_eq!(actual, (3, 4));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(grid.values().iter().all(|v| *v == 2.0));
    }

    #[test]
    fn test_north_up_roundtrip() {
        let mut grid = small_grid();
        // raster row 0 is the northern row (lat 12)
        let raster = Array2::from_shape_fn((3, 4), |(r, c)| (r * 10 + c) as f32);
        grid.fill_north_up(raster.view()).unwrap();

        // south-west node is the last raster row, first column
        assert_eq!(grid.get(0, 0), Some(20.0));
        // north-east node is the first raster row, last column
        assert_eq!(grid.get(3, 2), Some(3.0));
        assert_eq!(grid.to_north_up(), raster);
    }

    #[test]
    fn test_geo_transform_edges() {
        let grid = UniformGrid::new(55.95, 72.05, 0.1, 0.1, 400, 650).unwrap();
        let gt = grid.geo_transform();
        assert!((gt.origin_lat - 56.0).abs() < 1e-9);
        assert!((gt.origin_lon - 72.0).abs() < 1e-9);

        let center = gt.pixel_center(0, 0);
        assert!((center.lat - grid.lat_upper()).abs() < 1e-9);
        assert!((center.lon - grid.lon_lower()).abs() < 1e-9);
    }
}
