//! Mean of the 2x2 node block at a point.

use super::{window, PointSampler};
use crate::error::Result;
use crate::grid::UniformGrid;
use crate::types::Point;

/// Averages the non-NaN values of the node at or below the point and its
/// three neighbours towards larger longitude and latitude.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlockMeanSampler;

impl PointSampler for BlockMeanSampler {
    fn name(&self) -> &'static str {
        "block_mean"
    }

    fn sample_point(&self, grid: &UniformGrid, point: Point) -> Result<f32> {
        let (i, j) = grid.index_of(point)?;
        let block = window(grid, point, i as i64, j as i64, 2, 2)?;

        let mut sum = 0.0f64;
        let mut count = 0usize;
        for &v in block.iter() {
            if !v.is_nan() {
                sum += v as f64;
                count += 1;
            }
        }

        if count == 0 {
            Ok(f32::NAN)
        } else {
            Ok((sum / count as f64) as f32)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array2};

    fn grid_3x3(values: Array2<f32>) -> UniformGrid {
        let mut grid = UniformGrid::new(2.0, 0.0, 1.0, 1.0, 3, 3).unwrap();
        grid.fill_owned(values).unwrap();
        grid
    }

    #[test]
    fn test_constant_grid() {
        let grid = grid_3x3(Array2::from_elem((3, 3), 4.25));
        let value = BlockMeanSampler.sample_point(&grid, Point::new(0.3, 1.6)).unwrap();
        assert_eq!(value, 4.25);
    }

    #[test]
    fn test_ignores_nan_nodes() {
        let grid = grid_3x3(array![
            [1.0, f32::NAN, 0.0],
            [3.0, 5.0, 0.0],
            [0.0, 0.0, 0.0]
        ]);
        let value = BlockMeanSampler.sample_point(&grid, Point::new(0.5, 0.5)).unwrap();
        assert_eq!(value, 3.0);
    }

    #[test]
    fn test_all_nan_block() {
        let grid = grid_3x3(Array2::from_elem((3, 3), f32::NAN));
        let value = BlockMeanSampler.sample_point(&grid, Point::new(0.5, 0.5)).unwrap();
        assert!(value.is_nan());
    }

    #[test]
    fn test_block_leaving_grid_is_out_of_bounds() {
        let grid = grid_3x3(Array2::from_elem((3, 3), 1.0));
        // last column: the block would need a fourth column
        let err = BlockMeanSampler.sample_point(&grid, Point::new(2.0, 0.5)).unwrap_err();
        assert!(err.is_out_of_bounds());

        let values = BlockMeanSampler.sample(&grid, &[Point::new(2.0, 0.5), Point::new(0.5, 0.5)]);
        assert!(values[0].is_nan());
        assert_eq!(values[1], 1.0);
    }
}
