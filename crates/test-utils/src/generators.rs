//! Synthetic raster generators.
//!
//! Arrays come back in whatever axis order the caller asks for via `shape`;
//! the grid layout is `(lon_count, lat_count)` and north-up rasters are
//! `(lat_count, lon_count)`.

use ndarray::Array2;

/// Every cell set to `value`.
pub fn constant_array(shape: (usize, usize), value: f32) -> Array2<f32> {
    Array2::from_elem(shape, value)
}

/// Cell `[[i, j]]` holds `i * 1000 + j`.
///
/// Makes it easy to verify that data was not transposed or flipped.
///
/// # Example
///
/// ```
/// use test_utils::indexed_array;
///
/// let a = indexed_array((3, 2));
/// assert_eq!(a[[0, 1]], 1.0);
/// assert_eq!(a[[2, 0]], 2000.0);
/// ```
pub fn indexed_array(shape: (usize, usize)) -> Array2<f32> {
    Array2::from_shape_fn(shape, |(i, j)| (i * 1000 + j) as f32)
}

/// A plane `a * lon + b * lat + c` sampled on the given node coordinates.
///
/// Output is `(lon.len(), lat.len())`, the grid layout.
pub fn linear_field(lon: &[f64], lat: &[f64], a: f64, b: f64, c: f64) -> Array2<f32> {
    Array2::from_shape_fn((lon.len(), lat.len()), |(i, j)| {
        (a * lon[i] + b * lat[j] + c) as f32
    })
}

/// All-NaN array with a `size x size` block of `value` starting at `origin`.
///
/// Cells of the block that fall outside the array are skipped.
pub fn nan_with_block(
    shape: (usize, usize),
    origin: (usize, usize),
    size: usize,
    value: f32,
) -> Array2<f32> {
    let mut data = Array2::from_elem(shape, f32::NAN);
    for i in origin.0..(origin.0 + size).min(shape.0) {
        for j in origin.1..(origin.1 + size).min(shape.1) {
            data[[i, j]] = value;
        }
    }
    data
}

/// Replace every `stride`-th cell (row-major) with `sentinel`.
pub fn sprinkle_sentinels(data: &mut Array2<f32>, stride: usize, sentinel: f32) -> usize {
    let stride = stride.max(1);
    let mut count = 0;
    for (k, v) in data.iter_mut().enumerate() {
        if k % stride == 0 {
            *v = sentinel;
            count += 1;
        }
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indexed_array() {
        let a = indexed_array((4, 3));
        assert_eq!(a.dim(), (4, 3));
        assert_eq!(a[[3, 2]], 3002.0);
    }

    #[test]
    fn test_linear_field() {
        let lon = [100.0, 101.0];
        let lat = [30.0, 31.0, 32.0];
        let f = linear_field(&lon, &lat, 2.0, -1.0, 0.5);
        assert_eq!(f.dim(), (2, 3));
        assert_eq!(f[[1, 2]], (202.0 - 32.0 + 0.5) as f32);
    }

    #[test]
    fn test_nan_with_block() {
        let a = nan_with_block((10, 10), (2, 3), 3, 7.0);
        assert_eq!(a.iter().filter(|v| !v.is_nan()).count(), 9);
        assert_eq!(a[[2, 3]], 7.0);
        assert_eq!(a[[4, 5]], 7.0);
        assert!(a[[5, 5]].is_nan());
    }

    #[test]
    fn test_nan_with_block_clipped() {
        let a = nan_with_block((4, 4), (3, 3), 3, 1.0);
        assert_eq!(a.iter().filter(|v| !v.is_nan()).count(), 1);
    }

    #[test]
    fn test_sprinkle_sentinels() {
        let mut a = constant_array((3, 3), 1.0);
        let n = sprinkle_sentinels(&mut a, 4, -9.99e33);
        assert_eq!(n, 3);
        assert_eq!(a[[0, 0]], -9.99e33);
        assert_eq!(a[[1, 1]], -9.99e33);
    }
}
