//! Bilinear interpolation on a 2-D node array.

use ndarray::ArrayView2;

/// Bilinear interpolation at fractional node position `(x, y)`.
///
/// `x` runs along axis 0 and `y` along axis 1 of `data`; both must lie in
/// `[0, len - 1]`. A NaN corner carrying non-zero weight yields NaN, while
/// corners with zero weight are ignored so that points exactly on a node or
/// an edge only depend on the nodes they touch.
pub fn bilinear_interpolate(data: ArrayView2<'_, f32>, x: f64, y: f64) -> f32 {
    let (nx, ny) = data.dim();
    if nx == 0 || ny == 0 {
        return f32::NAN;
    }

    let (x0, xf) = split_position(x, nx);
    let (y0, yf) = split_position(y, ny);
    let x1 = (x0 + 1).min(nx - 1);
    let y1 = (y0 + 1).min(ny - 1);

    let corners = [
        (data[[x0, y0]], (1.0 - xf) * (1.0 - yf)),
        (data[[x1, y0]], xf * (1.0 - yf)),
        (data[[x0, y1]], (1.0 - xf) * yf),
        (data[[x1, y1]], xf * yf),
    ];

    let mut sum = 0.0f64;
    for (value, weight) in corners {
        if weight == 0.0 {
            continue;
        }
        if value.is_nan() {
            return f32::NAN;
        }
        sum += value as f64 * weight;
    }
    sum as f32
}

/// Split a position into a base index and the fraction towards the next node.
///
/// The base index never exceeds `len - 2`, so the last node is reached with a
/// fraction of one rather than by reading past the end.
fn split_position(pos: f64, len: usize) -> (usize, f64) {
    if len == 1 {
        return (0, 0.0);
    }
    let pos = pos.clamp(0.0, (len - 1) as f64);
    let base = (pos.floor() as usize).min(len - 2);
    (base, pos - base as f64)
}
