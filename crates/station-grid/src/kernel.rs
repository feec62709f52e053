//! Square weighting kernels for the kernel-weighted mean.
//!
//! A [`Kernel`] is immutable once built. Missing cells are handled on a
//! per-point working copy returned by [`Kernel::working_weights`], so one
//! kernel can be shared across points and threads.

use ndarray::{Array2, ArrayView2, Zip};

use crate::error::{GridError, Result};

/// A square matrix of non-negative weights.
#[derive(Debug, Clone, PartialEq)]
pub struct Kernel {
    weights: Array2<f64>,
}

impl Kernel {
    /// Wrap a weight matrix, validating it.
    pub fn new(weights: Array2<f64>) -> Result<Self> {
        let (rows, cols) = weights.dim();
        if rows == 0 || cols == 0 {
            return Err(GridError::invalid_kernel("kernel is empty"));
        }
        if rows != cols {
            return Err(GridError::invalid_kernel(format!(
                "kernel must be square, got {}x{}",
                rows, cols
            )));
        }
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(GridError::invalid_kernel(
                "weights must be finite and non-negative",
            ));
        }
        if weights.iter().all(|w| *w == 0.0) {
            return Err(GridError::invalid_kernel("all weights are zero"));
        }
        Ok(Self { weights })
    }

    /// A `side x side` kernel of ones.
    pub fn ones(side: usize) -> Result<Self> {
        Self::new(Array2::ones((side, side)))
    }

    /// Ones on every cell whose centre lies within `radius` cells of the middle.
    pub fn binary_disc(radius: f64) -> Result<Self> {
        if !(radius.is_finite() && radius >= 0.0) {
            return Err(GridError::invalid_kernel(format!(
                "radius must be non-negative, got {}",
                radius
            )));
        }
        let half = radius.floor() as usize;
        let side = 2 * half + 1;
        let weights = Array2::from_shape_fn((side, side), |(r, c)| {
            let dr = r as f64 - half as f64;
            let dc = c as f64 - half as f64;
            if dr * dr + dc * dc <= radius * radius {
                1.0
            } else {
                0.0
            }
        });
        Self::new(weights)
    }

    /// Weights `r^2 - d^2` clipped at zero, with `r = (side - 1) / 2`.
    ///
    /// With an even side the centre sits between cells; `side = 30` gives a
    /// disc of radius 14.5 cells.
    pub fn quadratic_disc(side: usize) -> Result<Self> {
        if side == 0 {
            return Err(GridError::invalid_kernel("kernel is empty"));
        }
        let center = (side - 1) as f64 / 2.0;
        let weights = Array2::from_shape_fn((side, side), |(r, c)| {
            let dr = r as f64 - center;
            let dc = c as f64 - center;
            (center * center - (dr * dr + dc * dc)).max(0.0)
        });
        Self::new(weights)
    }

    /// Side length in cells.
    pub fn side(&self) -> usize {
        self.weights.nrows()
    }

    /// The original weights.
    pub fn weights(&self) -> ArrayView2<'_, f64> {
        self.weights.view()
    }

    /// First grid index of the window for a point whose node index is `index`.
    ///
    /// For an even side `2h` the window spans `[index + 1 - h, index + 1 + h)`;
    /// for an odd side `2h + 1` it is centred on `index`.
    pub fn window_start(&self, index: usize) -> i64 {
        index as i64 + 1 - ((self.side() + 1) / 2) as i64
    }

    /// Per-point weights for `window`, renormalised around missing cells.
    ///
    /// Returns `None` when every cell under a non-zero weight is NaN.
    /// Otherwise the result is a fresh copy with zero weight on NaN cells,
    /// summing to one.
    pub fn working_weights(&self, window: ArrayView2<'_, f32>) -> Option<Array2<f64>> {
        debug_assert_eq!(window.dim(), self.weights.dim());

        let any_valid = Zip::from(&self.weights)
            .and(&window)
            .fold(false, |acc, &w, &v| acc || (w != 0.0 && !v.is_nan()));
        if !any_valid {
            return None;
        }

        let mut working = self.weights.clone();
        Zip::from(&mut working).and(&window).for_each(|w, &v| {
            if v.is_nan() {
                *w = 0.0;
            }
        });
        let total = working.sum();
        working.mapv_inplace(|w| w / total);
        Some(working)
    }

    /// Weighted mean of `window`, ignoring NaN cells. NaN if none are usable.
    pub fn weighted_mean(&self, window: ArrayView2<'_, f32>) -> f64 {
        match self.working_weights(window) {
            Some(working) => Zip::from(&working)
                .and(&window)
                .fold(0.0, |acc, &w, &v| if v.is_nan() { acc } else { acc + w * v as f64 }),
            None => f64::NAN,
        }
    }
}
