//! Error types for grid construction, sampling and raster encoding.

use thiserror::Error;

/// Errors that can occur while working with a grid or a raster file.
#[derive(Error, Debug)]
pub enum GridError {
    /// An array does not have the shape the grid expects.
    #[error("shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },

    /// A query point or window falls outside the grid.
    #[error("point {requested} is outside grid bounds {grid}")]
    OutOfBounds { requested: String, grid: String },

    /// Grid geometry violates its invariants.
    #[error("invalid grid geometry: {0}")]
    InvalidGeometry(String),

    /// Kernel weights are unusable.
    #[error("invalid kernel: {0}")]
    InvalidKernel(String),

    /// The raster file is malformed or uses an unsupported layout.
    #[error("raster codec error: {0}")]
    Codec(String),

    /// Filesystem error while reading or writing a raster.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl GridError {
    /// Create a ShapeMismatch error.
    pub fn shape_mismatch(expected: (usize, usize), actual: (usize, usize)) -> Self {
        Self::ShapeMismatch { expected, actual }
    }

    /// Create an OutOfBounds error.
    pub fn out_of_bounds(requested: impl Into<String>, grid: impl Into<String>) -> Self {
        Self::OutOfBounds {
            requested: requested.into(),
            grid: grid.into(),
        }
    }

    /// Create an InvalidGeometry error.
    pub fn invalid_geometry(msg: impl Into<String>) -> Self {
        Self::InvalidGeometry(msg.into())
    }

    /// Create an InvalidKernel error.
    pub fn invalid_kernel(msg: impl Into<String>) -> Self {
        Self::InvalidKernel(msg.into())
    }

    /// Create a Codec error.
    pub fn codec(msg: impl Into<String>) -> Self {
        Self::Codec(msg.into())
    }

    /// Whether this error only concerns a single query point.
    pub fn is_out_of_bounds(&self) -> bool {
        matches!(self, Self::OutOfBounds { .. })
    }
}

impl From<tiff::TiffError> for GridError {
    fn from(err: tiff::TiffError) -> Self {
        match err {
            tiff::TiffError::IoError(e) => Self::Io(e),
            other => Self::Codec(other.to_string()),
        }
    }
}

impl From<ndarray::ShapeError> for GridError {
    fn from(err: ndarray::ShapeError) -> Self {
        Self::Codec(err.to_string())
    }
}

/// Result type for grid operations.
pub type Result<T> = std::result::Result<T, GridError>;
