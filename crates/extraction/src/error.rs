//! Error types for the extraction crate.

use std::path::Path;

use station_grid::GridError;
use thiserror::Error;

/// Errors that can occur while extracting station values.
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error(transparent)]
    Grid(#[from] GridError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to parse {input}: {reason}")]
    Parse { input: String, reason: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to list {path}: {message}")]
    Walk { path: String, message: String },
}

impl ExtractionError {
    pub fn parse(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Parse {
            input: input.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    pub fn walk(path: &Path, message: impl Into<String>) -> Self {
        Self::Walk {
            path: path.display().to_string(),
            message: message.into(),
        }
    }
}

impl From<walkdir::Error> for ExtractionError {
    fn from(err: walkdir::Error) -> Self {
        let path = err
            .path()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        Self::Walk {
            path,
            message: err.to_string(),
        }
    }
}

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractionError>;
