//! Error types for VisMag

use thiserror::Error;

/// Main error type for VisMag operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Invalid raster dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    #[error("Index out of bounds: ({row}, {col}) in raster of size ({rows}, {cols})")]
    IndexOutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("Raster size mismatch: expected ({er}, {ec}), got ({ar}, {ac})")]
    SizeMismatch { er: usize, ec: usize, ar: usize, ac: usize },

    #[error("Invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("Algorithm error: {0}")]
    Algorithm(String),

    #[error("Worker {worker} panicked: {message}")]
    WorkerPanicked { worker: usize, message: String },

    #[error("{0}")]
    Other(String),
}

/// Result type alias for VisMag operations
pub type Result<T> = std::result::Result<T, Error>;
