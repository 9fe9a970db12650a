//! Error types for the Strata hierarchical map engine.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for Strata operations.
#[derive(Error, Debug)]
pub enum StrataError {
    /// Invalid configuration. Fatal; rejected before any layer is built.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Training was invoked with zero samples.
    #[error("Empty training set: {0}")]
    EmptyTrainingSet(String),

    /// Error during training.
    #[error("Training error: {0}")]
    Training(String),

    /// Error during storage operations.
    #[error("Storage error: {0}")]
    Storage(String),

    /// State file with an unrecognized or unsupported layout.
    #[error("Invalid state format: {0}")]
    InvalidStateFormat(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// File not found.
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),
}

/// Result type alias for Strata operations.
pub type Result<T> = std::result::Result<T, StrataError>;

impl From<bincode::Error> for StrataError {
    fn from(err: bincode::Error) -> Self {
        StrataError::Serialization(err.to_string())
    }
}
