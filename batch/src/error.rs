//! Error types for batch stripping.

use thiserror::Error;

/// Errors that can occur while collecting, stripping, or writing scripts.
#[derive(Debug, Error)]
pub enum BatchError {
    /// Failure reading or decoding one script.
    #[error("strip error: {0}")]
    Strip(#[from] sqlstrip_core::StripError),

    /// File I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Worker pool could not be started.
    #[error("thread pool error: {0}")]
    ThreadPool(String),

    /// Invalid or missing input (e.g. non-existent path, no scripts found).
    #[error("{0}")]
    InvalidInput(String),
}

/// Convenience alias for results with [`BatchError`].
pub type Result<T> = std::result::Result<T, BatchError>;
