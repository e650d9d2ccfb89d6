//! Error types for comment stripping.
//!
//! The stripper itself never fails: unterminated comments and stray `*/`
//! sequences are valid input. Every variant here originates in the character
//! source being scanned.

use thiserror::Error;

/// Errors surfaced while pulling characters from a source.
#[derive(Debug, Error)]
pub enum StripError {
    /// Read failure from the underlying byte source, passed through as-is.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Source bytes are not valid UTF-8.
    #[error("invalid UTF-8 at byte offset {offset}")]
    InvalidUtf8 {
        /// Absolute offset of the first byte of the offending sequence.
        offset: u64,
    },

    /// Failure reported by a caller-supplied character source.
    #[error("character source error: {0}")]
    Source(String),
}

/// Convenience alias for results with [`StripError`].
pub type Result<T> = std::result::Result<T, StripError>;
