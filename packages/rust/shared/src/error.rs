//! Error types for SlidePipe.
//!
//! Library crates use [`SlidePipeError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all SlidePipe operations.
#[derive(Debug, thiserror::Error)]
pub enum SlidePipeError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// JSON/TOML decoding error.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Data validation error (bad budget, invalid widths, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },

    /// A content source is missing or unreadable. Recovered by the aggregator.
    #[error("source unavailable: {origin}: {reason}")]
    SourceUnavailable { origin: String, reason: String },

    /// A document record carries a status outside the success set.
    /// Recovered by the aggregator; the record is excluded but kept for audit.
    #[error("unsupported status '{status}' for {origin}")]
    UnsupportedStatus { origin: String, status: String },

    /// Neither real nor fallback content exists for slide synthesis.
    #[error("no content available for slide generation")]
    NoContentAvailable,

    /// A pipeline stage failed.
    #[error("stage '{stage}' failed: {message}")]
    StageFailure { stage: String, message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, SlidePipeError>;

impl SlidePipeError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn source_unavailable(origin: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::SourceUnavailable {
            origin: origin.into(),
            reason: reason.into(),
        }
    }

    pub fn unsupported_status(origin: impl Into<String>, status: impl Into<String>) -> Self {
        Self::UnsupportedStatus {
            origin: origin.into(),
            status: status.into(),
        }
    }

    pub fn stage(stage: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::StageFailure {
            stage: stage.into(),
            message: msg.into(),
        }
    }
}
