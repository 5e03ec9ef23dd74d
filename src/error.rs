//! Crate-level error type for configuration and schema loading.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Convenience alias for fallible operations outside of tree validation.
pub type Result<T> = std::result::Result<T, Error>;

/// Recoverable failures raised while loading configuration or schema fixtures.
///
/// Tree validation never produces these; it reports
/// [`crate::query::errors::SqExprValidationError`] values as data instead.
#[derive(Debug, Error)]
pub enum Error {
    /// Reading a file from disk failed.
    #[error("failed to read {path}: {source}")]
    Io {
        /// File that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// TOML document could not be decoded.
    #[error("invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),
    /// JSON document could not be decoded.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// Schema fixture decoded but violates a structural rule.
    #[error("invalid schema: {0}")]
    InvalidSchema(String),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}
