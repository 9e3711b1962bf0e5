//! Error types for forecast file validation.

use std::path::PathBuf;

use thiserror::Error;

/// Failures that prevent a file from being checked at all.
///
/// A file that can be read but breaks the format is not an error; it
/// yields an invalid [`crate::ValidationReport`].
#[derive(Debug, Error)]
pub enum ValidatorError {
    #[error("Failed to open forecast file {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read CSV from {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// Result type alias using ValidatorError.
pub type Result<T> = std::result::Result<T, ValidatorError>;
