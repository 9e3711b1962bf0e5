//! Error types shared across the GEFS driver crates.

use thiserror::Error;

/// Result type alias using GefsError.
pub type GefsResult<T> = Result<T, GefsError>;

/// Errors raised while parsing or validating shared driver types.
#[derive(Debug, Error)]
pub enum GefsError {
    // === Site Errors ===
    #[error("Invalid coordinate for site '{site_id}': {message}")]
    InvalidCoordinate { site_id: String, message: String },

    #[error("Duplicate site id: {0}")]
    DuplicateSite(String),

    #[error("Missing required column: {0}")]
    MissingColumn(String),

    #[error("Failed to read site metadata: {0}")]
    SiteMetadata(String),

    // === Time Errors ===
    #[error("Invalid time specification: {0}")]
    InvalidTime(String),

    #[error("Invalid lead time: {0}")]
    InvalidLeadTime(String),

    #[error("Unsupported time units: {0}")]
    UnsupportedUnits(String),

    // === Variable Errors ===
    #[error("Unknown variable: {0}")]
    UnknownVariable(String),
}

impl From<std::io::Error> for GefsError {
    fn from(err: std::io::Error) -> Self {
        GefsError::SiteMetadata(err.to_string())
    }
}

impl From<csv::Error> for GefsError {
    fn from(err: csv::Error) -> Self {
        GefsError::SiteMetadata(format!("CSV error: {}", err))
    }
}
