//! Error types for site clustering and spatial subsetting.

use thiserror::Error;

/// Errors that can occur while computing a site bounding box.
#[derive(Error, Debug)]
pub enum SubsetError {
    /// Empty site set, malformed coordinates or out-of-range parameters.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The clustering routine could not produce a complete assignment.
    #[error("clustering failed: {0}")]
    Clustering(String),
}

impl SubsetError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn clustering(msg: impl Into<String>) -> Self {
        Self::Clustering(msg.into())
    }
}

impl From<gefs_common::GefsError> for SubsetError {
    fn from(err: gefs_common::GefsError) -> Self {
        Self::InvalidInput(err.to_string())
    }
}

/// Result type for subsetting operations.
pub type Result<T> = std::result::Result<T, SubsetError>;
