//! Error types for the GEFS store reader.

use thiserror::Error;

/// Errors that can occur while reading GEFS stores.
#[derive(Error, Debug)]
pub enum ReaderError {
    /// Failed to open the store or one of its arrays.
    #[error("failed to open store: {0}")]
    OpenFailed(String),

    /// Failed to read data from an array.
    #[error("failed to read array data: {0}")]
    ReadFailed(String),

    /// A requested variable is not present in the store.
    #[error("variable not found in store: {0}")]
    MissingVariable(String),

    /// Array or coordinate metadata does not match the expected layout.
    #[error("invalid store metadata: {0}")]
    InvalidMetadata(String),

    /// A selection matched no coordinates.
    #[error("selection on '{axis}' is empty: {detail}")]
    EmptySelection { axis: String, detail: String },

    /// A site lies outside the window that was read.
    #[error("site '{site_id}' lies outside the read window {window}")]
    SiteOutsideWindow { site_id: String, window: String },

    /// Object storage error.
    #[error("storage error: {0}")]
    Storage(String),

    /// A Parquet stage file could not be decoded.
    #[error("failed to decode Parquet: {0}")]
    Decode(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Invalid request arguments.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Spatial subsetting failed.
    #[error(transparent)]
    Subset(#[from] site_cluster::SubsetError),

    /// Shared type parsing failed.
    #[error(transparent)]
    Common(#[from] gefs_common::GefsError),
}

impl ReaderError {
    pub fn open_failed(msg: impl Into<String>) -> Self {
        Self::OpenFailed(msg.into())
    }

    pub fn read_failed(msg: impl Into<String>) -> Self {
        Self::ReadFailed(msg.into())
    }

    pub fn invalid_metadata(msg: impl Into<String>) -> Self {
        Self::InvalidMetadata(msg.into())
    }

    pub fn empty_selection(axis: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::EmptySelection {
            axis: axis.into(),
            detail: detail.into(),
        }
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::InvalidRequest(msg.into())
    }
}

impl From<object_store::Error> for ReaderError {
    fn from(err: object_store::Error) -> Self {
        Self::Storage(err.to_string())
    }
}

impl From<csv::Error> for ReaderError {
    fn from(err: csv::Error) -> Self {
        Self::Storage(format!("CSV error: {}", err))
    }
}

impl From<parquet::errors::ParquetError> for ReaderError {
    fn from(err: parquet::errors::ParquetError) -> Self {
        Self::Decode(err.to_string())
    }
}

impl From<arrow::error::ArrowError> for ReaderError {
    fn from(err: arrow::error::ArrowError) -> Self {
        Self::Decode(err.to_string())
    }
}

/// Result type for reader operations.
pub type Result<T> = std::result::Result<T, ReaderError>;
