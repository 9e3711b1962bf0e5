//! Error types for forecast submission.

use thiserror::Error;

use forecast_validator::ValidatorError;

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("{0} must be provided")]
    MissingArgument(&'static str),

    #[error("AWS CLI '{program}' is not installed or not found in PATH: {message}")]
    CliUnavailable { program: String, message: String },

    #[error("Forecast was not successfully submitted to server (exit status {status:?}): {stderr}")]
    UploadFailed { status: Option<i32>, stderr: String },

    #[error(transparent)]
    Validation(#[from] ValidatorError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SubmitError>;
