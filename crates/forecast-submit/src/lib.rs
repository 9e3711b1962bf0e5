//! Submission of forecast files to the EFI forecast challenge.
//!
//! Files are validated with `forecast-validator`, optionally confirmed,
//! then copied to the public submissions bucket with the AWS CLI using an
//! unsigned request.

pub mod aws;
pub mod confirm;
pub mod error;
pub mod options;
pub mod submit;

pub use aws::{destination, upload_args, AwsCli, ISOLATED_ENV_VARS, SUBMISSIONS_BUCKET};
pub use confirm::{is_yes, AutoConfirm, Confirm, LinePrompt, CONFIRM_PROMPT};
pub use error::{Result, SubmitError};
pub use options::{SubmitOptions, DEFAULT_CLI_PROGRAM, DEFAULT_S3_ENDPOINT, DEFAULT_S3_REGION};
pub use submit::{submit, SubmitOutcome};
