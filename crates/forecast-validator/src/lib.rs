//! Validation of EFI forecast challenge submission files.
//!
//! A forecast file is a `.csv` or `.csv.gz` table in the challenge's long
//! format. [`validate_forecast`] reads its header and first row and runs
//! the column checks, returning a [`ValidationReport`]. Check outcomes are
//! also logged through `tracing`.
//!
//! ```ignore
//! let report = forecast_validator::validate_forecast("forecast.csv.gz")?;
//! if !report.is_valid() {
//!     eprintln!("{}", report);
//! }
//! ```

pub mod error;
pub mod report;
pub mod validator;

pub use error::{Result, ValidatorError};
pub use report::{Check, CheckResult, CheckStatus, ValidationReport, FORMAT_DOCS_URL};
pub use validator::{
    check_columns, has_accepted_extension, validate_forecast, ForecastHeader, ACCEPTED_EXTENSIONS,
};
