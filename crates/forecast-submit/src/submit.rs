//! Validate-confirm-upload flow.

use std::path::Path;

use forecast_validator::{validate_forecast, ValidationReport};
use tracing::{info, warn};

use crate::aws::AwsCli;
use crate::confirm::{Confirm, CONFIRM_PROMPT};
use crate::error::{Result, SubmitError};
use crate::options::SubmitOptions;

const INSTRUCTIONS_URL: &str = "https://projects.ecoforecast.org/usgsrc4cast-ci/instructions.html";

/// What happened to a submission that ran to completion.
#[derive(Debug)]
pub enum SubmitOutcome {
    /// Uploaded; carries the CLI's output.
    Submitted { destination: String, output: String },
    /// Failed validation and was not uploaded.
    Rejected(ValidationReport),
    /// The confirmation prompt was declined.
    Declined,
}

impl SubmitOutcome {
    pub fn is_submitted(&self) -> bool {
        matches!(self, SubmitOutcome::Submitted { .. })
    }
}

/// Validate a forecast file and upload it to the challenge bucket.
///
/// With `options.ask` set, `confirm` is asked before uploading.
pub async fn submit(
    forecast_file: Option<&Path>,
    project_id: Option<&str>,
    options: &SubmitOptions,
    confirm: &mut dyn Confirm,
) -> Result<SubmitOutcome> {
    let forecast_file = forecast_file.ok_or(SubmitError::MissingArgument("forecast_file"))?;
    let project_id = project_id
        .filter(|p| !p.trim().is_empty())
        .ok_or(SubmitError::MissingArgument("project_id"))?;

    info!(file = %forecast_file.display(), "validating that file matches required standards");
    let report = validate_forecast(forecast_file)?;
    if !report.is_valid() {
        warn!(
            instructions = INSTRUCTIONS_URL,
            "Forecast was not in a valid format and was not submitted"
        );
        return Ok(SubmitOutcome::Rejected(report));
    }

    if options.ask && !confirm.confirm(CONFIRM_PROMPT)? {
        warn!("Forecast was not submitted to server");
        return Ok(SubmitOutcome::Declined);
    }

    let destination = crate::aws::destination(forecast_file, project_id)?;
    let cli = AwsCli::new(&options.cli_program)?;
    cli.check_available().await?;
    let output = cli.copy(forecast_file, project_id, options).await?;

    info!(destination = %destination, "Forecast submitted");
    Ok(SubmitOutcome::Submitted {
        destination,
        output,
    })
}
