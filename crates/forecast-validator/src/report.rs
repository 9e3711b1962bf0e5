//! Outcome of validating one forecast file.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

/// Format reference shown when a file fails validation.
pub const FORMAT_DOCS_URL: &str =
    "https://projects.ecoforecast.org/neon4cast-ci/instructions.html#forecast-file-format";

/// The individual schema checks, in the order they run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Check {
    Extension,
    ModelId,
    VariablePrediction,
    FamilyParameter,
    SiteId,
    Datetime,
    Duration,
    ProjectId,
    ReferenceDatetime,
}

impl Check {
    pub const ALL: [Check; 9] = [
        Check::Extension,
        Check::ModelId,
        Check::VariablePrediction,
        Check::FamilyParameter,
        Check::SiteId,
        Check::Datetime,
        Check::Duration,
        Check::ProjectId,
        Check::ReferenceDatetime,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Check::Extension => "extension",
            Check::ModelId => "model_id",
            Check::VariablePrediction => "variable_prediction",
            Check::FamilyParameter => "family_parameter",
            Check::SiteId => "site_id",
            Check::Datetime => "datetime",
            Check::Duration => "duration",
            Check::ProjectId => "project_id",
            Check::ReferenceDatetime => "reference_datetime",
        }
    }
}

impl fmt::Display for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Pass,
    /// Accepted, but the file should be updated.
    Warn,
    Fail,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckResult {
    pub check: Check,
    pub status: CheckStatus,
    pub message: String,
}

impl CheckResult {
    pub fn pass(check: Check, message: impl Into<String>) -> Self {
        Self {
            check,
            status: CheckStatus::Pass,
            message: message.into(),
        }
    }

    pub fn warn(check: Check, message: impl Into<String>) -> Self {
        Self {
            check,
            status: CheckStatus::Warn,
            message: message.into(),
        }
    }

    pub fn fail(check: Check, message: impl Into<String>) -> Self {
        Self {
            check,
            status: CheckStatus::Fail,
            message: message.into(),
        }
    }
}

/// Every check run against a file, in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    file: PathBuf,
    checks: Vec<CheckResult>,
}

impl ValidationReport {
    pub fn new(file: impl AsRef<Path>, checks: Vec<CheckResult>) -> Self {
        Self {
            file: file.as_ref().to_path_buf(),
            checks,
        }
    }

    pub fn file(&self) -> &Path {
        &self.file
    }

    pub fn checks(&self) -> &[CheckResult] {
        &self.checks
    }

    /// True when no check failed. Warnings do not invalidate a file.
    pub fn is_valid(&self) -> bool {
        !self.checks.iter().any(|c| c.status == CheckStatus::Fail)
    }

    pub fn failures(&self) -> impl Iterator<Item = &CheckResult> {
        self.checks.iter().filter(|c| c.status == CheckStatus::Fail)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &CheckResult> {
        self.checks.iter().filter(|c| c.status == CheckStatus::Warn)
    }

    pub fn get(&self, check: Check) -> Option<&CheckResult> {
        self.checks.iter().find(|c| c.check == check)
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.file.display())?;
        for result in &self.checks {
            let tag = match result.status {
                CheckStatus::Pass => "ok",
                CheckStatus::Warn => "warn",
                CheckStatus::Fail => "FAIL",
            };
            writeln!(f, "  [{:>4}] {}", tag, result.message)?;
        }
        if self.is_valid() {
            write!(f, "Forecast format is valid")
        } else {
            write!(
                f,
                "Forecast file is not valid. The following link provides information about the format:\n{}",
                FORMAT_DOCS_URL
            )
        }
    }
}
