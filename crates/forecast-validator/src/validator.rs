//! Column checks for forecast submission files.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use flate2::read::GzDecoder;
use tracing::{info, instrument, warn};

use crate::error::{Result, ValidatorError};
use crate::report::{Check, CheckResult, CheckStatus, ValidationReport, FORMAT_DOCS_URL};

/// Accepted file suffixes.
pub const ACCEPTED_EXTENSIONS: [&str; 2] = [".csv", ".csv.gz"];

/// Header and first data row of a forecast file.
///
/// Only the first row is read; no check inspects later rows.
#[derive(Debug, Clone, Default)]
pub struct ForecastHeader {
    columns: Vec<String>,
    first_row: Option<Vec<String>>,
}

impl ForecastHeader {
    pub fn new(columns: Vec<String>, first_row: Option<Vec<String>>) -> Self {
        Self { columns, first_row }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn has(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    pub fn has_all(&self, columns: &[&str]) -> bool {
        columns.iter().all(|c| self.has(c))
    }

    /// Value of `column` in the first data row.
    pub fn first_value(&self, column: &str) -> Option<&str> {
        let idx = self.columns.iter().position(|c| c == column)?;
        self.first_row.as_ref()?.get(idx).map(String::as_str)
    }

    /// Read the header and first row of CSV text.
    pub fn from_reader<R: Read>(reader: R) -> csv::Result<Self> {
        let mut csv = csv::ReaderBuilder::new().flexible(true).from_reader(reader);

        let columns = csv
            .headers()?
            .iter()
            .enumerate()
            .map(|(i, c)| {
                let c = if i == 0 { c.trim_start_matches('\u{feff}') } else { c };
                c.trim().to_string()
            })
            .collect();

        let first_row = match csv.records().next() {
            Some(record) => Some(record?.iter().map(str::to_string).collect()),
            None => None,
        };

        Ok(Self { columns, first_row })
    }

    /// Read the header of a `.csv` or gzip-compressed `.csv.gz` file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|source| ValidatorError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        let reader: Box<dyn Read> = if file_name(path).ends_with(".gz") {
            Box::new(GzDecoder::new(BufReader::new(file)))
        } else {
            Box::new(BufReader::new(file))
        };

        Self::from_reader(reader).map_err(|source| ValidatorError::Csv {
            path: path.to_path_buf(),
            source,
        })
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Whether the file name ends in `.csv` or `.csv.gz`.
pub fn has_accepted_extension(path: &Path) -> bool {
    let name = file_name(path);
    ACCEPTED_EXTENSIONS.iter().any(|ext| name.ends_with(ext))
}

/// Run the column checks against a parsed header.
pub fn check_columns(header: &ForecastHeader) -> Vec<CheckResult> {
    let mut results = Vec::with_capacity(Check::ALL.len() - 1);

    results.push(if header.has("model_id") {
        CheckResult::pass(Check::ModelId, "file has model_id column")
    } else {
        CheckResult::fail(Check::ModelId, "file missing model_id column")
    });

    results.push(if header.has_all(&["variable", "prediction"]) {
        CheckResult::pass(
            Check::VariablePrediction,
            "forecasted variables found correct variable + prediction column",
        )
    } else {
        CheckResult::fail(
            Check::VariablePrediction,
            "missing the variable and prediction columns",
        )
    });

    results.push(if header.has("ensemble") {
        CheckResult::fail(
            Check::FamilyParameter,
            "ensemble dimension should be named parameter",
        )
    } else if header.has("family") {
        if header.has("parameter") {
            CheckResult::pass(
                Check::FamilyParameter,
                "file has correct family and parameter columns",
            )
        } else {
            CheckResult::fail(Check::FamilyParameter, "file does not have parameter column")
        }
    } else {
        CheckResult::fail(
            Check::FamilyParameter,
            "file does not have ensemble or family and/or parameter column",
        )
    });

    results.push(if header.has("site_id") {
        CheckResult::pass(Check::SiteId, "file has site_id column")
    } else {
        CheckResult::fail(Check::SiteId, "file missing site_id column")
    });

    results.push(if !header.has("datetime") {
        CheckResult::fail(Check::Datetime, "file missing datetime column")
    } else {
        match header.first_value("datetime") {
            Some(value) if value.contains('-') => {
                CheckResult::pass(Check::Datetime, "file has correct datetime column")
            }
            Some(_) => CheckResult::fail(
                Check::Datetime,
                "datetime column format is not in the correct YYYY-MM-DD format",
            ),
            None => CheckResult::fail(Check::Datetime, "datetime column has no values"),
        }
    });

    results.push(if header.has("duration") {
        CheckResult::pass(Check::Duration, "file has duration column")
    } else {
        CheckResult::fail(
            Check::Duration,
            "file missing duration column (values for the column: daily = P1D, 30min = PT30M)",
        )
    });

    results.push(if header.has("project_id") {
        CheckResult::pass(Check::ProjectId, "file has project_id column")
    } else {
        CheckResult::fail(
            Check::ProjectId,
            "file missing project_id column (use the challenge you're submitting to as the project_id)",
        )
    });

    results.push(if header.has("reference_datetime") {
        CheckResult::pass(Check::ReferenceDatetime, "file has reference_datetime column")
    } else if header.has("start_time") {
        CheckResult::warn(
            Check::ReferenceDatetime,
            "file start_time column should be named reference_datetime. We are converting it \
             during processing but please update your submission format",
        )
    } else {
        CheckResult::fail(Check::ReferenceDatetime, "file missing reference_datetime column")
    });

    results
}

/// Validate a forecast file against the challenge's submission format.
///
/// A file with an unaccepted extension is not opened; its report holds
/// the single failed extension check.
pub fn validate_forecast(path: impl AsRef<Path>) -> Result<ValidationReport> {
    validate_path(path.as_ref())
}

#[instrument(skip(path), fields(file = %path.display()))]
fn validate_path(path: &Path) -> Result<ValidationReport> {
    let checks = if has_accepted_extension(path) {
        let header = ForecastHeader::from_path(path)?;
        let mut checks = vec![CheckResult::pass(Check::Extension, "file has csv extension")];
        checks.extend(check_columns(&header));
        checks
    } else {
        vec![CheckResult::fail(
            Check::Extension,
            "incorrect file extension (csv or csv.gz are accepted)",
        )]
    };

    let report = ValidationReport::new(path, checks);
    log_report(&report);
    Ok(report)
}

fn log_report(report: &ValidationReport) {
    for result in report.checks() {
        match result.status {
            CheckStatus::Pass => info!(check = %result.check, "{}", result.message),
            CheckStatus::Warn => warn!(check = %result.check, "{}", result.message),
            CheckStatus::Fail => warn!(check = %result.check, "{}", result.message),
        }
    }

    if report.is_valid() {
        info!(file = %report.file().display(), "Forecast format is valid");
    } else {
        warn!(
            file = %report.file().display(),
            failures = report.failures().count(),
            docs = FORMAT_DOCS_URL,
            "Forecast file is not valid"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(csv: &str) -> ForecastHeader {
        ForecastHeader::from_reader(csv.as_bytes()).unwrap()
    }

    fn status(results: &[CheckResult], check: Check) -> CheckStatus {
        results.iter().find(|r| r.check == check).map(|r| r.status).unwrap()
    }

    #[test]
    fn test_extension() {
        assert!(has_accepted_extension(Path::new("/tmp/f.csv")));
        assert!(has_accepted_extension(Path::new("f.csv.gz")));
        assert!(!has_accepted_extension(Path::new("f.parquet")));
        assert!(!has_accepted_extension(Path::new("f.gz")));
        assert!(!has_accepted_extension(Path::new("csv")));
    }

    #[test]
    fn test_first_value_and_bom() {
        let h = header("\u{feff}model_id,datetime\nm,2024-01-01\n");
        assert!(h.has("model_id"));
        assert_eq!(h.first_value("datetime"), Some("2024-01-01"));
        assert_eq!(h.first_value("missing"), None);
    }

    #[test]
    fn test_ensemble_column_rejected() {
        let results = check_columns(&header("ensemble,family,parameter\n1,normal,mu\n"));
        assert_eq!(status(&results, Check::FamilyParameter), CheckStatus::Fail);
    }

    #[test]
    fn test_family_without_parameter() {
        let results = check_columns(&header("family\nnormal\n"));
        assert_eq!(status(&results, Check::FamilyParameter), CheckStatus::Fail);
        assert_eq!(status(&results, Check::ModelId), CheckStatus::Fail);
    }

    #[test]
    fn test_datetime_format() {
        let results = check_columns(&header("datetime\n20240101\n"));
        assert_eq!(status(&results, Check::Datetime), CheckStatus::Fail);

        let results = check_columns(&header("datetime\n"));
        assert_eq!(status(&results, Check::Datetime), CheckStatus::Fail);

        let results = check_columns(&header("datetime\n2024-01-01 00:00:00\n"));
        assert_eq!(status(&results, Check::Datetime), CheckStatus::Pass);
    }

    #[test]
    fn test_start_time_is_warning() {
        let results = check_columns(&header("start_time\n2024-01-01\n"));
        assert_eq!(status(&results, Check::ReferenceDatetime), CheckStatus::Warn);

        let results = check_columns(&header("other\nx\n"));
        assert_eq!(status(&results, Check::ReferenceDatetime), CheckStatus::Fail);
    }

    #[test]
    fn test_checks_run_in_order() {
        let results = check_columns(&header("x\n1\n"));
        let order: Vec<Check> = results.iter().map(|r| r.check).collect();
        assert_eq!(order, Check::ALL[1..].to_vec());
    }
}
