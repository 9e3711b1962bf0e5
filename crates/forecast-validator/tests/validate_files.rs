//! Validation of forecast files written to a scratch directory.

use std::io::Write;
use std::path::PathBuf;

use flate2::write::GzEncoder;
use flate2::Compression;
use forecast_validator::{validate_forecast, Check, CheckStatus, ValidatorError};
use tempfile::TempDir;
use test_utils::fixtures::forecast;

fn write_file(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, contents).expect("Failed to write fixture");
    path
}

fn write_gz(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    let file = std::fs::File::create(&path).expect("Failed to create fixture");
    let mut encoder = GzEncoder::new(file, Compression::default());
    encoder.write_all(contents.as_bytes()).unwrap();
    encoder.finish().unwrap();
    path
}

#[test]
fn test_valid_csv() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(&dir, "neon4cast-climatology.csv", forecast::VALID_CSV);

    let report = validate_forecast(&path).unwrap();
    assert!(report.is_valid(), "{}", report);
    assert_eq!(report.checks().len(), Check::ALL.len());
    assert!(report.checks().iter().all(|c| c.status == CheckStatus::Pass));
}

#[test]
fn test_valid_csv_gz() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_gz(&dir, "forecast-2024-01-01.csv.gz", forecast::VALID_CSV);

    let report = validate_forecast(&path).unwrap();
    assert!(report.is_valid(), "{}", report);
}

#[test]
fn test_start_time_warns_but_passes() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(&dir, "forecast.csv", forecast::START_TIME_CSV);

    let report = validate_forecast(&path).unwrap();
    assert!(report.is_valid());
    let warning = report.warnings().next().expect("start_time warning");
    assert_eq!(warning.check, Check::ReferenceDatetime);
}

#[test]
fn test_ensemble_column_invalid() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(&dir, "forecast.csv", forecast::ENSEMBLE_CSV);

    let report = validate_forecast(&path).unwrap();
    assert!(!report.is_valid());
    let failed: Vec<Check> = report.failures().map(|c| c.check).collect();
    assert_eq!(failed, vec![Check::FamilyParameter]);
}

#[test]
fn test_wrong_extension_is_not_opened() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("forecast.parquet");

    // The file does not exist; the extension check fails before any read.
    let report = validate_forecast(&path).unwrap();
    assert!(!report.is_valid());
    assert_eq!(report.checks().len(), 1);
    assert_eq!(report.checks()[0].check, Check::Extension);
}

#[test]
fn test_missing_columns_all_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(&dir, "forecast.csv", "site_id,datetime\nNIWO,2024/01/02\n");

    let report = validate_forecast(&path).unwrap();
    let failed: Vec<Check> = report.failures().map(|c| c.check).collect();
    assert_eq!(
        failed,
        vec![
            Check::ModelId,
            Check::VariablePrediction,
            Check::FamilyParameter,
            Check::Datetime,
            Check::Duration,
            Check::ProjectId,
            Check::ReferenceDatetime,
        ]
    );
    assert_eq!(
        report.get(Check::SiteId).map(|c| c.status),
        Some(CheckStatus::Pass)
    );
}

#[test]
fn test_unreadable_file_is_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.csv");
    assert!(matches!(
        validate_forecast(&path),
        Err(ValidatorError::Open { .. })
    ));
}

#[test]
fn test_report_serializes() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(&dir, "forecast.csv", forecast::START_TIME_CSV);

    let report = validate_forecast(&path).unwrap();
    let json = serde_json::to_value(&report).unwrap();
    let checks = json["checks"].as_array().unwrap();
    assert_eq!(checks[0]["check"], "extension");
    assert_eq!(checks.last().unwrap()["status"], "warn");
}
