//! End-to-end submission flow with stand-in CLI programs.
//!
//! `true` accepts any arguments and exits 0; `false` always exits 1.

use std::path::{Path, PathBuf};

use forecast_submit::{submit, AutoConfirm, AwsCli, SubmitError, SubmitOptions, SubmitOutcome};
use tempfile::TempDir;
use test_utils::fixtures::forecast;

fn forecast_file(dir: &TempDir, contents: &str) -> PathBuf {
    let path = dir.path().join("neon4cast-climatology-2024-01-01.csv");
    std::fs::write(&path, contents).unwrap();
    path
}

fn options(program: &str) -> SubmitOptions {
    SubmitOptions::default()
        .with_ask(false)
        .with_cli_program(program)
}

#[tokio::test]
async fn test_valid_file_is_submitted() {
    let dir = tempfile::tempdir().unwrap();
    let file = forecast_file(&dir, forecast::VALID_CSV);

    let outcome = submit(
        Some(file.as_path()),
        Some("neon4cast"),
        &options("true"),
        &mut AutoConfirm(false),
    )
    .await
    .unwrap();

    match outcome {
        SubmitOutcome::Submitted { destination, .. } => assert_eq!(
            destination,
            "s3://submissions/neon4cast/neon4cast-climatology-2024-01-01.csv"
        ),
        other => panic!("expected submission, got {:?}", other),
    }
}

#[tokio::test]
async fn test_invalid_file_is_rejected_before_upload() {
    let dir = tempfile::tempdir().unwrap();
    let file = forecast_file(&dir, forecast::ENSEMBLE_CSV);

    // A missing program would fail if the upload were attempted.
    let outcome = submit(
        Some(file.as_path()),
        Some("neon4cast"),
        &options("definitely-not-an-aws-cli"),
        &mut AutoConfirm(true),
    )
    .await
    .unwrap();

    match outcome {
        SubmitOutcome::Rejected(report) => assert!(!report.is_valid()),
        other => panic!("expected rejection, got {:?}", other),
    }
}

#[tokio::test]
async fn test_declined_prompt() {
    let dir = tempfile::tempdir().unwrap();
    let file = forecast_file(&dir, forecast::VALID_CSV);

    let outcome = submit(
        Some(file.as_path()),
        Some("neon4cast"),
        &options("true").with_ask(true),
        &mut AutoConfirm(false),
    )
    .await
    .unwrap();
    assert!(matches!(outcome, SubmitOutcome::Declined));
}

#[tokio::test]
async fn test_confirmed_prompt_uploads() {
    let dir = tempfile::tempdir().unwrap();
    let file = forecast_file(&dir, forecast::VALID_CSV);

    let outcome = submit(
        Some(file.as_path()),
        Some("neon4cast"),
        &options("true").with_ask(true),
        &mut AutoConfirm(true),
    )
    .await
    .unwrap();
    assert!(outcome.is_submitted());
}

#[tokio::test]
async fn test_missing_arguments() {
    let dir = tempfile::tempdir().unwrap();
    let file = forecast_file(&dir, forecast::VALID_CSV);

    let result = submit(None, Some("neon4cast"), &options("true"), &mut AutoConfirm(true)).await;
    assert!(matches!(result, Err(SubmitError::MissingArgument("forecast_file"))));

    let result = submit(Some(file.as_path()), None, &options("true"), &mut AutoConfirm(true)).await;
    assert!(matches!(result, Err(SubmitError::MissingArgument("project_id"))));
}

#[tokio::test]
async fn test_failing_cli_is_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let file = forecast_file(&dir, forecast::VALID_CSV);

    let result = submit(Some(file.as_path()), Some("neon4cast"), &options("false"), &mut AutoConfirm(true)).await;
    assert!(matches!(result, Err(SubmitError::CliUnavailable { .. })));

    let result = submit(
        Some(file.as_path()),
        Some("neon4cast"),
        &options("definitely-not-an-aws-cli"),
        &mut AutoConfirm(true),
    )
    .await;
    assert!(matches!(result, Err(SubmitError::CliUnavailable { .. })));
}

#[tokio::test]
async fn test_failed_copy_is_an_error() {
    let cli = AwsCli::new("false").unwrap();
    let result = cli
        .copy(
            Path::new("/tmp/forecast.csv"),
            "neon4cast",
            &SubmitOptions::default(),
        )
        .await;
    assert!(matches!(
        result,
        Err(SubmitError::UploadFailed { status: Some(1), .. })
    ));
}
