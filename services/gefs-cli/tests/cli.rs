//! Runs the `gefs` binary end to end on local files.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use test_utils::fixtures::{forecast, sites};
use test_utils::temp_test_dir;

fn gefs(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_gefs"))
        .args(args)
        .env_remove("GEFS_CONFIG")
        .env("LOG_LEVEL", "error")
        .output()
        .expect("Failed to run gefs")
}

fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_bbox_prints_clusters() {
    let dir = temp_test_dir("gefs_cli_");
    let sites = write(dir.path(), "sites.csv", sites::METADATA_CSV);

    let output = gefs(&["bbox", "--sites", sites.to_str().unwrap()]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    // NIWO and KONZ cluster together; GUAN is on its own.
    assert_eq!(report["clusters"].as_array().unwrap().len(), 2);
    assert_eq!(report["params"]["buffer_degrees"], 2.0);
    assert!(report["bbox"]["min_lat"].as_f64().unwrap() <= 17.96955 - 2.0);
    assert!(report["bbox"]["max_lon"].as_f64().unwrap() >= -66.8687 + 2.0);
}

#[test]
fn test_bbox_site_filter_and_radius() {
    let dir = temp_test_dir("gefs_cli_");
    let sites = write(dir.path(), "sites.csv", sites::METADATA_CSV);

    let output = gefs(&[
        "bbox",
        "--sites",
        sites.to_str().unwrap(),
        "--site-id",
        "NIWO,KONZ",
        "--radius-km",
        "100",
    ]);
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["clusters"].as_array().unwrap().len(), 2);
    assert_eq!(report["params"]["cluster_radius_km"], 100.0);
}

#[test]
fn test_bbox_unknown_site_fails() {
    let dir = temp_test_dir("gefs_cli_");
    let sites = write(dir.path(), "sites.csv", sites::METADATA_CSV);

    let output = gefs(&["bbox", "--sites", sites.to_str().unwrap(), "--site-id", "NOPE"]);
    assert!(!output.status.success());
}

#[test]
fn test_validate_exit_codes() {
    let dir = temp_test_dir("gefs_cli_");

    let valid = write(dir.path(), "valid.csv", forecast::VALID_CSV);
    let output = gefs(&["validate", valid.to_str().unwrap()]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("Forecast format is valid"));

    let invalid = write(dir.path(), "ensemble.csv", forecast::ENSEMBLE_CSV);
    let output = gefs(&["validate", invalid.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stdout).contains("not valid"));
}

#[test]
fn test_submit_with_stand_in_cli() {
    let dir = temp_test_dir("gefs_cli_");
    let file = write(dir.path(), "neon4cast-test-2024-01-01.csv", forecast::VALID_CSV);

    let output = gefs(&[
        "submit",
        file.to_str().unwrap(),
        "--project-id",
        "neon4cast",
        "--yes",
        "--cli-program",
        "true",
    ]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert!(String::from_utf8_lossy(&output.stdout)
        .contains("s3://submissions/neon4cast/neon4cast-test-2024-01-01.csv"));
}

#[test]
fn test_stage_rejects_unknown_number() {
    let output = gefs(&["stage", "--stage", "4", "--project-id", "neon4cast"]);
    assert!(!output.status.success());
}

#[test]
fn test_compare_sample_files() {
    let dir = temp_test_dir("gefs_cli_");
    let header = "site_id,datetime,reference_datetime,horizon_hours,ensemble_member,variable,prediction\n";
    let candidate = write(
        dir.path(),
        "dynamical.csv",
        &format!(
            "{header}NIWO,2024-01-01T00:00:00Z,,,,air_temperature,270.0\n\
             NIWO,2024-01-01T06:00:00Z,,,,air_temperature,272.0\n\
             NIWO,2024-01-01T12:00:00Z,,,,air_temperature,275.0\n"
        ),
    );
    let reference = write(
        dir.path(),
        "stage3.csv",
        &format!(
            "{header}NIWO,2024-01-01T00:00:00Z,,,,air_temperature,270.5\n\
             NIWO,2024-01-01T06:00:00Z,,,,air_temperature,272.5\n\
             NIWO,2024-01-01T12:00:00Z,,,,air_temperature,275.5\n"
        ),
    );

    let output = gefs(&[
        "compare",
        "--candidate",
        candidate.to_str().unwrap(),
        "--reference",
        reference.to_str().unwrap(),
    ]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report[0]["n"], 3);
    assert_eq!(report[0]["mean_diff"], -0.5);
    assert_eq!(report[0]["acceptable"], true);
}
