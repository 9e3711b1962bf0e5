//! Integration test: pull ensemble forecasts from a local forecast store.

mod common;

use chrono::{Duration, TimeZone, Utc};
use gefs_common::{LeadTime, Site, SiteCollection, TimeRange};
use gefs_reader::{
    open_source, pull_gefs_analysis, pull_gefs_operational, DynamicalConfig, GriddedSource,
    LeadingAxes, Product, ReaderError, ZarrSource,
};
use site_cluster::SubsetParams;
use test_utils::fixtures::grid;
use zarrs_storage::ReadableStorageTraits;

use common::{forecast_path, forecast_value, write_forecast_store};

const LEAD_HOURS: [i64; 4] = [0, 6, 12, 24];

fn open(dir: &tempfile::TempDir) -> ZarrSource<dyn ReadableStorageTraits> {
    let path = forecast_path(dir);
    open_source(Product::Forecast35Day, path.to_str(), &DynamicalConfig::default())
        .expect("Failed to open forecast store")
}

fn niwo() -> SiteCollection {
    SiteCollection::new(vec![Site::new("NIWO", 40.05, -105.58)]).unwrap()
}

fn temperature() -> Vec<String> {
    vec!["temperature_2m".to_string()]
}

#[tokio::test]
async fn test_open_decodes_forecast_axes() {
    let dir = write_forecast_store(&grid::COLORADO_1DEG, 2, 3, &LEAD_HOURS).unwrap();
    let source = open(&dir);

    match &source.coordinates().leading {
        LeadingAxes::Forecast {
            init_time,
            ensemble_member,
            lead_time,
        } => {
            assert_eq!(
                init_time,
                &vec![
                    Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap(),
                    Utc.with_ymd_and_hms(2024, 1, 16, 0, 0, 0).unwrap(),
                ]
            );
            assert_eq!(ensemble_member, &vec![0i64, 1, 2]);
            assert_eq!(lead_time[3], Duration::hours(24));
        }
        other => panic!("unexpected leading axes {:?}", other),
    }
}

#[tokio::test]
async fn test_pull_every_member_up_to_lead() {
    let dir = write_forecast_store(&grid::COLORADO_1DEG, 2, 3, &LEAD_HOURS).unwrap();
    let source = open(&dir);

    let range = TimeRange::parse("2024-01-15", "2024-01-16").unwrap();
    let samples = pull_gefs_operational(
        &source,
        &range,
        &niwo(),
        LeadTime::parse("12h").unwrap(),
        &temperature(),
        &SubsetParams::default(),
    )
    .await
    .expect("Pull failed");

    // 2 inits x 3 members x 3 leads (0, 6, 12 h)
    assert_eq!(samples.len(), 18);

    for row in samples.rows() {
        let init = row.reference_datetime.expect("forecast rows carry an init time");
        let hours = row.horizon_hours.expect("forecast rows carry a horizon");
        assert!(hours <= 12.0);
        assert_eq!(row.datetime, init + Duration::hours(hours as i64));
        assert!(row.ensemble_member.is_some());
    }

    // Row order follows [init, member, lead]; NIWO is row 2, col 2.
    let rows = samples.rows();
    assert_eq!(rows[0].prediction, forecast_value(0, 0, 0, 2, 2));
    assert_eq!(rows[4].ensemble_member, Some(1));
    assert_eq!(rows[4].horizon_hours, Some(6.0));
    assert_eq!(rows[4].prediction, forecast_value(0, 1, 1, 2, 2));
    assert_eq!(
        rows[17].reference_datetime,
        Some(Utc.with_ymd_and_hms(2024, 1, 16, 0, 0, 0).unwrap())
    );
    assert_eq!(rows[17].prediction, forecast_value(1, 2, 2, 2, 2));
}

#[tokio::test]
async fn test_single_init() {
    let dir = write_forecast_store(&grid::COLORADO_1DEG, 3, 2, &LEAD_HOURS).unwrap();
    let source = open(&dir);

    let range = TimeRange::parse("2024-01-16", "2024-01-16").unwrap();
    let samples = pull_gefs_operational(
        &source,
        &range,
        &niwo(),
        LeadTime::parse("1d").unwrap(),
        &temperature(),
        &SubsetParams::default(),
    )
    .await
    .unwrap();

    // 1 init x 2 members x 4 leads
    assert_eq!(samples.len(), 8);
    assert!(samples.rows().iter().all(|r| r.reference_datetime
        == Some(Utc.with_ymd_and_hms(2024, 1, 16, 0, 0, 0).unwrap())));
}

#[tokio::test]
async fn test_init_range_outside_store() {
    let dir = write_forecast_store(&grid::COLORADO_1DEG, 2, 2, &LEAD_HOURS).unwrap();
    let source = open(&dir);

    let range = TimeRange::parse("2023-06-01", "2023-06-02").unwrap();
    let result = pull_gefs_operational(
        &source,
        &range,
        &niwo(),
        LeadTime::parse("12h").unwrap(),
        &temperature(),
        &SubsetParams::default(),
    )
    .await;
    assert!(matches!(result, Err(ReaderError::EmptySelection { axis, .. }) if axis == "init_time"));
}

#[tokio::test]
async fn test_analysis_pull_rejects_forecast_store() {
    let dir = write_forecast_store(&grid::COLORADO_1DEG, 1, 1, &LEAD_HOURS).unwrap();
    let source = open(&dir);

    let range = TimeRange::parse("2024-01-15", "2024-01-16").unwrap();
    let result = pull_gefs_analysis(
        &source,
        &range,
        &niwo(),
        &temperature(),
        &SubsetParams::default(),
    )
    .await;
    assert!(matches!(result, Err(ReaderError::InvalidRequest(_))));
}
