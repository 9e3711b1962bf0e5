//! Writers for small local GEFS-shaped Zarr stores.
//!
//! Stores follow the dynamical.org layout: 1-D coordinate arrays at the
//! root plus data variables whose dimension names are recorded in the
//! `_ARRAY_DIMENSIONS` attribute.

#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use tempfile::TempDir;
use test_utils::fixtures::grid::GridSpec;
use test_utils::{create_test_grid, create_time_series_grid};
use zarrs::array::{ArrayBuilder, DataType, FillValue};
use zarrs::array_subset::ArraySubset;
use zarrs_filesystem::FilesystemStore;

pub type BoxError = Box<dyn std::error::Error>;

/// Analysis time axis: 6-hourly from this epoch.
pub const TIME_UNITS: &str = "hours since 2024-01-01T00:00:00";
pub const ANALYSIS_STEP_HOURS: i64 = 6;

/// Forecast init axis: daily from this epoch.
pub const INIT_UNITS: &str = "hours since 2024-01-15T00:00:00";

fn attributes(dims: &[&str], units: Option<&str>) -> serde_json::Map<String, serde_json::Value> {
    let mut attrs = serde_json::Map::new();
    attrs.insert("_ARRAY_DIMENSIONS".to_string(), serde_json::json!(dims));
    if let Some(units) = units {
        attrs.insert("units".to_string(), serde_json::json!(units));
    }
    attrs
}

fn open_store(path: &Path) -> Result<Arc<FilesystemStore>, BoxError> {
    std::fs::create_dir_all(path)?;
    Ok(Arc::new(FilesystemStore::new(path)?))
}

/// Write a Float64 1-D coordinate array.
pub fn write_f64_coordinate(
    path: &Path,
    name: &str,
    values: &[f64],
    units: Option<&str>,
) -> Result<(), BoxError> {
    let store = open_store(path)?;
    let len = values.len() as u64;
    let array = ArrayBuilder::new(
        vec![len],
        DataType::Float64,
        vec![len.max(1)].try_into()?,
        FillValue::from(f64::NAN),
    )
    .attributes(attributes(&[name], units))
    .build(store, &format!("/{}", name))?;

    array.store_metadata()?;
    let subset = ArraySubset::new_with_start_shape(vec![0], vec![len])?;
    array.store_array_subset_elements(&subset, values)?;
    Ok(())
}

/// Write an Int64 1-D coordinate array.
pub fn write_i64_coordinate(
    path: &Path,
    name: &str,
    values: &[i64],
    units: Option<&str>,
) -> Result<(), BoxError> {
    let store = open_store(path)?;
    let len = values.len() as u64;
    let array = ArrayBuilder::new(
        vec![len],
        DataType::Int64,
        vec![len.max(1)].try_into()?,
        FillValue::from(0i64),
    )
    .attributes(attributes(&[name], units))
    .build(store, &format!("/{}", name))?;

    array.store_metadata()?;
    let subset = ArraySubset::new_with_start_shape(vec![0], vec![len])?;
    array.store_array_subset_elements(&subset, values)?;
    Ok(())
}

/// Write a Float32 data variable, chunked by `chunk` along every dimension.
pub fn write_variable(
    path: &Path,
    name: &str,
    dims: &[&str],
    shape: Vec<u64>,
    chunk: u64,
    data: &[f32],
) -> Result<(), BoxError> {
    let store = open_store(path)?;
    let chunks: Vec<u64> = shape.iter().map(|&n| n.min(chunk).max(1)).collect();
    let array = ArrayBuilder::new(
        shape.clone(),
        DataType::Float32,
        chunks.try_into()?,
        FillValue::from(f32::NAN),
    )
    .attributes(attributes(dims, Some("test")))
    .build(store, &format!("/{}", name))?;

    array.store_metadata()?;
    let subset = ArraySubset::new_with_start_shape(vec![0; shape.len()], shape)?;
    array.store_array_subset_elements(&subset, data)?;
    Ok(())
}

fn write_spatial_axes(path: &Path, grid: &GridSpec) -> Result<(), BoxError> {
    write_f64_coordinate(path, "latitude", &grid.latitudes(), Some("degrees_north"))?;
    write_f64_coordinate(path, "longitude", &grid.longitudes(), Some("degrees_east"))?;
    Ok(())
}

/// Analysis store with `steps` 6-hourly times.
///
/// `temperature_2m` at `[t, row, col]` is `t * 100000 + col * 1000 + row`;
/// `precipitation_surface` is the plain test grid at every step.
pub fn write_analysis_store(grid: &GridSpec, steps: usize) -> Result<TempDir, BoxError> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("analysis.zarr");

    write_spatial_axes(&path, grid)?;
    let times: Vec<i64> = (0..steps as i64).map(|i| i * ANALYSIS_STEP_HOURS).collect();
    write_i64_coordinate(&path, "time", &times, Some(TIME_UNITS))?;

    let dims = ["time", "latitude", "longitude"];
    let shape = vec![steps as u64, grid.lat_count as u64, grid.lon_count as u64];
    write_variable(
        &path,
        "temperature_2m",
        &dims,
        shape.clone(),
        4,
        &create_time_series_grid(steps, grid.lon_count, grid.lat_count),
    )?;

    let plane = create_test_grid(grid.lon_count, grid.lat_count);
    let precip: Vec<f32> = (0..steps).flat_map(|_| plane.iter().copied()).collect();
    write_variable(&path, "precipitation_surface", &dims, shape, 4, &precip)?;

    Ok(dir)
}

/// Path of the store written by [`write_analysis_store`].
pub fn analysis_path(dir: &TempDir) -> std::path::PathBuf {
    dir.path().join("analysis.zarr")
}

/// Value written at one analysis cell.
pub fn analysis_value(step: usize, row: usize, col: usize) -> f64 {
    (step * 100_000 + col * 1000 + row) as f64
}

/// Forecast store with daily inits, `members` ensemble members and the
/// given lead hours.
///
/// `temperature_2m` at `[i, m, l, row, col]` is
/// `i * 1e6 + m * 1e5 + l * 1e4 + col * 100 + row`.
pub fn write_forecast_store(
    grid: &GridSpec,
    inits: usize,
    members: usize,
    lead_hours: &[i64],
) -> Result<TempDir, BoxError> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("forecast.zarr");

    write_spatial_axes(&path, grid)?;
    let init_values: Vec<i64> = (0..inits as i64).map(|i| i * 24).collect();
    write_i64_coordinate(&path, "init_time", &init_values, Some(INIT_UNITS))?;
    let member_values: Vec<i64> = (0..members as i64).collect();
    write_i64_coordinate(&path, "ensemble_member", &member_values, None)?;
    write_i64_coordinate(&path, "lead_time", lead_hours, Some("hours"))?;

    let mut data = Vec::with_capacity(inits * members * lead_hours.len() * grid.size());
    for i in 0..inits {
        for m in 0..members {
            for l in 0..lead_hours.len() {
                for row in 0..grid.lat_count {
                    for col in 0..grid.lon_count {
                        data.push(forecast_value(i, m, l, row, col) as f32);
                    }
                }
            }
        }
    }

    write_variable(
        &path,
        "temperature_2m",
        &[
            "init_time",
            "ensemble_member",
            "lead_time",
            "latitude",
            "longitude",
        ],
        vec![
            inits as u64,
            members as u64,
            lead_hours.len() as u64,
            grid.lat_count as u64,
            grid.lon_count as u64,
        ],
        3,
        &data,
    )?;

    Ok(dir)
}

pub fn forecast_path(dir: &TempDir) -> std::path::PathBuf {
    dir.path().join("forecast.zarr")
}

pub fn forecast_value(init: usize, member: usize, lead: usize, row: usize, col: usize) -> f64 {
    (init * 1_000_000 + member * 100_000 + lead * 10_000 + col * 100 + row) as f64
}
