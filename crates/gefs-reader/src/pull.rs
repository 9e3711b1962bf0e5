//! Site-level pulls from the GEFS analysis and forecast stores.
//!
//! Each pull narrows the store in the order that bounds network volume:
//! variables and time first, then the clustered site bounding box, then a
//! nearest-grid-point lookup per site inside the window that was read.

use std::ops::Range;

use chrono::Duration;
use tracing::{debug, info};

use gefs_common::{BoundingBox, LeadTime, SiteCollection, TimeRange};
use site_cluster::{auto_spatial_subset, SubsetParams};

use crate::axis::longitude_range;
use crate::error::{ReaderError, Result};
use crate::sampler::NearestSampler;
use crate::samples::{SampleRow, SiteSamples};
use crate::source::{Coordinates, GriddedSource, LeadingAxes, Product, Window};

/// Pull analysis values at every site for `range` (inclusive).
pub async fn pull_gefs_analysis<G: GriddedSource + ?Sized>(
    source: &G,
    range: &TimeRange,
    sites: &SiteCollection,
    variables: &[String],
    params: &SubsetParams,
) -> Result<SiteSamples> {
    expect_product(source, Product::Analysis)?;
    check_variables(source, variables).await?;

    let coords = source.coordinates();
    let time = match &coords.leading {
        LeadingAxes::Analysis { time } => time,
        LeadingAxes::Forecast { .. } => {
            return Err(ReaderError::invalid_metadata(
                "analysis store has forecast coordinates",
            ))
        }
    };
    let time_range = contiguous_range(time, |t| range.contains(t))
        .ok_or_else(|| ReaderError::empty_selection("time", range_text(range)))?;

    let bbox = auto_spatial_subset(sites, params)?;
    let window = spatial_window(coords, &bbox, vec![time_range.clone()])?;
    let sampler = NearestSampler::new(coords, &window, sites)?;

    let mut rows = Vec::new();
    for variable in variables {
        let data = source.read_window(variable, &window).await?;
        for (point, series) in sampler.sample(&data)? {
            for (step, value) in series.into_iter().enumerate() {
                rows.push(SampleRow {
                    site_id: point.site_id.clone(),
                    datetime: time[time_range.start + step],
                    reference_datetime: None,
                    horizon_hours: None,
                    ensemble_member: None,
                    variable: variable.clone(),
                    prediction: value,
                });
            }
        }
    }

    info!(
        sites = sites.len(),
        variables = variables.len(),
        times = time_range.len(),
        rows = rows.len(),
        bbox = %bbox,
        "Pulled GEFS analysis"
    );

    Ok(SiteSamples::new(Product::Analysis, rows))
}

/// Pull forecast values at every site for forecasts initialised within
/// `init_range` (inclusive), every ensemble member, and lead times from 0
/// up to and including `lead_time`.
pub async fn pull_gefs_operational<G: GriddedSource + ?Sized>(
    source: &G,
    init_range: &TimeRange,
    sites: &SiteCollection,
    lead_time: LeadTime,
    variables: &[String],
    params: &SubsetParams,
) -> Result<SiteSamples> {
    expect_product(source, Product::Forecast35Day)?;
    check_variables(source, variables).await?;

    let coords = source.coordinates();
    let (init_time, ensemble_member, leads) = match &coords.leading {
        LeadingAxes::Forecast {
            init_time,
            ensemble_member,
            lead_time,
        } => (init_time, ensemble_member, lead_time),
        LeadingAxes::Analysis { .. } => {
            return Err(ReaderError::invalid_metadata(
                "forecast store has analysis coordinates",
            ))
        }
    };

    let init_sel = contiguous_range(init_time, |t| init_range.contains(t))
        .ok_or_else(|| ReaderError::empty_selection("init_time", range_text(init_range)))?;
    let max_lead = lead_time.duration();
    let lead_sel = contiguous_range(leads, |d| *d >= Duration::zero() && *d <= max_lead)
        .ok_or_else(|| ReaderError::empty_selection("lead_time", format!("0h..={}", lead_time)))?;
    let member_sel = 0..ensemble_member.len();
    if member_sel.is_empty() {
        return Err(ReaderError::empty_selection("ensemble_member", "no members"));
    }

    let bbox = auto_spatial_subset(sites, params)?;
    let window = spatial_window(
        coords,
        &bbox,
        vec![init_sel.clone(), member_sel.clone(), lead_sel.clone()],
    )?;
    let sampler = NearestSampler::new(coords, &window, sites)?;

    let (n_members, n_leads) = (member_sel.len(), lead_sel.len());
    let mut rows = Vec::new();
    for variable in variables {
        let data = source.read_window(variable, &window).await?;
        for (point, series) in sampler.sample(&data)? {
            for (step, value) in series.into_iter().enumerate() {
                let init = init_time[init_sel.start + step / (n_members * n_leads)];
                let member = ensemble_member[(step / n_leads) % n_members];
                let lead = leads[lead_sel.start + step % n_leads];
                rows.push(SampleRow {
                    site_id: point.site_id.clone(),
                    datetime: init + lead,
                    reference_datetime: Some(init),
                    horizon_hours: Some(lead.num_seconds() as f64 / 3600.0),
                    ensemble_member: Some(member),
                    variable: variable.clone(),
                    prediction: value,
                });
            }
        }
    }

    info!(
        sites = sites.len(),
        variables = variables.len(),
        init_times = init_sel.len(),
        members = n_members,
        lead_times = n_leads,
        rows = rows.len(),
        bbox = %bbox,
        "Pulled GEFS forecast"
    );

    Ok(SiteSamples::new(Product::Forecast35Day, rows))
}

fn expect_product<G: GriddedSource + ?Sized>(source: &G, expected: Product) -> Result<()> {
    if source.product() != expected {
        return Err(ReaderError::invalid_request(format!(
            "expected a {} store, got {}",
            expected,
            source.product()
        )));
    }
    Ok(())
}

async fn check_variables<G: GriddedSource + ?Sized>(source: &G, variables: &[String]) -> Result<()> {
    if variables.is_empty() {
        return Err(ReaderError::invalid_request("no variables requested"));
    }
    for variable in variables {
        if !source.has_variable(variable).await? {
            return Err(ReaderError::MissingVariable(variable.clone()));
        }
    }
    Ok(())
}

/// Filter a store's variable list down to those it actually holds.
pub async fn available_variables<G: GriddedSource + ?Sized>(
    source: &G,
    candidates: &[String],
) -> Result<Vec<String>> {
    let mut found = Vec::with_capacity(candidates.len());
    for name in candidates {
        if source.has_variable(name).await? {
            found.push(name.clone());
        } else {
            tracing::warn!(variable = %name, "Variable not in store, skipping");
        }
    }
    Ok(found)
}

/// Window over `bbox` with the given leading ranges.
pub fn spatial_window(
    coords: &Coordinates,
    bbox: &BoundingBox,
    leading: Vec<Range<usize>>,
) -> Result<Window> {
    let latitude = coords
        .latitude
        .index_range(bbox.min_lat, bbox.max_lat)
        .ok_or_else(|| ReaderError::empty_selection("latitude", bbox.to_string()))?;
    let longitude = longitude_range(&coords.longitude, bbox.min_lon, bbox.max_lon)
        .ok_or_else(|| ReaderError::empty_selection("longitude", bbox.to_string()))?;

    debug!(
        bbox = %bbox,
        latitude = ?latitude,
        longitude = ?longitude,
        "Spatial window"
    );

    Ok(Window {
        leading,
        latitude,
        longitude,
    })
}

/// First through last index matching `pred` on a sorted axis.
fn contiguous_range<T>(values: &[T], pred: impl Fn(&T) -> bool) -> Option<Range<usize>> {
    let first = values.iter().position(&pred)?;
    let last = values.iter().rposition(&pred)?;
    Some(first..last + 1)
}

fn range_text(range: &TimeRange) -> String {
    format!("{}..={}", range.start, range.end)
}
