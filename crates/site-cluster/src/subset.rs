//! Site clustering and bounding-box union for spatial subsetting.
//!
//! Sites are grouped by great-circle proximity, each group gets its own
//! padded box, and the padded boxes are unioned into the single rectangle
//! used to window a gridded store before per-site nearest-point sampling.
//!
//! ```text
//! sites (deg) ──► radians ──► DBSCAN(haversine, eps = km / R, min_samples = 1)
//!                                   │
//!                                   ▼
//!                     per-cluster tight box + buffer
//!                                   │
//!                                   ▼
//!                         union ──► BoundingBox
//! ```
//!
//! The union covers the same area as one padded box around every site
//! whenever the clusters are far apart; it is still the returned contract,
//! and the per-cluster boxes are exposed for callers that fetch clusters
//! separately.

use gefs_common::{BoundingBox, Site, SiteCollection};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::dbscan::Dbscan;
use crate::error::{Result, SubsetError};
use crate::haversine::{haversine_distance, km_to_radians};

/// Default padding around each cluster, in degrees.
pub const DEFAULT_BUFFER_DEGREES: f64 = 2.0;

/// Default clustering radius, in kilometres.
pub const DEFAULT_CLUSTER_RADIUS_KM: f64 = 1000.0;

/// Every site is a core point, so outliers become singleton clusters.
const MIN_SAMPLES: usize = 1;

/// Parameters for [`auto_spatial_subset`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubsetParams {
    /// Degrees of padding added on every side of each cluster box.
    pub buffer_degrees: f64,
    /// Great-circle neighbourhood radius for clustering, in kilometres.
    pub cluster_radius_km: f64,
}

impl Default for SubsetParams {
    fn default() -> Self {
        Self {
            buffer_degrees: DEFAULT_BUFFER_DEGREES,
            cluster_radius_km: DEFAULT_CLUSTER_RADIUS_KM,
        }
    }
}

impl SubsetParams {
    pub fn validate(&self) -> Result<()> {
        if !self.buffer_degrees.is_finite() || self.buffer_degrees < 0.0 {
            return Err(SubsetError::invalid_input(format!(
                "buffer_degrees must be a finite number >= 0, got {}",
                self.buffer_degrees
            )));
        }
        if !self.cluster_radius_km.is_finite() || self.cluster_radius_km <= 0.0 {
            return Err(SubsetError::invalid_input(format!(
                "cluster_radius_km must be a finite number > 0, got {}",
                self.cluster_radius_km
            )));
        }
        Ok(())
    }
}

/// Cluster label for every site, in input order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterAssignment {
    labels: Vec<usize>,
    num_clusters: usize,
}

impl ClusterAssignment {
    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    pub fn num_clusters(&self) -> usize {
        self.num_clusters
    }

    /// Site indices grouped by cluster label.
    pub fn groups(&self) -> Vec<Vec<usize>> {
        let mut groups = vec![Vec::new(); self.num_clusters];
        for (idx, &label) in self.labels.iter().enumerate() {
            groups[label].push(idx);
        }
        groups
    }
}

/// Padded bounding box of one cluster.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClusterBoundingBox {
    pub label: usize,
    pub num_sites: usize,
    pub bbox: BoundingBox,
}

fn validate_sites(sites: &[Site]) -> Result<()> {
    if sites.is_empty() {
        return Err(SubsetError::invalid_input("site collection is empty"));
    }
    for site in sites {
        site.validate()?;
    }
    Ok(())
}

/// Cluster sites by great-circle proximity.
///
/// Two sites share a cluster when they are linked by a chain of sites each
/// within `cluster_radius_km` of the next.
pub fn cluster_sites(sites: &[Site], cluster_radius_km: f64) -> Result<ClusterAssignment> {
    validate_sites(sites)?;
    if !cluster_radius_km.is_finite() || cluster_radius_km <= 0.0 {
        return Err(SubsetError::invalid_input(format!(
            "cluster_radius_km must be a finite number > 0, got {}",
            cluster_radius_km
        )));
    }

    let radians: Vec<(f64, f64)> = sites.iter().map(Site::to_radians).collect();
    let dbscan = Dbscan::new(km_to_radians(cluster_radius_km), MIN_SAMPLES)?;
    let raw = dbscan.fit_predict(&radians, |a, b| haversine_distance(*a, *b))?;

    let labels = raw
        .iter()
        .zip(sites)
        .map(|(label, site)| {
            label.ok_or_else(|| {
                SubsetError::clustering(format!("site '{}' was left unassigned", site.site_id))
            })
        })
        .collect::<Result<Vec<usize>>>()?;

    let num_clusters = labels.iter().max().map_or(0, |max| max + 1);

    debug!(
        sites = sites.len(),
        clusters = num_clusters,
        radius_km = cluster_radius_km,
        "Clustered sites"
    );

    Ok(ClusterAssignment {
        labels,
        num_clusters,
    })
}

/// Tight box of each cluster's members, padded by `buffer_degrees`.
pub fn cluster_bounding_boxes(
    sites: &[Site],
    assignment: &ClusterAssignment,
    buffer_degrees: f64,
) -> Result<Vec<ClusterBoundingBox>> {
    if assignment.labels.len() != sites.len() {
        return Err(SubsetError::clustering(format!(
            "assignment covers {} sites but {} were given",
            assignment.labels.len(),
            sites.len()
        )));
    }

    assignment
        .groups()
        .into_iter()
        .enumerate()
        .map(|(label, members)| {
            let num_sites = members.len();
            let tight = BoundingBox::enclosing(
                members
                    .into_iter()
                    .map(|i| (sites[i].latitude, sites[i].longitude)),
            )
            .ok_or_else(|| SubsetError::clustering(format!("cluster {} has no sites", label)))?;

            Ok(ClusterBoundingBox {
                label,
                num_sites,
                bbox: tight.expand(buffer_degrees),
            })
        })
        .collect()
}

/// Single bounding box covering every cluster's padded extent.
///
/// Fails with [`SubsetError::InvalidInput`] for an empty site list, an
/// out-of-range or non-finite coordinate, a negative buffer or a
/// non-positive radius.
pub fn compute_bounding_box(
    sites: &[Site],
    buffer_degrees: f64,
    cluster_radius_km: f64,
) -> Result<BoundingBox> {
    let params = SubsetParams {
        buffer_degrees,
        cluster_radius_km,
    };
    params.validate()?;

    let assignment = cluster_sites(sites, cluster_radius_km)?;
    let boxes = cluster_bounding_boxes(sites, &assignment, buffer_degrees)?;

    let union = boxes
        .iter()
        .map(|c| c.bbox)
        .reduce(|acc, b| acc.union(&b))
        .ok_or_else(|| SubsetError::clustering("no clusters produced"))?;

    debug!(
        clusters = boxes.len(),
        bbox = %union,
        "Computed spatial subset"
    );

    Ok(union)
}

/// [`compute_bounding_box`] over a site collection.
pub fn auto_spatial_subset(sites: &SiteCollection, params: &SubsetParams) -> Result<BoundingBox> {
    compute_bounding_box(sites.sites(), params.buffer_degrees, params.cluster_radius_km)
}
