//! Spatial subsetting for site-level forecast extraction.
//!
//! Given a set of monitoring sites, [`compute_bounding_box`] returns the
//! smallest lat/lon rectangle that covers every site cluster plus a
//! buffer, so only that window of a global grid needs to be read.
//!
//! ```ignore
//! use gefs_common::Site;
//! use site_cluster::compute_bounding_box;
//!
//! let sites = vec![Site::new("NIWO", 40.05, -105.58), Site::new("GUAN", 17.97, -66.87)];
//! let bbox = compute_bounding_box(&sites, 2.0, 1000.0)?;
//! ```

pub mod dbscan;
pub mod error;
pub mod haversine;
pub mod subset;

pub use dbscan::Dbscan;
pub use error::{Result, SubsetError};
pub use haversine::{haversine_distance, km_to_radians, EARTH_RADIUS_KM};
pub use subset::{
    auto_spatial_subset, cluster_bounding_boxes, cluster_sites, compute_bounding_box,
    ClusterAssignment, ClusterBoundingBox, SubsetParams, DEFAULT_BUFFER_DEGREES,
    DEFAULT_CLUSTER_RADIUS_KM,
};
