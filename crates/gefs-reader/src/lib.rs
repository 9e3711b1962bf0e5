//! Site-level access to NOAA GEFS driver data.
//!
//! Two kinds of stores are read:
//!
//! - **Gridded Zarr stores** published by dynamical.org (the GEFS analysis
//!   and the 35-day forecast). Only the chunks covering the sites' clustered
//!   bounding box and the requested time span are fetched; each site is
//!   then snapped to its nearest grid point.
//! - **EFI driver stages** on the OSN bucket: hive-partitioned Parquet
//!   datasets listed through `object_store` and decoded into Arrow record
//!   batches.
//!
//! # Architecture
//!
//! ```text
//! SiteCollection ──► auto_spatial_subset ──► BoundingBox
//!                                               │
//! TimeRange / LeadTime ──────────────────┐      │
//!                                        ▼      ▼
//!                               spatial_window (index ranges)
//!                                        │
//!                                        ▼
//!                        GriddedSource::read_window (zarrs)
//!                                        │
//!                                        ▼
//!                         NearestSampler ──► SiteSamples
//! ```
//!
//! # Example
//!
//! ```ignore
//! use gefs_reader::{open_source, pull_gefs_analysis, DynamicalConfig, Product};
//!
//! let config = DynamicalConfig::from_env();
//! let source = open_source(Product::Analysis, None, &config)?;
//! let samples = pull_gefs_analysis(&source, &range, &sites, &variables, &params).await?;
//! samples.write_csv(std::io::stdout())?;
//! ```

pub mod axis;
pub mod config;
pub mod error;
pub mod pull;
pub mod sampler;
pub mod samples;
pub mod source;
pub mod stages;
pub mod storage;

// Re-export commonly used types at crate root
pub use axis::{longitude_range, CoordinateAxis, LongitudeConvention};
pub use config::{
    DynamicalConfig, S3EndpointConfig, DEFAULT_ANALYSIS_URL, DEFAULT_EFI_BUCKET,
    DEFAULT_EFI_ENDPOINT, DEFAULT_FORECAST_URL,
};
pub use error::{ReaderError, Result};
pub use pull::{available_variables, pull_gefs_analysis, pull_gefs_operational, spatial_window};
pub use sampler::{NearestSampler, SitePoint};
pub use samples::{SampleRow, SiteSamples, VariableComparison};
pub use source::{
    open_source, Coordinates, GriddedSource, LeadingAxes, Product, Window, WindowData, ZarrSource,
};
pub use stages::{
    hive_partitions, row_count, Stage, StageDataset, StageFile, StageRequest, REFERENCE_DATETIME,
};
pub use storage::{
    efi_object_store, open_filesystem_storage, open_http_storage, open_storage, HttpStorage,
    TokioBlockOn,
};
