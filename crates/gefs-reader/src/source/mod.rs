//! Gridded GEFS sources and the window types they read.

mod zarr;

pub use zarr::ZarrSource;

use std::ops::Range;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use zarrs::storage::ReadableStorageTraits;

use crate::axis::CoordinateAxis;
use crate::config::DynamicalConfig;
use crate::error::{ReaderError, Result};
use crate::storage::open_storage;

/// The dynamical.org GEFS products and their array layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Product {
    /// Variables shaped `[time, latitude, longitude]`.
    Analysis,
    /// Variables shaped `[init_time, ensemble_member, lead_time, latitude, longitude]`.
    Forecast35Day,
}

impl Product {
    /// Dimension names of every data variable, outermost first.
    pub fn dimensions(&self) -> &'static [&'static str] {
        match self {
            Product::Analysis => &["time", "latitude", "longitude"],
            Product::Forecast35Day => &[
                "init_time",
                "ensemble_member",
                "lead_time",
                "latitude",
                "longitude",
            ],
        }
    }

    /// Number of dimensions ahead of latitude/longitude.
    pub fn leading_rank(&self) -> usize {
        self.dimensions().len() - 2
    }

    pub fn name(&self) -> &'static str {
        match self {
            Product::Analysis => "analysis",
            Product::Forecast35Day => "forecast-35-day",
        }
    }

    /// Configured store URL for this product.
    pub fn url<'a>(&self, config: &'a DynamicalConfig) -> &'a str {
        match self {
            Product::Analysis => &config.analysis_url,
            Product::Forecast35Day => &config.forecast_url,
        }
    }
}

impl std::fmt::Display for Product {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Decoded non-spatial coordinates of a product.
#[derive(Debug, Clone, PartialEq)]
pub enum LeadingAxes {
    Analysis {
        time: Vec<DateTime<Utc>>,
    },
    Forecast {
        init_time: Vec<DateTime<Utc>>,
        ensemble_member: Vec<i64>,
        lead_time: Vec<Duration>,
    },
}

impl LeadingAxes {
    /// Length of each leading dimension, in array order.
    pub fn shape(&self) -> Vec<usize> {
        match self {
            LeadingAxes::Analysis { time } => vec![time.len()],
            LeadingAxes::Forecast {
                init_time,
                ensemble_member,
                lead_time,
            } => vec![init_time.len(), ensemble_member.len(), lead_time.len()],
        }
    }
}

/// All coordinates of an opened store.
#[derive(Debug, Clone, PartialEq)]
pub struct Coordinates {
    pub leading: LeadingAxes,
    pub latitude: CoordinateAxis,
    pub longitude: CoordinateAxis,
}

impl Coordinates {
    pub fn product(&self) -> Product {
        match self.leading {
            LeadingAxes::Analysis { .. } => Product::Analysis,
            LeadingAxes::Forecast { .. } => Product::Forecast35Day,
        }
    }
}

/// A hyper-rectangle of array indices: leading dimensions, then lat/lon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Window {
    pub leading: Vec<Range<usize>>,
    pub latitude: Range<usize>,
    pub longitude: Range<usize>,
}

impl Window {
    /// Start offset of every dimension.
    pub fn start(&self) -> Vec<u64> {
        self.ranges().map(|r| r.start as u64).collect()
    }

    /// Extent of every dimension.
    pub fn shape(&self) -> Vec<u64> {
        self.ranges().map(|r| r.len() as u64).collect()
    }

    /// Number of elements in the window.
    pub fn num_elements(&self) -> usize {
        self.ranges().map(|r| r.len()).product()
    }

    /// Number of elements per spatial point.
    pub fn series_len(&self) -> usize {
        self.leading.iter().map(|r| r.len()).product()
    }

    fn ranges(&self) -> impl Iterator<Item = &Range<usize>> {
        self.leading
            .iter()
            .chain([&self.latitude, &self.longitude])
    }
}

/// Values of one variable over a [`Window`], row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowData {
    pub variable: String,
    pub window: Window,
    pub values: Vec<f64>,
}

impl WindowData {
    pub fn new(variable: impl Into<String>, window: Window, values: Vec<f64>) -> Result<Self> {
        let variable = variable.into();
        if values.len() != window.num_elements() {
            return Err(ReaderError::read_failed(format!(
                "'{}' returned {} values for a window of {}",
                variable,
                values.len(),
                window.num_elements()
            )));
        }
        Ok(Self {
            variable,
            window,
            values,
        })
    }

    /// Every leading-dimension value at one grid point, in row-major order
    /// of the leading dimensions.
    ///
    /// `lat_idx` and `lon_idx` are absolute array indices and must lie
    /// inside the window.
    pub fn series_at(&self, lat_idx: usize, lon_idx: usize) -> Option<Vec<f64>> {
        let w = &self.window;
        if !w.latitude.contains(&lat_idx) || !w.longitude.contains(&lon_idx) {
            return None;
        }

        let n_lon = w.longitude.len();
        let plane = w.latitude.len() * n_lon;
        let offset = (lat_idx - w.latitude.start) * n_lon + (lon_idx - w.longitude.start);

        Some(
            (0..w.series_len())
                .map(|step| self.values[step * plane + offset])
                .collect(),
        )
    }
}

/// Read access to a gridded GEFS store.
#[async_trait]
pub trait GriddedSource: Send + Sync {
    /// Product layout of the store.
    fn product(&self) -> Product;

    /// Decoded coordinates (read once when the store is opened).
    fn coordinates(&self) -> &Coordinates;

    /// Whether the store holds a data variable with this name.
    ///
    /// `Ok(false)` only when no such array exists; an array that cannot be
    /// read or does not fit the product layout is an error.
    async fn has_variable(&self, name: &str) -> Result<bool>;

    /// Read one variable over a window, fetching only the chunks it covers.
    async fn read_window(&self, variable: &str, window: &Window) -> Result<WindowData>;
}

/// Open a product store from a URL or local directory.
///
/// `location` defaults to the product's configured URL.
pub fn open_source(
    product: Product,
    location: Option<&str>,
    config: &DynamicalConfig,
) -> Result<ZarrSource<dyn ReadableStorageTraits>> {
    let location = location.unwrap_or_else(|| product.url(config));
    let storage = open_storage(location, config)?;
    ZarrSource::open(storage, product, location)
}
