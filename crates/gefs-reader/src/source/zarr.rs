//! Zarr-backed GEFS source.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use zarrs::array::{Array, ArrayCreateError, DataType};
use zarrs::array_subset::ArraySubset;
use zarrs::storage::ReadableStorageTraits;

use gefs_common::{CfDurationUnits, CfTimeUnits};

use crate::axis::CoordinateAxis;
use crate::error::{ReaderError, Result};

use super::{Coordinates, GriddedSource, LeadingAxes, Product, Window, WindowData};

/// GEFS store read through `zarrs`.
///
/// Coordinates are read and decoded once at open; data variables are opened
/// per read and only the chunks intersecting the requested window are
/// fetched.
pub struct ZarrSource<S: ?Sized> {
    storage: Arc<S>,
    product: Product,
    coordinates: Coordinates,
    /// Store location, for logging.
    location: String,
}

impl<S: ?Sized + ReadableStorageTraits + 'static> ZarrSource<S> {
    /// Open a store and decode its coordinate arrays.
    ///
    /// # Arguments
    /// * `storage` - The storage backend, rooted at the store's top-level group
    /// * `product` - Expected product layout
    /// * `location` - URL or path, used in log messages
    pub fn open(storage: Arc<S>, product: Product, location: impl Into<String>) -> Result<Self> {
        let location = location.into();

        let latitude = CoordinateAxis::new("latitude", read_axis(&storage, "latitude")?)?;
        let longitude = CoordinateAxis::new("longitude", read_axis(&storage, "longitude")?)?;

        let leading = match product {
            Product::Analysis => LeadingAxes::Analysis {
                time: read_datetime_axis(&storage, "time")?,
            },
            Product::Forecast35Day => LeadingAxes::Forecast {
                init_time: read_datetime_axis(&storage, "init_time")?,
                ensemble_member: read_axis(&storage, "ensemble_member")?
                    .into_iter()
                    .map(|v| v.round() as i64)
                    .collect(),
                lead_time: read_duration_axis(&storage, "lead_time")?,
            },
        };

        tracing::info!(
            location = %location,
            product = %product,
            leading = ?leading.shape(),
            latitude = latitude.len(),
            longitude = longitude.len(),
            "Opened GEFS Zarr store"
        );

        Ok(Self {
            storage,
            product,
            coordinates: Coordinates {
                leading,
                latitude,
                longitude,
            },
            location,
        })
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    /// Open a data variable and check it against the product layout.
    fn open_variable(&self, name: &str) -> Result<Array<S>> {
        let array = try_open_array(&self.storage, name)?
            .ok_or_else(|| ReaderError::MissingVariable(name.to_string()))?;

        let dims = self.product.dimensions();
        let shape = array.shape();
        if shape.len() != dims.len() {
            return Err(ReaderError::invalid_metadata(format!(
                "'{}' has rank {}, expected {} ({})",
                name,
                shape.len(),
                dims.len(),
                dims.join(", ")
            )));
        }

        if let Some(names) = dimension_names(&array) {
            if names.iter().map(String::as_str).ne(dims.iter().copied()) {
                return Err(ReaderError::invalid_metadata(format!(
                    "'{}' has dimensions [{}], expected [{}]",
                    name,
                    names.join(", "),
                    dims.join(", ")
                )));
            }
        }

        let mut expected: Vec<u64> = self
            .coordinates
            .leading
            .shape()
            .into_iter()
            .map(|n| n as u64)
            .collect();
        expected.push(self.coordinates.latitude.len() as u64);
        expected.push(self.coordinates.longitude.len() as u64);
        if shape != expected.as_slice() {
            return Err(ReaderError::invalid_metadata(format!(
                "'{}' has shape {:?}, coordinates imply {:?}",
                name, shape, expected
            )));
        }

        Ok(array)
    }

    fn read_window_sync(&self, variable: &str, window: &Window) -> Result<WindowData> {
        if window.leading.len() != self.product.leading_rank() {
            return Err(ReaderError::invalid_request(format!(
                "window has {} leading dimensions, {} needs {}",
                window.leading.len(),
                self.product,
                self.product.leading_rank()
            )));
        }

        let array = self.open_variable(variable)?;
        let subset = ArraySubset::new_with_start_shape(window.start(), window.shape())
            .map_err(|e| ReaderError::read_failed(e.to_string()))?;

        tracing::debug!(
            location = %self.location,
            variable = %variable,
            start = ?window.start(),
            shape = ?window.shape(),
            "Reading window"
        );

        let values = retrieve_f64(&array, &subset, variable)?;
        WindowData::new(variable, window.clone(), values)
    }
}

#[async_trait]
impl<S: ?Sized + ReadableStorageTraits + 'static> GriddedSource for ZarrSource<S> {
    fn product(&self) -> Product {
        self.product
    }

    fn coordinates(&self) -> &Coordinates {
        &self.coordinates
    }

    async fn has_variable(&self, name: &str) -> Result<bool> {
        match self.open_variable(name) {
            Ok(_) => Ok(true),
            Err(ReaderError::MissingVariable(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn read_window(&self, variable: &str, window: &Window) -> Result<WindowData> {
        self.read_window_sync(variable, window)
    }
}

fn open_array<S: ?Sized + ReadableStorageTraits + 'static>(
    storage: &Arc<S>,
    name: &str,
) -> Result<Array<S>> {
    Array::open(storage.clone(), &format!("/{}", name))
        .map_err(|e| ReaderError::open_failed(format!("{}: {}", name, e)))
}

/// Like [`open_array`], with `None` when the store has no array metadata
/// under `name`. Storage and metadata errors are still returned.
fn try_open_array<S: ?Sized + ReadableStorageTraits + 'static>(
    storage: &Arc<S>,
    name: &str,
) -> Result<Option<Array<S>>> {
    match Array::open(storage.clone(), &format!("/{}", name)) {
        Ok(array) => Ok(Some(array)),
        Err(ArrayCreateError::MissingMetadata) => Ok(None),
        Err(e) => Err(ReaderError::open_failed(format!("{}: {}", name, e))),
    }
}

/// Dimension names from Zarr v3 metadata, falling back to the v2
/// `_ARRAY_DIMENSIONS` attribute.
fn dimension_names<S: ?Sized>(array: &Array<S>) -> Option<Vec<String>> {
    if let Some(names) = array.dimension_names() {
        let names: Option<Vec<String>> = names
            .iter()
            .map(|n| n.as_str().map(str::to_string))
            .collect();
        if names.is_some() {
            return names;
        }
    }

    array
        .attributes()
        .get("_ARRAY_DIMENSIONS")
        .and_then(|v| v.as_array())
        .map(|dims| {
            dims.iter()
                .filter_map(|d| d.as_str().map(str::to_string))
                .collect()
        })
}

fn units_attribute<S: ?Sized>(array: &Array<S>, name: &str) -> Result<String> {
    array
        .attributes()
        .get("units")
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .ok_or_else(|| {
            ReaderError::invalid_metadata(format!("coordinate '{}' has no units attribute", name))
        })
}

/// Read an entire 1-D array as `f64`, whatever its numeric type.
fn axis_values<S: ?Sized + ReadableStorageTraits + 'static>(
    array: &Array<S>,
    name: &str,
) -> Result<Vec<f64>> {
    if array.shape().len() != 1 {
        return Err(ReaderError::invalid_metadata(format!(
            "coordinate '{}' must be 1-D, has shape {:?}",
            name,
            array.shape()
        )));
    }
    retrieve_f64(array, &array.subset_all(), name)
}

fn read_axis<S: ?Sized + ReadableStorageTraits + 'static>(
    storage: &Arc<S>,
    name: &str,
) -> Result<Vec<f64>> {
    axis_values(&open_array(storage, name)?, name)
}

fn read_datetime_axis<S: ?Sized + ReadableStorageTraits + 'static>(
    storage: &Arc<S>,
    name: &str,
) -> Result<Vec<DateTime<Utc>>> {
    let array = open_array(storage, name)?;
    let units = CfTimeUnits::parse(&units_attribute(&array, name)?)?;
    Ok(axis_values(&array, name)?
        .into_iter()
        .map(|v| units.decode(v))
        .collect())
}

fn read_duration_axis<S: ?Sized + ReadableStorageTraits + 'static>(
    storage: &Arc<S>,
    name: &str,
) -> Result<Vec<Duration>> {
    let array = open_array(storage, name)?;
    let units = CfDurationUnits::parse(&units_attribute(&array, name)?)?;
    Ok(axis_values(&array, name)?
        .into_iter()
        .map(|v| units.decode(v))
        .collect())
}

fn read_error(name: &str, err: impl std::fmt::Display) -> ReaderError {
    ReaderError::read_failed(format!("{}: {}", name, err))
}

fn retrieve_f64<S: ?Sized + ReadableStorageTraits + 'static>(
    array: &Array<S>,
    subset: &ArraySubset,
    name: &str,
) -> Result<Vec<f64>> {
    let values = match array.data_type() {
        DataType::Float64 => array
            .retrieve_array_subset_elements::<f64>(subset)
            .map_err(|e| read_error(name, e))?,
        DataType::Float32 => array
            .retrieve_array_subset_elements::<f32>(subset)
            .map_err(|e| read_error(name, e))?
            .into_iter()
            .map(f64::from)
            .collect(),
        DataType::Int64 => array
            .retrieve_array_subset_elements::<i64>(subset)
            .map_err(|e| read_error(name, e))?
            .into_iter()
            .map(|v| v as f64)
            .collect(),
        DataType::Int32 => array
            .retrieve_array_subset_elements::<i32>(subset)
            .map_err(|e| read_error(name, e))?
            .into_iter()
            .map(f64::from)
            .collect(),
        DataType::Int16 => array
            .retrieve_array_subset_elements::<i16>(subset)
            .map_err(|e| read_error(name, e))?
            .into_iter()
            .map(f64::from)
            .collect(),
        DataType::UInt16 => array
            .retrieve_array_subset_elements::<u16>(subset)
            .map_err(|e| read_error(name, e))?
            .into_iter()
            .map(f64::from)
            .collect(),
        DataType::UInt8 => array
            .retrieve_array_subset_elements::<u8>(subset)
            .map_err(|e| read_error(name, e))?
            .into_iter()
            .map(f64::from)
            .collect(),
        other => {
            return Err(ReaderError::invalid_metadata(format!(
                "'{}' has unsupported data type {:?}",
                name, other
            )))
        }
    };
    Ok(values)
}
