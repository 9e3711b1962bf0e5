//! Bounding box types and operations.

use serde::{Deserialize, Serialize};

/// A geographic bounding box in degrees.
///
/// Invariant: `min_lat <= max_lat` and `min_lon <= max_lon`. Boxes built by
/// padding site extents may run past ±90/±180; readers clamp the selection
/// to their coordinate axes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    /// Create a new bounding box from latitude and longitude ranges.
    pub fn new(min_lat: f64, max_lat: f64, min_lon: f64, max_lon: f64) -> Self {
        Self {
            min_lat,
            max_lat,
            min_lon,
            max_lon,
        }
    }

    /// Tightest box enclosing every `(lat, lon)` point, or `None` for no points.
    pub fn enclosing<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        let mut iter = points.into_iter();
        let (lat, lon) = iter.next()?;
        let seed = Self::new(lat, lat, lon, lon);

        Some(iter.fold(seed, |acc, (lat, lon)| Self {
            min_lat: acc.min_lat.min(lat),
            max_lat: acc.max_lat.max(lat),
            min_lon: acc.min_lon.min(lon),
            max_lon: acc.max_lon.max(lon),
        }))
    }

    /// Latitude extent in degrees.
    pub fn height(&self) -> f64 {
        self.max_lat - self.min_lat
    }

    /// Longitude extent in degrees.
    pub fn width(&self) -> f64 {
        self.max_lon - self.min_lon
    }

    /// Check if a point is contained within this bbox (edges inclusive).
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        lat >= self.min_lat && lat <= self.max_lat && lon >= self.min_lon && lon <= self.max_lon
    }

    /// Check if `other` lies entirely inside this bbox.
    pub fn contains_box(&self, other: &BoundingBox) -> bool {
        self.contains(other.min_lat, other.min_lon) && self.contains(other.max_lat, other.max_lon)
    }

    /// Expand the bounding box by `buffer` degrees on every side.
    ///
    /// Latitude and longitude are padded independently, no spherical correction.
    pub fn expand(&self, buffer: f64) -> Self {
        Self {
            min_lat: self.min_lat - buffer,
            max_lat: self.max_lat + buffer,
            min_lon: self.min_lon - buffer,
            max_lon: self.max_lon + buffer,
        }
    }

    /// Smallest box enclosing both boxes.
    pub fn union(&self, other: &BoundingBox) -> Self {
        Self {
            min_lat: self.min_lat.min(other.min_lat),
            max_lat: self.max_lat.max(other.max_lat),
            min_lon: self.min_lon.min(other.min_lon),
            max_lon: self.max_lon.max(other.max_lon),
        }
    }
}

impl std::fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "lat [{}, {}] lon [{}, {}]",
            self.min_lat, self.max_lat, self.min_lon, self.max_lon
        )
    }
}
