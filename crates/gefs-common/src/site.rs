//! Forecast sites: named points at which gridded drivers are sampled.

use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{GefsError, GefsResult};

/// A named geographic point at which forecast data is sampled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Site {
    pub site_id: String,
    /// Latitude in degrees, [-90, 90].
    pub latitude: f64,
    /// Longitude in degrees, [-180, 180].
    pub longitude: f64,
}

impl Site {
    pub fn new(site_id: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            site_id: site_id.into(),
            latitude,
            longitude,
        }
    }

    /// Check that both coordinates are finite and within geographic range.
    pub fn validate(&self) -> GefsResult<()> {
        let invalid = |message: String| GefsError::InvalidCoordinate {
            site_id: self.site_id.clone(),
            message,
        };

        if !self.latitude.is_finite() {
            return Err(invalid(format!("latitude {} is not a number", self.latitude)));
        }
        if !self.longitude.is_finite() {
            return Err(invalid(format!("longitude {} is not a number", self.longitude)));
        }
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(invalid(format!("latitude {} outside [-90, 90]", self.latitude)));
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(invalid(format!(
                "longitude {} outside [-180, 180]",
                self.longitude
            )));
        }

        Ok(())
    }

    /// `(latitude, longitude)` in radians.
    pub fn to_radians(&self) -> (f64, f64) {
        (self.latitude.to_radians(), self.longitude.to_radians())
    }
}

/// Ordered collection of sites with unique identifiers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SiteCollection {
    sites: Vec<Site>,
}

impl SiteCollection {
    /// Build a collection, rejecting duplicate site ids.
    pub fn new(sites: Vec<Site>) -> GefsResult<Self> {
        let mut seen = HashSet::with_capacity(sites.len());
        for site in &sites {
            if !seen.insert(site.site_id.as_str()) {
                return Err(GefsError::DuplicateSite(site.site_id.clone()));
            }
        }
        Ok(Self { sites })
    }

    /// Load site metadata from a CSV file with `site_id`, `latitude` and
    /// `longitude` columns. Other columns are ignored.
    pub fn from_csv_path(path: impl AsRef<Path>) -> GefsResult<Self> {
        let file = std::fs::File::open(path.as_ref()).map_err(|e| {
            GefsError::SiteMetadata(format!("{}: {}", path.as_ref().display(), e))
        })?;
        Self::from_csv_reader(file)
    }

    /// Load site metadata from any CSV source.
    pub fn from_csv_reader<R: Read>(reader: R) -> GefsResult<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = rdr.headers()?.clone();
        let column = |name: &str| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| GefsError::MissingColumn(name.to_string()))
        };
        let id_idx = column("site_id")?;
        let lat_idx = column("latitude")?;
        let lon_idx = column("longitude")?;

        let mut sites = Vec::new();
        for record in rdr.records() {
            let record = record?;
            let site_id = record.get(id_idx).unwrap_or_default().to_string();

            let parse = |idx: usize, name: &str| -> GefsResult<f64> {
                let raw = record.get(idx).unwrap_or_default();
                raw.parse::<f64>().map_err(|_| GefsError::InvalidCoordinate {
                    site_id: site_id.clone(),
                    message: format!("{} '{}' is not a number", name, raw),
                })
            };

            let latitude = parse(lat_idx, "latitude")?;
            let longitude = parse(lon_idx, "longitude")?;
            sites.push(Site::new(site_id, latitude, longitude));
        }

        tracing::debug!(sites = sites.len(), "Loaded site metadata");
        Self::new(sites)
    }

    pub fn sites(&self) -> &[Site] {
        &self.sites
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Site> {
        self.sites.iter()
    }

    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    /// Look up a site by id.
    pub fn get(&self, site_id: &str) -> Option<&Site> {
        self.sites.iter().find(|s| s.site_id == site_id)
    }

    /// Keep only the named sites, preserving collection order.
    pub fn select(&self, site_ids: &[String]) -> Self {
        Self {
            sites: self
                .sites
                .iter()
                .filter(|s| site_ids.iter().any(|id| id == &s.site_id))
                .cloned()
                .collect(),
        }
    }
}

impl<'a> IntoIterator for &'a SiteCollection {
    type Item = &'a Site;
    type IntoIter = std::slice::Iter<'a, Site>;

    fn into_iter(self) -> Self::IntoIter {
        self.sites.iter()
    }
}
