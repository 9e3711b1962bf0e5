//! Connection settings for the dynamical.org Zarr stores and the EFI bucket.
//!
//! Both configs are passed explicitly to the functions that open stores;
//! nothing here reads or writes process state after construction.

use serde::{Deserialize, Serialize};

pub const DEFAULT_ANALYSIS_URL: &str = "https://data.dynamical.org/noaa/gefs/analysis/latest.zarr";
pub const DEFAULT_FORECAST_URL: &str =
    "https://data.dynamical.org/noaa/gefs/forecast-35-day/latest.zarr";
pub const DEFAULT_EFI_ENDPOINT: &str = "https://sdsc.osn.xsede.org";
pub const DEFAULT_EFI_BUCKET: &str = "bio230014-bucket01";

/// dynamical.org store locations and the contact email sent with requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DynamicalConfig {
    /// Root URL of the GEFS analysis store.
    pub analysis_url: String,
    /// Root URL of the GEFS 35-day forecast store.
    pub forecast_url: String,
    /// Contact email, sent as the HTTP `From` header.
    pub email: Option<String>,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for DynamicalConfig {
    fn default() -> Self {
        Self {
            analysis_url: DEFAULT_ANALYSIS_URL.to_string(),
            forecast_url: DEFAULT_FORECAST_URL.to_string(),
            email: None,
            timeout_secs: 120,
        }
    }
}

impl DynamicalConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    /// Override fields from `DYNAMICAL_*` environment variables.
    pub fn apply_env(&mut self) {
        if let Ok(val) = std::env::var("DYNAMICAL_ANALYSIS_URL") {
            self.analysis_url = val;
        }
        if let Ok(val) = std::env::var("DYNAMICAL_FORECAST_URL") {
            self.forecast_url = val;
        }
        if let Ok(val) = std::env::var("DYNAMICAL_EMAIL") {
            if !val.trim().is_empty() {
                self.email = Some(val);
            }
        }
        if let Ok(val) = std::env::var("DYNAMICAL_TIMEOUT_SECS") {
            if let Ok(secs) = val.parse() {
                self.timeout_secs = secs;
            }
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        for (name, url) in [
            ("analysis_url", &self.analysis_url),
            ("forecast_url", &self.forecast_url),
        ] {
            if !(url.starts_with("https://") || url.starts_with("http://")) {
                return Err(format!("{} must be an http(s) URL, got '{}'", name, url));
            }
        }
        if let Some(email) = &self.email {
            if !email.contains('@') {
                return Err(format!("email '{}' is not an address", email));
            }
        }
        if self.timeout_secs == 0 {
            return Err("timeout_secs must be > 0".to_string());
        }
        Ok(())
    }
}

/// S3-compatible endpoint holding the EFI Parquet driver products.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct S3EndpointConfig {
    /// Endpoint URL (path-style addressing).
    pub endpoint: String,
    pub bucket: String,
    /// Signing region; the OSN endpoint ignores it.
    pub region: String,
    /// Send unsigned requests (public buckets).
    pub skip_signature: bool,
    /// Allow plain-HTTP endpoints.
    pub allow_http: bool,
}

impl Default for S3EndpointConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_EFI_ENDPOINT.to_string(),
            bucket: DEFAULT_EFI_BUCKET.to_string(),
            region: "us-east-1".to_string(),
            skip_signature: true,
            allow_http: false,
        }
    }
}

impl S3EndpointConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    /// Override fields from `EFI_S3_*` environment variables.
    pub fn apply_env(&mut self) {
        if let Ok(val) = std::env::var("EFI_S3_ENDPOINT") {
            self.allow_http = val.starts_with("http://");
            self.endpoint = val;
        }
        if let Ok(val) = std::env::var("EFI_S3_BUCKET") {
            self.bucket = val;
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.bucket.is_empty() {
            return Err("bucket must not be empty".to_string());
        }
        if self.endpoint.starts_with("http://") && !self.allow_http {
            return Err(format!(
                "endpoint '{}' is plain HTTP but allow_http is false",
                self.endpoint
            ));
        }
        Ok(())
    }
}
