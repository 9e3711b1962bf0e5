//! CLI configuration.
//!
//! Settings come from defaults, then an optional YAML file, then
//! environment variables. Command line flags are applied last by the
//! individual commands.

use std::env;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use forecast_submit::SubmitOptions;
use gefs_reader::{DynamicalConfig, S3EndpointConfig};
use site_cluster::SubsetParams;

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriversConfig {
    /// dynamical.org Zarr stores
    pub dynamical: DynamicalConfig,

    /// EFI bucket holding the stage products
    pub efi: S3EndpointConfig,

    /// Forecast submission endpoint
    pub submit: SubmitOptions,

    /// Site clustering for spatial subsetting
    pub subset: SubsetParams,

    /// Log level when `--log-level` is not given
    pub log_level: String,
}

impl Default for DriversConfig {
    fn default() -> Self {
        Self {
            dynamical: DynamicalConfig::default(),
            efi: S3EndpointConfig::default(),
            submit: SubmitOptions::default(),
            subset: SubsetParams::default(),
            log_level: "info".to_string(),
        }
    }
}

impl DriversConfig {
    /// Load from a YAML file, then apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => {
                let mut config = Self::from_yaml_file(path)?;
                config.apply_env()?;
                config
            }
            None => Self::from_env()?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_yaml_str(&text)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let mut config = Self {
            dynamical: DynamicalConfig::from_env(),
            efi: S3EndpointConfig::from_env(),
            ..Self::default()
        };
        config.apply_local_env()?;
        Ok(config)
    }

    pub fn apply_env(&mut self) -> Result<()> {
        self.dynamical.apply_env();
        self.efi.apply_env();
        self.apply_local_env()
    }

    fn apply_local_env(&mut self) -> Result<()> {
        self.submit.apply_env();

        if let Ok(val) = env::var("SUBSET_BUFFER_DEG") {
            self.subset.buffer_degrees = val
                .parse()
                .with_context(|| format!("SUBSET_BUFFER_DEG '{}' is not a number", val))?;
        }
        if let Ok(val) = env::var("SUBSET_CLUSTER_RADIUS_KM") {
            self.subset.cluster_radius_km = val
                .parse()
                .with_context(|| format!("SUBSET_CLUSTER_RADIUS_KM '{}' is not a number", val))?;
        }
        if let Ok(val) = env::var("LOG_LEVEL") {
            self.log_level = val;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        self.dynamical
            .validate()
            .map_err(|e| anyhow::anyhow!("dynamical: {}", e))?;
        self.efi
            .validate()
            .map_err(|e| anyhow::anyhow!("efi: {}", e))?;
        self.subset.validate().context("subset")?;
        Ok(())
    }
}
