//! Upload settings.

use serde::{Deserialize, Serialize};

pub const DEFAULT_S3_REGION: &str = "s3-west";
pub const DEFAULT_S3_ENDPOINT: &str = "nrp-nautilus.io";
pub const DEFAULT_CLI_PROGRAM: &str = "aws";

/// Where and how a forecast is uploaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubmitOptions {
    /// Subdomain of the submission endpoint, also passed as the region.
    pub s3_region: String,
    /// Root domain of the submission endpoint.
    pub s3_endpoint: String,
    /// Ask for confirmation before uploading.
    pub ask: bool,
    /// AWS CLI executable.
    pub cli_program: String,
}

impl Default for SubmitOptions {
    fn default() -> Self {
        Self {
            s3_region: DEFAULT_S3_REGION.to_string(),
            s3_endpoint: DEFAULT_S3_ENDPOINT.to_string(),
            ask: true,
            cli_program: DEFAULT_CLI_PROGRAM.to_string(),
        }
    }
}

impl SubmitOptions {
    /// Apply `SUBMIT_S3_REGION` and `SUBMIT_S3_ENDPOINT` overrides.
    pub fn apply_env(&mut self) {
        if let Ok(region) = std::env::var("SUBMIT_S3_REGION") {
            self.s3_region = region;
        }
        if let Ok(endpoint) = std::env::var("SUBMIT_S3_ENDPOINT") {
            self.s3_endpoint = endpoint;
        }
    }

    pub fn endpoint_url(&self) -> String {
        format!("https://{}.{}", self.s3_region, self.s3_endpoint)
    }

    pub fn with_ask(mut self, ask: bool) -> Self {
        self.ask = ask;
        self
    }

    pub fn with_cli_program(mut self, program: impl Into<String>) -> Self {
        self.cli_program = program.into();
        self
    }
}
