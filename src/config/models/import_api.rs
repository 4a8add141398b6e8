//! Bulk-import job API configuration

use super::*;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// External import job API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportApiConfig {
    /// FHIR server base URL
    #[serde(default = "default_import_base_url")]
    pub base_url: String,
    /// Import operation path, relative to `base_url`
    #[serde(default = "default_endpoint_path")]
    pub endpoint_path: String,
    /// Base location every batched file is addressable under
    #[serde(default = "default_storage_base_url")]
    pub storage_base_url: String,
    /// Input format identifier sent with each job
    #[serde(default = "default_input_format")]
    pub input_format: String,
    /// Import mode sent with each job
    #[serde(default = "default_import_mode")]
    pub mode: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,
    /// Bearer token, acquired outside this service
    #[serde(default, skip_serializing)]
    pub bearer_token: Option<String>,
}

impl Default for ImportApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_import_base_url(),
            endpoint_path: default_endpoint_path(),
            storage_base_url: default_storage_base_url(),
            input_format: default_input_format(),
            mode: default_import_mode(),
            timeout: default_timeout(),
            bearer_token: None,
        }
    }
}

impl ImportApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}
