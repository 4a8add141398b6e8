//! Batch pipeline validators
//!
//! Validation for the accumulation policy, the import job API and the reconciler.

use super::trait_def::Validate;
use super::validate_http_url;
use crate::config::models::*;
use tracing::warn;

impl Validate for BatchingConfig {
    fn validate(&self) -> Result<(), String> {
        if self.max_batch_size == 0 {
            return Err("Maximum batch size must be greater than 0".to_string());
        }

        if self.max_conflict_retries == 0 {
            return Err("Conflict retries must be at least 1".to_string());
        }

        if self.suggested_min_file_size > self.max_batch_size {
            warn!(
                "Suggested minimum file size {} exceeds the batch size {}; every file will be flagged",
                self.suggested_min_file_size, self.max_batch_size
            );
        }

        Ok(())
    }
}

impl Validate for ImportApiConfig {
    fn validate(&self) -> Result<(), String> {
        validate_http_url("Import API base URL", &self.base_url)?;
        validate_http_url("Storage base URL", &self.storage_base_url)?;

        if self.endpoint_path.trim_matches('/').is_empty() {
            return Err("Import endpoint path cannot be empty".to_string());
        }

        if self.input_format.is_empty() {
            return Err("Import input format cannot be empty".to_string());
        }

        if self.mode.is_empty() {
            return Err("Import mode cannot be empty".to_string());
        }

        if self.timeout == 0 {
            return Err("Import API timeout must be greater than 0".to_string());
        }

        Ok(())
    }
}

impl Validate for ReconcilerConfig {
    fn validate(&self) -> Result<(), String> {
        if self.poll_interval == 0 {
            return Err("Reconciler poll interval must be greater than 0".to_string());
        }

        if self.request_timeout == 0 {
            return Err("Reconciler request timeout must be greater than 0".to_string());
        }

        if self.concurrency == 0 {
            return Err("Reconciler concurrency must be greater than 0".to_string());
        }

        if self.request_timeout > self.poll_interval {
            warn!(
                "Status request timeout ({}s) is longer than the poll interval ({}s)",
                self.request_timeout, self.poll_interval
            );
        }

        Ok(())
    }
}
