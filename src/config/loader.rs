//! Configuration loading utilities
//!
//! Environment overrides applied on top of file or default configuration.

use super::models::*;
use crate::utils::error::{ImporterError, Result};
use std::str::FromStr;
use tracing::debug;

fn parse_var<T>(key: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .parse()
        .map_err(|e| ImporterError::Config(format!("Invalid {}: {}", key, e)))
}

impl ImporterConfig {
    /// Apply `IMPORTER_*` (and `DATABASE_URL`) overrides using the given lookup
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        debug!("Applying environment overrides");

        // Server configuration
        if let Some(host) = lookup("IMPORTER_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("IMPORTER_PORT") {
            self.server.port = parse_var("IMPORTER_PORT", &port)?;
        }

        // Database configuration
        if let Some(url) = lookup("DATABASE_URL") {
            self.storage.database.url = url;
        }
        if let Some(max_conn) = lookup("DATABASE_MAX_CONNECTIONS") {
            self.storage.database.max_connections =
                parse_var("DATABASE_MAX_CONNECTIONS", &max_conn)?;
        }

        // Batching
        if let Some(size) = lookup("IMPORTER_MAX_BATCH_SIZE") {
            self.batching.max_batch_size = parse_var("IMPORTER_MAX_BATCH_SIZE", &size)?;
        }
        if let Some(size) = lookup("IMPORTER_SUGGESTED_MIN_FILE_SIZE") {
            self.batching.suggested_min_file_size =
                parse_var("IMPORTER_SUGGESTED_MIN_FILE_SIZE", &size)?;
        }

        // Import API
        if let Some(base_url) = lookup("IMPORTER_API_BASE_URL") {
            self.import_api.base_url = base_url;
        }
        if let Some(storage_base_url) = lookup("IMPORTER_STORAGE_BASE_URL") {
            self.import_api.storage_base_url = storage_base_url;
        }
        if let Some(token) = lookup("IMPORTER_API_TOKEN") {
            self.import_api.bearer_token = Some(token);
        }

        // Reconciler
        if let Some(interval) = lookup("IMPORTER_POLL_INTERVAL") {
            self.reconciler.poll_interval = parse_var("IMPORTER_POLL_INTERVAL", &interval)?;
        }
        if let Some(enabled) = lookup("IMPORTER_RECONCILER_ENABLED") {
            self.reconciler.enabled = parse_var("IMPORTER_RECONCILER_ENABLED", &enabled)?;
        }

        // Logging
        if let Some(level) = lookup("IMPORTER_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(json) = lookup("IMPORTER_LOG_JSON") {
            self.logging.json = parse_var("IMPORTER_LOG_JSON", &json)?;
        }

        Ok(())
    }
}
