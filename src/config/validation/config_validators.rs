//! Core configuration validators
//!
//! Validation for the top-level importer configuration, the HTTP server and logging.

use super::trait_def::Validate;
use crate::config::models::*;
use tracing::debug;
use tracing_subscriber::EnvFilter;

impl Validate for ImporterConfig {
    fn validate(&self) -> Result<(), String> {
        debug!("Validating importer configuration");

        self.server.validate()?;
        self.storage.validate()?;
        self.batching.validate()?;
        self.import_api.validate()?;
        self.reconciler.validate()?;
        self.logging.validate()?;

        debug!("Importer configuration validation completed");
        Ok(())
    }
}

impl Validate for ServerConfig {
    fn validate(&self) -> Result<(), String> {
        if self.host.is_empty() {
            return Err("Server host cannot be empty".to_string());
        }

        if self.port == 0 {
            return Err("Server port must be greater than 0".to_string());
        }

        if let Some(workers) = self.workers {
            if workers == 0 {
                return Err("Worker count must be greater than 0".to_string());
            }
        }

        if self.timeout == 0 {
            return Err("Server timeout must be greater than 0".to_string());
        }

        Ok(())
    }
}

impl Validate for LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        EnvFilter::try_new(&self.level)
            .map(|_| ())
            .map_err(|e| format!("Invalid log level '{}': {}", self.level, e))
    }
}
