//! Configuration management for the importer
//!
//! This module handles loading, validation, and management of all importer configuration.

mod loader;
pub mod models;
pub mod validation;

pub use models::*;
pub use validation::Validate;

use crate::utils::error::{ImporterError, Result};
use std::path::Path;
use tracing::{debug, info};

/// Main configuration struct for the importer
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Importer configuration
    pub importer: ImporterConfig,
}

impl Config {
    /// Load configuration from file
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading configuration from: {:?}", path);

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ImporterError::Config(format!("Failed to read config file: {}", e)))?;

        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML document
    pub fn from_yaml(content: &str) -> Result<Self> {
        let importer: ImporterConfig = serde_yaml::from_str(content)
            .map_err(|e| ImporterError::Config(format!("Failed to parse config: {}", e)))?;

        let config = Self { importer };
        config.validate()?;

        debug!("Configuration loaded successfully");
        Ok(config)
    }

    /// Load the file when it exists, otherwise fall back to defaults; environment wins either way
    pub async fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if tokio::fs::try_exists(path).await.unwrap_or(false) {
            Self::from_file(path).await?
        } else {
            info!("Configuration file {:?} not found, using defaults", path);
            Self::default()
        };

        config
            .importer
            .apply_env_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Get server configuration
    pub fn server(&self) -> &ServerConfig {
        &self.importer.server
    }

    /// Get storage configuration
    pub fn storage(&self) -> &StorageConfig {
        &self.importer.storage
    }

    /// Get batching configuration
    pub fn batching(&self) -> &BatchingConfig {
        &self.importer.batching
    }

    /// Get import API configuration
    pub fn import_api(&self) -> &ImportApiConfig {
        &self.importer.import_api
    }

    /// Get reconciler configuration
    pub fn reconciler(&self) -> &ReconcilerConfig {
        &self.importer.reconciler
    }

    /// Get logging configuration
    pub fn logging(&self) -> &LoggingConfig {
        &self.importer.logging
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        debug!("Validating configuration");

        Validate::validate(&self.importer).map_err(ImporterError::Config)?;

        debug!("Configuration validation completed");
        Ok(())
    }

    /// Convert to YAML string
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(&self.importer).map_err(|e| {
            ImporterError::Config(format!("Failed to serialize config to YAML: {}", e))
        })
    }
}
