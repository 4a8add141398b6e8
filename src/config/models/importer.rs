//! Top-level importer configuration

use super::*;
use serde::{Deserialize, Serialize};

/// Main importer configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ImporterConfig {
    /// HTTP intake server
    #[serde(default)]
    pub server: ServerConfig,
    /// Batch store
    #[serde(default)]
    pub storage: StorageConfig,
    /// Accumulation policy
    #[serde(default)]
    pub batching: BatchingConfig,
    /// External bulk-import job API
    #[serde(default)]
    pub import_api: ImportApiConfig,
    /// Status reconciliation schedule
    #[serde(default)]
    pub reconciler: ReconcilerConfig,
    /// Logging
    #[serde(default)]
    pub logging: LoggingConfig,
}
