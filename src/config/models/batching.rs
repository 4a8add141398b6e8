//! Accumulation policy configuration

use super::*;
use serde::{Deserialize, Serialize};

/// Batch accumulation policy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchingConfig {
    /// Resource-count threshold at which the active batch rolls over
    #[serde(default = "default_max_batch_size")]
    pub max_batch_size: u64,
    /// Files smaller than this are accepted with a warning
    #[serde(default = "default_suggested_min_file_size")]
    pub suggested_min_file_size: u64,
    /// Drop single files larger than `max_batch_size` instead of batching them alone
    #[serde(default)]
    pub reject_oversized_files: bool,
    /// Attempts per file arrival when the store reports a concurrent write
    #[serde(default = "default_max_conflict_retries")]
    pub max_conflict_retries: u32,
}

impl Default for BatchingConfig {
    fn default() -> Self {
        Self {
            max_batch_size: default_max_batch_size(),
            suggested_min_file_size: default_suggested_min_file_size(),
            reject_oversized_files: false,
            max_conflict_retries: default_max_conflict_retries(),
        }
    }
}

impl BatchingConfig {
    pub fn with_max_batch_size(mut self, max_batch_size: u64) -> Self {
        self.max_batch_size = max_batch_size;
        self
    }
}
