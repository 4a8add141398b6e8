//! Status reconciliation schedule

use super::*;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Reconciler configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconcilerConfig {
    /// Run the background reconciliation loop
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Seconds between reconciliation ticks
    #[serde(default = "default_poll_interval")]
    pub poll_interval: u64,
    /// Per-request status poll timeout in seconds
    #[serde(default = "default_timeout")]
    pub request_timeout: u64,
    /// Batches polled concurrently within one tick
    #[serde(default = "default_poll_concurrency")]
    pub concurrency: usize,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            poll_interval: default_poll_interval(),
            request_timeout: default_timeout(),
            concurrency: default_poll_concurrency(),
        }
    }
}

impl ReconcilerConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }
}
