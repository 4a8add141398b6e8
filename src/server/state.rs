//! Application state shared across HTTP handlers

use crate::config::Config;
use crate::core::Importer;
use crate::core::batch::BatchAccumulator;
use crate::storage::BatchStore;
use std::sync::Arc;

/// HTTP server state shared across handlers
///
/// All fields are wrapped in Arc for sharing across worker threads.
#[derive(Clone)]
pub struct AppState {
    /// Importer configuration (shared read-only)
    pub config: Arc<Config>,
    /// Batch persistence
    pub store: Arc<dyn BatchStore>,
    /// Entry point for file arrivals
    pub accumulator: Arc<BatchAccumulator>,
}

impl AppState {
    /// Create a new AppState from the importer's services
    pub fn new(importer: &Importer) -> Self {
        Self {
            config: Arc::new(importer.config().clone()),
            store: importer.store(),
            accumulator: importer.accumulator(),
        }
    }
}
