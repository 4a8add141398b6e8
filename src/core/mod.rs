//! Core functionality for the importer
//!
//! This module contains the batch lifecycle logic and the import job API seam.

pub mod batch;
pub mod import;

use crate::config::Config;
use crate::storage::{BatchStore, Database};
use crate::utils::error::Result;
use batch::{BatchAccumulator, ImportSubmitter, StatusReconciler, spawn_reconciliation_task};
use import::{HttpImportJobClient, ImportJobClient};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Wires the store, the job client and the batch lifecycle services together
#[derive(Clone)]
pub struct Importer {
    /// Importer configuration
    config: Arc<Config>,
    /// Batch persistence
    store: Arc<dyn BatchStore>,
    /// File arrival handling
    accumulator: Arc<BatchAccumulator>,
    /// Job status polling
    reconciler: Arc<StatusReconciler>,
}

impl Importer {
    /// Connect the database, run migrations and build every service
    pub async fn new(config: Config) -> Result<Self> {
        info!("Initializing importer");

        debug!("Connecting to database");
        let database = Database::new(&config.storage().database).await?;
        database.migrate().await?;

        debug!("Building import job client");
        let client = HttpImportJobClient::new(config.import_api())?;

        let importer = Self::with_components(config, Arc::new(database), Arc::new(client));
        info!("Importer initialized successfully");
        Ok(importer)
    }

    /// Build the services on top of an existing store and job client
    pub fn with_components(
        config: Config,
        store: Arc<dyn BatchStore>,
        client: Arc<dyn ImportJobClient>,
    ) -> Self {
        let submitter = Arc::new(ImportSubmitter::new(
            client.clone(),
            store.clone(),
            config.import_api().clone(),
        ));
        let accumulator = Arc::new(BatchAccumulator::new(
            store.clone(),
            submitter,
            config.batching().clone(),
        ));
        let reconciler = Arc::new(StatusReconciler::new(
            store.clone(),
            client,
            config.reconciler().clone(),
        ));

        Self {
            config: Arc::new(config),
            store,
            accumulator,
            reconciler,
        }
    }

    /// Spawn the reconciliation loop, unless disabled in configuration
    pub fn start_background_services(&self) -> Option<JoinHandle<()>> {
        let reconciler = self.config.reconciler();
        if !reconciler.enabled {
            info!("Reconciliation disabled, not polling import jobs");
            return None;
        }

        Some(spawn_reconciliation_task(
            self.reconciler.clone(),
            self.accumulator.clone(),
            reconciler.poll_interval(),
        ))
    }

    /// Get importer configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> Arc<dyn BatchStore> {
        self.store.clone()
    }

    pub fn accumulator(&self) -> Arc<BatchAccumulator> {
        self.accumulator.clone()
    }

    pub fn reconciler(&self) -> Arc<StatusReconciler> {
        self.reconciler.clone()
    }
}
