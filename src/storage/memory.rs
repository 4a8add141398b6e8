//! In-process batch store
//!
//! Backs the scenario tests and embedded use where no database is configured.

use super::{
    BatchFilter, BatchStore, SaveAction, check_file_outcome, check_mark_unpollable, check_save,
};
use crate::core::batch::{Batch, BatchStatus, FileReference};
use crate::utils::error::{ImporterError, Result};
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Default)]
struct Batches {
    by_id: HashMap<Uuid, Batch>,
    /// The single staging batch, if any
    active: Option<Uuid>,
}

impl Batches {
    fn active(&self) -> Option<&Batch> {
        self.active.and_then(|batch_id| self.by_id.get(&batch_id))
    }
}

/// [`BatchStore`] keeping every batch in a map guarded by a single lock
#[derive(Debug, Default)]
pub struct MemoryBatchStore {
    batches: RwLock<Batches>,
}

impl MemoryBatchStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored batches
    pub fn len(&self) -> usize {
        self.batches.read().by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.batches.read().by_id.is_empty()
    }
}

#[async_trait]
impl BatchStore for MemoryBatchStore {
    async fn load_active_batch(&self) -> Result<Option<Batch>> {
        Ok(self.batches.read().active().cloned())
    }

    async fn get_batch(&self, batch_id: Uuid) -> Result<Option<Batch>> {
        Ok(self.batches.read().by_id.get(&batch_id).cloned())
    }

    async fn list_batches(&self, filter: &BatchFilter) -> Result<Vec<Batch>> {
        let mut batches: Vec<Batch> = self
            .batches
            .read()
            .by_id
            .values()
            .filter(|batch| filter.matches(batch))
            .cloned()
            .collect();
        batches.sort_by_key(|batch| batch.created_at);
        if let Some(limit) = filter.limit {
            batches.truncate(limit);
        }
        Ok(batches)
    }

    async fn save_batch(&self, batch: &Batch) -> Result<Batch> {
        let mut batches = self.batches.write();
        let other_staging = batches.active;
        let stored = batches.by_id.get(&batch.batch_id);

        match check_save(stored, batch, other_staging)? {
            SaveAction::Unchanged => {
                debug!("Batch {} unchanged, skipping write", batch.batch_id);
                // `stored` is always present for an unchanged save
                stored.cloned().ok_or_else(|| {
                    ImporterError::internal(format!("Batch {} vanished", batch.batch_id))
                })
            }
            SaveAction::Insert | SaveAction::Update => {
                let mut saved = batch.clone();
                saved.version = batch.version + 1;
                saved.updated_at = Utc::now();
                if saved.status == BatchStatus::Staging {
                    batches.active = Some(saved.batch_id);
                } else if batches.active == Some(saved.batch_id) {
                    batches.active = None;
                }
                batches.by_id.insert(saved.batch_id, saved.clone());
                Ok(saved)
            }
        }
    }

    async fn save_file_outcome(&self, batch_id: Uuid, file: &FileReference) -> Result<()> {
        let mut batches = self.batches.write();
        let batch = batches
            .by_id
            .get_mut(&batch_id)
            .ok_or_else(|| ImporterError::not_found(format!("Batch {} not found", batch_id)))?;

        if let Some(index) = check_file_outcome(batch, file)? {
            batch.files[index].outcome = file.outcome.clone();
            batch.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn mark_unpollable(&self, batch_id: Uuid, reason: &str) -> Result<Batch> {
        let mut batches = self.batches.write();
        let batch = batches
            .by_id
            .get_mut(&batch_id)
            .ok_or_else(|| ImporterError::not_found(format!("Batch {} not found", batch_id)))?;
        check_mark_unpollable(batch)?;

        batch.pollable = false;
        batch.last_error = Some(reason.to_string());
        batch.version += 1;
        batch.updated_at = Utc::now();
        Ok(batch.clone())
    }

    async fn health_check(&self) -> Result<()> {
        Ok(())
    }
}
