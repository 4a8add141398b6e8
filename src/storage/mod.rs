//! Storage layer for batch lifecycle state
//!
//! [`BatchStore`] is the persistence contract shared by the accumulator, the
//! submitter and the reconciler. Every implementation applies the same
//! boundary rules (see [`check_save`]) so that a batch can never be persisted
//! in a state that breaks its invariants.

/// Database storage module
pub mod database;
/// In-process storage module
pub mod memory;

pub use database::Database;
pub use memory::MemoryBatchStore;

use crate::core::batch::{Batch, BatchStatus, FileReference};
use crate::utils::error::{ImporterError, Result};
use async_trait::async_trait;
use uuid::Uuid;

/// Selection criteria for [`BatchStore::list_batches`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchFilter {
    /// Accepted statuses; empty accepts every status
    pub statuses: Vec<BatchStatus>,
    /// Restrict to pollable (or un-pollable) batches
    pub pollable: Option<bool>,
    /// Maximum number of batches returned
    pub limit: Option<usize>,
}

impl BatchFilter {
    /// Batches whose import job still has to be polled
    pub fn awaiting_reconciliation() -> Self {
        Self {
            statuses: vec![BatchStatus::Initiated, BatchStatus::Imported],
            pollable: Some(true),
            limit: None,
        }
    }

    pub fn with_status(status: BatchStatus) -> Self {
        Self {
            statuses: vec![status],
            ..Default::default()
        }
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn matches(&self, batch: &Batch) -> bool {
        (self.statuses.is_empty() || self.statuses.contains(&batch.status))
            && self.pollable.is_none_or(|pollable| batch.pollable == pollable)
    }
}

/// Persistence contract for batches and their files
#[async_trait]
pub trait BatchStore: Send + Sync {
    /// The single batch in `staging`, with its files
    async fn load_active_batch(&self) -> Result<Option<Batch>>;

    async fn get_batch(&self, batch_id: Uuid) -> Result<Option<Batch>>;

    /// Matching batches, oldest first
    async fn list_batches(&self, filter: &BatchFilter) -> Result<Vec<Batch>>;

    /// Insert or update a batch and its files.
    ///
    /// The caller's `version` must equal the stored one (0 for a batch never
    /// persisted); the returned batch carries the new version. Saving content
    /// identical to what is stored performs no write.
    async fn save_batch(&self, batch: &Batch) -> Result<Batch>;

    /// Record one file's import outcome. Outcomes are written exactly once.
    async fn save_file_outcome(&self, batch_id: Uuid, file: &FileReference) -> Result<()>;

    /// Exclude a batch from polling after a permanent failure
    async fn mark_unpollable(&self, batch_id: Uuid, reason: &str) -> Result<Batch>;

    async fn health_check(&self) -> Result<()>;
}

/// How a validated save must be applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SaveAction {
    Insert,
    Update,
    Unchanged,
}

/// Boundary rules for [`BatchStore::save_batch`].
///
/// `other_staging` is the id of a stored staging batch, if any.
pub(crate) fn check_save(
    stored: Option<&Batch>,
    incoming: &Batch,
    other_staging: Option<Uuid>,
) -> Result<SaveAction> {
    incoming.check_invariants()?;

    let Some(stored) = stored else {
        if incoming.version != 0 {
            return Err(ImporterError::conflict(format!(
                "Batch {} was expected at version {} but is not stored",
                incoming.batch_id, incoming.version
            )));
        }
        if incoming.status == BatchStatus::Staging
            && other_staging.is_some_and(|id| id != incoming.batch_id)
        {
            return Err(ImporterError::conflict(format!(
                "Cannot stage batch {}: another batch is already staging",
                incoming.batch_id
            )));
        }
        return Ok(SaveAction::Insert);
    };

    if stored.same_content(incoming) {
        return Ok(SaveAction::Unchanged);
    }

    if stored.version != incoming.version {
        return Err(ImporterError::conflict(format!(
            "Batch {} is at version {}, update was based on version {}",
            incoming.batch_id, stored.version, incoming.version
        )));
    }

    if stored.status.is_terminal() || !stored.status.can_transition_to(incoming.status) {
        return Err(ImporterError::InvalidTransition {
            batch_id: incoming.batch_id.to_string(),
            from: stored.status.to_string(),
            to: incoming.status.to_string(),
        });
    }

    if stored.status.is_submitted() && !stored.same_files(incoming) {
        return Err(ImporterError::validation(format!(
            "Batch {} is {}; its files can no longer change",
            incoming.batch_id, stored.status
        )));
    }

    for file in &stored.files {
        let Some(recorded) = &file.outcome else {
            continue;
        };
        let replacement = incoming
            .files
            .iter()
            .find(|candidate| candidate.filename == file.filename)
            .and_then(|candidate| candidate.outcome.as_ref());
        if replacement != Some(recorded) {
            return Err(ImporterError::conflict(format!(
                "Outcome of {} in batch {} is already recorded",
                file.filename, incoming.batch_id
            )));
        }
    }

    Ok(SaveAction::Update)
}

/// Boundary rules for [`BatchStore::save_file_outcome`].
///
/// Returns the index of the file to write, or `None` when the identical
/// outcome is already recorded.
pub(crate) fn check_file_outcome(batch: &Batch, file: &FileReference) -> Result<Option<usize>> {
    if !matches!(batch.status, BatchStatus::Initiated | BatchStatus::Imported) {
        return Err(ImporterError::validation(format!(
            "Cannot record file outcomes on {} batch {}",
            batch.status, batch.batch_id
        )));
    }

    let Some(outcome) = &file.outcome else {
        return Err(ImporterError::validation(format!(
            "No outcome given for {}",
            file.filename
        )));
    };

    let index = batch
        .files
        .iter()
        .position(|candidate| candidate.filename == file.filename)
        .ok_or_else(|| {
            ImporterError::not_found(format!(
                "File {} is not part of batch {}",
                file.filename, batch.batch_id
            ))
        })?;

    match &batch.files[index].outcome {
        None => Ok(Some(index)),
        Some(recorded) if recorded == outcome => Ok(None),
        Some(_) => Err(ImporterError::conflict(format!(
            "Outcome of {} in batch {} is already recorded",
            file.filename, batch.batch_id
        ))),
    }
}

/// Boundary rule for [`BatchStore::mark_unpollable`]
pub(crate) fn check_mark_unpollable(batch: &Batch) -> Result<()> {
    if batch.status.is_terminal() || batch.status == BatchStatus::Staging {
        return Err(ImporterError::validation(format!(
            "Batch {} is {} and is not polled",
            batch.batch_id, batch.status
        )));
    }
    Ok(())
}
