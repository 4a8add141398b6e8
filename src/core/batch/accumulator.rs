//! Batch accumulation
//!
//! [`accumulate`] is the pure step deciding where an arriving file goes;
//! [`BatchAccumulator`] runs it against the store, serialized behind a
//! single-writer lock and retried on optimistic concurrency conflicts.

use super::submitter::ImportSubmitter;
use super::types::{Batch, FileArrival, FileReference};
use crate::config::BatchingConfig;
use crate::storage::BatchStore;
use crate::utils::error::{ImporterError, Result};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Result of placing one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Accumulation {
    /// Batch closed because the file would have pushed it past the threshold
    pub rolled_over: Option<Batch>,
    /// Batch now holding the file
    pub active: Batch,
    /// The file was already in the active batch; nothing was appended
    pub duplicate: bool,
}

/// Place `file` into `batch`, rolling over to a fresh staging batch when the
/// running total would exceed `max_batch_size`.
///
/// The threshold is checked against the total before insertion, so a file
/// larger than the threshold still lands in an empty batch. A file flagged
/// last-in-request closes the batch holding it.
pub fn accumulate(mut batch: Batch, file: FileReference, max_batch_size: u64) -> Accumulation {
    let closes = file.is_last_in_request;

    if batch.contains_file(&file.filename) {
        batch.closed |= closes;
        return Accumulation {
            rolled_over: None,
            active: batch,
            duplicate: true,
        };
    }

    let mut rolled_over = None;
    if !batch.is_empty()
        && batch.total_resource_count.saturating_add(file.line_count) > max_batch_size
    {
        batch.closed = true;
        rolled_over = Some(std::mem::replace(&mut batch, Batch::new_staging()));
    }

    batch.push_file(file);
    batch.closed |= closes;

    Accumulation {
        rolled_over,
        active: batch,
        duplicate: false,
    }
}

/// Groups file arrivals into size-bounded batches and hands closed batches to
/// the submitter
pub struct BatchAccumulator {
    store: Arc<dyn BatchStore>,
    submitter: Arc<ImportSubmitter>,
    config: BatchingConfig,
    write_lock: Mutex<()>,
}

impl BatchAccumulator {
    pub fn new(
        store: Arc<dyn BatchStore>,
        submitter: Arc<ImportSubmitter>,
        config: BatchingConfig,
    ) -> Self {
        Self {
            store,
            submitter,
            config,
            write_lock: Mutex::new(()),
        }
    }

    /// Add an arriving file to the active batch.
    ///
    /// Returns the batch holding the file. A roll-over whose submission fails
    /// returns the submission error without appending the file, so the
    /// arrival must be redelivered.
    pub async fn accept(&self, arrival: FileArrival) -> Result<Batch> {
        arrival.validate()?;

        if arrival.line_count < self.config.suggested_min_file_size {
            warn!(
                "File {} carries {} resources, below the suggested minimum of {}",
                arrival.filename, arrival.line_count, self.config.suggested_min_file_size
            );
        }

        if arrival.line_count > self.config.max_batch_size {
            if self.config.reject_oversized_files {
                warn!(
                    "Rejecting {}: {} resources exceed the batch limit of {}",
                    arrival.filename, arrival.line_count, self.config.max_batch_size
                );
                return Err(ImporterError::OversizedFile {
                    filename: arrival.filename,
                    line_count: arrival.line_count,
                    max_batch_size: self.config.max_batch_size,
                });
            }
            warn!(
                "File {} carries {} resources, more than the batch limit of {}; it will not share a batch",
                arrival.filename, arrival.line_count, self.config.max_batch_size
            );
        }

        let file = arrival.into_file_reference();
        let _guard = self.write_lock.lock().await;

        let mut attempt = 0;
        loop {
            match self.accept_once(&file).await {
                Err(e) if e.is_conflict() && attempt < self.config.max_conflict_retries => {
                    attempt += 1;
                    debug!(
                        "Conflict placing {} (attempt {}): {}",
                        file.filename, attempt, e
                    );
                }
                result => return result,
            }
        }
    }

    async fn accept_once(&self, file: &FileReference) -> Result<Batch> {
        let batch = self.open_batch().await?;
        let step = accumulate(batch, file.clone(), self.config.max_batch_size);

        if let Some(full) = step.rolled_over {
            let full = self.store.save_batch(&full).await?;
            info!(
                "Batch {} reached {} resources, closing",
                full.batch_id, full.total_resource_count
            );
            self.submitter.submit(full).await?;
        }

        if step.duplicate {
            debug!(
                "File {} already in batch {}",
                file.filename, step.active.batch_id
            );
        }

        let active = self.store.save_batch(&step.active).await?;
        if active.closed {
            return Ok(self.close(active).await);
        }
        Ok(active)
    }

    /// The staging batch new files go to. A closed batch still staging is
    /// submitted first so that no second staging batch is ever created.
    async fn open_batch(&self) -> Result<Batch> {
        match self.store.load_active_batch().await? {
            Some(batch) if batch.closed => {
                info!("Retrying submission of closed batch {}", batch.batch_id);
                self.submitter.submit(batch).await?;
                Ok(Batch::new_staging())
            }
            Some(batch) => Ok(batch),
            None => Ok(Batch::new_staging()),
        }
    }

    /// Submit a closed batch, leaving it for a later retry when that fails
    async fn close(&self, batch: Batch) -> Batch {
        let batch_id = batch.batch_id;
        match self.submitter.submit(batch.clone()).await {
            Ok(submitted) => submitted,
            Err(e) => {
                warn!(
                    "Batch {} is closed but could not be submitted, will retry: {}",
                    batch_id, e
                );
                batch
            }
        }
    }

    /// Submit the active batch if it is closed and still waiting
    pub async fn submit_pending(&self) -> Result<Option<Batch>> {
        let _guard = self.write_lock.lock().await;
        match self.store.load_active_batch().await? {
            Some(batch) if batch.closed => self.submitter.submit(batch).await.map(Some),
            _ => Ok(None),
        }
    }

    /// Force-close and submit the active batch. No-op when there is no
    /// active batch or it holds no files.
    pub async fn flush(&self) -> Result<Option<Batch>> {
        let _guard = self.write_lock.lock().await;
        let Some(mut batch) = self.store.load_active_batch().await? else {
            return Ok(None);
        };
        if batch.is_empty() {
            return Ok(None);
        }

        if !batch.closed {
            batch.closed = true;
            batch = self.store.save_batch(&batch).await?;
        }
        info!(
            "Flushing batch {} with {} files",
            batch.batch_id,
            batch.files.len()
        );
        self.submitter.submit(batch).await.map(Some)
    }
}
