//! Status polling and persistence of reconciled outcomes

use super::matching::{Reconciliation, reconcile};
use crate::config::ReconcilerConfig;
use crate::config::validation::validate_http_url;
use crate::core::batch::{Batch, BatchStatus};
use crate::core::import::{ImportJobClient, JobStatus};
use crate::storage::{BatchFilter, BatchStore};
use crate::utils::error::{ImporterError, Result};
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use url::Url;

/// What one poll did to one batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// Job still running; batch stays `initiated`
    Pending,
    /// Job finished and the batch reached this terminal status
    Reconciled(BatchStatus),
    /// Transient failure; retried on the next tick
    Deferred(String),
    /// Permanent failure; batch excluded from polling
    Disabled(String),
    /// Batch no longer needs polling
    Skipped,
}

/// Tally of one reconciliation tick
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileSummary {
    pub examined: usize,
    pub pending: usize,
    pub reconciled: usize,
    pub deferred: usize,
    pub disabled: usize,
}

impl ReconcileSummary {
    fn record(&mut self, outcome: &PollOutcome) {
        self.examined += 1;
        match outcome {
            PollOutcome::Pending => self.pending += 1,
            PollOutcome::Reconciled(_) => self.reconciled += 1,
            PollOutcome::Deferred(_) => self.deferred += 1,
            PollOutcome::Disabled(_) => self.disabled += 1,
            PollOutcome::Skipped => {}
        }
    }
}

/// Polls import jobs of submitted batches and records their outcomes
pub struct StatusReconciler {
    store: Arc<dyn BatchStore>,
    client: Arc<dyn ImportJobClient>,
    config: ReconcilerConfig,
}

impl StatusReconciler {
    pub fn new(
        store: Arc<dyn BatchStore>,
        client: Arc<dyn ImportJobClient>,
        config: ReconcilerConfig,
    ) -> Self {
        Self {
            store,
            client,
            config,
        }
    }

    /// Poll every batch awaiting reconciliation once.
    ///
    /// Batches are polled concurrently, each bounded by the request timeout,
    /// so a stalled job endpoint only delays its own batch.
    pub async fn run_once(&self) -> Result<ReconcileSummary> {
        let batches = self
            .store
            .list_batches(&BatchFilter::awaiting_reconciliation())
            .await?;

        let mut summary = ReconcileSummary::default();
        if batches.is_empty() {
            return Ok(summary);
        }
        debug!("Reconciling {} batches", batches.len());

        let outcomes: Vec<PollOutcome> = stream::iter(batches)
            .map(|batch| self.reconcile_batch(batch))
            .buffer_unordered(self.config.concurrency.max(1))
            .collect()
            .await;

        for outcome in &outcomes {
            summary.record(outcome);
        }

        info!(
            "Reconciliation tick: {} examined, {} pending, {} reconciled, {} deferred, {} disabled",
            summary.examined,
            summary.pending,
            summary.reconciled,
            summary.deferred,
            summary.disabled
        );
        Ok(summary)
    }

    /// Poll one batch and apply the result. Failures are classified, never
    /// propagated.
    pub async fn reconcile_batch(&self, batch: Batch) -> PollOutcome {
        let batch_id = batch.batch_id;
        match self.poll(&batch).await {
            Ok(outcome) => outcome,
            Err(e) if e.is_permanent_poll_failure() => {
                error!("Batch {} can no longer be polled: {}", batch_id, e);
                let reason = e.to_string();
                match self.store.mark_unpollable(batch_id, &reason).await {
                    Ok(_) => PollOutcome::Disabled(reason),
                    Err(store_err) => {
                        warn!(
                            "Failed to flag batch {} as unpollable: {}",
                            batch_id, store_err
                        );
                        PollOutcome::Deferred(store_err.to_string())
                    }
                }
            }
            Err(e) => {
                warn!("Polling batch {} failed, will retry: {}", batch_id, e);
                PollOutcome::Deferred(e.to_string())
            }
        }
    }

    async fn poll(&self, batch: &Batch) -> Result<PollOutcome> {
        if batch.status.is_terminal() || !batch.pollable {
            return Ok(PollOutcome::Skipped);
        }

        let handle = status_handle(batch)?;
        let status = tokio::time::timeout(
            self.config.request_timeout(),
            self.client.fetch_status(&handle),
        )
        .await
        .map_err(|_| {
            ImporterError::timeout(format!(
                "Status of batch {} did not arrive within {:?}",
                batch.batch_id,
                self.config.request_timeout()
            ))
        })??;

        match status {
            JobStatus::InProgress => {
                debug!("Import job for batch {} still running", batch.batch_id);
                Ok(PollOutcome::Pending)
            }
            JobStatus::Completed(response) => {
                let reconciliation = reconcile(batch, &response)?;
                self.apply(batch, reconciliation)
                    .await
                    .map(PollOutcome::Reconciled)
            }
        }
    }

    /// Persist a completed job: `imported`, then every file outcome, then
    /// the totals with the terminal status.
    async fn apply(&self, batch: &Batch, reconciliation: Reconciliation) -> Result<BatchStatus> {
        for input in &reconciliation.unmatched_inputs {
            warn!(
                "Job result for batch {} lists {} which is not part of the batch",
                batch.batch_id, input
            );
        }

        let mut current = batch.clone();
        if current.status == BatchStatus::Initiated {
            current.status = BatchStatus::Imported;
            current = self.store.save_batch(&current).await?;
        }

        for file in &reconciliation.files {
            self.store.save_file_outcome(current.batch_id, file).await?;
        }

        current.files = reconciliation.files;
        current.total_success_count = reconciliation.total_success_count;
        current.total_error_count = reconciliation.total_error_count;
        current.status = reconciliation.status;

        let saved = self.store.save_batch(&current).await?;
        info!(
            "Batch {} {}: {} imported, {} failed",
            saved.batch_id, saved.status, saved.total_success_count, saved.total_error_count
        );
        Ok(saved.status)
    }
}

fn status_handle(batch: &Batch) -> Result<Url> {
    let raw = batch.status_handle.as_deref().ok_or_else(|| {
        ImporterError::InvalidStatusHandle(format!(
            "Batch {} has no status handle",
            batch.batch_id
        ))
    })?;
    validate_http_url("status handle", raw).map_err(ImporterError::InvalidStatusHandle)
}
