//! Import job submission

use super::types::{Batch, BatchStatus};
use crate::config::ImportApiConfig;
use crate::core::import::{ImportJobClient, ImportRequest};
use crate::storage::BatchStore;
use crate::utils::error::{ImporterError, Result};
use std::sync::Arc;
use tracing::{debug, error, info};

/// Starts an import job for a closed batch and records its status handle
pub struct ImportSubmitter {
    client: Arc<dyn ImportJobClient>,
    store: Arc<dyn BatchStore>,
    config: ImportApiConfig,
}

impl ImportSubmitter {
    pub fn new(
        client: Arc<dyn ImportJobClient>,
        store: Arc<dyn BatchStore>,
        config: ImportApiConfig,
    ) -> Self {
        Self {
            client,
            store,
            config,
        }
    }

    /// Location the import service reads `filename` from
    pub fn file_url(&self, filename: &str) -> String {
        format!(
            "{}/{}",
            self.config.storage_base_url.trim_end_matches('/'),
            filename
        )
    }

    /// Job request referencing every file of the batch
    pub fn build_request(&self, batch: &Batch) -> ImportRequest {
        ImportRequest::new(
            &self.config.input_format,
            &self.config.mode,
            batch.files.iter().map(|file| self.file_url(&file.filename)),
        )
    }

    /// Submit a batch and move it to `initiated`.
    ///
    /// A batch that already left `staging` is returned untouched. On failure
    /// nothing is persisted and the batch can be submitted again. When the job
    /// starts but the batch cannot be saved, its status handle is logged so
    /// the orphaned job can be cancelled.
    pub async fn submit(&self, batch: Batch) -> Result<Batch> {
        if batch.status != BatchStatus::Staging {
            debug!(
                "Batch {} already {}, not resubmitting",
                batch.batch_id, batch.status
            );
            return Ok(batch);
        }

        if batch.is_empty() {
            return Err(ImporterError::validation(format!(
                "Batch {} has no files to import",
                batch.batch_id
            )));
        }

        let request = self.build_request(&batch);
        let submission = self.client.submit_import(&request).await.map_err(|e| {
            ImporterError::submission(format!(
                "Batch {} could not be submitted: {}",
                batch.batch_id, e
            ))
        })?;

        let mut initiated = batch;
        initiated.status = BatchStatus::Initiated;
        initiated.status_handle = Some(submission.status_handle);
        initiated.closed = true;

        let saved = match self.store.save_batch(&initiated).await {
            Ok(saved) => saved,
            Err(e) => {
                error!(
                    "Batch {} was submitted but not recorded, import job {} is orphaned: {}",
                    initiated.batch_id,
                    initiated.status_handle.as_deref().unwrap_or_default(),
                    e
                );
                return Err(e);
            }
        };
        info!(
            "Batch {} submitted with {} files ({} resources), status handle {}",
            saved.batch_id,
            saved.files.len(),
            saved.total_resource_count,
            saved.status_handle.as_deref().unwrap_or_default()
        );
        Ok(saved)
    }
}
