//! Test fixtures and data factories
//!
//! Provides factory methods for creating test data with sensible defaults.
//! All factories create real objects, not mocks.

use fhir_import_batcher::{Batch, BatchStatus, FileReference};
use serde_json::{Value, json};

/// Factory for creating test batches
pub struct BatchFactory;

impl BatchFactory {
    /// Unsaved staging batch holding the given files
    pub fn staging(files: &[(&str, u64)]) -> Batch {
        let mut batch = Batch::new_staging();
        for (name, lines) in files {
            batch.push_file(FileReference::new(*name, *lines));
        }
        batch
    }

    /// Unsaved batch that has been submitted under `status_handle`
    pub fn initiated(files: &[(&str, u64)], status_handle: &str) -> Batch {
        let mut batch = Self::staging(files);
        batch.status = BatchStatus::Initiated;
        batch.status_handle = Some(status_handle.to_string());
        batch.closed = true;
        batch
    }
}

/// Builder for completed import job result bodies
#[derive(Debug, Default)]
pub struct JobResultBuilder {
    base_url: String,
    output: Vec<Value>,
    error: Vec<Value>,
}

impl JobResultBuilder {
    /// Inputs are addressed relative to `base_url`
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            ..Default::default()
        }
    }

    fn input_url(&self, filename: &str) -> String {
        format!("{}/{}", self.base_url, filename)
    }

    pub fn output(mut self, filename: &str, count: u64) -> Self {
        let entry = json!({
            "type": "Patient",
            "inputUrl": self.input_url(filename),
            "count": count,
        });
        self.output.push(entry);
        self
    }

    pub fn error(mut self, filename: &str, count: u64) -> Self {
        let entry = json!({
            "type": "OperationOutcome",
            "inputUrl": self.input_url(filename),
            "count": count,
            "url": format!("http://errors.test/{}", filename),
        });
        self.error.push(entry);
        self
    }

    pub fn build(self) -> Value {
        json!({
            "transactionTime": "2024-09-01T10:00:00Z",
            "request": "http://fhir.test/$import",
            "output": self.output,
            "error": self.error,
        })
    }
}
