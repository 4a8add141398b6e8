//! Bulk import job API
//!
//! The [`ImportJobClient`] trait is the seam between batch lifecycle logic and
//! the external job service: the submitter starts jobs through it and the
//! reconciler polls them.

pub mod client;
pub mod types;

pub use client::HttpImportJobClient;
pub use types::*;

use crate::utils::error::Result;
use async_trait::async_trait;
use url::Url;

/// Client for an asynchronous bulk import job API
#[async_trait]
pub trait ImportJobClient: Send + Sync {
    /// Start a job and return its status handle
    async fn submit_import(&self, request: &ImportRequest) -> Result<ImportSubmission>;

    /// Query a previously started job
    async fn fetch_status(&self, status_handle: &Url) -> Result<JobStatus>;
}
