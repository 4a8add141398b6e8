//! HTTP client for the bulk import job API

use super::ImportJobClient;
use super::types::{ImportRequest, ImportStatusResponse, ImportSubmission, JobStatus};
use crate::config::ImportApiConfig;
use crate::utils::error::{ImporterError, Result};
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_LOCATION, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use tracing::{debug, warn};
use url::Url;

const FHIR_JSON: &str = "application/fhir+json";

/// [`ImportJobClient`] speaking the asynchronous FHIR `$import` request pattern
#[derive(Debug, Clone)]
pub struct HttpImportJobClient {
    client: Client,
    import_url: Url,
    bearer_token: Option<String>,
}

impl HttpImportJobClient {
    /// Create a client for the configured import endpoint
    pub fn new(config: &ImportApiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| ImporterError::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            import_url: import_url(&config.base_url, &config.endpoint_path)?,
            bearer_token: config.bearer_token.clone(),
        })
    }

    /// Absolute endpoint jobs are submitted to
    pub fn import_url(&self) -> &Url {
        &self.import_url
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.bearer_token {
            Some(token) => request.header(AUTHORIZATION, format!("Bearer {}", token)),
            None => request,
        }
    }
}

/// Join the base URL and the operation path, keeping any base path prefix
fn import_url(base_url: &str, endpoint_path: &str) -> Result<Url> {
    let mut base = base_url.to_string();
    if !base.ends_with('/') {
        base.push('/');
    }
    let base = Url::parse(&base)
        .map_err(|e| ImporterError::config(format!("Invalid import API base URL: {}", e)))?;
    base.join(endpoint_path.trim_start_matches('/'))
        .map_err(|e| ImporterError::config(format!("Invalid import endpoint path: {}", e)))
}

#[async_trait]
impl ImportJobClient for HttpImportJobClient {
    async fn submit_import(&self, request: &ImportRequest) -> Result<ImportSubmission> {
        let body = serde_json::to_vec(request)?;
        let response = self
            .authorize(
                self.client
                    .post(self.import_url.clone())
                    .header(CONTENT_TYPE, FHIR_JSON)
                    .header("Prefer", "respond-async"),
            )
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            warn!("Import submission rejected with {}: {}", status, message);
            return Err(ImporterError::ImportApi {
                status: status.as_u16(),
                message,
            });
        }

        let location = response
            .headers()
            .get(CONTENT_LOCATION)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| {
                ImporterError::submission(format!(
                    "Import accepted with {} but no Content-Location header",
                    status
                ))
            })?;

        // Relative handles are resolved against the endpoint that issued them
        let status_handle = self
            .import_url
            .join(location)
            .map_err(|e| {
                ImporterError::submission(format!("Unusable status handle {:?}: {}", location, e))
            })?
            .to_string();

        debug!("Import job accepted, status handle {}", status_handle);
        Ok(ImportSubmission { status_handle })
    }

    async fn fetch_status(&self, status_handle: &Url) -> Result<JobStatus> {
        let response = self
            .authorize(self.client.get(status_handle.clone()))
            .send()
            .await?;

        match response.status() {
            StatusCode::ACCEPTED => Ok(JobStatus::InProgress),
            StatusCode::OK => {
                let body = response.bytes().await?;
                let result: ImportStatusResponse = serde_json::from_slice(&body)?;
                Ok(JobStatus::Completed(result))
            }
            status => {
                let message = response.text().await.unwrap_or_default();
                Err(ImporterError::ImportApi {
                    status: status.as_u16(),
                    message,
                })
            }
        }
    }
}
