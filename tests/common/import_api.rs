//! Mock bulk import job API
//!
//! Wraps a `wiremock` server that accepts `$import` submissions and serves
//! job status under `/jobs/{id}`.

use fhir_import_batcher::config::ImportApiConfig;
use serde_json::Value;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Storage location the mocked jobs read their inputs from
pub const STORAGE_BASE_URL: &str = "http://storage.test/ndjson";

pub struct MockImportApi {
    server: MockServer,
}

impl MockImportApi {
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    pub fn server(&self) -> &MockServer {
        &self.server
    }

    pub fn base_url(&self) -> String {
        self.server.uri()
    }

    /// Client configuration pointing at this server
    pub fn config(&self) -> ImportApiConfig {
        ImportApiConfig {
            base_url: self.base_url(),
            storage_base_url: STORAGE_BASE_URL.to_string(),
            timeout: 5,
            ..Default::default()
        }
    }

    /// Absolute status handle for `job_id`
    pub fn status_url(&self, job_id: u32) -> String {
        format!("{}/jobs/{}", self.base_url(), job_id)
    }

    /// Accept every submission, handing out the status handle of `job_id`
    pub async fn accept_submissions(&self, job_id: u32) {
        Mock::given(method("POST"))
            .and(path("/$import"))
            .respond_with(
                ResponseTemplate::new(202)
                    .insert_header("Content-Location", format!("/jobs/{}", job_id).as_str()),
            )
            .mount(&self.server)
            .await;
    }

    /// Reject every submission with `status`
    pub async fn reject_submissions(&self, status: u16) {
        Mock::given(method("POST"))
            .and(path("/$import"))
            .respond_with(ResponseTemplate::new(status).set_body_string("unavailable"))
            .mount(&self.server)
            .await;
    }

    /// Report `job_id` as still running, for at most `times` polls
    pub async fn job_in_progress(&self, job_id: u32, times: u64) {
        Mock::given(method("GET"))
            .and(path(format!("/jobs/{}", job_id)))
            .respond_with(ResponseTemplate::new(202))
            .up_to_n_times(times)
            .mount(&self.server)
            .await;
    }

    /// Report `job_id` as completed with `result`
    pub async fn job_completed(&self, job_id: u32, result: &Value) {
        Mock::given(method("GET"))
            .and(path(format!("/jobs/{}", job_id)))
            .respond_with(ResponseTemplate::new(200).set_body_json(result))
            .mount(&self.server)
            .await;
    }

    /// Requests received so far that match `http_method`
    pub async fn request_count(&self, http_method: &str) -> usize {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|request| request.method.as_str() == http_method)
            .count()
    }
}
