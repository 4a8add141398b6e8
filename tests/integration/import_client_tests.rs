//! Import job client integration tests
//!
//! Runs the HTTP client against a `wiremock` stand-in for the job API.

#[cfg(test)]
mod tests {
    use crate::common::MockImportApi;
    use fhir_import_batcher::ImporterError;
    use fhir_import_batcher::core::import::{
        HttpImportJobClient, ImportJobClient, ImportRequest, JobStatus,
    };
    use serde_json::json;
    use url::Url;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, ResponseTemplate};

    fn request() -> ImportRequest {
        ImportRequest::new(
            "application/fhir+ndjson",
            "IncrementalLoad",
            [
                "http://storage.test/ndjson/a.ndjson",
                "http://storage.test/ndjson/b.ndjson",
            ],
        )
    }

    #[tokio::test]
    async fn test_submit_sends_parameters_resource() {
        let api = MockImportApi::start().await;
        Mock::given(method("POST"))
            .and(path("/$import"))
            .and(header("Content-Type", "application/fhir+json"))
            .and(header("Prefer", "respond-async"))
            .and(body_partial_json(json!({ "resourceType": "Parameters" })))
            .respond_with(ResponseTemplate::new(202).insert_header("Content-Location", "/jobs/7"))
            .expect(1)
            .mount(api.server())
            .await;

        let client = HttpImportJobClient::new(&api.config()).unwrap();
        let submission = client.submit_import(&request()).await.unwrap();
        assert_eq!(submission.status_handle, api.status_url(7));

        let received = api.server().received_requests().await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&received[0].body).unwrap();
        let inputs: Vec<_> = body["parameter"]
            .as_array()
            .unwrap()
            .iter()
            .filter(|p| p["name"] == "input")
            .collect();
        assert_eq!(inputs.len(), 2);
    }

    #[tokio::test]
    async fn test_submit_keeps_absolute_content_location() {
        let api = MockImportApi::start().await;
        Mock::given(method("POST"))
            .and(path("/$import"))
            .respond_with(
                ResponseTemplate::new(202)
                    .insert_header("Content-Location", "https://jobs.elsewhere.test/status/abc"),
            )
            .mount(api.server())
            .await;

        let client = HttpImportJobClient::new(&api.config()).unwrap();
        let submission = client.submit_import(&request()).await.unwrap();
        assert_eq!(
            submission.status_handle,
            "https://jobs.elsewhere.test/status/abc"
        );
    }

    #[tokio::test]
    async fn test_submit_sends_bearer_token() {
        let api = MockImportApi::start().await;
        Mock::given(method("POST"))
            .and(header("Authorization", "Bearer secret-token"))
            .respond_with(ResponseTemplate::new(202).insert_header("Content-Location", "/jobs/1"))
            .expect(1)
            .mount(api.server())
            .await;

        let mut config = api.config();
        config.bearer_token = Some("secret-token".to_string());
        let client = HttpImportJobClient::new(&config).unwrap();
        assert!(client.submit_import(&request()).await.is_ok());
    }

    #[tokio::test]
    async fn test_submit_rejected() {
        let api = MockImportApi::start().await;
        api.reject_submissions(503).await;

        let client = HttpImportJobClient::new(&api.config()).unwrap();
        let err = client.submit_import(&request()).await.unwrap_err();
        match err {
            ImporterError::ImportApi { status, message } => {
                assert_eq!(status, 503);
                assert_eq!(message, "unavailable");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_submit_without_content_location() {
        let api = MockImportApi::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(202))
            .mount(api.server())
            .await;

        let client = HttpImportJobClient::new(&api.config()).unwrap();
        let err = client.submit_import(&request()).await.unwrap_err();
        assert!(matches!(err, ImporterError::Submission(_)), "got {:?}", err);
    }

    #[tokio::test]
    async fn test_fetch_status_in_progress() {
        let api = MockImportApi::start().await;
        api.job_in_progress(3, 1).await;

        let client = HttpImportJobClient::new(&api.config()).unwrap();
        let handle = Url::parse(&api.status_url(3)).unwrap();
        let status = client.fetch_status(&handle).await.unwrap();
        assert_eq!(status, JobStatus::InProgress);
    }

    #[tokio::test]
    async fn test_fetch_status_completed() {
        let api = MockImportApi::start().await;
        let body = json!({
            "transactionTime": "2024-09-01T10:00:00Z",
            "request": "http://fhir.test/$import",
            "output": [
                { "type": "Patient", "inputUrl": "http://storage.test/ndjson/a.ndjson", "count": 9 }
            ],
            "error": [
                {
                    "type": "OperationOutcome",
                    "inputUrl": "http://storage.test/ndjson/a.ndjson",
                    "count": 1,
                    "url": "http://errors.test/a.ndjson"
                }
            ]
        });
        api.job_completed(3, &body).await;

        let client = HttpImportJobClient::new(&api.config()).unwrap();
        let handle = Url::parse(&api.status_url(3)).unwrap();
        let JobStatus::Completed(result) = client.fetch_status(&handle).await.unwrap() else {
            panic!("job should be completed");
        };
        assert_eq!(result.output.len(), 1);
        assert_eq!(result.output[0].count, 9);
        assert_eq!(result.output[0].resource_type.as_deref(), Some("Patient"));
        assert_eq!(result.error[0].url.as_deref(), Some("http://errors.test/a.ndjson"));
    }

    #[tokio::test]
    async fn test_fetch_status_server_error() {
        let api = MockImportApi::start().await;
        Mock::given(method("GET"))
            .and(path("/jobs/4"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(api.server())
            .await;

        let client = HttpImportJobClient::new(&api.config()).unwrap();
        let handle = Url::parse(&api.status_url(4)).unwrap();
        let err = client.fetch_status(&handle).await.unwrap_err();
        assert!(
            matches!(err, ImporterError::ImportApi { status: 500, .. }),
            "got {:?}",
            err
        );
    }

    #[tokio::test]
    async fn test_fetch_status_unparseable_body() {
        let api = MockImportApi::start().await;
        Mock::given(method("GET"))
            .and(path("/jobs/5"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(api.server())
            .await;

        let client = HttpImportJobClient::new(&api.config()).unwrap();
        let handle = Url::parse(&api.status_url(5)).unwrap();
        let err = client.fetch_status(&handle).await.unwrap_err();
        assert!(
            matches!(err, ImporterError::Serialization(_)),
            "got {:?}",
            err
        );
    }
}
