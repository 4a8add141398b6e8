//! Full batch lifecycle tests
//!
//! Arrivals go through the accumulator into SQLite, batches are submitted to
//! a mocked job API, and the reconciler records the job results.

#[cfg(test)]
mod tests {
    use crate::common::import_api::STORAGE_BASE_URL;
    use crate::common::{JobResultBuilder, MockImportApi, TestDatabase};
    use fhir_import_batcher::core::batch::PollOutcome;
    use fhir_import_batcher::core::import::HttpImportJobClient;
    use fhir_import_batcher::{
        BatchFilter, BatchStatus, BatchStore, Config, FileArrival, Importer,
    };
    use std::sync::Arc;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, ResponseTemplate};

    struct Pipeline {
        db: TestDatabase,
        api: MockImportApi,
        importer: Importer,
    }

    impl Pipeline {
        async fn start(max_batch_size: u64) -> Self {
            let db = TestDatabase::new().await;
            let api = MockImportApi::start().await;

            let mut config = Config::default();
            config.importer.import_api = api.config();
            config.importer.batching.max_batch_size = max_batch_size;
            config.importer.reconciler.request_timeout = 5;

            let client = HttpImportJobClient::new(config.import_api()).unwrap();
            let importer = Importer::with_components(config, db.store(), Arc::new(client));
            Self { db, api, importer }
        }

        /// Hand out `/jobs/{id}` for the next submission only
        async fn accept_next_submission(&self, job_id: u32) {
            Mock::given(method("POST"))
                .and(path("/$import"))
                .respond_with(
                    ResponseTemplate::new(202)
                        .insert_header("Content-Location", format!("/jobs/{}", job_id).as_str()),
                )
                .up_to_n_times(1)
                .mount(self.api.server())
                .await;
        }

        async fn arrive(&self, filename: &str, line_count: u64, last: bool) {
            self.importer
                .accumulator()
                .accept(FileArrival {
                    filename: filename.to_string(),
                    line_count,
                    is_last_in_request: last,
                })
                .await
                .unwrap();
        }

        async fn batches(&self, status: BatchStatus) -> Vec<fhir_import_batcher::Batch> {
            self.db
                .db()
                .list_batches(&BatchFilter::with_status(status))
                .await
                .unwrap()
        }
    }

    #[tokio::test]
    async fn test_full_lifecycle() {
        let pipeline = Pipeline::start(100).await;
        pipeline.accept_next_submission(1).await;
        pipeline.accept_next_submission(2).await;

        pipeline.arrive("a.ndjson", 40, false).await;
        pipeline.arrive("b.ndjson", 40, false).await;
        assert_eq!(pipeline.api.request_count("POST").await, 0);

        // Rolls the first batch over, then closes the second
        pipeline.arrive("c.ndjson", 30, true).await;
        assert_eq!(pipeline.api.request_count("POST").await, 2);
        assert!(pipeline.db.db().load_active_batch().await.unwrap().is_none());

        let initiated = pipeline.batches(BatchStatus::Initiated).await;
        assert_eq!(initiated.len(), 2);
        let first = initiated
            .iter()
            .find(|b| b.files.len() == 2)
            .expect("rolled-over batch")
            .clone();
        let second = initiated
            .iter()
            .find(|b| b.files.len() == 1)
            .expect("closed batch")
            .clone();
        assert_eq!(first.total_resource_count, 80);
        assert_eq!(first.status_handle, Some(pipeline.api.status_url(1)));
        assert_eq!(second.status_handle, Some(pipeline.api.status_url(2)));

        pipeline.api.job_in_progress(1, 1).await;
        pipeline
            .api
            .job_completed(
                1,
                &JobResultBuilder::new(STORAGE_BASE_URL)
                    .output("a.ndjson", 40)
                    .output("b.ndjson", 35)
                    .error("b.ndjson", 5)
                    .build(),
            )
            .await;
        pipeline
            .api
            .job_completed(
                2,
                &JobResultBuilder::new(STORAGE_BASE_URL)
                    .output("c.ndjson", 30)
                    .build(),
            )
            .await;

        let reconciler = pipeline.importer.reconciler();
        let summary = reconciler.run_once().await.unwrap();
        assert_eq!(summary.examined, 2);
        assert_eq!(summary.pending, 1);
        assert_eq!(summary.reconciled, 1);

        let summary = reconciler.run_once().await.unwrap();
        assert_eq!(summary.examined, 1);
        assert_eq!(summary.reconciled, 1);

        let first = pipeline
            .db
            .db()
            .get_batch(first.batch_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(first.status, BatchStatus::PartiallyFailed);
        assert_eq!(first.total_success_count, 75);
        assert_eq!(first.total_error_count, 5);
        let b = first.files.iter().find(|f| f.filename == "b.ndjson").unwrap();
        assert_eq!(b.success_count(), 35);
        assert_eq!(b.error_count(), 5);
        assert_eq!(b.error_url(), Some("http://errors.test/b.ndjson"));

        let second = pipeline
            .db
            .db()
            .get_batch(second.batch_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(second.status, BatchStatus::Succeeded);
        assert_eq!(second.total_success_count, 30);

        // Nothing left to poll
        let summary = reconciler.run_once().await.unwrap();
        assert_eq!(summary.examined, 0);
    }

    #[tokio::test]
    async fn test_failed_submission_retried_later() {
        let pipeline = Pipeline::start(100).await;
        pipeline.api.reject_submissions(503).await;

        let accepted = pipeline
            .importer
            .accumulator()
            .accept(FileArrival {
                filename: "a.ndjson".to_string(),
                line_count: 10,
                is_last_in_request: true,
            })
            .await
            .unwrap();
        assert!(accepted.closed);
        assert_eq!(accepted.status, BatchStatus::Staging);

        let staged = pipeline.db.db().load_active_batch().await.unwrap().unwrap();
        assert!(staged.closed);
        assert!(staged.status_handle.is_none());

        pipeline.api.server().reset().await;
        pipeline.accept_next_submission(9).await;

        let submitted = pipeline
            .importer
            .accumulator()
            .submit_pending()
            .await
            .unwrap()
            .expect("closed batch should be submitted");
        assert_eq!(submitted.status, BatchStatus::Initiated);
        assert_eq!(submitted.status_handle, Some(pipeline.api.status_url(9)));
        assert!(pipeline.db.db().load_active_batch().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_redelivered_file_is_not_duplicated() {
        let pipeline = Pipeline::start(100).await;

        pipeline.arrive("a.ndjson", 10, false).await;
        pipeline.arrive("a.ndjson", 10, false).await;

        let staged = pipeline.db.db().load_active_batch().await.unwrap().unwrap();
        assert_eq!(staged.files.len(), 1);
        assert_eq!(staged.total_resource_count, 10);
    }

    #[tokio::test]
    async fn test_incomplete_job_result_disables_polling() {
        let pipeline = Pipeline::start(100).await;
        pipeline.accept_next_submission(1).await;

        pipeline.arrive("a.ndjson", 10, false).await;
        pipeline.arrive("b.ndjson", 10, true).await;

        pipeline
            .api
            .job_completed(
                1,
                &JobResultBuilder::new(STORAGE_BASE_URL)
                    .output("a.ndjson", 10)
                    .build(),
            )
            .await;

        let batch = pipeline.batches(BatchStatus::Initiated).await.remove(0);
        let outcome = pipeline.importer.reconciler().reconcile_batch(batch.clone()).await;
        assert!(matches!(outcome, PollOutcome::Disabled(_)), "got {:?}", outcome);

        let stored = pipeline
            .db
            .db()
            .get_batch(batch.batch_id)
            .await
            .unwrap()
            .unwrap();
        assert!(!stored.pollable);
        assert!(stored.last_error.is_some());
        assert_eq!(stored.status, BatchStatus::Initiated);
        assert!(stored.files.iter().all(|f| f.outcome.is_none()));

        let summary = pipeline.importer.reconciler().run_once().await.unwrap();
        assert_eq!(summary.examined, 0);
    }

    #[tokio::test]
    async fn test_status_endpoint_failure_is_retried() {
        let pipeline = Pipeline::start(100).await;
        pipeline.accept_next_submission(1).await;
        pipeline.arrive("a.ndjson", 10, true).await;

        Mock::given(method("GET"))
            .and(path("/jobs/1"))
            .respond_with(ResponseTemplate::new(500))
            .up_to_n_times(1)
            .mount(pipeline.api.server())
            .await;
        pipeline
            .api
            .job_completed(
                1,
                &JobResultBuilder::new(STORAGE_BASE_URL)
                    .output("a.ndjson", 10)
                    .build(),
            )
            .await;

        let reconciler = pipeline.importer.reconciler();
        let summary = reconciler.run_once().await.unwrap();
        assert_eq!(summary.deferred, 1);
        assert_eq!(pipeline.batches(BatchStatus::Initiated).await.len(), 1);

        let summary = reconciler.run_once().await.unwrap();
        assert_eq!(summary.reconciled, 1);
        assert_eq!(pipeline.batches(BatchStatus::Succeeded).await.len(), 1);
    }
}
