//! Common test utilities for fhir-import-batcher
//!
//! This module provides shared test infrastructure for all tests:
//! - In-memory SQLite database support
//! - Batch fixtures and import job result bodies
//! - A mock import job API
//!
//! # Usage
//!
//! ```rust
//! use crate::common::{TestDatabase, fixtures};
//!
//! #[tokio::test]
//! async fn my_test() {
//!     let db = TestDatabase::new().await;
//!     let batch = fixtures::BatchFactory::staging(&[("a.ndjson", 10)]);
//!     // ...
//! }
//! ```

pub mod fixtures;
pub mod import_api;

// Re-export commonly used items
pub use database::TestDatabase;
pub use fixtures::{BatchFactory, JobResultBuilder};
pub use import_api::MockImportApi;
