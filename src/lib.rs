//! # fhir-import-batcher
//!
//! Groups NDJSON file arrivals into size-bounded batches, submits each batch
//! as one FHIR bulk `$import` job and reconciles per-file import outcomes once
//! the job completes.
//!
//! ## Lifecycle
//!
//! - **Accumulate**: each arriving file joins the single `staging` batch until
//!   the resource threshold would be exceeded or the file closes its request
//! - **Submit**: a closed batch becomes one import job; its status handle is
//!   recorded and the batch moves to `initiated`
//! - **Reconcile**: a periodic task polls job status, records each file's
//!   success and error counts and derives `succeeded`, `partiallyFailed` or
//!   `fullyFailed`
//!
//! ## Service Mode
//!
//! ```rust,no_run
//! use fhir_import_batcher::{Config, server};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("config/importer.yaml").await?;
//!     server::builder::run_service(config).await?;
//!     Ok(())
//! }
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_inception)]

// Public module exports
pub mod config;
pub mod core;
pub mod server;
pub mod storage;
pub mod utils;

// Re-export main types
pub use config::Config;
pub use core::Importer;
pub use core::batch::{
    Batch, BatchAccumulator, BatchStatus, FileArrival, FileOutcome, FileReference,
    ImportSubmitter, StatusReconciler,
};
pub use storage::{BatchFilter, BatchStore, MemoryBatchStore};
pub use utils::error::{ImporterError, Result};

// Version information
/// Current version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Name of the crate
pub const NAME: &str = env!("CARGO_PKG_NAME");
/// Description of the crate
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
