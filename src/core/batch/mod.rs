//! Batch lifecycle for bulk FHIR imports
//!
//! Arriving files are accumulated into size-bounded batches, each closed
//! batch is submitted as one import job, and a periodic reconciler records
//! per-file outcomes once the job completes.

mod accumulator;
pub mod reconciler;
mod scheduler;
mod submitter;
mod types;


// Re-export all public types
pub use accumulator::{Accumulation, BatchAccumulator, accumulate};
pub use reconciler::{PollOutcome, ReconcileSummary, StatusReconciler};
pub use scheduler::spawn_reconciliation_task;
pub use submitter::ImportSubmitter;
pub use types::{Batch, BatchStatus, FileArrival, FileOutcome, FileReference};
