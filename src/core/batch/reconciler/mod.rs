//! Status reconciliation
//!
//! `matching` turns a completed job result into per-file outcomes and a
//! terminal status without touching I/O; `poller` fetches job status and
//! persists what `matching` derives.

pub mod matching;
mod poller;

pub use matching::{
    Reconciliation, derive_terminal_status, input_file_name, merge_outcomes, reconcile,
};
pub use poller::{PollOutcome, ReconcileSummary, StatusReconciler};
