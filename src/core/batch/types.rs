//! Batch lifecycle types and data structures

use crate::utils::error::{ImporterError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Batch lifecycle status
///
/// Transitions are strictly forward:
/// `staging -> initiated -> imported -> {succeeded | partiallyFailed | fullyFailed}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BatchStatus {
    /// Accepting files; at most one batch is ever in this state
    Staging,
    /// Submitted to the import job API, waiting for the job to finish
    Initiated,
    /// Job finished, per-file outcomes being recorded
    Imported,
    /// Every resource imported
    Succeeded,
    /// Some resources failed
    PartiallyFailed,
    /// No resource imported
    FullyFailed,
}

impl BatchStatus {
    pub const ALL: [BatchStatus; 6] = [
        BatchStatus::Staging,
        BatchStatus::Initiated,
        BatchStatus::Imported,
        BatchStatus::Succeeded,
        BatchStatus::PartiallyFailed,
        BatchStatus::FullyFailed,
    ];

    /// Storage and wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            BatchStatus::Staging => "staging",
            BatchStatus::Initiated => "initiated",
            BatchStatus::Imported => "imported",
            BatchStatus::Succeeded => "succeeded",
            BatchStatus::PartiallyFailed => "partiallyFailed",
            BatchStatus::FullyFailed => "fullyFailed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            BatchStatus::Succeeded | BatchStatus::PartiallyFailed | BatchStatus::FullyFailed
        )
    }

    /// Whether the file set is frozen
    pub fn is_submitted(&self) -> bool {
        !matches!(self, BatchStatus::Staging)
    }

    fn stage(&self) -> u8 {
        match self {
            BatchStatus::Staging => 0,
            BatchStatus::Initiated => 1,
            BatchStatus::Imported => 2,
            BatchStatus::Succeeded | BatchStatus::PartiallyFailed | BatchStatus::FullyFailed => 3,
        }
    }

    /// Staying put is always allowed; otherwise exactly one stage forward
    pub fn can_transition_to(&self, next: BatchStatus) -> bool {
        if *self == next {
            return true;
        }
        !self.is_terminal() && next.stage() == self.stage() + 1
    }
}

impl fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BatchStatus {
    type Err = ImporterError;

    fn from_str(s: &str) -> Result<Self> {
        BatchStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ImporterError::validation(format!("Unknown batch status: {}", s)))
    }
}

/// Import outcome recorded for one file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileOutcome {
    /// Resources imported
    pub success_count: u64,
    /// Resources rejected
    pub error_count: u64,
    /// Location of the error details, when any resource was rejected
    pub error_url: Option<String>,
}

/// One ingested file and, once reconciled, its import outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileReference {
    /// Unique within its batch
    pub filename: String,
    /// Resources contributed to the batch
    pub line_count: u64,
    /// Closes the producing request
    pub is_last_in_request: bool,
    /// Set exactly once by the reconciler
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<FileOutcome>,
}

impl FileReference {
    pub fn new(filename: impl Into<String>, line_count: u64) -> Self {
        Self {
            filename: filename.into(),
            line_count,
            is_last_in_request: false,
            outcome: None,
        }
    }

    /// Mark as the final file of its request
    pub fn last_in_request(mut self) -> Self {
        self.is_last_in_request = true;
        self
    }

    pub fn success_count(&self) -> u64 {
        self.outcome.as_ref().map_or(0, |o| o.success_count)
    }

    pub fn error_count(&self) -> u64 {
        self.outcome.as_ref().map_or(0, |o| o.error_count)
    }

    pub fn error_url(&self) -> Option<&str> {
        self.outcome.as_ref().and_then(|o| o.error_url.as_deref())
    }

    /// Same file identity, ignoring the outcome
    fn same_identity(&self, other: &FileReference) -> bool {
        self.filename == other.filename
            && self.line_count == other.line_count
            && self.is_last_in_request == other.is_last_in_request
    }
}

/// A unit of work submitted to the import job API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Batch {
    /// Assigned at creation
    pub batch_id: Uuid,
    pub status: BatchStatus,
    /// Always the sum of the files' line counts
    pub total_resource_count: u64,
    pub files: Vec<FileReference>,
    /// Returned by job submission; present once past `staging`
    pub status_handle: Option<String>,
    pub total_success_count: u64,
    pub total_error_count: u64,
    /// Closed to new files, waiting for submission
    pub closed: bool,
    /// Cleared after a permanent status-poll failure
    pub pollable: bool,
    /// Reason the batch stopped being polled
    pub last_error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Optimistic concurrency token; 0 until first persisted
    pub version: i64,
}

impl Batch {
    /// Fresh, empty staging batch
    pub fn new_staging() -> Self {
        let now = Utc::now();
        Self {
            batch_id: Uuid::new_v4(),
            status: BatchStatus::Staging,
            total_resource_count: 0,
            files: Vec::new(),
            status_handle: None,
            total_success_count: 0,
            total_error_count: 0,
            closed: false,
            pollable: true,
            last_error: None,
            created_at: now,
            updated_at: now,
            version: 0,
        }
    }

    pub fn is_persisted(&self) -> bool {
        self.version > 0
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn contains_file(&self, filename: &str) -> bool {
        self.files.iter().any(|f| f.filename == filename)
    }

    /// Append a file, keeping the resource total in step. Returns false for a duplicate filename.
    pub fn push_file(&mut self, file: FileReference) -> bool {
        if self.contains_file(&file.filename) {
            return false;
        }
        self.total_resource_count += file.line_count;
        self.files.push(file);
        true
    }

    /// Sum of the files' line counts
    pub fn summed_line_count(&self) -> u64 {
        self.files.iter().map(|f| f.line_count).sum()
    }

    /// Files without a recorded outcome
    pub fn files_missing_outcome(&self) -> Vec<&str> {
        self.files
            .iter()
            .filter(|f| f.outcome.is_none())
            .map(|f| f.filename.as_str())
            .collect()
    }

    /// Structural checks every persisted batch must pass
    pub fn check_invariants(&self) -> Result<()> {
        let summed = self.summed_line_count();
        if self.total_resource_count != summed {
            return Err(ImporterError::validation(format!(
                "Batch {} total resource count {} does not match its files ({})",
                self.batch_id, self.total_resource_count, summed
            )));
        }

        let mut seen = HashSet::with_capacity(self.files.len());
        for file in &self.files {
            if !seen.insert(file.filename.as_str()) {
                return Err(ImporterError::validation(format!(
                    "Batch {} lists {} more than once",
                    self.batch_id, file.filename
                )));
            }
        }

        if self.status.is_submitted() && self.status_handle.is_none() {
            return Err(ImporterError::validation(format!(
                "Batch {} is {} without a status handle",
                self.batch_id, self.status
            )));
        }

        if self.status.is_terminal() {
            let missing = self.files_missing_outcome();
            if !missing.is_empty() {
                return Err(ImporterError::validation(format!(
                    "Batch {} cannot be {} while files lack outcomes: {}",
                    self.batch_id,
                    self.status,
                    missing.join(", ")
                )));
            }
        }

        Ok(())
    }

    /// Whether both describe the same file set, ignoring order and outcomes
    pub fn same_files(&self, other: &Batch) -> bool {
        self.files.len() == other.files.len()
            && self.files.iter().all(|file| {
                other
                    .files
                    .iter()
                    .any(|candidate| candidate.same_identity(file))
            })
    }

    /// Equal persisted content, ignoring bookkeeping timestamps and version
    pub fn same_content(&self, other: &Batch) -> bool {
        self.batch_id == other.batch_id
            && self.status == other.status
            && self.total_resource_count == other.total_resource_count
            && self.status_handle == other.status_handle
            && self.total_success_count == other.total_success_count
            && self.total_error_count == other.total_error_count
            && self.closed == other.closed
            && self.pollable == other.pollable
            && self.last_error == other.last_error
            && self.same_files(other)
            && self.files.iter().all(|file| {
                other
                    .files
                    .iter()
                    .find(|candidate| candidate.filename == file.filename)
                    .is_some_and(|candidate| candidate.outcome == file.outcome)
            })
    }
}

/// File-arrival notification delivered to the accumulator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileArrival {
    pub filename: String,
    pub line_count: u64,
    #[serde(default, alias = "isLastFileInRequest")]
    pub is_last_in_request: bool,
}

impl FileArrival {
    /// Parse a JSON-encoded arrival event
    pub fn parse(raw: &str) -> Result<Self> {
        let arrival: FileArrival = serde_json::from_str(raw)
            .map_err(|e| ImporterError::MalformedInput(e.to_string()))?;
        arrival.validate()?;
        Ok(arrival)
    }

    /// The filename must be usable as the final segment of a location
    pub fn validate(&self) -> Result<()> {
        if self.filename.trim().is_empty() {
            return Err(ImporterError::MalformedInput(
                "filename cannot be empty".to_string(),
            ));
        }

        if let Some(c) = self
            .filename
            .chars()
            .find(|c| matches!(c, '/' | '\\' | '?' | '#') || c.is_whitespace() || c.is_control())
        {
            return Err(ImporterError::malformed(format!(
                "filename {:?} contains illegal character {:?}",
                self.filename, c
            )));
        }

        Ok(())
    }

    pub fn into_file_reference(self) -> FileReference {
        FileReference {
            filename: self.filename,
            line_count: self.line_count,
            is_last_in_request: self.is_last_in_request,
            outcome: None,
        }
    }
}
