//! Matching job results to batch files

use crate::core::batch::{Batch, BatchStatus, FileOutcome, FileReference};
use crate::core::import::ImportStatusResponse;
use crate::utils::error::{ImporterError, Result};
use std::collections::{BTreeSet, HashMap};

/// Per-file outcomes and totals derived from a completed job
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    /// Batch files, each carrying its outcome
    pub files: Vec<FileReference>,
    pub total_success_count: u64,
    pub total_error_count: u64,
    /// Terminal status derived from the totals
    pub status: BatchStatus,
    /// Input references that match no file of the batch
    pub unmatched_inputs: Vec<String>,
}

fn add_count(total: u64, count: u64, key: &str) -> Result<u64> {
    total.checked_add(count).ok_or_else(|| {
        ImporterError::IncompleteResult(format!("Resource counts for {} overflow", key))
    })
}

fn merge(
    outcomes: &mut HashMap<String, FileOutcome>,
    key: &str,
    success_count: u64,
    error_count: u64,
    error_url: Option<&str>,
) -> Result<()> {
    let outcome = outcomes.entry(key.to_string()).or_default();
    outcome.success_count = add_count(outcome.success_count, success_count, key)?;
    outcome.error_count = add_count(outcome.error_count, error_count, key)?;
    if outcome.error_url.is_none() {
        outcome.error_url = error_url.filter(|url| !url.is_empty()).map(str::to_string);
    }
    Ok(())
}

/// Walk `output` then `error` in response order, merging under `key(input)`
fn merge_entries<F>(response: &ImportStatusResponse, key: F) -> Result<HashMap<String, FileOutcome>>
where
    F: Fn(&str) -> &str,
{
    let mut outcomes = HashMap::with_capacity(response.output.len() + response.error.len());
    for entry in &response.output {
        merge(&mut outcomes, key(entry.input_url.as_str()), entry.count, 0, None)?;
    }
    for entry in &response.error {
        merge(
            &mut outcomes,
            key(entry.input_url.as_str()),
            0,
            entry.count,
            entry.url.as_deref(),
        )?;
    }
    Ok(outcomes)
}

/// Merge `output` and `error` entries by input reference in a single pass.
///
/// Repeated entries for one reference are summed and the first error
/// location is kept. Counts that overflow fail with
/// [`ImporterError::IncompleteResult`].
pub fn merge_outcomes(response: &ImportStatusResponse) -> Result<HashMap<String, FileOutcome>> {
    merge_entries(response, |input| input)
}

/// Final path segment of an input reference, ignoring query and fragment
pub fn input_file_name(input: &str) -> &str {
    let end = input.find(['?', '#']).unwrap_or(input.len());
    let path = input[..end].trim_end_matches('/');
    match path.rfind('/') {
        Some(index) => &path[index + 1..],
        None => path,
    }
}

pub fn derive_terminal_status(total_success_count: u64, total_error_count: u64) -> BatchStatus {
    if total_error_count == 0 {
        BatchStatus::Succeeded
    } else if total_success_count == 0 {
        BatchStatus::FullyFailed
    } else {
        BatchStatus::PartiallyFailed
    }
}

/// Derive every file outcome and the terminal status of `batch` from a
/// completed job result.
///
/// Fails with [`ImporterError::IncompleteResult`] when a file that carries
/// resources is absent from the result; an empty file legitimately produces
/// no entries and is recorded with zero counts.
pub fn reconcile(batch: &Batch, response: &ImportStatusResponse) -> Result<Reconciliation> {
    let mut by_name = merge_entries(response, input_file_name)?;
    let mut inputs_by_name: HashMap<&str, BTreeSet<&str>> = HashMap::new();
    let inputs = response.output.iter().map(|entry| entry.input_url.as_str());
    let inputs = inputs.chain(response.error.iter().map(|entry| entry.input_url.as_str()));
    for input in inputs {
        inputs_by_name
            .entry(input_file_name(input))
            .or_default()
            .insert(input);
    }

    let mut files = Vec::with_capacity(batch.files.len());
    let mut missing = Vec::new();
    for file in &batch.files {
        let outcome = match by_name.remove(&file.filename) {
            Some(outcome) => outcome,
            None if file.line_count == 0 => FileOutcome::default(),
            None => {
                missing.push(file.filename.as_str());
                continue;
            }
        };
        files.push(FileReference {
            outcome: Some(outcome),
            ..file.clone()
        });
    }

    if !missing.is_empty() {
        return Err(ImporterError::IncompleteResult(format!(
            "Job result for batch {} has no entry for {}",
            batch.batch_id,
            missing.join(", ")
        )));
    }

    let total_success_count = total(&files, FileReference::success_count, "success")?;
    let total_error_count = total(&files, FileReference::error_count, "error")?;

    let mut unmatched_inputs: Vec<String> = by_name
        .into_keys()
        .flat_map(|name| inputs_by_name.remove(name.as_str()).unwrap_or_default())
        .map(str::to_string)
        .collect();
    unmatched_inputs.sort();

    Ok(Reconciliation {
        files,
        total_success_count,
        total_error_count,
        status: derive_terminal_status(total_success_count, total_error_count),
        unmatched_inputs,
    })
}

fn total(files: &[FileReference], count: fn(&FileReference) -> u64, kind: &str) -> Result<u64> {
    files
        .iter()
        .try_fold(0u64, |sum, file| add_count(sum, count(file), kind))
        .map_err(|_| ImporterError::IncompleteResult(format!("Total {} count overflows", kind)))
}
