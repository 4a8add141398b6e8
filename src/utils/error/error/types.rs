//! Core error types

use thiserror::Error;

/// Result type alias for the importer
pub type Result<T> = std::result::Result<T, ImporterError>;

/// Main error type for the importer
#[derive(Error, Debug)]
pub enum ImporterError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Database errors
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// HTTP client errors
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// An inbound file-arrival event could not be parsed
    #[error("Malformed file arrival: {0}")]
    MalformedInput(String),

    /// A single file larger than the whole batch budget
    #[error(
        "File {filename} carries {line_count} resources, exceeding the batch limit of {max_batch_size}"
    )]
    OversizedFile {
        filename: String,
        line_count: u64,
        max_batch_size: u64,
    },

    /// Validation errors, including store-boundary schema checks
    #[error("Validation error: {0}")]
    Validation(String),

    /// Attempted backward or skipping status change
    #[error("Invalid status transition for batch {batch_id}: {from} -> {to}")]
    InvalidTransition {
        batch_id: String,
        from: String,
        to: String,
    },

    /// Optimistic concurrency conflict
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Not found errors
    #[error("Not found: {0}")]
    NotFound(String),

    /// The import job could not be submitted
    #[error("Import submission failed: {0}")]
    Submission(String),

    /// The import job API answered with a non-success status
    #[error("Import API returned status {status}: {message}")]
    ImportApi { status: u16, message: String },

    /// A status handle that can never be polled
    #[error("Invalid status handle: {0}")]
    InvalidStatusHandle(String),

    /// A completed job result that does not account for every file or whose
    /// counts overflow
    #[error("Incomplete import result: {0}")]
    IncompleteResult(String),

    /// Timeout errors
    #[error("Timeout error: {0}")]
    Timeout(String),

    /// Internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}
