//! Configuration data models
//!
//! This module defines all configuration structures used by the importer.

pub mod batching;
pub mod import_api;
pub mod importer;
pub mod logging;
pub mod reconciler;
pub mod server;
pub mod storage;

pub use batching::*;
pub use import_api::*;
pub use importer::*;
pub use logging::*;
pub use reconciler::*;
pub use server::*;
pub use storage::*;

/// Default values for configuration
pub fn default_host() -> String {
    "0.0.0.0".to_string()
}

/// Default server port
pub fn default_port() -> u16 {
    8080
}

/// Default HTTP timeout in seconds
pub fn default_timeout() -> u64 {
    30
}

/// Default database URL
pub fn default_database_url() -> String {
    "sqlite://data/importer.db?mode=rwc".to_string()
}

pub fn default_max_connections() -> u32 {
    10
}

pub fn default_connection_timeout() -> u64 {
    5
}

/// Default resource budget per batch (100M resources)
pub fn default_max_batch_size() -> u64 {
    100_000_000
}

pub fn default_suggested_min_file_size() -> u64 {
    1_000
}

pub fn default_max_conflict_retries() -> u32 {
    5
}

/// Default FHIR server base URL
pub fn default_import_base_url() -> String {
    "http://localhost:8081".to_string()
}

/// Default base location of the batched files
pub fn default_storage_base_url() -> String {
    "http://localhost:10000/data/".to_string()
}

pub fn default_endpoint_path() -> String {
    "$import".to_string()
}

pub fn default_input_format() -> String {
    "application/fhir+ndjson".to_string()
}

pub fn default_import_mode() -> String {
    "IncrementalLoad".to_string()
}

/// Default reconciliation interval in seconds
pub fn default_poll_interval() -> u64 {
    60
}

pub fn default_poll_concurrency() -> usize {
    4
}

pub fn default_log_level() -> String {
    "info".to_string()
}

pub fn default_true() -> bool {
    true
}
