//! Error handling for the importer
//!
//! This module defines all error types used throughout the service.

mod helpers;
mod response;
mod types;

pub use response::{ErrorDetail, ErrorResponse};
pub use types::{ImporterError, Result};
