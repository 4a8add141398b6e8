//! Configuration validation
//!
//! The validation is organized into several submodules:
//! - `trait_def`: Core Validate trait definition
//! - `config_validators`: Top-level, server and logging validators
//! - `storage_validators`: Database validators
//! - `batch_validators`: Batching, import API and reconciler validators
//! - `tests`: Test suite for all validators

mod batch_validators;
mod config_validators;
mod storage_validators;
mod trait_def;

pub use trait_def::Validate;

/// Check that a configured URL is absolute http(s) with a host
pub(crate) fn validate_http_url(field: &str, value: &str) -> Result<url::Url, String> {
    if value.is_empty() {
        return Err(format!("{} cannot be empty", field));
    }

    let parsed =
        url::Url::parse(value).map_err(|e| format!("{} is not a valid URL: {}", field, e))?;

    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(format!("{} must use http or https", field));
    }

    if parsed.host_str().is_none() {
        return Err(format!("{} must include a host", field));
    }

    Ok(parsed)
}
