//! Wire types for the bulk import job API

use serde::{Deserialize, Serialize};

/// `Parameters` resource posted to start an import job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportRequest {
    pub resource_type: String,
    pub parameter: Vec<ImportParameter>,
}

/// A single `Parameters.parameter` entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportParameter {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_string: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub part: Vec<ImportParameterPart>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportParameterPart {
    pub name: String,
    pub value_uri: String,
}

impl ImportRequest {
    /// Build a request listing one `input` parameter per file location
    pub fn new<I, S>(input_format: &str, mode: &str, input_urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut parameter = vec![
            ImportParameter::string("inputFormat", input_format),
            ImportParameter::string("mode", mode),
        ];
        parameter.extend(input_urls.into_iter().map(|url| ImportParameter {
            name: "input".to_string(),
            value_string: None,
            part: vec![ImportParameterPart {
                name: "url".to_string(),
                value_uri: url.into(),
            }],
        }));

        Self {
            resource_type: "Parameters".to_string(),
            parameter,
        }
    }

    /// Locations of every `input` parameter, in request order
    pub fn input_urls(&self) -> Vec<&str> {
        self.parameter
            .iter()
            .filter(|p| p.name == "input")
            .flat_map(|p| p.part.iter())
            .filter(|part| part.name == "url")
            .map(|part| part.value_uri.as_str())
            .collect()
    }
}

impl ImportParameter {
    fn string(name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            value_string: Some(value.to_string()),
            part: Vec::new(),
        }
    }
}

/// Result body of a completed import job
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportStatusResponse {
    #[serde(default)]
    pub output: Vec<OutputEntry>,
    #[serde(default)]
    pub error: Vec<ErrorEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request: Option<String>,
}

/// Successfully imported resources for one input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputEntry {
    pub input_url: String,
    pub count: u64,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
}

/// Rejected resources for one input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorEntry {
    pub input_url: String,
    pub count: u64,
    /// Where the error log for this input can be fetched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
}

/// Accepted job submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSubmission {
    /// Absolute URL to poll for job status
    pub status_handle: String,
}

/// State of a submitted job as reported by its status endpoint
#[derive(Debug, Clone, PartialEq)]
pub enum JobStatus {
    InProgress,
    Completed(ImportStatusResponse),
}
