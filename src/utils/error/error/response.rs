//! HTTP response handling for errors

use super::types::ImporterError;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};

impl ResponseError for ImporterError {
    fn status_code(&self) -> StatusCode {
        match self {
            ImporterError::MalformedInput(_)
            | ImporterError::Validation(_)
            | ImporterError::InvalidTransition { .. } => StatusCode::BAD_REQUEST,
            ImporterError::OversizedFile { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ImporterError::NotFound(_) => StatusCode::NOT_FOUND,
            ImporterError::Conflict(_) => StatusCode::CONFLICT,
            ImporterError::Submission(_)
            | ImporterError::ImportApi { .. }
            | ImporterError::HttpClient(_) => StatusCode::BAD_GATEWAY,
            ImporterError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status_code = self.status_code();
        let (error_code, message) = match self {
            ImporterError::MalformedInput(_) => ("MALFORMED_INPUT", self.to_string()),
            ImporterError::Validation(_) => ("VALIDATION_ERROR", self.to_string()),
            ImporterError::InvalidTransition { .. } => ("INVALID_TRANSITION", self.to_string()),
            ImporterError::OversizedFile { .. } => ("OVERSIZED_FILE", self.to_string()),
            ImporterError::NotFound(_) => ("NOT_FOUND", self.to_string()),
            ImporterError::Conflict(_) => ("CONFLICT", self.to_string()),
            ImporterError::Submission(_) => ("SUBMISSION_FAILED", self.to_string()),
            ImporterError::ImportApi { .. } | ImporterError::HttpClient(_) => {
                ("IMPORT_API_ERROR", self.to_string())
            }
            ImporterError::Timeout(_) => ("TIMEOUT", self.to_string()),
            ImporterError::Database(_) => {
                ("DATABASE_ERROR", "Database operation failed".to_string())
            }
            _ => ("INTERNAL_ERROR", "An internal error occurred".to_string()),
        };

        let error_response = ErrorResponse {
            success: false,
            error: ErrorDetail {
                code: error_code.to_string(),
                message,
                timestamp: chrono::Utc::now().timestamp(),
            },
        };

        HttpResponse::build(status_code).json(error_response)
    }
}

/// Standard error response format, matching the `success` flag of API responses
#[derive(Debug, serde::Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorDetail,
}

/// Error detail structure
#[derive(Debug, serde::Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    pub timestamp: i64,
}
