//! Helper functions for creating and classifying errors

use super::types::ImporterError;

impl ImporterError {
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    pub fn malformed<S: Into<String>>(message: S) -> Self {
        Self::MalformedInput(message.into())
    }

    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation(message.into())
    }

    pub fn conflict<S: Into<String>>(message: S) -> Self {
        Self::Conflict(message.into())
    }

    pub fn not_found<S: Into<String>>(message: S) -> Self {
        Self::NotFound(message.into())
    }

    pub fn submission<S: Into<String>>(message: S) -> Self {
        Self::Submission(message.into())
    }

    pub fn timeout<S: Into<String>>(message: S) -> Self {
        Self::Timeout(message.into())
    }

    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal(message.into())
    }

    /// Failures worth retrying on a later cycle
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::HttpClient(_)
                | Self::ImportApi { .. }
                | Self::Timeout(_)
                | Self::Conflict(_)
                | Self::Database(_)
                | Self::Submission(_)
        )
    }

    /// Status-poll failures that will never resolve by polling again
    pub fn is_permanent_poll_failure(&self) -> bool {
        matches!(
            self,
            Self::InvalidStatusHandle(_) | Self::IncompleteResult(_)
        )
    }

    /// Whether this is an optimistic concurrency conflict
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }
}
