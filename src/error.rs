//! Error types surfaced by every client operation.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::session::StorageError;
use crate::validation::ValidationErrors;

/// Shown when a failure carries nothing worth displaying.
pub const DEFAULT_DISPLAY_MESSAGE: &str = "Unable to process your request. Please try again.";

/// The uniform `(status, message)` pair produced for every failed request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedError {
    pub status_code: u16,
    pub message: String,
}

impl NormalizedError {
    pub fn new(status_code: u16, message: impl Into<String>) -> Self {
        NormalizedError {
            status_code,
            message: message.into(),
        }
    }
}

impl fmt::Display for NormalizedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.status_code, self.message)
    }
}

#[derive(Debug, Error)]
pub enum ClientError {
    /// Missing or unusable client configuration. Not recoverable at runtime.
    #[error("configuration error: {0}")]
    Configuration(String),
    /// The backend answered 401. The session has already been invalidated.
    #[error("unauthorized: {}", .0.message)]
    Unauthorized(NormalizedError),
    #[error("request failed with status {}: {}", .0.status_code, .0.message)]
    Request(NormalizedError),
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("could not encode request body: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("session storage error: {0}")]
    Storage(#[from] StorageError),
}

impl ClientError {
    /// The normalized failure, for errors that came back from the network.
    pub fn normalized(&self) -> Option<&NormalizedError> {
        match self {
            ClientError::Unauthorized(e) | ClientError::Request(e) => Some(e),
            _ => None,
        }
    }

    pub fn status_code(&self) -> Option<u16> {
        self.normalized().map(|e| e.status_code)
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ClientError::Unauthorized(_))
    }
}

pub type Result<T, E = ClientError> = std::result::Result<T, E>;

/// Pick the text a user should see for `error`, falling back to `fallback`.
pub fn resolve_error_message(error: &ClientError, fallback: &str) -> String {
    let candidate = match error {
        ClientError::Unauthorized(e) | ClientError::Request(e) => Some(e.message.clone()),
        ClientError::Validation(errors) => errors.first().map(|e| e.message.clone()),
        _ => None,
    };
    candidate
        .filter(|message| !message.trim().is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_normalized_message() {
        let err = ClientError::Request(NormalizedError::new(404, "Card not found"));
        assert_eq!(
            resolve_error_message(&err, DEFAULT_DISPLAY_MESSAGE),
            "Card not found"
        );
        assert_eq!(err.status_code(), Some(404));
        assert!(!err.is_unauthorized());
    }

    #[test]
    fn blank_message_uses_fallback() {
        let err = ClientError::Unauthorized(NormalizedError::new(401, "  "));
        assert_eq!(resolve_error_message(&err, "try again"), "try again");
        assert!(err.is_unauthorized());
    }

    #[test]
    fn validation_uses_first_field_message() {
        let mut errors = ValidationErrors::default();
        errors.push("email", "Invalid email address");
        errors.push("password", "Password must be at least 8 characters");
        let err = ClientError::from(errors);
        assert_eq!(
            resolve_error_message(&err, DEFAULT_DISPLAY_MESSAGE),
            "Invalid email address"
        );
        assert_eq!(err.status_code(), None);
    }

    #[test]
    fn configuration_errors_use_fallback() {
        let err = ClientError::Configuration("missing api.base_url".into());
        assert_eq!(
            resolve_error_message(&err, DEFAULT_DISPLAY_MESSAGE),
            DEFAULT_DISPLAY_MESSAGE
        );
    }
}
