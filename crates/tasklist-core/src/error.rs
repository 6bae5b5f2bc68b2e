//! Error types
//!
//! Provides typed errors for the three failure classes of the client:
//! invalid user input, remote collection failures, and missing
//! configuration.

use reqwest::StatusCode;
use thiserror::Error;

/// Input rejected before any network call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Title was empty or whitespace only
    #[error("Title should not be empty")]
    EmptyTitle,
}

/// Failure of a call to the remote collection
///
/// The engine treats every variant the same way; the distinction only
/// matters for logs.
#[derive(Error, Debug)]
pub enum RemoteError {
    /// Connection, timeout or other transport failure
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("Server returned {status} for {url}")]
    Status { status: StatusCode, url: String },

    /// Response body could not be decoded
    #[error("Invalid response: {0}")]
    Decode(String),
}

impl RemoteError {
    /// Whether the server was reached at all
    pub fn is_transport(&self) -> bool {
        matches!(self, RemoteError::Transport(_))
    }
}

/// Fatal configuration problems
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// No owner identity configured
    #[error("User id is not configured")]
    MissingUserId,
}

impl ConfigError {
    /// Get a suggestion for fixing this error
    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            ConfigError::MissingUserId => {
                "Set your user id with `tasklist config set user_id <id>` or the TASKLIST_USER_ID environment variable."
            }
        }
    }
}

/// Result type for remote collection calls
pub type RemoteResult<T> = Result<T, RemoteError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message() {
        assert_eq!(
            ValidationError::EmptyTitle.to_string(),
            "Title should not be empty"
        );
    }

    #[test]
    fn test_status_error_display() {
        let err = RemoteError::Status {
            status: StatusCode::NOT_FOUND,
            url: "http://localhost/todos/9".to_string(),
        };

        let msg = err.to_string();
        assert!(msg.contains("404"));
        assert!(msg.contains("/todos/9"));
        assert!(!err.is_transport());
    }

    #[test]
    fn test_missing_user_id_suggestion() {
        let err = ConfigError::MissingUserId;
        assert!(err.recovery_suggestion().contains("user_id"));
    }
}
