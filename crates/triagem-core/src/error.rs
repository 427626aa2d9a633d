//! Error types
//!
//! Remote store faults pass through unmodified; the controller wraps
//! them only to say which operation failed (fetch vs write). Nothing
//! here retries - re-invoking the failed operation is the caller's
//! decision.

use thiserror::Error;

use crate::models::Status;

/// Errors from the remote store collaborator
#[derive(Error, Debug)]
pub enum RemoteError {
    /// Transport-level HTTP failure
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status
    #[error("Remote store error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Response body could not be decoded
    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Change feed could not be established
    #[error("Change feed error: {0}")]
    Feed(String),
}

/// Errors surfaced by the sync controller
#[derive(Error, Debug)]
pub enum SyncError {
    /// A full load (initial or push-triggered) failed; the cache
    /// retains its last-known-good contents
    #[error("Failed to load applications: {0}")]
    Fetch(#[source] RemoteError),

    /// A create/update/delete failed; no local mutation was applied
    #[error("Write to remote store failed: {0}")]
    Write(#[source] RemoteError),

    /// Subscribing to the change feed failed
    #[error("Failed to subscribe to change feed: {0}")]
    Subscribe(#[source] RemoteError),

    /// The requested status is not a reviewer decision
    #[error("'{0}' is not a valid review decision (expected approved or rejected)")]
    InvalidStatus(Status),
}

/// Errors from the authentication collaborator
#[derive(Error, Debug)]
pub enum AuthError {
    /// Transport-level HTTP failure
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server refused the credentials
    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    /// Stored session could not be read or written
    #[error("Session store error: {0}")]
    Session(String),

    /// No active session
    #[error("Not signed in")]
    NotSignedIn,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_keeps_source_message() {
        let err = SyncError::Fetch(RemoteError::Api {
            status: 503,
            message: "service unavailable".to_string(),
        });
        let msg = err.to_string();
        assert!(msg.contains("Failed to load"));
        assert!(msg.contains("503"));
    }

    #[test]
    fn test_invalid_status_display() {
        let err = SyncError::InvalidStatus(Status::Pending);
        assert!(err.to_string().contains("pending"));
    }
}
