//! Error types shared by every secret backend.
//!
//! Backends report failures through [`BackendError`]. The credential store
//! passes these through unmodified on its write paths and swallows them on
//! its read path, so the variants only need to be precise enough for callers
//! that inspect write failures.

use thiserror::Error;

/// Failure reported by a secret backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// No secret with this name exists in the session's workspace
    #[error("Secret not found: {0}")]
    NotFound(String),

    /// Authentication against the backend failed
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The session handle is unknown to the backend or has been revoked
    #[error("Invalid session: {0}")]
    InvalidSession(String),

    /// The backend is temporarily unreachable
    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    /// The backend connection has already been closed
    #[error("Backend connection closed")]
    Closed,

    /// Internal backend error
    #[error("Internal backend error: {0}")]
    Internal(String),
}

/// Result type for backend operations.
pub type BackendResult<T> = Result<T, BackendError>;

impl BackendError {
    /// Check if this error describes a transient fault.
    ///
    /// This is informational only. Nothing in this workspace retries; retry
    /// policy, if any, belongs to the backend.
    ///
    /// # Examples
    ///
    /// ```
    /// use avp_common::BackendError;
    ///
    /// assert!(BackendError::unavailable("connection reset").is_transient());
    /// assert!(!BackendError::not_found("openai_api_key").is_transient());
    /// ```
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }

    /// Check if this error means the secret does not exist.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Create a not found error for the given secret name.
    #[must_use]
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound(name.into())
    }

    /// Create an unavailable error with the given message.
    #[must_use]
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    /// Create an invalid session error.
    #[must_use]
    pub fn invalid_session(session_id: impl Into<String>) -> Self {
        Self::InvalidSession(session_id.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_errors() {
        assert!(BackendError::Unavailable("timeout".to_string()).is_transient());
    }

    #[test]
    fn test_non_transient_errors() {
        assert!(!BackendError::not_found("key").is_transient());
        assert!(!BackendError::Closed.is_transient());
        assert!(!BackendError::AuthenticationFailed("bad password".to_string()).is_transient());
    }

    #[test]
    fn test_error_display() {
        let err = BackendError::not_found("openai_api_key");
        assert_eq!(err.to_string(), "Secret not found: openai_api_key");

        let err = BackendError::invalid_session("3f2a");
        assert_eq!(err.to_string(), "Invalid session: 3f2a");

        assert_eq!(BackendError::Closed.to_string(), "Backend connection closed");
    }
}
