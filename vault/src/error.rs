//! Credential store error types using thiserror 2.0.

use avp_common::BackendError;
use thiserror::Error;

/// Errors surfaced by the credential store's write paths.
///
/// Reads never produce this type; see [`crate::CredentialStore::get`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Credential names must not be empty
    #[error("Invalid credential name: name must not be empty")]
    InvalidName,

    /// Backend failure, passed through unmodified
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Result type for credential store operations.
pub type StoreResult<T> = Result<T, StoreError>;

impl StoreError {
    /// The underlying backend error, if any.
    #[must_use]
    pub const fn backend(&self) -> Option<&BackendError> {
        match self {
            Self::Backend(err) => Some(err),
            Self::InvalidName => None,
        }
    }
}
