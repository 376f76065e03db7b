//! Secret backend boundary.
//!
//! The store never talks to a vault directly; it goes through this trait so
//! any encrypted vault client can sit behind it.

use crate::secrets::{Labels, SecretSummary, SecretValue, Session};
use avp_common::BackendResult;

/// One connection to an external secret backend.
///
/// Implementations own encryption, authentication, storage format and any
/// locking they need. Other connections may read and write the same secrets
/// concurrently; `close` releases this connection only.
pub trait SecretBackend: Send + Sync {
    /// Open a session scoped to `workspace`.
    fn authenticate(&self, workspace: &str) -> BackendResult<Session>;

    /// Fetch the current value of `name`.
    fn retrieve(&self, session: &Session, name: &str) -> BackendResult<SecretValue>;

    /// Create or overwrite `name`.
    fn store(
        &self,
        session: &Session,
        name: &str,
        value: &[u8],
        labels: &Labels,
    ) -> BackendResult<()>;

    /// Remove `name`, returning whether it existed.
    fn delete(&self, session: &Session, name: &str) -> BackendResult<bool>;

    /// List secrets whose labels match every entry in `filter`.
    fn list_secrets(
        &self,
        session: &Session,
        filter: Option<&Labels>,
    ) -> BackendResult<Vec<SecretSummary>>;

    /// Write a new version of an existing secret, keeping history.
    fn rotate(&self, session: &Session, name: &str, value: &[u8]) -> BackendResult<()>;

    /// Release this connection. Sessions opened on it become invalid.
    fn close(&self) -> BackendResult<()>;
}
