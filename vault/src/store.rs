//! Credential store over a pluggable secret backend.

use crate::backend::SecretBackend;
use crate::config::StoreConfig;
use crate::error::{StoreError, StoreResult};
use crate::secrets::{Labels, Session};
use avp_common::BackendResult;
use secrecy::SecretString;
use std::fmt;
use tracing::{debug, info, instrument, warn};

/// Capability-scoped accessor for the credentials of one workspace.
///
/// The store owns its backend connection. The session is opened by
/// [`CredentialStore::open`] and the connection released exactly once: either by [`CredentialStore::close`] or, on every other
/// exit path (early return, panic unwinding), when the store is dropped.
///
/// Values are never cached. Each read goes through the backend and the
/// decoded value is handed to the caller as a [`SecretString`].
pub struct CredentialStore {
    backend: Box<dyn SecretBackend>,
    session: Session,
    open: bool,
}

impl CredentialStore {
    /// Take ownership of the `backend` connection, authenticate, and open a
    /// store for the configured workspace.
    ///
    /// Stores sharing secrets each need their own connection, e.g. from
    /// [`crate::MemoryBackend::connect`].
    ///
    /// # Errors
    ///
    /// Returns the backend's authentication error unmodified.
    #[instrument(skip(backend), fields(workspace = %config.workspace))]
    pub fn open<B>(backend: B, config: &StoreConfig) -> StoreResult<Self>
    where
        B: SecretBackend + 'static,
    {
        let session = backend.authenticate(&config.workspace)?;
        info!(session_id = %session.session_id(), "Opened credential store");
        Ok(Self {
            backend: Box::new(backend),
            session,
            open: true,
        })
    }

    /// Workspace this store is scoped to.
    #[must_use]
    pub fn workspace(&self) -> &str {
        self.session.workspace()
    }

    /// Read a credential.
    ///
    /// Fails soft: a missing secret, a payload that is not valid UTF-8 and a
    /// backend fault all yield `None`. Callers cannot tell these apart.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<SecretString> {
        match self.backend.retrieve(&self.session, name) {
            Ok(value) => match std::str::from_utf8(value.expose_bytes()) {
                Ok(text) => Some(SecretString::from(text)),
                Err(e) => {
                    debug!(name, error = %e, "Credential is not valid UTF-8");
                    None
                }
            },
            Err(e) => {
                debug!(name, error = %e, "Credential read failed");
                None
            }
        }
    }

    /// Read a credential, returning `default` on any failure.
    #[must_use]
    pub fn get_or(&self, name: &str, default: SecretString) -> SecretString {
        self.get(name).unwrap_or(default)
    }

    /// Store a credential, overwriting any existing value.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidName`] for an empty name, otherwise the
    /// backend's error unmodified.
    #[instrument(skip(self, value, labels), fields(workspace = %self.workspace()))]
    pub fn set(&self, name: &str, value: &str, labels: Option<&Labels>) -> StoreResult<()> {
        if name.is_empty() {
            return Err(StoreError::InvalidName);
        }
        let empty = Labels::new();
        self.backend
            .store(&self.session, name, value.as_bytes(), labels.unwrap_or(&empty))?;
        debug!("Stored credential");
        Ok(())
    }

    /// Delete a credential, returning whether it existed.
    ///
    /// # Errors
    ///
    /// Returns the backend's error unmodified.
    #[instrument(skip(self), fields(workspace = %self.workspace()))]
    pub fn delete(&self, name: &str) -> StoreResult<bool> {
        let deleted = self.backend.delete(&self.session, name)?;
        debug!(deleted, "Deleted credential");
        Ok(deleted)
    }

    /// List credential names, optionally restricted to those whose labels
    /// match every given label exactly.
    ///
    /// # Errors
    ///
    /// Returns the backend's error unmodified.
    pub fn list(&self, labels: Option<&Labels>) -> StoreResult<Vec<String>> {
        let secrets = self.backend.list_secrets(&self.session, labels)?;
        Ok(secrets.into_iter().map(|s| s.name).collect())
    }

    /// Replace a credential's value while the backend keeps version history.
    ///
    /// # Errors
    ///
    /// Fails if `name` does not exist, or with any other backend error.
    #[instrument(skip(self, new_value), fields(workspace = %self.workspace()))]
    pub fn rotate(&self, name: &str, new_value: &str) -> StoreResult<()> {
        self.backend
            .rotate(&self.session, name, new_value.as_bytes())?;
        info!("Rotated credential");
        Ok(())
    }

    /// Release the backend connection now and report the outcome.
    ///
    /// # Errors
    ///
    /// Returns the backend's close error unmodified.
    pub fn close(mut self) -> StoreResult<()> {
        self.release().map_err(StoreError::from)
    }

    fn release(&mut self) -> BackendResult<()> {
        if !self.open {
            return Ok(());
        }
        self.open = false;
        info!(workspace = %self.session.workspace(), "Closing credential store");
        self.backend.close()
    }
}

impl Drop for CredentialStore {
    fn drop(&mut self) {
        if let Err(e) = self.release() {
            warn!(error = %e, "Failed to close secret backend");
        }
    }
}

impl fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialStore")
            .field("workspace", &self.session.workspace())
            .field("session_id", &self.session.session_id())
            .field("open", &self.open)
            .finish_non_exhaustive()
    }
}
