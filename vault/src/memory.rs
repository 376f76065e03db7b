//! In-memory secret backend.
//!
//! Keeps everything in process memory, isolated per workspace, with version
//! history for rotated secrets. Connections share the secrets but not their
//! sessions. Payloads are zeroized when overwritten, deleted, or dropped.
//! Intended for tests and local development; it does not encrypt anything.

use crate::backend::SecretBackend;
use crate::secrets::{Labels, SecretSummary, SecretValue, Session, labels_match};
use avp_common::{BackendError, BackendResult};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;
use zeroize::Zeroizing;

struct Record {
    versions: Vec<Zeroizing<Vec<u8>>>,
    labels: Labels,
    updated_at: DateTime<Utc>,
}

impl Record {
    fn new(value: &[u8], labels: Labels) -> Self {
        Self {
            versions: vec![Zeroizing::new(value.to_vec())],
            labels,
            updated_at: Utc::now(),
        }
    }

    fn current_version(&self) -> u32 {
        u32::try_from(self.versions.len()).unwrap_or(u32::MAX)
    }

    fn summary(&self, name: &str) -> SecretSummary {
        SecretSummary {
            name: name.to_string(),
            labels: self.labels.clone(),
            version: self.current_version(),
            updated_at: self.updated_at,
        }
    }
}

#[derive(Default)]
struct Vault {
    workspaces: HashMap<String, BTreeMap<String, Record>>,
}

impl Vault {
    fn workspace(&self, session: &Session) -> Option<&BTreeMap<String, Record>> {
        self.workspaces.get(session.workspace())
    }

    fn workspace_mut(&mut self, session: &Session) -> &mut BTreeMap<String, Record> {
        self.workspaces
            .entry(session.workspace().to_string())
            .or_default()
    }
}

#[derive(Default)]
struct Connection {
    sessions: HashSet<Uuid>,
    closed: bool,
}

impl Connection {
    fn check(&self, session: &Session) -> BackendResult<()> {
        if self.closed {
            return Err(BackendError::Closed);
        }
        if !self.sessions.contains(&session.session_id()) {
            return Err(BackendError::invalid_session(session.session_id().to_string()));
        }
        Ok(())
    }
}

/// Connection to a secret vault held entirely in memory.
///
/// Each value is one connection with its own sessions. [`MemoryBackend::connect`]
/// opens another connection over the same secrets; closing one connection
/// leaves the others usable.
#[derive(Default)]
pub struct MemoryBackend {
    vault: Arc<RwLock<Vault>>,
    connection: RwLock<Connection>,
}

impl MemoryBackend {
    /// Create an empty vault and a first connection to it.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Open another connection to the same vault.
    #[must_use]
    pub fn connect(&self) -> Self {
        Self {
            vault: Arc::clone(&self.vault),
            connection: RwLock::default(),
        }
    }

    /// Number of versions kept for `name` in `workspace`, or 0 if absent.
    #[must_use]
    pub fn version_count(&self, workspace: &str, name: &str) -> usize {
        self.vault
            .read()
            .workspaces
            .get(workspace)
            .and_then(|secrets| secrets.get(name))
            .map_or(0, |record| record.versions.len())
    }

    /// Number of sessions open on this connection.
    #[must_use]
    pub fn active_sessions(&self) -> usize {
        self.connection.read().sessions.len()
    }

    /// Whether [`SecretBackend::close`] has been called on this connection.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.connection.read().closed
    }
}

impl SecretBackend for MemoryBackend {
    fn authenticate(&self, workspace: &str) -> BackendResult<Session> {
        let mut connection = self.connection.write();
        if connection.closed {
            return Err(BackendError::Closed);
        }
        if workspace.is_empty() {
            return Err(BackendError::AuthenticationFailed(
                "workspace must not be empty".to_string(),
            ));
        }

        let session = Session::new(workspace);
        connection.sessions.insert(session.session_id());
        debug!(workspace, session_id = %session.session_id(), "Opened in-memory session");
        Ok(session)
    }

    fn retrieve(&self, session: &Session, name: &str) -> BackendResult<SecretValue> {
        self.connection.read().check(session)?;
        let vault = self.vault.read();

        let record = vault
            .workspace(session)
            .and_then(|secrets| secrets.get(name))
            .ok_or_else(|| BackendError::not_found(name))?;
        let current = record
            .versions
            .last()
            .ok_or_else(|| BackendError::Internal(format!("secret {name} has no versions")))?;

        Ok(SecretValue::new(current.to_vec(), record.current_version()))
    }

    fn store(
        &self,
        session: &Session,
        name: &str,
        value: &[u8],
        labels: &Labels,
    ) -> BackendResult<()> {
        self.connection.read().check(session)?;

        // A plain write replaces the history; only rotate keeps old versions.
        self.vault
            .write()
            .workspace_mut(session)
            .insert(name.to_string(), Record::new(value, labels.clone()));
        Ok(())
    }

    fn delete(&self, session: &Session, name: &str) -> BackendResult<bool> {
        self.connection.read().check(session)?;
        Ok(self.vault.write().workspace_mut(session).remove(name).is_some())
    }

    fn list_secrets(
        &self,
        session: &Session,
        filter: Option<&Labels>,
    ) -> BackendResult<Vec<SecretSummary>> {
        self.connection.read().check(session)?;
        let vault = self.vault.read();

        let Some(secrets) = vault.workspace(session) else {
            return Ok(Vec::new());
        };
        Ok(secrets
            .iter()
            .filter(|(_, record)| filter.is_none_or(|f| labels_match(&record.labels, f)))
            .map(|(name, record)| record.summary(name))
            .collect())
    }

    fn rotate(&self, session: &Session, name: &str, value: &[u8]) -> BackendResult<()> {
        self.connection.read().check(session)?;
        let mut vault = self.vault.write();

        let record = vault
            .workspace_mut(session)
            .get_mut(name)
            .ok_or_else(|| BackendError::not_found(name))?;
        record.versions.push(Zeroizing::new(value.to_vec()));
        record.updated_at = Utc::now();
        Ok(())
    }

    fn close(&self) -> BackendResult<()> {
        let mut connection = self.connection.write();
        connection.sessions.clear();
        connection.closed = true;
        debug!("Closed in-memory connection");
        Ok(())
    }
}
