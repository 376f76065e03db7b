//! Wiring shared by the end-to-end tests.
//!
//! A [`Harness`] owns one in-memory vault, a factory over the stub
//! registry, and an audit callback. Every store it loads gets its own
//! counted connection to the vault, so each test exercises the same path a
//! caller would: load credentials, build a client, record its calls.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use avp_common::BackendResult;
use avp_llm::{AuditCallback, ClientFactory, LoadedCredentials, load_credentials};
use avp_vault::{SecretBackend, StoreConfig, StoreResult};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use test_utils::fixtures::SampleCredential;
use test_utils::mocks::{BackendStats, RecordingBackend, StubClient, stub_registry};

/// Backend, factory and callback wired together.
pub struct Harness {
    vault: RecordingBackend,
    /// Call counters across every connection to the vault
    pub stats: Arc<BackendStats>,
    /// Factory over the stub registry
    pub factory: ClientFactory<StubClient>,
    /// Callback recording model calls
    pub callback: AuditCallback,
}

impl Harness {
    /// Create a harness over an empty backend.
    #[must_use]
    pub fn new() -> Self {
        let vault = RecordingBackend::new();
        Self {
            stats: vault.stats(),
            vault,
            factory: ClientFactory::new(stub_registry()),
            callback: AuditCallback::new(),
        }
    }

    /// Write `credentials` into `workspace` without opening a store.
    ///
    /// Goes through an uncounted connection, so neither the authentication
    /// nor the close counters move.
    ///
    /// # Errors
    ///
    /// Returns the first backend error.
    pub fn seed(&self, workspace: &str, credentials: &[SampleCredential]) -> BackendResult<()> {
        let backend = self.vault.inner();
        let session = backend.authenticate(workspace)?;
        for credential in credentials {
            backend.store(
                &session,
                credential.name,
                credential.value.as_bytes(),
                &credential.labels,
            )?;
        }
        Ok(())
    }

    /// Open a store on a fresh connection to the vault and resolve
    /// `env_vars`.
    ///
    /// # Errors
    ///
    /// Returns the backend's authentication error.
    pub fn load(
        &self,
        config: &StoreConfig,
        env_vars: &[(&str, &str)],
    ) -> StoreResult<LoadedCredentials> {
        let mapping: BTreeMap<String, String> = env_vars
            .iter()
            .map(|(env_name, credential)| ((*env_name).to_string(), (*credential).to_string()))
            .collect();
        load_credentials(self.vault.connect(), config, &mapping)
    }
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Harness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Harness")
            .field("stats", &self.stats)
            .field("factory", &self.factory)
            .field("callback", &self.callback)
            .finish()
    }
}
