//! Environment variable bindings for collaborators configured by env.
//!
//! Bindings are returned to the caller rather than written into the
//! process environment; apply them to a child process with
//! [`EnvBindings::apply_to`] or read them directly.

use avp_vault::{CredentialStore, SecretBackend, StoreConfig, StoreResult};
use secrecy::{ExposeSecret, SecretString};
use std::collections::BTreeMap;
use std::process::Command;
use tracing::debug;

/// Environment variable name → credential value.
#[derive(Debug, Clone, Default)]
pub struct EnvBindings {
    vars: BTreeMap<String, SecretString>,
}

impl EnvBindings {
    /// Resolve `mapping` (env var name → credential name) against `store`.
    ///
    /// Credentials that are absent, unreadable, or empty are skipped.
    #[must_use]
    pub fn resolve(store: &CredentialStore, mapping: &BTreeMap<String, String>) -> Self {
        let vars = mapping
            .iter()
            .filter_map(|(env_name, credential)| {
                let value = store.get(credential)?;
                if value.expose_secret().is_empty() {
                    debug!(env_name = %env_name, credential = %credential, "Skipping empty credential");
                    return None;
                }
                Some((env_name.clone(), value))
            })
            .collect();
        Self { vars }
    }

    /// Value bound to `env_name`.
    #[must_use]
    pub fn get(&self, env_name: &str) -> Option<&SecretString> {
        self.vars.get(env_name)
    }

    /// Bound variable names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.vars.keys().map(String::as_str)
    }

    /// Number of bound variables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    /// Whether nothing was bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Set every binding in a child process's environment.
    pub fn apply_to<'a>(&self, command: &'a mut Command) -> &'a mut Command {
        for (name, value) in &self.vars {
            command.env(name, value.expose_secret());
        }
        command
    }
}

/// A freshly opened store plus the environment bindings resolved from it.
#[derive(Debug)]
pub struct LoadedCredentials {
    /// The open store
    pub store: CredentialStore,
    /// Bindings resolved at load time
    pub env: EnvBindings,
}

/// Open a store owning the `backend` connection and resolve `env_vars`
/// against it.
///
/// # Errors
///
/// Returns the backend's authentication error unmodified.
pub fn load_credentials<B>(
    backend: B,
    config: &StoreConfig,
    env_vars: &BTreeMap<String, String>,
) -> StoreResult<LoadedCredentials>
where
    B: SecretBackend + 'static,
{
    let store = CredentialStore::open(backend, config)?;
    let env = EnvBindings::resolve(&store, env_vars);
    debug!(bound = env.len(), requested = env_vars.len(), "Resolved environment bindings");
    Ok(LoadedCredentials { store, env })
}
