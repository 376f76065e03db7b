//! Credential store for LLM provider keys.
//!
//! Wraps an external secret backend behind a workspace-scoped store with a
//! fail-soft read path and pass-through write errors.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod backend;
pub mod config;
pub mod error;
pub mod memory;
pub mod secrets;
pub mod store;

pub use backend::SecretBackend;
pub use config::StoreConfig;
pub use error::{StoreError, StoreResult};
pub use memory::MemoryBackend;
pub use secrets::{Labels, SecretSummary, SecretValue, Session};
pub use store::CredentialStore;
