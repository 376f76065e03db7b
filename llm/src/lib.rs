//! Build LLM clients from vault-held provider credentials.
//!
//! This crate provides:
//! - Provider name → credential key resolution
//! - An append-only registry of provider constructors
//! - A client factory that resolves credentials and dispatches to the
//!   registered constructor
//! - An audit sink and lifecycle callback recording model calls
//! - Environment bindings for collaborators configured by env
//!
//! ```
//! use avp_llm::{ClientFactory, ClientOptions, ClientSpec, ConstructError, ProviderRegistry, ReferenceProvider};
//! use avp_vault::{CredentialStore, MemoryBackend, StoreConfig};
//! use secrecy::ExposeSecret;
//!
//! fn connect(spec: ClientSpec) -> Result<String, ConstructError> {
//!     Ok(format!("{} with {} chars of key", spec.model, spec.credential.expose_secret().len()))
//! }
//!
//! let mut registry = ProviderRegistry::new();
//! registry.register("anthropic", ReferenceProvider::Anthropic.registration(connect)).unwrap();
//! let factory = ClientFactory::new(registry);
//!
//! let store = CredentialStore::open(MemoryBackend::new(), &StoreConfig::default()).unwrap();
//! store.set("anthropic_api_key", "sk-ant-example", None).unwrap();
//!
//! let client = factory.build("anthropic", &store, None, ClientOptions::new()).unwrap();
//! assert_eq!(client, "claude-3-haiku-20240307 with 14 chars of key");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod audit;
pub mod callback;
pub mod env;
pub mod error;
pub mod factory;
pub mod registry;
pub mod resolver;

pub use audit::{AuditEntry, AuditEventKind, AuditMetadata, AuditSink};
pub use callback::{AuditCallback, LlmEnd, LlmStart};
pub use env::{EnvBindings, LoadedCredentials, load_credentials};
pub use error::{ConstructError, FactoryError, RegistryError};
pub use factory::ClientFactory;
pub use registry::{
    ClientConstructor, ClientOptions, ClientSpec, ProviderRegistration, ProviderRegistry,
    ReferenceProvider, UnavailableConstructor,
};
pub use resolver::ProviderKeyResolver;
