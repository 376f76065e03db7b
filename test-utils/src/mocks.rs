//! Mock backends and constructors for testing.

use avp_common::{BackendError, BackendResult};
use avp_llm::{ClientOptions, ClientSpec, ConstructError, ProviderRegistry, ReferenceProvider};
use avp_vault::{Labels, MemoryBackend, SecretBackend, SecretSummary, SecretValue, Session};
use secrecy::ExposeSecret;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Call counters shared by every connection of a mock backend.
#[derive(Debug, Default)]
pub struct BackendStats {
    authentications: AtomicUsize,
    closes: AtomicUsize,
    retrievals: AtomicUsize,
}

impl BackendStats {
    /// Number of `authenticate` calls.
    #[must_use]
    pub fn authentications(&self) -> usize {
        self.authentications.load(Ordering::SeqCst)
    }

    /// Number of `close` calls.
    #[must_use]
    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    /// Number of `retrieve` calls.
    #[must_use]
    pub fn retrievals(&self) -> usize {
        self.retrievals.load(Ordering::SeqCst)
    }

    fn count(counter: &AtomicUsize) {
        counter.fetch_add(1, Ordering::SeqCst);
    }
}

/// In-memory backend connection that counts session opens and closes.
///
/// Counters are shared with every connection made through
/// [`RecordingBackend::connect`], so they stay readable after the store
/// that owns a connection is gone.
#[derive(Default)]
pub struct RecordingBackend {
    inner: MemoryBackend,
    stats: Arc<BackendStats>,
}

impl RecordingBackend {
    /// Create an empty vault and a first connection to it.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Open another counted connection to the same vault.
    #[must_use]
    pub fn connect(&self) -> Self {
        Self {
            inner: self.inner.connect(),
            stats: Arc::clone(&self.stats),
        }
    }

    /// Counters for this vault.
    #[must_use]
    pub fn stats(&self) -> Arc<BackendStats> {
        Arc::clone(&self.stats)
    }

    /// The wrapped, uncounted connection.
    #[must_use]
    pub const fn inner(&self) -> &MemoryBackend {
        &self.inner
    }
}

impl SecretBackend for RecordingBackend {
    fn authenticate(&self, workspace: &str) -> BackendResult<Session> {
        BackendStats::count(&self.stats.authentications);
        self.inner.authenticate(workspace)
    }

    fn retrieve(&self, session: &Session, name: &str) -> BackendResult<SecretValue> {
        BackendStats::count(&self.stats.retrievals);
        self.inner.retrieve(session, name)
    }

    fn store(
        &self,
        session: &Session,
        name: &str,
        value: &[u8],
        labels: &Labels,
    ) -> BackendResult<()> {
        self.inner.store(session, name, value, labels)
    }

    fn delete(&self, session: &Session, name: &str) -> BackendResult<bool> {
        self.inner.delete(session, name)
    }

    fn list_secrets(
        &self,
        session: &Session,
        filter: Option<&Labels>,
    ) -> BackendResult<Vec<SecretSummary>> {
        self.inner.list_secrets(session, filter)
    }

    fn rotate(&self, session: &Session, name: &str, value: &[u8]) -> BackendResult<()> {
        self.inner.rotate(session, name, value)
    }

    fn close(&self) -> BackendResult<()> {
        BackendStats::count(&self.stats.closes);
        self.inner.close()
    }
}

/// Backend that authenticates but fails every other call with `error`.
pub struct FailingBackend {
    error: BackendError,
    stats: Arc<BackendStats>,
}

impl FailingBackend {
    /// Fail with [`BackendError::Unavailable`].
    #[must_use]
    pub fn unavailable() -> Self {
        Self::with_error(BackendError::unavailable("vault sealed"))
    }

    /// Fail with the given error.
    #[must_use]
    pub fn with_error(error: BackendError) -> Self {
        Self {
            error,
            stats: Arc::default(),
        }
    }

    /// Counters for this backend.
    #[must_use]
    pub fn stats(&self) -> Arc<BackendStats> {
        Arc::clone(&self.stats)
    }
}

impl SecretBackend for FailingBackend {
    fn authenticate(&self, workspace: &str) -> BackendResult<Session> {
        BackendStats::count(&self.stats.authentications);
        Ok(Session::new(workspace))
    }

    fn retrieve(&self, _session: &Session, _name: &str) -> BackendResult<SecretValue> {
        BackendStats::count(&self.stats.retrievals);
        Err(self.error.clone())
    }

    fn store(&self, _: &Session, _: &str, _: &[u8], _: &Labels) -> BackendResult<()> {
        Err(self.error.clone())
    }

    fn delete(&self, _session: &Session, _name: &str) -> BackendResult<bool> {
        Err(self.error.clone())
    }

    fn list_secrets(&self, _: &Session, _: Option<&Labels>) -> BackendResult<Vec<SecretSummary>> {
        Err(self.error.clone())
    }

    fn rotate(&self, _session: &Session, _name: &str, _value: &[u8]) -> BackendResult<()> {
        Err(self.error.clone())
    }

    fn close(&self) -> BackendResult<()> {
        BackendStats::count(&self.stats.closes);
        Err(self.error.clone())
    }
}

/// Client produced by the stub constructors.
#[derive(Debug, Clone, PartialEq)]
pub struct StubClient {
    /// Provider the client was built for
    pub provider: String,
    /// Credential it was built with
    pub api_key: String,
    /// Model it was built for
    pub model: String,
    /// Options it was built with
    pub options: ClientOptions,
}

/// Constructor that records its inputs into a [`StubClient`].
pub fn stub_constructor(
    provider: &'static str,
) -> impl Fn(ClientSpec) -> Result<StubClient, ConstructError> + Send + Sync + 'static {
    move |spec: ClientSpec| {
        Ok(StubClient {
            provider: provider.to_string(),
            api_key: spec.credential.expose_secret().to_string(),
            model: spec.model,
            options: spec.options,
        })
    }
}

/// Registry with a stub constructor for every reference provider.
///
/// # Panics
///
/// Panics if two reference providers share a name.
#[must_use]
pub fn stub_registry() -> ProviderRegistry<StubClient> {
    ReferenceProvider::ALL
        .iter()
        .try_fold(ProviderRegistry::new(), |registry, provider| {
            registry.with_provider(
                provider.name(),
                provider.registration(stub_constructor(provider.name())),
            )
        })
        .unwrap_or_else(|err| panic!("reference provider names collide: {err}"))
}
