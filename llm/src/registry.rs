//! Provider constructor registry.
//!
//! Provider dispatch is a table lookup: each provider name maps to a
//! constructor capability supplied by the surrounding integration, along
//! with that provider's default model. New providers are added by
//! registering them; the factory never changes.

use crate::error::{ConstructError, RegistryError};
use secrecy::SecretString;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Extra constructor arguments, passed through untouched.
pub type ClientOptions = BTreeMap<String, serde_json::Value>;

/// Everything a constructor receives.
#[derive(Debug, Clone)]
pub struct ClientSpec {
    /// Provider API key
    pub credential: SecretString,
    /// Requested model, or the registration's default
    pub model: String,
    /// Provider-specific options
    pub options: ClientOptions,
}

/// Builds a client of type `C` for one provider.
pub trait ClientConstructor<C>: Send + Sync {
    /// Construct a client.
    ///
    /// # Errors
    ///
    /// Returns [`ConstructError::CapabilityUnavailable`] if the provider SDK
    /// is missing, or [`ConstructError::Failed`] for anything else.
    fn construct(&self, spec: ClientSpec) -> Result<C, ConstructError>;
}

impl<C, F> ClientConstructor<C> for F
where
    F: Fn(ClientSpec) -> Result<C, ConstructError> + Send + Sync,
{
    fn construct(&self, spec: ClientSpec) -> Result<C, ConstructError> {
        self(spec)
    }
}

/// Constructor for a provider whose SDK is not linked in.
///
/// Always fails with [`ConstructError::CapabilityUnavailable`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnavailableConstructor {
    capability: String,
}

impl UnavailableConstructor {
    /// Create a constructor reporting `capability` as missing.
    #[must_use]
    pub fn new(capability: impl Into<String>) -> Self {
        Self {
            capability: capability.into(),
        }
    }
}

impl<C> ClientConstructor<C> for UnavailableConstructor {
    fn construct(&self, _spec: ClientSpec) -> Result<C, ConstructError> {
        Err(ConstructError::capability_unavailable(&self.capability))
    }
}

/// A registered provider: default model plus constructor.
pub struct ProviderRegistration<C> {
    default_model: String,
    constructor: Arc<dyn ClientConstructor<C>>,
}

impl<C> ProviderRegistration<C> {
    /// Create a registration.
    pub fn new(
        default_model: impl Into<String>,
        constructor: impl ClientConstructor<C> + 'static,
    ) -> Self {
        Self {
            default_model: default_model.into(),
            constructor: Arc::new(constructor),
        }
    }

    /// Model used when the caller does not request one.
    #[must_use]
    pub fn default_model(&self) -> &str {
        &self.default_model
    }

    /// Invoke the constructor.
    ///
    /// # Errors
    ///
    /// Returns whatever the constructor returns.
    pub fn construct(&self, spec: ClientSpec) -> Result<C, ConstructError> {
        self.constructor.construct(spec)
    }
}

impl<C> Clone for ProviderRegistration<C> {
    fn clone(&self) -> Self {
        Self {
            default_model: self.default_model.clone(),
            constructor: Arc::clone(&self.constructor),
        }
    }
}

impl<C> fmt::Debug for ProviderRegistration<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderRegistration")
            .field("default_model", &self.default_model)
            .finish_non_exhaustive()
    }
}

/// Append-only map from lowercased provider name to registration.
pub struct ProviderRegistry<C> {
    providers: BTreeMap<String, ProviderRegistration<C>>,
}

impl<C> Default for ProviderRegistry<C> {
    fn default() -> Self {
        Self {
            providers: BTreeMap::new(),
        }
    }
}

impl<C> ProviderRegistry<C> {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `provider` (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::AlreadyRegistered`] if the name is taken.
    pub fn register(
        &mut self,
        provider: &str,
        registration: ProviderRegistration<C>,
    ) -> Result<(), RegistryError> {
        let name = provider.to_lowercase();
        if self.providers.contains_key(&name) {
            return Err(RegistryError::AlreadyRegistered(name));
        }
        tracing::debug!(provider = %name, default_model = %registration.default_model, "Registered provider");
        self.providers.insert(name, registration);
        Ok(())
    }

    /// Builder-style [`ProviderRegistry::register`].
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::AlreadyRegistered`] if the name is taken.
    pub fn with_provider(
        mut self,
        provider: &str,
        registration: ProviderRegistration<C>,
    ) -> Result<Self, RegistryError> {
        self.register(provider, registration)?;
        Ok(self)
    }

    /// Look up a provider (case-insensitive).
    #[must_use]
    pub fn get(&self, provider: &str) -> Option<&ProviderRegistration<C>> {
        self.providers.get(&provider.to_lowercase())
    }

    /// Whether `provider` is registered.
    #[must_use]
    pub fn contains(&self, provider: &str) -> bool {
        self.get(provider).is_some()
    }

    /// Registered provider names, sorted.
    #[must_use]
    pub fn providers(&self) -> Vec<String> {
        self.providers.keys().cloned().collect()
    }

    /// Number of registered providers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// Whether nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl<C> Clone for ProviderRegistry<C> {
    fn clone(&self) -> Self {
        Self {
            providers: self.providers.clone(),
        }
    }
}

impl<C> fmt::Debug for ProviderRegistry<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.providers.iter()).finish()
    }
}

/// Providers with known default models and SDK capabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceProvider {
    /// Anthropic chat models
    Anthropic,
    /// `OpenAI` chat models
    OpenAi,
    /// Cohere chat models
    Cohere,
    /// Mistral chat models
    Mistral,
}

impl ReferenceProvider {
    /// Every reference provider.
    pub const ALL: [Self; 4] = [Self::Anthropic, Self::OpenAi, Self::Cohere, Self::Mistral];

    /// Registry name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Anthropic => "anthropic",
            Self::OpenAi => "openai",
            Self::Cohere => "cohere",
            Self::Mistral => "mistral",
        }
    }

    /// Small, cheap default tier.
    #[must_use]
    pub const fn default_model(&self) -> &'static str {
        match self {
            Self::Anthropic => "claude-3-haiku-20240307",
            Self::OpenAi => "gpt-3.5-turbo",
            Self::Cohere => "command",
            Self::Mistral => "mistral-small-latest",
        }
    }

    /// SDK package the provider's constructor depends on.
    #[must_use]
    pub const fn capability(&self) -> &'static str {
        match self {
            Self::Anthropic => "langchain-anthropic",
            Self::OpenAi => "langchain-openai",
            Self::Cohere => "langchain-cohere",
            Self::Mistral => "langchain-mistralai",
        }
    }

    /// Registration using `constructor` and this provider's default model.
    pub fn registration<C>(
        &self,
        constructor: impl ClientConstructor<C> + 'static,
    ) -> ProviderRegistration<C> {
        ProviderRegistration::new(self.default_model(), constructor)
    }

    /// Registration for when the provider SDK is not linked in.
    #[must_use]
    pub fn unlinked<C>(&self) -> ProviderRegistration<C> {
        self.registration(UnavailableConstructor::new(self.capability()))
    }
}

impl<C> ProviderRegistry<C> {
    /// Registry with every reference provider registered as unlinked.
    ///
    /// Useful as a starting point for error reporting; to actually build
    /// clients, register real constructors with
    /// [`ReferenceProvider::registration`] instead.
    #[must_use]
    pub fn unlinked_reference() -> Self {
        Self {
            providers: ReferenceProvider::ALL
                .iter()
                .map(|provider| (provider.name().to_string(), provider.unlinked()))
                .collect(),
        }
    }
}
