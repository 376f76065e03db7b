//! Client factory: credential resolution plus provider dispatch.

use crate::error::{ConstructError, FactoryError};
use crate::registry::{ClientOptions, ClientSpec, ProviderRegistry};
use crate::resolver::ProviderKeyResolver;
use avp_vault::CredentialStore;
use secrecy::ExposeSecret;
use std::fmt;
use tracing::{debug, info, instrument, warn};

/// Builds clients of type `C` from credentials held in a [`CredentialStore`].
///
/// Stateless per call. The registry and resolver are fixed once the factory
/// is built; the store is borrowed only for the duration of one build and
/// the credential is handed straight to the constructor.
pub struct ClientFactory<C> {
    registry: ProviderRegistry<C>,
    resolver: ProviderKeyResolver,
}

impl<C> ClientFactory<C> {
    /// Create a factory dispatching through `registry` with the default
    /// key table.
    #[must_use]
    pub fn new(registry: ProviderRegistry<C>) -> Self {
        Self {
            registry,
            resolver: ProviderKeyResolver::default(),
        }
    }

    /// Replace the key resolver.
    #[must_use]
    pub fn with_resolver(mut self, resolver: ProviderKeyResolver) -> Self {
        self.resolver = resolver;
        self
    }

    /// The provider registry.
    #[must_use]
    pub const fn registry(&self) -> &ProviderRegistry<C> {
        &self.registry
    }

    /// The key resolver.
    #[must_use]
    pub const fn resolver(&self) -> &ProviderKeyResolver {
        &self.resolver
    }

    /// Build a client for `provider`.
    ///
    /// `model` overrides the registration's default model; `options` are
    /// passed to the constructor untouched. Nothing is retried.
    ///
    /// # Errors
    ///
    /// - [`FactoryError::UnsupportedProvider`] if no constructor is
    ///   registered for `provider`
    /// - [`FactoryError::MissingCredential`] if the store yields nothing, or
    ///   an empty value, for the provider's key
    /// - [`FactoryError::CapabilityUnavailable`] if the constructor's SDK is
    ///   missing
    /// - [`FactoryError::Construction`] for any other constructor failure
    #[instrument(skip(self, store, options), fields(workspace = %store.workspace()))]
    pub fn build(
        &self,
        provider: &str,
        store: &CredentialStore,
        model: Option<&str>,
        options: ClientOptions,
    ) -> Result<C, FactoryError> {
        let provider = provider.to_lowercase();

        let Some(registration) = self.registry.get(&provider) else {
            warn!("No constructor registered for provider");
            return Err(FactoryError::UnsupportedProvider {
                provider,
                known: self.registry.providers(),
            });
        };

        let key = self.resolver.resolve(&provider);
        let Some(credential) = store
            .get(&key)
            .filter(|credential| !credential.expose_secret().is_empty())
        else {
            return Err(FactoryError::MissingCredential { provider, key });
        };
        debug!(key = %key, "Resolved provider credential");

        let model = model.unwrap_or_else(|| registration.default_model()).to_string();
        let spec = ClientSpec {
            credential,
            model,
            options,
        };

        match registration.construct(spec) {
            Ok(client) => {
                info!("Constructed client");
                Ok(client)
            }
            Err(ConstructError::CapabilityUnavailable { capability }) => {
                warn!(capability = %capability, "Provider capability unavailable");
                Err(FactoryError::CapabilityUnavailable {
                    provider,
                    capability,
                })
            }
            Err(source) => Err(FactoryError::Construction { provider, source }),
        }
    }
}

impl<C> Clone for ClientFactory<C> {
    fn clone(&self) -> Self {
        Self {
            registry: self.registry.clone(),
            resolver: self.resolver.clone(),
        }
    }
}

impl<C> fmt::Debug for ClientFactory<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientFactory")
            .field("providers", &self.registry.providers())
            .field("resolver", &self.resolver)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{ProviderRegistration, ReferenceProvider};
    use avp_vault::{MemoryBackend, StoreConfig};

    #[derive(Debug, PartialEq)]
    struct Client {
        api_key: String,
        model: String,
        temperature: Option<f64>,
    }

    fn construct(spec: ClientSpec) -> Result<Client, ConstructError> {
        Ok(Client {
            api_key: spec.credential.expose_secret().to_string(),
            model: spec.model,
            temperature: spec.options.get("temperature").and_then(serde_json::Value::as_f64),
        })
    }

    fn factory() -> ClientFactory<Client> {
        let registry = ProviderRegistry::new()
            .with_provider("anthropic", ReferenceProvider::Anthropic.registration(construct))
            .unwrap()
            .with_provider("cohere", ReferenceProvider::Cohere.unlinked())
            .unwrap()
            .with_provider(
                "openai",
                ProviderRegistration::new("gpt-3.5-turbo", |_spec: ClientSpec| {
                    Err::<Client, ConstructError>(
                        anyhow::anyhow!("organization header rejected").into(),
                    )
                }),
            )
            .unwrap();
        ClientFactory::new(registry)
    }

    fn store() -> CredentialStore {
        CredentialStore::open(MemoryBackend::new(), &StoreConfig::default()).unwrap()
    }

    #[test]
    fn test_build_with_default_model() {
        let store = store();
        store.set("anthropic_api_key", "sk-ant-test", None).unwrap();

        let client = factory()
            .build("Anthropic", &store, None, ClientOptions::new())
            .unwrap();
        assert_eq!(
            client,
            Client {
                api_key: "sk-ant-test".to_string(),
                model: "claude-3-haiku-20240307".to_string(),
                temperature: None,
            }
        );
    }

    #[test]
    fn test_build_with_model_and_options() {
        let store = store();
        store.set("anthropic_api_key", "sk-ant-test", None).unwrap();

        let mut options = ClientOptions::new();
        options.insert("temperature".to_string(), serde_json::json!(0.2));
        let client = factory()
            .build("anthropic", &store, Some("claude-3-opus-20240229"), options)
            .unwrap();
        assert_eq!(client.model, "claude-3-opus-20240229");
        assert_eq!(client.temperature, Some(0.2));
    }

    #[test]
    fn test_missing_credential() {
        let err = factory()
            .build("anthropic", &store(), None, ClientOptions::new())
            .unwrap_err();
        match err {
            FactoryError::MissingCredential { provider, key } => {
                assert_eq!(provider, "anthropic");
                assert_eq!(key, "anthropic_api_key");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_empty_credential_is_missing() {
        let store = store();
        store.set("anthropic_api_key", "", None).unwrap();

        let err = factory()
            .build("anthropic", &store, None, ClientOptions::new())
            .unwrap_err();
        assert!(matches!(
            err,
            FactoryError::MissingCredential { ref key, .. } if key == "anthropic_api_key"
        ));
    }

    #[test]
    fn test_unsupported_provider() {
        let err = factory()
            .build("unknown-provider", &store(), None, ClientOptions::new())
            .unwrap_err();
        match err {
            FactoryError::UnsupportedProvider { provider, known } => {
                assert_eq!(provider, "unknown-provider");
                assert_eq!(known, ["anthropic", "cohere", "openai"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_capability_unavailable() {
        let store = store();
        store.set("cohere_api_key", "co-test", None).unwrap();

        let err = factory()
            .build("cohere", &store, None, ClientOptions::new())
            .unwrap_err();
        assert_eq!(err.code(), "capability_unavailable");
        assert!(err.to_string().contains("langchain-cohere"));
    }

    #[test]
    fn test_construction_failure() {
        let store = store();
        store.set("openai_api_key", "sk-test", None).unwrap();

        let err = factory()
            .build("openai", &store, None, ClientOptions::new())
            .unwrap_err();
        assert_eq!(err.code(), "construction_failed");
        assert!(err.to_string().contains("organization header rejected"));
    }

    #[test]
    fn test_custom_resolver() {
        let store = store();
        store.set("claude_key", "sk-ant-custom", None).unwrap();

        let factory = factory()
            .with_resolver(ProviderKeyResolver::new().with_mapping("anthropic", "claude_key"));
        let client = factory
            .build("anthropic", &store, None, ClientOptions::new())
            .unwrap();
        assert_eq!(client.api_key, "sk-ant-custom");
    }
}
