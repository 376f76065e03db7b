//! Provider name to credential key mapping.

use avp_vault::CredentialStore;
use secrecy::SecretString;
use std::collections::BTreeMap;

/// Providers with a documented credential key.
pub const DEFAULT_KEY_MAPPING: [(&str, &str); 6] = [
    ("anthropic", "anthropic_api_key"),
    ("openai", "openai_api_key"),
    ("cohere", "cohere_api_key"),
    ("huggingface", "huggingface_api_key"),
    ("google", "google_api_key"),
    ("mistral", "mistral_api_key"),
];

/// Resolve `provider` against the fixed table.
///
/// Total and deterministic: unknown providers map to
/// `"{lowercased provider}_api_key"`.
///
/// ```
/// assert_eq!(avp_llm::resolver::resolve("OpenAI"), "openai_api_key");
/// assert_eq!(avp_llm::resolver::resolve("Groq"), "groq_api_key");
/// ```
#[must_use]
pub fn resolve(provider: &str) -> String {
    let provider = provider.to_lowercase();
    DEFAULT_KEY_MAPPING
        .iter()
        .find(|(name, _)| *name == provider)
        .map_or_else(|| fallback_key(&provider), |(_, key)| (*key).to_string())
}

fn fallback_key(provider: &str) -> String {
    format!("{provider}_api_key")
}

/// Extensible provider → credential key table.
///
/// Starts from [`DEFAULT_KEY_MAPPING`]; entries can be added or replaced
/// but not removed, so every provider always resolves to some key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderKeyResolver {
    mapping: BTreeMap<String, String>,
}

impl Default for ProviderKeyResolver {
    fn default() -> Self {
        Self {
            mapping: DEFAULT_KEY_MAPPING
                .iter()
                .map(|(provider, key)| ((*provider).to_string(), (*key).to_string()))
                .collect(),
        }
    }
}

impl ProviderKeyResolver {
    /// Create a resolver holding the default table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Map `provider` (case-insensitive) to `key`.
    ///
    /// Replaces any existing entry, including the documented ones; e.g.
    /// `with_mapping("openai", "azure_openai_key")` makes the factory read
    /// `azure_openai_key` for `openai`. The free [`resolve`] is unaffected.
    #[must_use]
    pub fn with_mapping(mut self, provider: &str, key: impl Into<String>) -> Self {
        self.mapping.insert(provider.to_lowercase(), key.into());
        self
    }

    /// Credential key name for `provider`.
    #[must_use]
    pub fn resolve(&self, provider: &str) -> String {
        let provider = provider.to_lowercase();
        self.mapping
            .get(&provider)
            .cloned()
            .unwrap_or_else(|| fallback_key(&provider))
    }

    /// Read the API key for `provider` through the store's fail-soft path.
    #[must_use]
    pub fn api_key(&self, store: &CredentialStore, provider: &str) -> Option<SecretString> {
        store.get(&self.resolve(provider))
    }
}
