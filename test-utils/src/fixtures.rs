//! Test fixtures with sample credentials.

use avp_vault::{CredentialStore, Labels, StoreResult};

/// A credential to seed into a store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleCredential {
    /// Credential name
    pub name: &'static str,
    /// Credential value
    pub value: &'static str,
    /// Labels
    pub labels: Labels,
}

impl SampleCredential {
    /// Create an unlabelled credential.
    #[must_use]
    pub fn new(name: &'static str, value: &'static str) -> Self {
        Self {
            name,
            value,
            labels: Labels::new(),
        }
    }

    /// Add a label.
    #[must_use]
    pub fn with_label(mut self, key: &str, value: &str) -> Self {
        self.labels.insert(key.to_string(), value.to_string());
        self
    }
}

/// API keys for every reference provider.
#[must_use]
pub fn provider_keys() -> Vec<SampleCredential> {
    vec![
        SampleCredential::new("anthropic_api_key", "sk-ant-test"),
        SampleCredential::new("openai_api_key", "sk-test"),
        SampleCredential::new("cohere_api_key", "co-test"),
        SampleCredential::new("mistral_api_key", "mk-test"),
    ]
}

/// One production and one development credential.
#[must_use]
pub fn environment_keys() -> Vec<SampleCredential> {
    vec![
        SampleCredential::new("prod_key", "prod_value").with_label("env", "production"),
        SampleCredential::new("dev_key", "dev_value").with_label("env", "development"),
    ]
}

/// Store every credential in `credentials`.
///
/// # Errors
///
/// Returns the first store error.
pub fn seed(store: &CredentialStore, credentials: &[SampleCredential]) -> StoreResult<()> {
    for credential in credentials {
        store.set(credential.name, credential.value, Some(&credential.labels))?;
    }
    Ok(())
}

/// Single-entry label set.
#[must_use]
pub fn label(key: &str, value: &str) -> Labels {
    Labels::from([(key.to_string(), value.to_string())])
}
