//! Client factory error types.
//!
//! The three factory failures map to three different fixes: populate the
//! vault, fix the provider name (or register it), or link the provider SDK.

use thiserror::Error;

/// Failure reported by a client constructor.
#[derive(Error, Debug)]
pub enum ConstructError {
    /// The provider SDK this constructor needs is not linked in
    #[error("Capability not available: {capability}")]
    CapabilityUnavailable {
        /// Name of the missing capability
        capability: String,
    },

    /// Any other construction failure
    #[error(transparent)]
    Failed(#[from] anyhow::Error),
}

impl ConstructError {
    /// Create a capability unavailable error.
    #[must_use]
    pub fn capability_unavailable(capability: impl Into<String>) -> Self {
        Self::CapabilityUnavailable {
            capability: capability.into(),
        }
    }
}

/// Error returned by [`crate::ClientFactory::build`].
#[derive(Error, Debug)]
pub enum FactoryError {
    /// No credential stored under the provider's key
    #[error("No API key found for provider: {provider} (expected credential {key})")]
    MissingCredential {
        /// Normalized provider name
        provider: String,
        /// Credential key that was looked up
        key: String,
    },

    /// No constructor registered under this provider name
    #[error("Unknown provider: {provider}. Supported: {}", .known.join(", "))]
    UnsupportedProvider {
        /// Normalized provider name
        provider: String,
        /// Registered providers, sorted
        known: Vec<String>,
    },

    /// Registered, but the constructor's SDK capability is missing
    #[error("Provider {provider} requires {capability}, which is not available")]
    CapabilityUnavailable {
        /// Normalized provider name
        provider: String,
        /// Name of the missing capability
        capability: String,
    },

    /// The constructor failed for another reason
    #[error("Failed to construct client for {provider}: {source}")]
    Construction {
        /// Normalized provider name
        provider: String,
        /// Constructor error
        #[source]
        source: ConstructError,
    },
}

impl FactoryError {
    /// Stable machine-readable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::MissingCredential { .. } => "missing_credential",
            Self::UnsupportedProvider { .. } => "unsupported_provider",
            Self::CapabilityUnavailable { .. } => "capability_unavailable",
            Self::Construction { .. } => "construction_failed",
        }
    }

    /// Provider the failed build was for.
    #[must_use]
    pub fn provider(&self) -> &str {
        match self {
            Self::MissingCredential { provider, .. }
            | Self::UnsupportedProvider { provider, .. }
            | Self::CapabilityUnavailable { provider, .. }
            | Self::Construction { provider, .. } => provider,
        }
    }
}

/// Error returned when populating a [`crate::ProviderRegistry`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// The provider name is already taken
    #[error("Provider already registered: {0}")]
    AlreadyRegistered(String),
}
