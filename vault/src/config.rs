//! Credential store configuration.

use avp_common::ConfigError;
use avp_common::config::{env_or, load_dotenv};

/// Workspace used when none is configured.
pub const DEFAULT_WORKSPACE: &str = "llm";

/// Credential store configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Workspace namespace the store's session is scoped to
    pub workspace: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            workspace: DEFAULT_WORKSPACE.to_string(),
        }
    }
}

impl StoreConfig {
    /// Create a configuration for `workspace`.
    #[must_use]
    pub fn new(workspace: impl Into<String>) -> Self {
        Self {
            workspace: workspace.into(),
        }
    }

    /// Load from `AVP_WORKSPACE`, reading `.env` first.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingRequired`] if the workspace is set but
    /// empty.
    pub fn from_env() -> Result<Self, ConfigError> {
        load_dotenv();
        let config = Self::new(env_or("AVP_WORKSPACE", DEFAULT_WORKSPACE));
        config.validate()?;
        Ok(config)
    }

    /// Set the workspace.
    #[must_use]
    pub fn with_workspace(mut self, workspace: impl Into<String>) -> Self {
        self.workspace = workspace.into();
        self
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingRequired`] for an empty workspace.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.workspace.trim().is_empty() {
            return Err(ConfigError::MissingRequired("workspace".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = StoreConfig::default();
        assert_eq!(config.workspace, "llm");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_workspace_rejected() {
        let config = StoreConfig::default().with_workspace("  ");
        assert_eq!(
            config.validate(),
            Err(ConfigError::MissingRequired("workspace".to_string()))
        );
    }
}
