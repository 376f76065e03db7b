//! Tracing subscriber setup.

use crate::config::{ConfigError, env_or, load_dotenv, parse_env};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Tracing configuration.
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Service name attached to the startup event
    pub service_name: String,
    /// Log level filter, used when `RUST_LOG` is unset
    pub log_level: String,
    /// Whether to output JSON format
    pub json_output: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            service_name: "avp-llm".to_string(),
            log_level: "info".to_string(),
            json_output: false,
        }
    }
}

impl TracingConfig {
    /// Load from `AVP_SERVICE_NAME`, `AVP_LOG_LEVEL` and `AVP_LOG_JSON`.
    ///
    /// # Errors
    ///
    /// Returns an error if `AVP_LOG_JSON` is set to something other than a
    /// boolean.
    pub fn from_env() -> Result<Self, ConfigError> {
        load_dotenv();
        let defaults = Self::default();

        Ok(Self {
            service_name: env_or("AVP_SERVICE_NAME", &defaults.service_name),
            log_level: env_or("AVP_LOG_LEVEL", &defaults.log_level),
            json_output: parse_env("AVP_LOG_JSON", defaults.json_output)?,
        })
    }

    /// Create config with custom service name.
    #[must_use]
    pub fn with_service_name(mut self, name: impl Into<String>) -> Self {
        self.service_name = name.into();
        self
    }

    /// Create config with custom log level.
    #[must_use]
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Enable JSON output.
    #[must_use]
    pub const fn with_json_output(mut self) -> Self {
        self.json_output = true;
        self
    }
}

/// Initialize tracing with the given configuration.
///
/// Installs the global subscriber; call once at startup. Returns `false`
/// if a global subscriber was already installed.
pub fn init_tracing(config: &TracingConfig) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let installed = if config.json_output {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
            .is_ok()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .try_init()
            .is_ok()
    };

    if installed {
        tracing::info!(service = %config.service_name, "Tracing initialized");
    }
    installed
}
