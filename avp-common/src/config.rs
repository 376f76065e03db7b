//! Environment-driven configuration helpers.
//!
//! Every crate in the workspace loads its settings the same way: read a
//! `.env` file if one exists, then parse typed values out of the process
//! environment, falling back to defaults.

use std::env;
use std::str::FromStr;
use thiserror::Error;

/// Configuration errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Missing required field
    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    /// Environment variable parse error
    #[error("Failed to parse environment variable {name}: {reason}")]
    ParseError {
        /// Variable name
        name: String,
        /// Parser message
        reason: String,
    },
}

/// Load a `.env` file from the working directory, if present.
///
/// A missing file is not an error.
pub fn load_dotenv() {
    if let Ok(path) = dotenvy::dotenv() {
        tracing::debug!(path = %path.display(), "Loaded .env file");
    }
}

/// Parse an environment variable with a default value.
///
/// # Errors
///
/// Returns [`ConfigError::ParseError`] if the variable is set but does not
/// parse as `T`.
pub fn parse_env<T: FromStr>(name: &str, default: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(val) => val.trim().parse().map_err(|e: T::Err| ConfigError::ParseError {
            name: name.to_string(),
            reason: e.to_string(),
        }),
        Err(_) => Ok(default),
    }
}

/// Read a string environment variable, falling back to `default`.
#[must_use]
pub fn env_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}
