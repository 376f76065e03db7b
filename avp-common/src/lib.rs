//! Shared building blocks for the avp-llm crates.
//!
//! This crate provides:
//! - The error taxonomy secret backends report through
//! - Environment-driven configuration helpers
//! - Tracing subscriber setup

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod tracing_config;

pub use config::ConfigError;
pub use error::{BackendError, BackendResult};
pub use tracing_config::{TracingConfig, init_tracing};
