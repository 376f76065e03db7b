//! Shared test utilities for avp-llm crates.
//!
//! This crate provides:
//! - Proptest generators for provider names, credentials and labels
//! - Instrumented and failing secret backends, stub client constructors
//! - Test fixtures with sample credentials

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
pub mod mocks;

pub use generators::*;
