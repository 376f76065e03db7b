//! LLM lifecycle hooks that feed an [`AuditSink`].

use crate::audit::{AuditEventKind, AuditMetadata, AuditSink};
use parking_lot::Mutex;
use serde_json::{Value, json};
use std::sync::Arc;

const UNKNOWN: &str = "unknown";

/// Details of a model call that is about to start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmStart {
    /// Provider or client class name
    pub provider: String,
    /// Model name
    pub model: String,
    /// Number of prompts in the call
    pub prompt_count: usize,
}

impl LlmStart {
    /// Create start details.
    #[must_use]
    pub fn new(provider: impl Into<String>, model: impl Into<String>, prompt_count: usize) -> Self {
        Self {
            provider: provider.into(),
            model: model.into(),
            prompt_count,
        }
    }

    /// Extract start details from a serialized client description.
    ///
    /// The model comes from `kwargs.model` and the provider from the last
    /// element of `id`; either falls back to `"unknown"`.
    #[must_use]
    pub fn from_serialized(serialized: &Value, prompts: &[String]) -> Self {
        let model = serialized
            .pointer("/kwargs/model")
            .and_then(Value::as_str)
            .unwrap_or(UNKNOWN);
        let provider = serialized
            .get("id")
            .and_then(Value::as_array)
            .and_then(|id| id.last())
            .and_then(Value::as_str)
            .unwrap_or(UNKNOWN);
        Self::new(provider, model, prompts.len())
    }
}

/// Details of a model call that finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmEnd {
    /// Number of generations returned
    pub generations: usize,
    /// Provider-reported token usage, `{}` if none
    pub token_usage: Value,
}

impl LlmEnd {
    /// Create end details.
    #[must_use]
    pub const fn new(generations: usize, token_usage: Value) -> Self {
        Self {
            generations,
            token_usage,
        }
    }

    /// Build from a provider's raw output, reading `token_usage` if present.
    #[must_use]
    pub fn from_llm_output(generations: usize, llm_output: Option<&Value>) -> Self {
        let token_usage = llm_output
            .and_then(|output| output.get("token_usage"))
            .cloned()
            .unwrap_or_else(|| json!({}));
        Self::new(generations, token_usage)
    }
}

/// Records model call lifecycle into an audit sink.
///
/// Tracks the run id of the call in flight: `on_llm_start` opens it and the
/// terminal hooks close it.
#[derive(Debug, Default)]
pub struct AuditCallback {
    sink: Arc<AuditSink>,
    current_run: Mutex<Option<String>>,
}

impl AuditCallback {
    /// Create a callback writing to a fresh sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a callback writing to a shared sink.
    #[must_use]
    pub fn with_sink(sink: Arc<AuditSink>) -> Self {
        Self {
            sink,
            current_run: Mutex::new(None),
        }
    }

    /// The sink entries are written to.
    #[must_use]
    pub const fn sink(&self) -> &Arc<AuditSink> {
        &self.sink
    }

    /// Run id of the call in flight.
    #[must_use]
    pub fn current_run(&self) -> Option<String> {
        self.current_run.lock().clone()
    }

    /// A model call started.
    pub fn on_llm_start(&self, start: &LlmStart, run_id: Option<&str>) {
        let mut current = self.current_run.lock();
        *current = run_id.map(String::from);

        let mut metadata = AuditMetadata::new();
        metadata.insert("provider".to_string(), json!(start.provider));
        metadata.insert("model".to_string(), json!(start.model));
        metadata.insert("prompt_count".to_string(), json!(start.prompt_count));
        self.sink
            .record(AuditEventKind::LlmStart, current.as_deref(), metadata);
    }

    /// A model call finished.
    pub fn on_llm_end(&self, end: &LlmEnd) {
        let mut metadata = AuditMetadata::new();
        metadata.insert("generations".to_string(), json!(end.generations));
        metadata.insert("token_usage".to_string(), end.token_usage.clone());
        self.finish(AuditEventKind::LlmEnd, metadata);
    }

    /// A model call failed.
    pub fn on_llm_error<E: std::error::Error>(&self, error: &E) {
        let mut metadata = AuditMetadata::new();
        metadata.insert("error".to_string(), json!(error.to_string()));
        metadata.insert("error_type".to_string(), json!(short_type_name::<E>()));
        self.finish(AuditEventKind::LlmError, metadata);
    }

    /// Copy of the audit log.
    #[must_use]
    pub fn audit_log(&self) -> Vec<crate::audit::AuditEntry> {
        self.sink.snapshot()
    }

    /// Clear the audit log.
    pub fn clear_audit_log(&self) {
        self.sink.clear();
    }

    fn finish(&self, event: AuditEventKind, metadata: AuditMetadata) {
        let mut current = self.current_run.lock();
        self.sink.record(event, current.as_deref(), metadata);
        *current = None;
    }
}

fn short_type_name<T>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}
