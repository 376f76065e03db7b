//! Append-only audit log of LLM invocations.

use chrono::{DateTime, SecondsFormat, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{self, Write as _};

/// Structured metadata attached to an audit entry.
pub type AuditMetadata = BTreeMap<String, serde_json::Value>;

/// Lifecycle event recorded in the audit log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditEventKind {
    /// A model call started; opens a correlation id
    LlmStart,
    /// A model call finished
    LlmEnd,
    /// A model call failed
    LlmError,
}

impl AuditEventKind {
    /// Convert to string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::LlmStart => "llm_start",
            Self::LlmEnd => "llm_end",
            Self::LlmError => "llm_error",
        }
    }

    /// Whether this event closes a correlation id.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::LlmEnd | Self::LlmError)
    }
}

impl fmt::Display for AuditEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One recorded event. Never mutated once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Insertion order, strictly increasing across the sink's lifetime
    pub sequence: u64,
    /// Wall-clock time of the append
    pub timestamp: DateTime<Utc>,
    /// Event kind
    pub event: AuditEventKind,
    /// Correlation id of the request, if known
    pub correlation_id: Option<String>,
    /// Event metadata
    pub metadata: AuditMetadata,
}

#[derive(Default)]
struct Log {
    entries: Vec<AuditEntry>,
    next_sequence: u64,
}

/// Thread-safe, append-only audit log.
///
/// Appends are serialized under one lock, so entries from concurrent callers
/// form a total order and readers never see a partial entry. The sink only
/// observes: it does not check that every start has a matching end.
#[derive(Default)]
pub struct AuditSink {
    log: Mutex<Log>,
}

impl AuditSink {
    /// Create an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event.
    pub fn record(&self, event: AuditEventKind, correlation_id: Option<&str>, metadata: AuditMetadata) {
        let mut log = self.log.lock();
        let sequence = log.next_sequence;
        log.next_sequence += 1;
        log.entries.push(AuditEntry {
            sequence,
            timestamp: Utc::now(),
            event,
            correlation_id: correlation_id.map(String::from),
            metadata,
        });
        drop(log);

        tracing::debug!(event = %event, correlation_id, sequence, "Recorded audit event");
    }

    /// Copy of every entry, in insertion order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<AuditEntry> {
        self.log.lock().entries.clone()
    }

    /// Remove every entry. Sequence numbers keep increasing afterwards.
    pub fn clear(&self) {
        self.log.lock().entries.clear();
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.log.lock().entries.len()
    }

    /// Whether the log is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.log.lock().entries.is_empty()
    }

    /// Human-readable listing, one line per entry.
    #[must_use]
    pub fn render(&self) -> String {
        let rule = "-".repeat(60);
        let mut out = format!("Audit Log:\n{rule}\n");
        for entry in self.snapshot() {
            let metadata = entry
                .metadata
                .iter()
                .map(|(key, value)| format!("{key}={}", display_value(value)))
                .collect::<Vec<_>>()
                .join(", ");
            let _ = writeln!(
                out,
                "  {} | {}: {metadata}",
                entry.timestamp.to_rfc3339_opts(SecondsFormat::Micros, true),
                entry.event,
            );
        }
        out.push_str(&rule);
        out
    }
}

impl fmt::Debug for AuditSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuditSink")
            .field("entries", &self.len())
            .finish()
    }
}

fn display_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
