//! Secret and session types exchanged with a backend.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;
use zeroize::Zeroizing;

/// Metadata labels attached to a credential.
pub type Labels = BTreeMap<String, String>;

/// Handle for an authenticated backend session, bound to one workspace.
///
/// Backends create these in `authenticate` and reject any they did not issue.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Session {
    session_id: Uuid,
    workspace: String,
}

impl Session {
    /// Create a fresh session for `workspace`.
    #[must_use]
    pub fn new(workspace: impl Into<String>) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            workspace: workspace.into(),
        }
    }

    /// Opaque session identifier.
    #[must_use]
    pub const fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Workspace this session is scoped to.
    #[must_use]
    pub fn workspace(&self) -> &str {
        &self.workspace
    }
}

/// Raw secret payload returned by [`crate::SecretBackend::retrieve`].
///
/// The buffer is zeroized on drop and never printed by `Debug`.
#[derive(Clone)]
pub struct SecretValue {
    value: Zeroizing<Vec<u8>>,
    version: u32,
}

impl SecretValue {
    /// Wrap a retrieved payload.
    #[must_use]
    pub fn new(value: Vec<u8>, version: u32) -> Self {
        Self {
            value: Zeroizing::new(value),
            version,
        }
    }

    /// Borrow the raw bytes.
    #[must_use]
    pub fn expose_bytes(&self) -> &[u8] {
        &self.value
    }

    /// Version number of this payload, starting at 1.
    #[must_use]
    pub const fn version(&self) -> u32 {
        self.version
    }
}

impl fmt::Debug for SecretValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretValue")
            .field("value", &"[REDACTED]")
            .field("version", &self.version)
            .finish()
    }
}

/// Listing entry returned by [`crate::SecretBackend::list_secrets`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretSummary {
    /// Credential name
    pub name: String,
    /// Labels attached at the last write
    pub labels: Labels,
    /// Current version
    pub version: u32,
    /// Last write time
    pub updated_at: DateTime<Utc>,
}

/// Check whether `labels` satisfies every entry of `filter` exactly.
///
/// An empty filter matches everything.
#[must_use]
pub fn labels_match(labels: &Labels, filter: &Labels) -> bool {
    filter
        .iter()
        .all(|(key, expected)| labels.get(key) == Some(expected))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(pairs: &[(&str, &str)]) -> Labels {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_secret_value_debug_redacted() {
        let value = SecretValue::new(b"sk-ant-123".to_vec(), 2);
        let debug = format!("{value:?}");
        assert!(!debug.contains("sk-ant-123"));
        assert!(debug.contains("[REDACTED]"));
        assert!(debug.contains("version: 2"));
    }

    #[test]
    fn test_labels_match_is_conjunctive() {
        let set = labels(&[("env", "production"), ("team", "ml")]);
        assert!(labels_match(&set, &labels(&[("env", "production")])));
        assert!(labels_match(&set, &labels(&[("env", "production"), ("team", "ml")])));
        assert!(!labels_match(&set, &labels(&[("env", "production"), ("team", "infra")])));
        assert!(!labels_match(&set, &labels(&[("region", "eu")])));
    }

    #[test]
    fn test_empty_filter_matches_all() {
        assert!(labels_match(&Labels::new(), &Labels::new()));
        assert!(labels_match(&labels(&[("env", "dev")]), &Labels::new()));
    }

    #[test]
    fn test_sessions_are_unique() {
        let a = Session::new("llm");
        let b = Session::new("llm");
        assert_ne!(a.session_id(), b.session_id());
        assert_eq!(a.workspace(), "llm");
    }
}
