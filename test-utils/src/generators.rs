//! Shared proptest generators.

use avp_llm::resolver::DEFAULT_KEY_MAPPING;
use avp_vault::Labels;
use proptest::prelude::*;

/// Generate a provider from the fixed key table, in random case.
pub fn known_provider_strategy() -> impl Strategy<Value = String> {
    (
        prop::sample::select(DEFAULT_KEY_MAPPING.map(|(provider, _)| provider).to_vec()),
        any::<bool>(),
    )
        .prop_map(|(provider, upper)| {
            if upper {
                provider.to_uppercase()
            } else {
                provider.to_string()
            }
        })
}

/// Generate a provider name outside the fixed key table.
pub fn unknown_provider_strategy() -> impl Strategy<Value = String> {
    "[A-Za-z][A-Za-z0-9-]{1,20}".prop_filter("must not be a mapped provider", |name| {
        let lower = name.to_lowercase();
        !DEFAULT_KEY_MAPPING.iter().any(|(provider, _)| *provider == lower)
    })
}

/// Generate valid credential names.
pub fn credential_name_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{2,30}"
}

/// Generate credential values shaped like API keys.
pub fn credential_value_strategy() -> impl Strategy<Value = String> {
    "(sk|sk-ant|co|mk)-[A-Za-z0-9]{16,48}"
}

/// Generate label sets with up to three entries.
pub fn labels_strategy() -> impl Strategy<Value = Labels> {
    prop::collection::btree_map(
        prop_oneof![Just("env".to_string()), Just("team".to_string()), Just("tier".to_string())],
        "[a-z]{3,12}",
        0..3,
    )
}

/// Generate valid workspace names.
pub fn workspace_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9-]{2,20}"
}

/// Generate valid correlation IDs.
pub fn correlation_id_strategy() -> impl Strategy<Value = String> {
    "[a-z0-9-]{8,36}"
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::strategy::ValueTree;
    use proptest::test_runner::TestRunner;

    #[test]
    fn test_unknown_providers_are_unmapped() {
        let mut runner = TestRunner::default();
        for _ in 0..20 {
            let value = unknown_provider_strategy()
                .new_tree(&mut runner)
                .unwrap()
                .current();
            assert!(!DEFAULT_KEY_MAPPING
                .iter()
                .any(|(provider, _)| *provider == value.to_lowercase()));
        }
    }

    #[test]
    fn test_known_providers_are_mapped() {
        let mut runner = TestRunner::default();
        for _ in 0..20 {
            let value = known_provider_strategy()
                .new_tree(&mut runner)
                .unwrap()
                .current();
            assert!(DEFAULT_KEY_MAPPING
                .iter()
                .any(|(provider, _)| *provider == value.to_lowercase()));
        }
    }

    #[test]
    fn test_labels_bounded() {
        let mut runner = TestRunner::default();
        for _ in 0..20 {
            let value = labels_strategy().new_tree(&mut runner).unwrap().current();
            assert!(value.len() < 3);
        }
    }
}
