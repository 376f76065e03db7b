//! End-to-end tests: load credentials, build clients, audit their calls.

use anyhow::Result;
use avp_integration_tests::Harness;
use avp_llm::{AuditEventKind, ClientOptions, FactoryError, LlmEnd, LlmStart};
use avp_vault::StoreConfig;
use proptest::prelude::*;
use secrecy::ExposeSecret;
use serde_json::json;
use std::process::Command;
use test_utils::credential_value_strategy;
use test_utils::fixtures::{SampleCredential, provider_keys, seed};

#[derive(Debug, thiserror::Error)]
#[error("provider returned 429")]
struct RateLimited;

#[test]
fn test_anthropic_call_is_built_and_audited() -> Result<()> {
    let harness = Harness::new();
    let loaded = harness.load(&StoreConfig::default(), &[])?;
    seed(&loaded.store, &provider_keys())?;

    let client = harness
        .factory
        .build("Anthropic", &loaded.store, None, ClientOptions::new())?;
    assert_eq!(client.provider, "anthropic");
    assert_eq!(client.api_key, "sk-ant-test");
    assert_eq!(client.model, "claude-3-haiku-20240307");

    let prompts = vec!["Summarize the incident report".to_string()];
    let serialized = json!({
        "id": ["langchain", "chat_models", "anthropic", "ChatAnthropic"],
        "kwargs": {"model": client.model},
    });
    harness
        .callback
        .on_llm_start(&LlmStart::from_serialized(&serialized, &prompts), Some("run-1"));
    assert_eq!(harness.callback.current_run().as_deref(), Some("run-1"));

    let output = json!({"token_usage": {"input_tokens": 12, "output_tokens": 40}});
    harness
        .callback
        .on_llm_end(&LlmEnd::from_llm_output(1, Some(&output)));
    assert_eq!(harness.callback.current_run(), None);

    let log = harness.callback.audit_log();
    assert_eq!(log.len(), 2);
    assert_eq!(log[0].event, AuditEventKind::LlmStart);
    assert_eq!(log[0].metadata["provider"], "ChatAnthropic");
    assert_eq!(log[0].metadata["prompt_count"], 1);
    assert_eq!(log[1].event, AuditEventKind::LlmEnd);
    assert_eq!(log[1].metadata["token_usage"]["output_tokens"], 40);
    assert!(log.iter().all(|e| e.correlation_id.as_deref() == Some("run-1")));

    let rendered = harness.callback.sink().render();
    assert!(rendered.starts_with("Audit Log:\n"));
    assert!(rendered.contains("llm_start: model=claude-3-haiku-20240307"));
    assert!(!rendered.contains("sk-ant-test"));

    loaded.store.close()?;
    assert_eq!(harness.stats.authentications(), 1);
    assert_eq!(harness.stats.closes(), 1);
    Ok(())
}

#[test]
fn test_failed_call_is_audited() -> Result<()> {
    let harness = Harness::new();
    let loaded = harness.load(&StoreConfig::default(), &[])?;
    loaded.store.set("cohere_api_key", "co-live", None)?;

    let client = harness
        .factory
        .build("cohere", &loaded.store, Some("command-r"), ClientOptions::new())?;
    assert_eq!(client.model, "command-r");

    harness
        .callback
        .on_llm_start(&LlmStart::new("cohere", &client.model, 1), Some("run-7"));
    harness.callback.on_llm_error(&RateLimited);

    let log = harness.callback.audit_log();
    assert_eq!(log.len(), 2);
    assert!(log[1].event.is_terminal());
    assert_eq!(log[1].metadata["error"], "provider returned 429");
    assert_eq!(log[1].metadata["error_type"], "RateLimited");
    assert_eq!(log[1].correlation_id.as_deref(), Some("run-7"));

    harness.callback.clear_audit_log();
    assert!(harness.callback.audit_log().is_empty());
    Ok(())
}

#[test]
fn test_options_reach_the_client() -> Result<()> {
    let harness = Harness::new();
    let loaded = harness.load(&StoreConfig::default(), &[])?;
    loaded.store.set("mistral_api_key", "mk-live", None)?;

    let options = ClientOptions::from([
        ("temperature".to_string(), json!(0.2)),
        ("max_tokens".to_string(), json!(512)),
    ]);
    let client = harness
        .factory
        .build("mistral", &loaded.store, None, options.clone())?;
    assert_eq!(client.options, options);
    assert_eq!(client.model, "mistral-small-latest");
    Ok(())
}

#[test]
fn test_missing_and_unknown_providers() -> Result<()> {
    let harness = Harness::new();
    let loaded = harness.load(&StoreConfig::default(), &[])?;

    let missing = harness
        .factory
        .build("anthropic", &loaded.store, None, ClientOptions::new())
        .unwrap_err();
    assert!(matches!(
        &missing,
        FactoryError::MissingCredential { key, .. } if key == "anthropic_api_key"
    ));

    loaded.store.set("unknown-provider_api_key", "x-key", None)?;
    let unknown = harness
        .factory
        .build("unknown-provider", &loaded.store, None, ClientOptions::new())
        .unwrap_err();
    assert_eq!(unknown.code(), "unsupported_provider");
    assert!(unknown.to_string().contains("anthropic, cohere, mistral, openai"));
    Ok(())
}

#[test]
fn test_env_bindings_for_child_process() -> Result<()> {
    let harness = Harness::new();
    harness.seed(
        "llm",
        &[
            SampleCredential::new("openai_api_key", "sk-live"),
            SampleCredential::new("empty_key", ""),
        ],
    )?;

    let loaded = harness.load(
        &StoreConfig::default(),
        &[
            ("OPENAI_API_KEY", "openai_api_key"),
            ("EMPTY_API_KEY", "empty_key"),
            ("COHERE_API_KEY", "cohere_api_key"),
        ],
    )?;
    assert_eq!(loaded.env.names().collect::<Vec<_>>(), ["OPENAI_API_KEY"]);
    assert_eq!(
        loaded.env.get("OPENAI_API_KEY").map(|value| value.expose_secret()),
        Some("sk-live")
    );
    assert!(!format!("{:?}", loaded.env).contains("sk-live"));

    let mut command = Command::new("env");
    loaded.env.apply_to(&mut command);
    let envs: Vec<_> = command
        .get_envs()
        .map(|(name, value)| (name.to_os_string(), value.map(ToOwned::to_owned)))
        .collect();
    assert_eq!(envs.len(), 1);
    assert_eq!(envs[0].0, "OPENAI_API_KEY");

    drop(loaded);
    assert_eq!(harness.stats.authentications(), 1);
    assert_eq!(harness.stats.closes(), 1);
    Ok(())
}

#[test]
fn test_workspaces_do_not_share_credentials() -> Result<()> {
    let harness = Harness::new();
    let prod = harness.load(&StoreConfig::new("prod"), &[])?;
    let default = harness.load(&StoreConfig::default(), &[])?;
    prod.store.set("openai_api_key", "sk-prod", None)?;

    assert!(
        harness
            .factory
            .build("openai", &prod.store, None, ClientOptions::new())
            .is_ok()
    );
    assert!(matches!(
        harness
            .factory
            .build("openai", &default.store, None, ClientOptions::new()),
        Err(FactoryError::MissingCredential { .. })
    ));
    Ok(())
}

#[test]
fn test_dropping_one_store_leaves_the_other_building() -> Result<()> {
    let harness = Harness::new();
    let first = harness.load(&StoreConfig::default(), &[])?;
    let second = harness.load(&StoreConfig::default(), &[])?;
    first.store.set("openai_api_key", "sk-shared", None)?;

    harness
        .factory
        .build("openai", &second.store, None, ClientOptions::new())?;
    drop(first);
    assert_eq!(harness.stats.closes(), 1);

    let client = harness
        .factory
        .build("openai", &second.store, None, ClientOptions::new())?;
    assert_eq!(client.api_key, "sk-shared");

    drop(second);
    assert_eq!(harness.stats.authentications(), 2);
    assert_eq!(harness.stats.closes(), 2);
    Ok(())
}

#[test]
fn test_empty_credential_is_reported_missing() -> Result<()> {
    let harness = Harness::new();
    harness.seed("llm", &[SampleCredential::new("anthropic_api_key", "")])?;
    let loaded = harness.load(&StoreConfig::default(), &[])?;

    let err = harness
        .factory
        .build("anthropic", &loaded.store, None, ClientOptions::new())
        .unwrap_err();
    assert_eq!(err.code(), "missing_credential");
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    /// Whatever credential is stored, the built client carries it and the
    /// store is released exactly once.
    #[test]
    fn prop_stored_credential_reaches_client(value in credential_value_strategy()) {
        let harness = Harness::new();
        {
            let loaded = harness.load(&StoreConfig::default(), &[]).unwrap();
            loaded.store.set("openai_api_key", &value, None).unwrap();
            let client = harness
                .factory
                .build("openai", &loaded.store, None, ClientOptions::new())
                .unwrap();
            prop_assert_eq!(client.api_key, value);
        }
        prop_assert_eq!(harness.stats.closes(), 1);
    }
}
