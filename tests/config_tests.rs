//! Tests for file and TOML based fallback configuration.

mod common;

use std::io::Write;
use std::time::Duration;

use pretty_assertions::assert_eq;

use common::{chain, ScriptedProvider};
use roci_fallback::config::FallbackConfig;
use roci_fallback::error::RociError;
use roci_fallback::fallback::FallbackModel;
use roci_fallback::provider::ModelProvider;

#[test]
fn empty_document_uses_defaults() {
    let config = FallbackConfig::from_toml_str("").unwrap();

    assert_eq!(config, FallbackConfig::default());
    let options = config.into_options();
    assert_eq!(options.max_retries_per_model, 0);
    assert_eq!(options.base_delay, Duration::from_millis(1_000));
    assert_eq!(options.max_delay, Duration::from_millis(30_000));
    assert!(options.classifier.is_none());
}

#[test]
fn toml_values_flow_into_options() {
    let config = FallbackConfig::from_toml_str(
        r#"
        max_retries_per_model = 2
        base_delay_ms = 250
        max_delay_ms = 4000
        model_id = "primary-then-backup"
        "#,
    )
    .unwrap();

    let options = config.into_options();

    assert_eq!(options.max_retries_per_model, 2);
    assert_eq!(options.base_delay, Duration::from_millis(250));
    assert_eq!(options.max_delay, Duration::from_millis(4_000));
    assert_eq!(options.model_id.as_deref(), Some("primary-then-backup"));
    assert_eq!(options.provider_name, None);
}

#[test]
fn unknown_keys_are_rejected() {
    let err = FallbackConfig::from_toml_str("max_retries = 2").unwrap_err();
    assert!(matches!(err, RociError::Configuration(_)));
}

#[test]
fn wrong_value_type_is_rejected() {
    let err = FallbackConfig::from_toml_str("base_delay_ms = \"fast\"").unwrap_err();
    assert!(matches!(err, RociError::Configuration(_)));
}

#[test]
fn config_file_builds_a_named_chain() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "provider_name = \"router\"").unwrap();
    writeln!(file, "max_retries_per_model = 1").unwrap();

    let config = FallbackConfig::from_file(file.path()).unwrap();
    let primary = ScriptedProvider::new("openai", "gpt-4o").shared();
    let backup = ScriptedProvider::new("anthropic", "claude-sonnet").shared();
    let fallback = FallbackModel::new(chain(&[&primary, &backup]), config.into_options()).unwrap();

    assert_eq!(fallback.provider_name(), "router");
    assert_eq!(fallback.model_id(), "gpt-4o -> claude-sonnet");
    assert_eq!(fallback.options().max_retries_per_model, 1);
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = FallbackConfig::from_file(dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, RociError::Io(_)));
}

#[test]
fn invalid_file_error_names_the_path() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "max_delay_ms = -5").unwrap();

    let err = FallbackConfig::from_file(file.path()).unwrap_err();

    match err {
        RociError::Configuration(msg) => {
            assert!(msg.contains(&file.path().display().to_string()))
        }
        other => panic!("expected configuration error, got {other:?}"),
    }
}

#[test]
fn environment_overrides_defaults_and_file_values() {
    const VARS: [&str; 3] = [
        "ROCI_FALLBACK_MAX_RETRIES",
        "ROCI_FALLBACK_BASE_DELAY_MS",
        "ROCI_FALLBACK_MODEL_ID",
    ];
    std::env::set_var(VARS[0], "4");
    std::env::set_var(VARS[1], " 250 ");
    std::env::set_var(VARS[2], "env-chain");

    let from_env = FallbackConfig::from_env();
    let layered = FallbackConfig::from_toml_str("max_delay_ms = 9000\nbase_delay_ms = 10")
        .unwrap()
        .with_env_overrides();
    std::env::set_var(VARS[0], "many");
    let invalid = FallbackConfig::from_env();
    for var in VARS {
        std::env::remove_var(var);
    }

    let from_env = from_env.unwrap();
    assert_eq!(from_env.max_retries_per_model, 4);
    assert_eq!(from_env.base_delay_ms, 250);
    assert_eq!(from_env.max_delay_ms, 30_000);
    assert_eq!(from_env.model_id.as_deref(), Some("env-chain"));

    let layered = layered.unwrap();
    assert_eq!(layered.base_delay_ms, 250);
    assert_eq!(layered.max_delay_ms, 9_000);

    match invalid.unwrap_err() {
        RociError::Configuration(msg) => assert!(msg.contains("ROCI_FALLBACK_MAX_RETRIES")),
        other => panic!("expected configuration error, got {other:?}"),
    }
}
