//! # Configuration Tests
//!
//! This file contains tests for the layered configuration loading of the `dbchat` CLI.

use dbchat::Locale;
use dbchat_cli::config::{get_config, ConfigError};
use std::env;
use std::io::Write;
use std::sync::Mutex;
use tempfile::NamedTempFile;

// A mutex to ensure that tests modifying the environment run sequentially.
static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Clears all environment variables read by `get_config`.
fn clear_env_vars() {
    for var in [
        "DBCHAT_LANGUAGE",
        "DBCHAT_TOP_K",
        "DBCHAT_DIALECT",
        "DBCHAT_DISPLAY_TYPES",
        "DBCHAT_AI__API_URL",
        "DBCHAT_TEST_API_KEY",
    ] {
        env::remove_var(var);
    }
}

fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp config");
    file.write_all(content.as_bytes())
        .expect("Failed to write temp config");
    file
}

#[test]
fn test_get_config_defaults() {
    let _lock = ENV_LOCK.lock().unwrap();
    clear_env_vars();

    let file = write_config("{}\n");
    let config = get_config(file.path().to_str()).expect("defaults should load");

    assert_eq!(config.language, "en");
    assert_eq!(config.dialect, "sqlite");
    assert_eq!(config.top_k, 50);
    assert_eq!(config.temperature, 0.5);
    assert_eq!(config.ai.provider, "local");
    assert_eq!(config.locale().unwrap(), Locale::En);
    assert_eq!(
        config.scene_settings().unwrap().display_types,
        dbchat::DisplayTypes::default()
    );
}

#[test]
fn test_get_config_from_yaml_with_substitution() {
    let _lock = ENV_LOCK.lock().unwrap();
    clear_env_vars();
    env::set_var("DBCHAT_TEST_API_KEY", "sk-test");

    let file = write_config(
        r#"
language: zh
dialect: postgresql
top_k: 20
db_name: benchmarks
display_types: ["Table", "LineChart"]
ai:
  provider: local
  api_url: http://localhost:1234/v1/chat/completions
  api_key: ${DBCHAT_TEST_API_KEY}
  model_name: qwen
"#,
    );
    let config = get_config(file.path().to_str()).expect("yaml config should load");

    assert_eq!(config.locale().unwrap(), Locale::Zh);
    assert_eq!(config.dialect, "postgresql");
    assert_eq!(config.top_k, 20);
    assert_eq!(config.db_name, "benchmarks");
    assert_eq!(config.ai.api_key.as_deref(), Some("sk-test"));
    let settings = config.scene_settings().unwrap();
    assert_eq!(
        settings.display_types.names(),
        &["Table".to_string(), "LineChart".to_string()]
    );

    clear_env_vars();
}

#[test]
fn test_env_overrides_file() {
    let _lock = ENV_LOCK.lock().unwrap();
    clear_env_vars();
    env::set_var("DBCHAT_TOP_K", "7");
    env::set_var("DBCHAT_AI__API_URL", "http://override:8080");

    let file = write_config("top_k: 20\nai:\n  api_url: http://file:1234\n");
    let config = get_config(file.path().to_str()).unwrap();

    assert_eq!(config.top_k, 7);
    assert_eq!(config.ai.api_url.as_deref(), Some("http://override:8080"));

    clear_env_vars();
}

#[test]
fn test_unknown_language_fails_at_load() {
    let _lock = ENV_LOCK.lock().unwrap();
    clear_env_vars();

    let file = write_config("language: fr\n");
    let err = get_config(file.path().to_str()).unwrap_err();
    assert!(matches!(err, ConfigError::UnknownLocale(ref v) if v == "fr"));
}

#[test]
fn test_missing_override_file() {
    let _lock = ENV_LOCK.lock().unwrap();
    let err = get_config(Some("/definitely/not/here/dbchat.yml")).unwrap_err();
    assert!(matches!(err, ConfigError::NotFound(_)));
}
