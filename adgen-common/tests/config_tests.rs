//! Configuration tests
//!
//! Covers:
//! - Graceful degradation when the TOML file is missing or invalid
//! - Root folder priority: CLI → environment → TOML → compiled default
//! - LLM API key priority: ADGEN_LLM_API_KEY → OPENAI_API_KEY → TOML
//!
//! Note: Uses serial_test to prevent ENV variable race conditions.

use adgen_common::config::{
    default_root_folder, load_config_or_default, load_toml_config, resolve_llm_api_key,
    LlmConfig, RootFolderInitializer, RootFolderResolver, TomlConfig, ROOT_FOLDER_ENV,
};
use serial_test::serial;
use std::env;
use std::path::PathBuf;
use tempfile::TempDir;

fn clear_key_env() {
    env::remove_var("ADGEN_LLM_API_KEY");
    env::remove_var("OPENAI_API_KEY");
}

#[test]
fn test_missing_config_file_uses_defaults() {
    let temp = TempDir::new().unwrap();
    let config = load_config_or_default(Some(&temp.path().join("absent.toml")));

    assert!(config.port.is_none());
    assert_eq!(config.logging.level, "info");
    assert_eq!(config.llm.max_tokens, 800);
}

#[test]
fn test_invalid_config_file_uses_defaults() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("broken.toml");
    std::fs::write(&path, "port = \"not a number\"\n[llm\n").unwrap();

    assert!(load_toml_config(&path).is_err());

    let config = load_config_or_default(Some(&path));
    assert!(config.port.is_none());
}

#[test]
fn test_full_config_file_is_loaded() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
root_folder = "/srv/adgen"
port = 8080

[logging]
level = "debug"

[llm]
base_url = "http://localhost:1234/v1"
model = "local-model"
generation_temperature = 0.5
remix_temperature = 1.1
max_tokens = 400
timeout_secs = 5
api_key = "toml-key"
"#,
    )
    .unwrap();

    let config = load_config_or_default(Some(&path));

    assert_eq!(config.root_folder, Some(PathBuf::from("/srv/adgen")));
    assert_eq!(config.port, Some(8080));
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.llm.base_url, "http://localhost:1234/v1");
    assert_eq!(config.llm.max_tokens, 400);
    assert_eq!(config.llm.timeout_secs, 5);
    assert_eq!(config.llm.api_key.as_deref(), Some("toml-key"));
}

#[test]
#[serial]
fn test_resolver_cli_arg_wins() {
    env::set_var(ROOT_FOLDER_ENV, "/tmp/adgen-env");
    let toml = TomlConfig {
        root_folder: Some(PathBuf::from("/tmp/adgen-toml")),
        ..TomlConfig::default()
    };

    let resolved = RootFolderResolver::new("test-module")
        .with_cli_arg(Some(PathBuf::from("/tmp/adgen-cli")))
        .with_toml_config(&toml)
        .resolve();

    env::remove_var(ROOT_FOLDER_ENV);
    assert_eq!(resolved, PathBuf::from("/tmp/adgen-cli"));
}

#[test]
#[serial]
fn test_resolver_env_beats_toml() {
    env::set_var(ROOT_FOLDER_ENV, "/tmp/adgen-env");
    let toml = TomlConfig {
        root_folder: Some(PathBuf::from("/tmp/adgen-toml")),
        ..TomlConfig::default()
    };

    let resolved = RootFolderResolver::new("test-module")
        .with_toml_config(&toml)
        .resolve();

    env::remove_var(ROOT_FOLDER_ENV);
    assert_eq!(resolved, PathBuf::from("/tmp/adgen-env"));
}

#[test]
#[serial]
fn test_resolver_falls_back_to_toml_then_default() {
    env::remove_var(ROOT_FOLDER_ENV);

    let toml = TomlConfig {
        root_folder: Some(PathBuf::from("/tmp/adgen-toml")),
        ..TomlConfig::default()
    };
    let resolved = RootFolderResolver::new("test-module")
        .with_toml_config(&toml)
        .resolve();
    assert_eq!(resolved, PathBuf::from("/tmp/adgen-toml"));

    let resolved = RootFolderResolver::new("test-module").resolve();
    assert_eq!(resolved, default_root_folder());
}

#[test]
fn test_initializer_creates_missing_directory() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("a").join("b");

    let init = RootFolderInitializer::new(root.clone());
    init.ensure_directory_exists().unwrap();

    assert!(root.is_dir());
    assert_eq!(init.database_path(), root.join("adgen.db"));
}

#[test]
#[serial]
fn test_api_key_env_priority() {
    clear_key_env();
    env::set_var("OPENAI_API_KEY", "openai-key");
    env::set_var("ADGEN_LLM_API_KEY", "adgen-key");

    let llm = LlmConfig {
        api_key: Some("toml-key".to_string()),
        ..LlmConfig::default()
    };
    let key = resolve_llm_api_key(&llm).unwrap();
    assert_eq!(key, "adgen-key");

    env::remove_var("ADGEN_LLM_API_KEY");
    let key = resolve_llm_api_key(&llm).unwrap();
    assert_eq!(key, "openai-key");

    clear_key_env();
    let key = resolve_llm_api_key(&llm).unwrap();
    assert_eq!(key, "toml-key");
}

#[test]
#[serial]
fn test_api_key_missing_is_config_error() {
    clear_key_env();
    env::set_var("OPENAI_API_KEY", "   ");

    let result = resolve_llm_api_key(&LlmConfig::default());

    clear_key_env();
    let err = result.unwrap_err();
    assert!(err.to_string().contains("LLM API key not configured"));
}

#[test]
fn test_zero_timeout_in_file_is_replaced_at_load() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("config.toml");
    std::fs::write(&path, "[llm]\ntimeout_secs = 0\nmax_tokens = 0\nremix_temperature = 7.5\n").unwrap();

    let config = load_toml_config(&path).unwrap();
    assert_eq!(config.llm.timeout_secs, LlmConfig::default().timeout_secs);
    assert_eq!(config.llm.max_tokens, 800);
    assert_eq!(config.llm.remix_temperature, 0.9);
}
