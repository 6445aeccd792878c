//! Configuration loading and root folder resolution

use jcr_common::config::{resolve_root_folder, TomlConfig, ROOT_ENV_VAR};
use serial_test::serial;
use std::path::{Path, PathBuf};

#[test]
fn test_empty_toml_uses_defaults() {
    let config = TomlConfig::parse("").unwrap();
    assert_eq!(config.server.port, 5780);
    assert_eq!(config.server.host, "127.0.0.1");
    assert_eq!(config.sync.timeout_secs, 30);
    assert_eq!(config.sync.max_concurrent, 4);
    assert_eq!(config.sync.sources.len(), 13);
    assert_eq!(config.logging.level, "info");
    assert!(config.root_folder.is_none());
}

#[test]
fn test_partial_toml_overrides() {
    let config = TomlConfig::parse(
        r#"
        root_folder = "/srv/jcr"

        [server]
        port = 9000

        [sync]
        timeout_secs = 5

        [[sync.sources]]
        table = "JCR2024"
        file = "JCR2024.csv"
        "#,
    )
    .unwrap();

    assert_eq!(config.root_folder, Some(PathBuf::from("/srv/jcr")));
    assert_eq!(config.server.port, 9000);
    assert_eq!(config.server.host, "127.0.0.1");
    assert_eq!(config.sync.timeout_secs, 5);
    assert_eq!(config.sync.sources.len(), 1);
    assert_eq!(config.sync.sources[0].table, "JCR2024");
}

#[test]
fn test_logging_level_override() {
    let config = TomlConfig::parse(
        r#"
        [logging]
        level = "debug,sqlx=warn"
        "#,
    )
    .unwrap();
    assert_eq!(config.logging.level, "debug,sqlx=warn");
    assert_eq!(config.server.port, 5780);
}

#[test]
fn test_invalid_toml_is_config_error() {
    let result = TomlConfig::parse("[server\nport = ");
    assert!(matches!(result, Err(jcr_common::Error::Config(_))));
}

#[test]
fn test_explicit_missing_file_is_error() {
    let result = TomlConfig::load_or_default(Some(Path::new("/nonexistent/jcr/config.toml")));
    assert!(result.is_err());
}

#[test]
#[serial]
fn test_cli_argument_wins() {
    std::env::set_var(ROOT_ENV_VAR, "/from/env");
    let config = TomlConfig {
        root_folder: Some(PathBuf::from("/from/toml")),
        ..TomlConfig::default()
    };
    let root = resolve_root_folder(Some(Path::new("/from/cli")), &config);
    std::env::remove_var(ROOT_ENV_VAR);

    assert_eq!(root, PathBuf::from("/from/cli"));
}

#[test]
#[serial]
fn test_env_beats_toml() {
    std::env::set_var(ROOT_ENV_VAR, "/from/env");
    let config = TomlConfig {
        root_folder: Some(PathBuf::from("/from/toml")),
        ..TomlConfig::default()
    };
    let root = resolve_root_folder(None, &config);
    std::env::remove_var(ROOT_ENV_VAR);

    assert_eq!(root, PathBuf::from("/from/env"));
}

#[test]
#[serial]
fn test_toml_beats_default() {
    std::env::remove_var(ROOT_ENV_VAR);
    let config = TomlConfig {
        root_folder: Some(PathBuf::from("/from/toml")),
        ..TomlConfig::default()
    };
    assert_eq!(resolve_root_folder(None, &config), PathBuf::from("/from/toml"));
}

#[test]
#[serial]
fn test_default_root_folder() {
    std::env::remove_var(ROOT_ENV_VAR);
    let root = resolve_root_folder(None, &TomlConfig::default());
    assert!(root.ends_with("jcr") || root.ends_with("jcr_data"));
}
