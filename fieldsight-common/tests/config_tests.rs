//! Configuration loading tests
//!
//! Tests that touch process environment variables are marked `#[serial]` so
//! they never race each other.

use fieldsight_common::config::{
    config_file_path, resolve_root_folder, TomlConfig, CONFIG_ENV_VAR, ROOT_FOLDER_ENV_VAR,
};
use serial_test::serial;
use std::env;
use std::path::{Path, PathBuf};

const ENKETO_KEYS: [&str; 4] = [
    "ENKETO_URL",
    "ENKETO_API_SURVEY_PATH",
    "ENKETO_API_INSTANCE_PATH",
    "ENKETO_API_TOKEN",
];

fn clear_env() {
    for key in ENKETO_KEYS {
        env::remove_var(key);
    }
    env::remove_var(CONFIG_ENV_VAR);
    env::remove_var(ROOT_FOLDER_ENV_VAR);
}

#[test]
#[serial]
fn test_missing_file_uses_defaults() {
    clear_env();
    let config = TomlConfig::load(Some(Path::new("/nonexistent/fieldsight-kc.toml"))).unwrap();

    assert_eq!(config.server.port, 8001);
    assert!(!config.enketo.is_configured());
}

#[test]
#[serial]
fn test_load_full_toml() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fieldsight-kc.toml");
    std::fs::write(
        &path,
        r#"
root_folder = "/srv/fieldsight"
debug = true

[server]
host = "0.0.0.0"
port = 9000

[enketo]
url = "https://enketo.example.org"
api_survey_path = "/api/v2/survey"
api_instance_path = "/api/v2/instance"
api_token = "abc"
offline_surveys = true
timeout_secs = 5

[hosts]
internal_hostname = "kc"
public_hostname = "kc.example.org"

[media]
thumbnail_suffix = "-sm"
"#,
    )
    .unwrap();

    let config = TomlConfig::load(Some(&path)).unwrap();

    assert!(config.debug);
    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!(config.server.port, 9000);
    assert!(config.enketo.is_configured());
    assert!(config.enketo.offline_surveys);
    assert_eq!(config.enketo.timeout_secs, 5);
    assert_eq!(config.enketo.protocol, "https");
    assert_eq!(config.hosts.public_hostname.as_deref(), Some("kc.example.org"));
    assert_eq!(config.media.thumbnail_suffix, "-sm");
    assert_eq!(config.media.base_url, "/media/");
    assert_eq!(config.root_folder, Some(PathBuf::from("/srv/fieldsight")));
}

#[test]
#[serial]
fn test_invalid_toml_is_config_error() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.toml");
    std::fs::write(&path, "[server\nport = ").unwrap();

    let err = TomlConfig::load(Some(&path)).unwrap_err();
    assert!(matches!(err, fieldsight_common::Error::Config(_)));
}

#[test]
#[serial]
fn test_environment_overrides_toml() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fieldsight-kc.toml");
    std::fs::write(&path, "[enketo]\nurl = \"https://old.example.org\"\n").unwrap();

    env::set_var("ENKETO_URL", "https://new.example.org");
    env::set_var("ENKETO_API_SURVEY_PATH", "/api/v2/survey");
    let config = TomlConfig::load(Some(&path)).unwrap();
    clear_env();

    assert_eq!(config.enketo.url.as_deref(), Some("https://new.example.org"));
    assert!(config.enketo.is_configured());
}

#[test]
#[serial]
fn test_config_file_path_priority() {
    clear_env();
    let cli = PathBuf::from("/etc/cli.toml");
    assert_eq!(config_file_path(Some(&cli)), Some(cli.clone()));

    env::set_var(CONFIG_ENV_VAR, "/etc/env.toml");
    assert_eq!(config_file_path(None), Some(PathBuf::from("/etc/env.toml")));
    assert_eq!(config_file_path(Some(&cli)), Some(cli));
    clear_env();
}

#[test]
#[serial]
fn test_root_folder_resolution_priority() {
    clear_env();
    let mut config = TomlConfig::default();

    let cli = PathBuf::from("/cli/root");
    assert_eq!(resolve_root_folder(Some(&cli), &config), cli);

    config.root_folder = Some(PathBuf::from("/toml/root"));
    assert_eq!(resolve_root_folder(None, &config), PathBuf::from("/toml/root"));

    env::set_var(ROOT_FOLDER_ENV_VAR, "/env/root");
    config.apply_env_overrides();
    clear_env();
    assert_eq!(resolve_root_folder(None, &config), PathBuf::from("/env/root"));
}
