//! Bootstrap configuration loading and root folder resolution
//!
//! Configuration comes from a TOML file, then legacy environment variables
//! override individual keys. Anything still unset falls back to built-in
//! defaults, so a missing file never stops startup.
//!
//! # Sources priority
//!
//! 1. Command-line arguments (`--config`, `--root-folder`, `--port`)
//! 2. Environment variables (`FIELDSIGHT_*`, `ENKETO_*`, `KOBOCAT_*`)
//! 3. TOML configuration file
//! 4. Built-in defaults

use crate::{Error, Result};
use secrecy::SecretString;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Environment variable naming the TOML config file
pub const CONFIG_ENV_VAR: &str = "FIELDSIGHT_CONFIG";

/// Environment variable naming the root folder (database + media)
pub const ROOT_FOLDER_ENV_VAR: &str = "FIELDSIGHT_ROOT_FOLDER";

const CONFIG_FILE_NAME: &str = "fieldsight-kc.toml";
const DATABASE_FILE_NAME: &str = "fieldsight.db";
const MEDIA_DIR_NAME: &str = "media";

/// Bootstrap configuration loaded from TOML
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    /// Root folder for the database and media files (optional)
    #[serde(default)]
    pub root_folder: Option<PathBuf>,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub enketo: EnketoSettings,

    #[serde(default)]
    pub hosts: HostSettings,

    #[serde(default)]
    pub media: MediaSettings,

    #[serde(default)]
    pub testing: TestingSettings,

    /// Debug mode: operator reports go to the console instead of the admin channel
    #[serde(default)]
    pub debug: bool,
}

/// HTTP listener settings
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Enketo service settings
#[derive(Debug, Clone, Deserialize)]
pub struct EnketoSettings {
    /// Base URL of the Enketo service, e.g. `https://enketo.example.org`
    #[serde(default)]
    pub url: Option<String>,

    /// API path for survey requests, e.g. `/api/v2/survey`
    #[serde(default)]
    pub api_survey_path: Option<String>,

    /// API path for instance requests, e.g. `/api/v2/instance`
    #[serde(default)]
    pub api_instance_path: Option<String>,

    /// API token sent as the basic-auth user name
    #[serde(default)]
    pub api_token: Option<SecretString>,

    /// Prefer `offline_url` over `url` in Enketo responses
    #[serde(default)]
    pub offline_surveys: bool,

    /// Protocol used when building server form URLs
    #[serde(default = "default_protocol")]
    pub protocol: String,

    /// Upper bound for a single Enketo request
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Verify the Enketo TLS certificate. Off unless explicitly enabled.
    #[serde(default)]
    pub verify_tls: bool,
}

impl Default for EnketoSettings {
    fn default() -> Self {
        Self {
            url: None,
            api_survey_path: None,
            api_instance_path: None,
            api_token: None,
            offline_surveys: false,
            protocol: default_protocol(),
            timeout_secs: default_timeout_secs(),
            verify_tls: false,
        }
    }
}

impl EnketoSettings {
    /// True when a base URL and survey path are both set
    pub fn is_configured(&self) -> bool {
        self.url.is_some() && self.api_survey_path.is_some()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Internal/public host pair of this server
///
/// Requests arriving on the internal host (and not on the public one) come
/// over the private network and must be answered with plain `http` URLs.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HostSettings {
    #[serde(default)]
    pub internal_hostname: Option<String>,

    #[serde(default)]
    pub public_hostname: Option<String>,
}

/// Media file serving
#[derive(Debug, Clone, Deserialize)]
pub struct MediaSettings {
    /// URL prefix under which media files are served
    #[serde(default = "default_media_base_url")]
    pub base_url: String,

    /// Suffix of the medium thumbnail, inserted before the file extension
    #[serde(default = "default_thumbnail_suffix")]
    pub thumbnail_suffix: String,
}

impl Default for MediaSettings {
    fn default() -> Self {
        Self {
            base_url: default_media_base_url(),
            thumbnail_suffix: default_thumbnail_suffix(),
        }
    }
}

/// Fixed host/user used when running under test
#[derive(Debug, Clone, Deserialize)]
pub struct TestingSettings {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_test_host")]
    pub http_host: String,

    #[serde(default = "default_test_username")]
    pub username: String,
}

impl Default for TestingSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            http_host: default_test_host(),
            username: default_test_username(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8001
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_protocol() -> String {
    "https".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_media_base_url() -> String {
    "/media/".to_string()
}

fn default_thumbnail_suffix() -> String {
    "-medium".to_string()
}

fn default_test_host() -> String {
    "testserver.com".to_string()
}

fn default_test_username() -> String {
    "bob".to_string()
}

impl TomlConfig {
    /// Load configuration from `path` (if any) and apply environment overrides
    ///
    /// A missing file logs a warning and yields defaults. A file that exists
    /// but cannot be parsed is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) if path.exists() => {
                let content = std::fs::read_to_string(path)?;
                let config = Self::from_toml_str(&content)?;
                info!("Loaded configuration from {}", path.display());
                config
            }
            Some(path) => {
                warn!(
                    "Config file {} not found, using built-in defaults",
                    path.display()
                );
                Self::default()
            }
            None => {
                warn!("No config file found, using built-in defaults");
                Self::default()
            }
        };

        config.apply_env_overrides();
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))
    }

    /// Override keys from the process environment
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Override keys from `lookup`; empty values are ignored
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("ENKETO_URL") {
            self.enketo.url = Some(v);
        }
        if let Some(v) = get("ENKETO_API_SURVEY_PATH") {
            self.enketo.api_survey_path = Some(v);
        }
        if let Some(v) = get("ENKETO_API_INSTANCE_PATH") {
            self.enketo.api_instance_path = Some(v);
        }
        if let Some(v) = get("ENKETO_API_TOKEN") {
            self.enketo.api_token = Some(SecretString::new(v));
        }
        if let Some(v) = get("ENKETO_OFFLINE_SURVEYS") {
            self.enketo.offline_surveys = parse_flag(&v);
        }
        if let Some(v) = get("ENKETO_PROTOCOL") {
            self.enketo.protocol = v;
        }
        if let Some(v) = get("KOBOCAT_INTERNAL_HOSTNAME") {
            self.hosts.internal_hostname = Some(v);
        }
        if let Some(v) = get("KOBOCAT_PUBLIC_HOSTNAME") {
            self.hosts.public_hostname = Some(v);
        }
        if let Some(v) = get(ROOT_FOLDER_ENV_VAR) {
            self.root_folder = Some(PathBuf::from(v));
        }
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// Locate the TOML config file
///
/// Priority: CLI argument, then `FIELDSIGHT_CONFIG`, then
/// `<config dir>/fieldsight/fieldsight-kc.toml` if it exists.
pub fn config_file_path(cli_arg: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        return Some(PathBuf::from(path));
    }

    dirs::config_dir()
        .map(|d| d.join("fieldsight").join(CONFIG_FILE_NAME))
        .filter(|p| p.exists())
}

/// Resolve the root folder
///
/// Priority: CLI argument, then TOML/environment value already merged into
/// `config`, then the OS-dependent default.
pub fn resolve_root_folder(cli_arg: Option<&Path>, config: &TomlConfig) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    if let Some(path) = &config.root_folder {
        return path.clone();
    }

    default_root_folder()
}

/// OS-dependent default root folder path
pub fn default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("fieldsight"))
        .unwrap_or_else(|| PathBuf::from("./fieldsight_data"))
}

/// Root folder layout: `fieldsight.db` and `media/`
#[derive(Debug, Clone)]
pub struct RootFolder {
    path: PathBuf,
}

impl RootFolder {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the root and media directories if missing
    pub fn ensure_directory_exists(&self) -> Result<()> {
        if !self.path.exists() {
            info!("Creating root folder: {}", self.path.display());
        }
        std::fs::create_dir_all(self.media_path())?;
        Ok(())
    }

    pub fn database_path(&self) -> PathBuf {
        self.path.join(DATABASE_FILE_NAME)
    }

    pub fn media_path(&self) -> PathBuf {
        self.path.join(MEDIA_DIR_NAME)
    }
}
