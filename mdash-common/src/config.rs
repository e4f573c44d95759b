//! Configuration loading and settings resolution
//!
//! Every setting is resolved in the same priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! A missing or unreadable TOML file is never fatal: a warning is logged and
//! the remaining tiers are used.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Backend used when nothing else is configured
pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8000/api";

/// Default per-request timeout
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

pub const ENV_CONFIG_PATH: &str = "MDASH_CONFIG";
pub const ENV_API_BASE_URL: &str = "MDASH_API_URL";
pub const ENV_CREDENTIALS_PATH: &str = "MDASH_CREDENTIALS";
pub const ENV_REQUEST_TIMEOUT: &str = "MDASH_TIMEOUT_SECS";

/// Configuration loaded from the TOML file
///
/// All fields are optional so that a partial file still loads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Base URL of the REST backend, e.g. `https://church.example.org/api`
    #[serde(default)]
    pub api_base_url: Option<String>,

    /// Where the bearer token is persisted
    #[serde(default)]
    pub credentials_path: Option<PathBuf>,

    /// Per-request timeout in seconds
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Unit labels used by the demo (hash-based) unit assignment
    #[serde(default)]
    pub units: Vec<String>,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Fully resolved settings for talking to the backend
#[derive(Debug, Clone, PartialEq)]
pub struct ClientSettings {
    pub api_base_url: String,
    pub credentials_path: PathBuf,
    pub request_timeout: Duration,
}

/// Resolves settings from CLI arguments, environment and a loaded TOML file
#[derive(Debug, Clone, Default)]
pub struct SettingsResolver {
    toml: TomlConfig,
}

impl SettingsResolver {
    pub fn new(toml: TomlConfig) -> Self {
        Self { toml }
    }

    pub fn toml(&self) -> &TomlConfig {
        &self.toml
    }

    /// Backend base URL, without a trailing slash
    pub fn api_base_url(&self, cli_arg: Option<&str>) -> String {
        let url = cli_arg
            .map(str::to_string)
            .or_else(|| non_empty_env(ENV_API_BASE_URL))
            .or_else(|| self.toml.api_base_url.clone())
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
        url.trim_end_matches('/').to_string()
    }

    pub fn credentials_path(&self, cli_arg: Option<&Path>) -> PathBuf {
        if let Some(path) = cli_arg {
            return path.to_path_buf();
        }
        if let Some(path) = non_empty_env(ENV_CREDENTIALS_PATH) {
            return PathBuf::from(path);
        }
        if let Some(path) = &self.toml.credentials_path {
            return path.clone();
        }
        default_credentials_path()
    }

    pub fn request_timeout(&self, cli_arg: Option<u64>) -> Duration {
        let env_secs = non_empty_env(ENV_REQUEST_TIMEOUT).and_then(|v| match v.parse::<u64>() {
            Ok(secs) => Some(secs),
            Err(e) => {
                warn!("Ignoring invalid {}='{}': {}", ENV_REQUEST_TIMEOUT, v, e);
                None
            }
        });
        let secs = cli_arg
            .or(env_secs)
            .or(self.toml.request_timeout_secs)
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);
        crate::time::secs_to_duration(secs)
    }

    /// Resolve all client settings at once
    pub fn client_settings(
        &self,
        api_base_url: Option<&str>,
        credentials_path: Option<&Path>,
        request_timeout_secs: Option<u64>,
    ) -> ClientSettings {
        ClientSettings {
            api_base_url: self.api_base_url(api_base_url),
            credentials_path: self.credentials_path(credentials_path),
            request_timeout: self.request_timeout(request_timeout_secs),
        }
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Locate the TOML config file for the platform
///
/// `MDASH_CONFIG` overrides the search. Returns `None` when no file exists.
pub fn find_config_file() -> Option<PathBuf> {
    if let Some(path) = non_empty_env(ENV_CONFIG_PATH) {
        return Some(PathBuf::from(path));
    }

    let user_config = dirs::config_dir().map(|d| d.join("mdash").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/mdash/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// Default credential file location for the platform
pub fn default_credentials_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("mdash"))
        .unwrap_or_else(|| PathBuf::from("./mdash_data"))
        .join("credentials.json")
}

/// Read and parse a TOML config file
pub fn read_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
}

/// Load the TOML config, degrading to defaults on any failure
pub fn load_toml_config(path: Option<&Path>) -> TomlConfig {
    let path = match path.map(Path::to_path_buf).or_else(find_config_file) {
        Some(path) => path,
        None => {
            info!("No config file found, using defaults");
            return TomlConfig::default();
        }
    };

    match read_toml_config(&path) {
        Ok(config) => {
            info!("Loaded config from {}", path.display());
            config
        }
        Err(e) => {
            warn!("{} - continuing with defaults", e);
            TomlConfig::default()
        }
    }
}

/// Write a TOML config atomically (temp file + rename)
pub fn write_toml_config(config: &TomlConfig, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)
        .map_err(|e| Error::Config(format!("Serialize TOML failed: {}", e)))?;
    write_atomic(path, content.as_bytes())
}

/// Write bytes to `path` via a sibling temp file and rename
///
/// Parent directories are created. On Unix the file is restricted to the
/// owner (0600) before it becomes visible under its final name.
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut tmp_name = path.as_os_str().to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = PathBuf::from(tmp_name);

    std::fs::write(&tmp_path, bytes)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&tmp_path, std::fs::Permissions::from_mode(0o600))?;
    }

    if let Err(e) = std::fs::rename(&tmp_path, path) {
        let _ = std::fs::remove_file(&tmp_path);
        return Err(e.into());
    }
    Ok(())
}
