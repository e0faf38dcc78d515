//! Configuration loader
//!
//! ## Loading Strategy
//! 1. Read a `.env` file if present
//! 2. Start from the file named by `DULYNOTED_CONFIG`, else the first file
//!    found by [`probe_config_paths`], else the built-in defaults
//! 3. Apply `DULYNOTED_*` environment overrides
//! 4. Fill provider fields left blank with the shipped defaults
//!
//! ## Environment Variables
//! - `DULYNOTED_CONFIG`: Explicit config file path
//! - `DULYNOTED_PROXY_URL`: Token proxy base URL (empty disables the proxy)
//! - `DULYNOTED_INSTALLATION_ID`: Identity redirect installation id
//! - `DULYNOTED_{GITHUB,NOTION}_CLIENT_ID`: OAuth client id
//! - `DULYNOTED_{GITHUB,NOTION}_CLIENT_SECRET`: OAuth client secret
//! - `DULYNOTED_{GITHUB,NOTION}_TRANSPORT`: `proxied`, `direct_json` or
//!   `direct_basic_auth`
//! - `DULYNOTED_{GITHUB,NOTION}_REDIRECT`: `callback_page` or `identity`
//! - `DULYNOTED_STORAGE_PATH`: SQLite file for durable storage
//! - `DULYNOTED_CACHE_TTL_SECONDS`: Resource cache TTL
//! - `DULYNOTED_CALLBACK_PORT`: Loopback callback port
//! - `DULYNOTED_CALLBACK_TIMEOUT_SECONDS`: Sign-in timeout
//!
//! ## File Locations
//! `dulynoted.{toml,json}` then `config.{toml,json}`, in the current
//! directory, then next to the executable.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use dulynoted_domain::{AppConfig, DulyNotedError, Provider, Result};
use serde::de::DeserializeOwned;

use crate::errors::conversions::to_domain;

const FILE_NAMES: [&str; 4] = ["dulynoted.toml", "dulynoted.json", "config.toml", "config.json"];

/// Load configuration from file and environment
///
/// # Errors
/// Returns `DulyNotedError::Configuration` if the file named by
/// `DULYNOTED_CONFIG` is missing, a config file is malformed, or an
/// environment override has an invalid value.
pub fn load() -> Result<AppConfig> {
    if let Ok(path) = dotenvy::dotenv() {
        tracing::debug!(path = %path.display(), "Loaded .env file");
    }

    let base = match std::env::var("DULYNOTED_CONFIG").ok().filter(|p| !p.trim().is_empty()) {
        Some(path) => load_from_file(Some(PathBuf::from(path)))?,
        None => match probe_config_paths() {
            Some(path) => load_from_file(Some(path))?,
            None => {
                tracing::debug!("No config file found, using defaults");
                AppConfig::default()
            }
        },
    };

    apply_env_overrides(base).map(AppConfig::with_provider_defaults)
}

/// Overlay `DULYNOTED_*` variables on `config`
///
/// # Errors
/// Returns `DulyNotedError::Configuration` for unparsable values.
pub fn apply_env_overrides(mut config: AppConfig) -> Result<AppConfig> {
    if let Some(proxy) = env_string("DULYNOTED_PROXY_URL") {
        config.oauth.proxy_url = Some(proxy).filter(|p| !p.trim().is_empty());
    }
    if let Some(id) = env_string("DULYNOTED_INSTALLATION_ID") {
        config.oauth.installation_id = Some(id);
    }

    for provider in Provider::ALL {
        let prefix = format!("DULYNOTED_{}", provider.as_str().to_ascii_uppercase());
        let client = config.provider_mut(provider);
        if let Some(id) = env_string(&format!("{prefix}_CLIENT_ID")) {
            client.client_id = id;
        }
        if let Some(secret) = env_string(&format!("{prefix}_CLIENT_SECRET")) {
            client.client_secret = Some(secret);
        }
        if let Some(transport) = env_enum(&format!("{prefix}_TRANSPORT"))? {
            client.transport = transport;
        }
        if let Some(redirect) = env_enum(&format!("{prefix}_REDIRECT"))? {
            client.redirect = Some(redirect);
        }
    }

    if let Some(path) = env_string("DULYNOTED_STORAGE_PATH") {
        config.storage.path = Some(path);
    }
    if let Some(ttl) = env_parse("DULYNOTED_CACHE_TTL_SECONDS")? {
        config.cache.ttl_seconds = ttl;
    }
    if let Some(port) = env_parse("DULYNOTED_CALLBACK_PORT")? {
        config.callback.port = port;
    }
    if let Some(timeout) = env_parse("DULYNOTED_CALLBACK_TIMEOUT_SECONDS")? {
        config.callback.timeout_seconds = timeout;
    }

    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes the standard locations.
///
/// # Errors
/// Returns `DulyNotedError::Configuration` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
pub fn load_from_file(path: Option<PathBuf>) -> Result<AppConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(DulyNotedError::Configuration(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            DulyNotedError::Configuration(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path).map_err(|e| {
        DulyNotedError::Configuration(format!("Failed to read config file: {e}"))
    })?;

    parse_config(&contents, &config_path)
}

/// Format is detected by file extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<AppConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match extension {
        "toml" => toml::from_str(contents).map_err(to_domain),
        "json" => serde_json::from_str(contents)
            .map_err(|e| DulyNotedError::Configuration(format!("Invalid JSON format: {e}"))),
        _ => Err(DulyNotedError::Configuration(format!(
            "Unsupported config format: {extension}"
        ))),
    }
}

/// First existing config file in the current directory, then next to the
/// executable
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut dirs = Vec::new();
    if let Ok(cwd) = std::env::current_dir() {
        dirs.push(cwd);
    }
    if let Some(exe_dir) = std::env::current_exe().ok().and_then(|p| p.parent().map(Path::to_path_buf))
    {
        dirs.push(exe_dir);
    }

    dirs.iter()
        .flat_map(|dir| FILE_NAMES.iter().map(move |name| dir.join(name)))
        .find(|path| path.exists())
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok().map(|v| v.trim().to_string())
}

fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    env_string(key)
        .filter(|v| !v.is_empty())
        .map(|v| {
            v.parse::<T>()
                .map_err(|e| DulyNotedError::Configuration(format!("Invalid {key}: {e}")))
        })
        .transpose()
}

/// Parse a snake_case enum value the way the config file spells it
fn env_enum<T: DeserializeOwned>(key: &str) -> Result<Option<T>> {
    env_string(key)
        .filter(|v| !v.is_empty())
        .map(|v| {
            serde_json::from_value(serde_json::Value::String(v.to_ascii_lowercase()))
                .map_err(|_| DulyNotedError::Configuration(format!("Invalid {key}: {v}")))
        })
        .transpose()
}
