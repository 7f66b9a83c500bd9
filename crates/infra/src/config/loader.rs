//! Configuration loader
//!
//! Loads the connection configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If `APILINK_URI` is missing or invalid, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `APILINK_URI`: API base URI (required)
//! - `APILINK_VERSION`: API version number
//! - `APILINK_PREFIX`: Path prefix the version is appended to
//! - `APILINK_PREFIX_ENABLED`: Whether the versioned prefix is applied
//! - `APILINK_PREFIX_NO_VERSION`: Whether the version number is left out
//! - `APILINK_CLIENT_ID`: OAuth client id
//! - `APILINK_CLIENT_KEY`: OAuth client key
//! - `APILINK_DEBUG`: Verbose request logging (true/false)
//! - `APILINK_INSECURE`: Accept invalid TLS certificates (true/false)
//! - `APILINK_TRANSPORT_SELECTION`: `scheme` or `handle_name`
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./apilink.json` or `./apilink.toml` (current working directory)
//! 2. `./config.json` or `./config.toml` (current working directory)
//! 3. `../config.json` or `../config.toml` (parent directory)
//! 4. Relative to executable location

use std::path::{Path, PathBuf};

use apilink_domain::{
    ApiLinkError, ConnectionConfig, ConnectionSettings, Result, TransportSelection,
};

use crate::errors::InfraError;

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If that fails, falls
/// back to loading from a config file.
///
/// # Errors
/// Returns `ApiLinkError::Config` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
/// - The URI is missing or cannot be resolved
pub fn load() -> Result<ConnectionConfig> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// `APILINK_URI` must be present; every other variable is optional.
///
/// # Errors
/// Returns `ApiLinkError::Config` if the URI is missing or invalid, or a
/// variable has an unparseable value.
pub fn load_from_env() -> Result<ConnectionConfig> {
    let uri = env_var("APILINK_URI")?;

    let version = env_opt("APILINK_VERSION")
        .map(|s| {
            s.parse::<u32>()
                .map_err(|e| ApiLinkError::Config(format!("Invalid API version: {}", e)))
        })
        .transpose()?;

    let transport_selection = env_opt("APILINK_TRANSPORT_SELECTION")
        .map(|s| s.parse::<TransportSelection>())
        .transpose()?
        .unwrap_or_default();

    let settings = ConnectionSettings {
        uri,
        version,
        prefix: env_opt("APILINK_PREFIX"),
        prefix_enabled: env_flag("APILINK_PREFIX_ENABLED"),
        prefix_no_version: env_flag("APILINK_PREFIX_NO_VERSION"),
        client_id: env_opt("APILINK_CLIENT_ID"),
        client_key: env_opt("APILINK_CLIENT_KEY"),
        debug: env_bool("APILINK_DEBUG", false),
        insecure: env_bool("APILINK_INSECURE", false),
        transport_selection,
    };

    settings.into_config()
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Arguments
/// * `path` - Optional path to config file. If `None`, uses
///   [`probe_config_paths`].
///
/// # Errors
/// Returns `ApiLinkError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
/// - The URI is missing or cannot be resolved
pub fn load_from_file(path: Option<PathBuf>) -> Result<ConnectionConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(ApiLinkError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            ApiLinkError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| ApiLinkError::Config(format!("Failed to read config file: {}", e)))?;

    parse_config(&contents, &config_path)?.into_config()
}

/// Parse connection settings from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
///
/// # Errors
/// Returns `ApiLinkError::Config` if format is invalid or parsing fails.
fn parse_config(contents: &str, path: &Path) -> Result<ConnectionSettings> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents).map_err(|e| InfraError::from(e).into()),
        "json" => serde_json::from_str(contents).map_err(|e| InfraError::from(e).into()),
        _ => Err(ApiLinkError::Config(format!("Unsupported config format: {}", extension))),
    }
}

/// Probe multiple paths for configuration files
///
/// Searches the current working directory, its parent, and the executable's
/// directory for `apilink.{json,toml}` and `config.{json,toml}`.
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        candidates.extend(candidates_in(&cwd));
        candidates.extend(vec![cwd.join("../config.json"), cwd.join("../config.toml")]);
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.extend(candidates_in(exe_dir));
        }
    }

    candidates.into_iter().find(|path| path.exists())
}

fn candidates_in(dir: &Path) -> Vec<PathBuf> {
    vec![
        dir.join("apilink.json"),
        dir.join("apilink.toml"),
        dir.join("config.json"),
        dir.join("config.toml"),
    ]
}

/// Get required environment variable
///
/// # Errors
/// Returns `ApiLinkError::Config` if the variable is not set.
fn env_var(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| {
        ApiLinkError::Config(format!("Missing required environment variable: {}", key))
    })
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.is_empty())
}

/// Parse an optional boolean environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive).
/// Anything else that is set reads as `false`.
fn env_flag(key: &str) -> Option<bool> {
    env_opt(key).map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
}

fn env_bool(key: &str, default: bool) -> bool {
    env_flag(key).unwrap_or(default)
}
