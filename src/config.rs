//! Client configuration parsed from environment variables.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::path::PathBuf;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:3333";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;

const SESSION_FILE_NAME: &str = "session.json";
const APP_DIR_NAME: &str = "trainerhub";

/// Errors produced while building a [`ClientConfig`].
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The API URL is not an absolute http(s) URL.
    #[error("invalid API URL '{0}': expected http:// or https://")]
    InvalidApiUrl(String),

    /// No session file override and no platform config directory to derive one from.
    #[error("cannot determine session file location; set TRAINERHUB_SESSION_FILE")]
    NoSessionDir,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self { request_secs: DEFAULT_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS }
    }
}

/// Values supplied explicitly (e.g. CLI flags). A set field wins over the
/// environment and its env variable is never read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub api_url: Option<String>,
    pub session_file: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_url: String,
    pub timeouts: Timeouts,
    pub session_file: PathBuf,
}

impl ClientConfig {
    /// Build typed client config from environment variables.
    ///
    /// Optional:
    /// - `TRAINERHUB_API_URL`: default `http://127.0.0.1:3333`
    /// - `TRAINERHUB_REQUEST_TIMEOUT_SECS`: default 15
    /// - `TRAINERHUB_CONNECT_TIMEOUT_SECS`: default 5
    /// - `TRAINERHUB_SESSION_FILE`: default `<config dir>/trainerhub/session.json`
    ///
    /// # Errors
    ///
    /// Returns an error if the API URL is malformed or no session file
    /// location can be derived.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_with(ConfigOverrides::default())
    }

    /// Like [`ClientConfig::from_env`], but explicit overrides are applied
    /// first, so a bad env value is ignored when an override replaces it.
    ///
    /// # Errors
    ///
    /// Returns an error if the effective API URL is malformed or no session
    /// file location can be derived.
    pub fn from_env_with(overrides: ConfigOverrides) -> Result<Self, ConfigError> {
        let raw_url = match overrides.api_url {
            Some(url) => url,
            None => std::env::var("TRAINERHUB_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_owned()),
        };
        let api_url = normalize_api_url(&raw_url)?;
        let timeouts = Timeouts {
            request_secs: env_parse_secs("TRAINERHUB_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_secs: env_parse_secs("TRAINERHUB_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS),
        };
        let session_file = match overrides.session_file.filter(|p| !p.as_os_str().is_empty()) {
            Some(path) => path,
            None => match std::env::var_os("TRAINERHUB_SESSION_FILE") {
                Some(path) if !path.is_empty() => PathBuf::from(path),
                _ => default_session_file(dirs::config_dir())?,
            },
        };

        Ok(Self { api_url, timeouts, session_file })
    }
}

/// Positive whole seconds; zero or garbage falls back to `default`.
fn env_parse_secs(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .filter(|secs| *secs > 0)
        .unwrap_or(default)
}

fn normalize_api_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(ConfigError::InvalidApiUrl(raw.to_owned()));
    }
    Ok(trimmed.to_owned())
}

fn default_session_file(config_dir: Option<PathBuf>) -> Result<PathBuf, ConfigError> {
    config_dir
        .map(|dir| dir.join(APP_DIR_NAME).join(SESSION_FILE_NAME))
        .ok_or(ConfigError::NoSessionDir)
}
