//! Client configuration parsed from environment variables.

use std::path::PathBuf;

pub const DEFAULT_API_BASE_URL: &str = "https://localhost:7285/api/v1";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

const SESSION_DIR: &str = ".catalog-admin";
const SESSION_FILE: &str = "session.json";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid API base URL '{0}' (expected http:// or https://)")]
    InvalidBaseUrl(String),
    #[error("cannot locate session file: set CATALOG_SESSION_FILE or HOME")]
    NoSessionPath,
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

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// API root without a trailing slash, e.g. `https://host/api/v1`.
    pub api_base_url: String,
    /// Where the CLI persists the session between runs.
    pub session_file: PathBuf,
    pub timeouts: Timeouts,
}

impl ClientConfig {
    /// Build typed config from environment variables.
    ///
    /// Optional:
    /// - `CATALOG_API_BASE_URL`: default `https://localhost:7285/api/v1`
    /// - `CATALOG_SESSION_FILE`: default `$HOME/.catalog-admin/session.json`
    /// - `CATALOG_REQUEST_TIMEOUT_SECS`: default 30
    /// - `CATALOG_CONNECT_TIMEOUT_SECS`: default 10
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is malformed or no session path can be derived.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_base_url = normalize_base_url(
            lookup("CATALOG_API_BASE_URL")
                .as_deref()
                .unwrap_or(DEFAULT_API_BASE_URL),
        )?;

        let session_file = match lookup("CATALOG_SESSION_FILE") {
            Some(path) if !path.trim().is_empty() => PathBuf::from(path),
            _ => lookup("HOME")
                .filter(|home| !home.is_empty())
                .map(|home| PathBuf::from(home).join(SESSION_DIR).join(SESSION_FILE))
                .ok_or(ConfigError::NoSessionPath)?,
        };

        let timeouts = Timeouts {
            request_secs: parse_u64(&lookup, "CATALOG_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_secs: parse_u64(&lookup, "CATALOG_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS),
        };

        Ok(Self { api_base_url, session_file, timeouts })
    }

    /// Replace the base URL, applying the same validation as `from_env`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBaseUrl`] for non-HTTP URLs.
    pub fn with_base_url(mut self, raw: &str) -> Result<Self, ConfigError> {
        self.api_base_url = normalize_base_url(raw)?;
        Ok(self)
    }

    #[must_use]
    pub fn with_session_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.session_file = path.into();
        self
    }

    /// Absolute URL for an API endpoint such as `/Product/42`.
    #[must_use]
    pub fn endpoint_url(&self, endpoint: &str) -> String {
        join_url(&self.api_base_url, endpoint)
    }
}

pub(crate) fn join_url(base: &str, endpoint: &str) -> String {
    if endpoint.starts_with('/') {
        format!("{base}{endpoint}")
    } else {
        format!("{base}/{endpoint}")
    }
}

fn parse_u64(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: u64) -> u64 {
    lookup(key)
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(default)
}

fn normalize_base_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        Ok(trimmed.to_owned())
    } else {
        Err(ConfigError::InvalidBaseUrl(raw.to_owned()))
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
