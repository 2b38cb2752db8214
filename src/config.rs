//! Client configuration parsed from environment variables.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::path::PathBuf;

pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

const TOKEN_DIR: &str = ".jobboard";
const TOKEN_FILE: &str = "token";
const FALLBACK_TOKEN_FILE: &str = ".jobboard-token";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid {var}: {value:?} ({reason})")]
    Invalid { var: &'static str, value: String, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl Default for RequestTimeouts {
    fn default() -> Self {
        Self {
            request_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Identity service base URL, without a trailing slash.
    pub api_url: String,
    /// Where the bearer token is persisted between runs.
    pub token_file: PathBuf,
    pub timeouts: RequestTimeouts,
}

impl ClientConfig {
    /// Build typed config from environment variables.
    ///
    /// Optional:
    /// - `JOBBOARD_API_URL`: default `http://localhost:5000/api`
    /// - `JOBBOARD_TOKEN_FILE`: default `$HOME/.jobboard/token`
    /// - `JOBBOARD_REQUEST_TIMEOUT_SECS`: default 30
    /// - `JOBBOARD_CONNECT_TIMEOUT_SECS`: default 10
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for a malformed URL or timeout.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ClientConfig::from_env`] over an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for a malformed URL or timeout.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_url = parse_api_url("JOBBOARD_API_URL", lookup("JOBBOARD_API_URL"))?;
        let token_file = lookup("JOBBOARD_TOKEN_FILE")
            .filter(|v| !v.trim().is_empty())
            .map_or_else(|| default_token_file(lookup("HOME")), PathBuf::from);
        let timeouts = RequestTimeouts {
            request_secs: parse_secs(
                "JOBBOARD_REQUEST_TIMEOUT_SECS",
                lookup("JOBBOARD_REQUEST_TIMEOUT_SECS"),
                DEFAULT_REQUEST_TIMEOUT_SECS,
            )?,
            connect_secs: parse_secs(
                "JOBBOARD_CONNECT_TIMEOUT_SECS",
                lookup("JOBBOARD_CONNECT_TIMEOUT_SECS"),
                DEFAULT_CONNECT_TIMEOUT_SECS,
            )?,
        };

        Ok(Self { api_url, token_file, timeouts })
    }

    /// Replace the base URL, applying the same checks as `JOBBOARD_API_URL`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming `source` when `raw` is not an
    /// http(s) URL.
    pub fn override_api_url(&mut self, source: &'static str, raw: String) -> Result<(), ConfigError> {
        self.api_url = parse_api_url(source, Some(raw))?;
        Ok(())
    }
}

fn parse_api_url(var: &'static str, raw: Option<String>) -> Result<String, ConfigError> {
    let Some(raw) = raw.filter(|v| !v.trim().is_empty()) else {
        return Ok(DEFAULT_API_URL.to_owned());
    };
    let url = raw.trim().trim_end_matches('/').to_owned();
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(url)
    } else {
        Err(ConfigError::Invalid {
            var,
            value: raw,
            reason: "expected an http:// or https:// URL".to_owned(),
        })
    }
}

fn parse_secs(var: &'static str, raw: Option<String>, default: u64) -> Result<u64, ConfigError> {
    let Some(raw) = raw else {
        return Ok(default);
    };
    match raw.trim().parse::<u64>() {
        Ok(0) => Err(ConfigError::Invalid { var, value: raw, reason: "must be positive".to_owned() }),
        Ok(secs) => Ok(secs),
        Err(e) => Err(ConfigError::Invalid { var, value: raw, reason: e.to_string() }),
    }
}

fn default_token_file(home: Option<String>) -> PathBuf {
    match home.filter(|h| !h.trim().is_empty()) {
        Some(home) => PathBuf::from(home).join(TOKEN_DIR).join(TOKEN_FILE),
        None => PathBuf::from(FALLBACK_TOKEN_FILE),
    }
}
