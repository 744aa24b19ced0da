//! Session and environment configuration.

use std::collections::BTreeMap;
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

pub use crate::core::error_mapper::ErrorMessages;

pub const CONFIG_PATH_ENV: &str = "CHAT_SESSION_CONFIG_PATH";
pub const LOG_FILTER_ENV: &str = "CHAT_SESSION_LOG";
pub const DEBUG_ENV: &str = "CHAT_SESSION_DEBUG";

pub const DEFAULT_RESPONSE_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct InitialFetch {
    pub url: String,
    pub body: Option<Value>,
}

impl InitialFetch {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            body: None,
        }
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// Immutable settings handed to the controller at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub send_url: String,
    pub initial_fetch: Option<InitialFetch>,
    pub headers: BTreeMap<String, String>,
    pub response_timeout: Duration,
    pub reverse_order: bool,
    pub error_messages: ErrorMessages,
}

impl SessionConfig {
    pub fn new(send_url: impl Into<String>) -> Self {
        Self {
            send_url: send_url.into(),
            initial_fetch: None,
            headers: BTreeMap::new(),
            response_timeout: DEFAULT_RESPONSE_TIMEOUT,
            reverse_order: false,
            error_messages: ErrorMessages::default(),
        }
    }

    pub fn with_initial_fetch(mut self, initial_fetch: InitialFetch) -> Self {
        self.initial_fetch = Some(initial_fetch);
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_response_timeout(mut self, timeout: Duration) -> Self {
        self.response_timeout = timeout;
        self
    }

    pub fn with_reverse_order(mut self, reverse_order: bool) -> Self {
        self.reverse_order = reverse_order;
        self
    }

    pub fn with_error_messages(mut self, error_messages: ErrorMessages) -> Self {
        self.error_messages = error_messages;
        self
    }

    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let file: FileConfig = serde_json::from_str(raw)?;
        file.into_config()
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    send_url: String,
    #[serde(default)]
    initial_url: Option<String>,
    #[serde(default)]
    initial_body: Option<Value>,
    #[serde(default)]
    headers: BTreeMap<String, String>,
    #[serde(default)]
    timeout_sec: Option<u64>,
    #[serde(default)]
    reverse_order: bool,
    #[serde(default)]
    error_messages: ErrorMessages,
}

impl FileConfig {
    fn into_config(self) -> Result<SessionConfig, ConfigError> {
        if self.send_url.trim().is_empty() {
            return Err(ConfigError::Invalid("send_url must not be empty".to_owned()));
        }

        let initial_fetch = match (self.initial_url, self.initial_body) {
            (Some(url), body) => {
                if url.trim().is_empty() {
                    return Err(ConfigError::Invalid(
                        "initial_url must not be empty".to_owned(),
                    ));
                }
                Some(InitialFetch { url, body })
            }
            (None, Some(_)) => {
                return Err(ConfigError::Invalid(
                    "initial_body requires initial_url".to_owned(),
                ))
            }
            (None, None) => None,
        };

        let response_timeout = match self.timeout_sec {
            Some(0) => {
                return Err(ConfigError::Invalid(
                    "timeout_sec must be greater than zero".to_owned(),
                ))
            }
            Some(seconds) => Duration::from_secs(seconds),
            None => DEFAULT_RESPONSE_TIMEOUT,
        };

        Ok(SessionConfig {
            send_url: self.send_url,
            initial_fetch,
            headers: self.headers,
            response_timeout,
            reverse_order: self.reverse_order,
            error_messages: self.error_messages,
        })
    }
}

/// Process environment knobs.
#[derive(Debug, Clone)]
pub struct EnvConfig {
    pub config_path: Option<PathBuf>,
    pub log_filter: Option<String>,
    pub debug: bool,
}

impl EnvConfig {
    pub fn from_env() -> Self {
        Self {
            config_path: env_string_opt(CONFIG_PATH_ENV).map(PathBuf::from),
            log_filter: env_string_opt(LOG_FILTER_ENV),
            debug: env_flag(DEBUG_ENV),
        }
    }
}

fn env_flag(key: &str) -> bool {
    env::var(key).map(|value| value == "1").unwrap_or(false)
}

fn env_string_opt(key: &str) -> Option<String> {
    env::var(key).ok().and_then(|value| {
        if value.trim().is_empty() {
            None
        } else {
            Some(value)
        }
    })
}
