//! Status/failure to user-facing text.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::failure::SessionFailure;

pub const DEFAULT_UNKNOWN_ERROR: &str = "Something went wrong. Please try again.";
pub const DEFAULT_NETWORK_ERROR: &str = "Network error. Please check your connection.";
pub const DEFAULT_TIMEOUT_ERROR: &str = "Request timeout. Please try again.";

/// Configured wording for failures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ErrorMessages {
    pub by_status: BTreeMap<u16, String>,
    pub unknown: String,
    pub network: String,
    pub timeout: String,
}

impl Default for ErrorMessages {
    fn default() -> Self {
        Self {
            by_status: BTreeMap::new(),
            unknown: DEFAULT_UNKNOWN_ERROR.to_owned(),
            network: DEFAULT_NETWORK_ERROR.to_owned(),
            timeout: DEFAULT_TIMEOUT_ERROR.to_owned(),
        }
    }
}

impl ErrorMessages {
    pub fn with_status(mut self, status: u16, message: impl Into<String>) -> Self {
        self.by_status.insert(status, message.into());
        self
    }
}

/// Pure mapping; holds no session state.
#[derive(Debug, Clone, Copy)]
pub struct ErrorMapper<'a> {
    messages: &'a ErrorMessages,
}

impl<'a> ErrorMapper<'a> {
    pub fn new(messages: &'a ErrorMessages) -> Self {
        Self { messages }
    }

    /// Raw text wins verbatim, then the status table (unknown fallback), then
    /// the network message.
    pub fn map(&self, status: Option<u16>, raw: Option<&str>) -> String {
        if let Some(raw) = raw {
            return raw.to_owned();
        }
        match status {
            Some(status) => self
                .messages
                .by_status
                .get(&status)
                .unwrap_or(&self.messages.unknown)
                .clone(),
            None => self.messages.network.clone(),
        }
    }

    pub fn map_failure(&self, failure: &SessionFailure) -> String {
        if failure.is_timeout() {
            return self.messages.timeout.clone();
        }
        self.map(failure.status_code(), failure.raw_description().as_deref())
    }
}
