use std::collections::BTreeMap;
use std::time::Duration;

/// Client-level configuration for [`crate::HttpTransport`].
///
/// Per-request headers and bodies come from the session; this only covers
/// what is shared by every exchange.
#[derive(Debug, Clone, Default)]
pub struct HttpTransportConfig {
    /// Optional `User-Agent` override.
    pub user_agent: Option<String>,
    /// Headers added to every request unless the request sets the same name.
    pub default_headers: BTreeMap<String, String>,
    /// Optional TCP connect timeout.
    pub connect_timeout: Option<Duration>,
    /// Optional whole-request timeout enforced by the client itself.
    pub request_timeout: Option<Duration>,
}

impl HttpTransportConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn insert_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.insert(key.into(), value.into());
        self
    }

    pub fn with_headers(mut self, headers: impl IntoIterator<Item = (String, String)>) -> Self {
        self.default_headers.extend(headers);
        self
    }
}
