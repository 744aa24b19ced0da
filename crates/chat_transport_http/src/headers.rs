use std::collections::BTreeMap;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use crate::config::HttpTransportConfig;
use crate::error::HttpTransportError;

pub const HEADER_ACCEPT: &str = "accept";
pub const HEADER_USER_AGENT: &str = "user-agent";

/// Build a deterministic header map for one request.
///
/// Precedence, lowest first: transport defaults (`accept`, `user-agent`),
/// configured default headers, request headers. Names are trimmed and
/// lowercased so later layers replace earlier ones regardless of case.
pub fn build_headers(
    config: &HttpTransportConfig,
    request_headers: &BTreeMap<String, String>,
) -> BTreeMap<String, String> {
    let mut headers = BTreeMap::new();

    headers.insert(HEADER_ACCEPT.to_owned(), "application/json".to_owned());

    let user_agent = config
        .user_agent
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
        .unwrap_or_else(default_user_agent);
    headers.insert(HEADER_USER_AGENT.to_owned(), user_agent);

    for (key, value) in config.default_headers.iter().chain(request_headers) {
        let key = key.trim().to_ascii_lowercase();
        if key.is_empty() {
            continue;
        }
        headers.insert(key, value.trim().to_owned());
    }

    headers
}

/// Convert a normalized header map into a `reqwest` header map.
pub fn to_header_map(headers: &BTreeMap<String, String>) -> Result<HeaderMap, HttpTransportError> {
    let mut out = HeaderMap::new();
    for (key, value) in headers {
        let name = HeaderName::from_bytes(key.as_bytes())
            .map_err(|_| HttpTransportError::InvalidHeader(format!("invalid header key: {key}")))?;
        let value = HeaderValue::from_str(value).map_err(|_| {
            HttpTransportError::InvalidHeader(format!("invalid header value for {key}"))
        })?;
        out.insert(name, value);
    }
    Ok(out)
}

fn default_user_agent() -> String {
    format!("chat-session/{}", env!("CARGO_PKG_VERSION"))
}
