use chat_transport::TransportError;
use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// Construction and request-building failures.
///
/// Failures that happen while a request is in flight are reported to the
/// session as [`TransportError`] instead.
#[derive(Debug, Error)]
pub enum HttpTransportError {
    #[error("invalid endpoint URL: {0}")]
    InvalidUrl(String),
    #[error("invalid header: {0}")]
    InvalidHeader(String),
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("transport is closed")]
    Closed,
}

impl From<HttpTransportError> for TransportError {
    fn from(error: HttpTransportError) -> Self {
        match error {
            HttpTransportError::Closed => Self::Closed,
            other => Self::Request(other.to_string()),
        }
    }
}

/// Map an in-flight `reqwest` failure onto the transport failure kinds.
pub fn classify_request_error(error: &reqwest::Error) -> TransportError {
    if error.is_timeout() {
        TransportError::Timeout
    } else if error.is_connect() {
        TransportError::Connect(error.to_string())
    } else {
        TransportError::Request(error.to_string())
    }
}

#[derive(Debug, Deserialize)]
struct ErrorPayload {
    error: Option<ErrorPayloadValue>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorPayloadValue {
    Text(String),
    Fields { message: Option<String> },
}

/// Extract a human-readable detail from a non-success response body.
///
/// Only used for diagnostics; the session maps status codes to user-facing
/// text on its own.
pub fn parse_error_detail(status: StatusCode, body: &str) -> String {
    let fallback = || {
        if body.trim().is_empty() {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        } else {
            body.to_string()
        }
    };

    let Ok(payload) = serde_json::from_str::<ErrorPayload>(body) else {
        return fallback();
    };

    let nested = match payload.error {
        Some(ErrorPayloadValue::Text(text)) => non_empty(text),
        Some(ErrorPayloadValue::Fields { message }) => message.and_then(non_empty),
        None => None,
    };

    nested
        .or_else(|| payload.message.and_then(non_empty))
        .unwrap_or_else(fallback)
}

fn non_empty(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}
