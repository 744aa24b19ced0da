//! Minimal transport contract between a chat session and a remote
//! conversational service.
//!
//! This crate defines only the two request/response exchanges a session
//! needs (initial history fetch and message send) plus the failure kinds a
//! transport can report. It contains no HTTP client, no payload decoding, and
//! no session state.

use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

/// Fixed content type carried by every outgoing send request.
pub const CONTENT_TYPE_JSON: &str = "application/json";
/// Canonical header name for the request content type.
pub const HEADER_CONTENT_TYPE: &str = "Content-Type";

/// Result returned by every transport exchange.
pub type TransportResult = Result<TransportResponse, TransportError>;

/// HTTP-style verb for a transport request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One outgoing request, fully resolved by the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportRequest {
    pub method: Method,
    pub url: String,
    pub headers: BTreeMap<String, String>,
    pub body: Option<Value>,
}

impl TransportRequest {
    #[must_use]
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
            headers: BTreeMap::new(),
            body: None,
        }
    }

    #[must_use]
    pub fn post(url: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::Post,
            url: url.into(),
            headers: BTreeMap::new(),
            body: Some(body),
        }
    }

    #[must_use]
    pub fn with_headers(mut self, headers: impl IntoIterator<Item = (String, String)>) -> Self {
        self.headers.extend(headers);
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: Option<Value>) -> Self {
        self.body = body;
        self
    }

    /// Returns a header value using case-insensitive name matching.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Raw response as observed on the wire: status code and undecoded body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    #[must_use]
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Success is any status in `[200, 300)`.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Failure raised before a response status could be observed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,
    #[error("connection failed: {0}")]
    Connect(String),
    #[error("request failed: {0}")]
    Request(String),
    #[error("transport is closed")]
    Closed,
}

impl TransportError {
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout)
    }
}

/// Embedder-supplied capability that performs the two remote exchanges.
///
/// Implementations must not interpret status codes: a non-success status is
/// returned as a normal [`TransportResponse`] and classified by the caller.
pub trait ChatTransport: Send + Sync + 'static {
    /// Fetches prior conversation history or a welcome message set.
    fn fetch_initial(
        &self,
        request: TransportRequest,
    ) -> impl Future<Output = TransportResult> + Send;

    /// Delivers one user message and returns the service reply.
    fn send(&self, request: TransportRequest) -> impl Future<Output = TransportResult> + Send;

    /// Releases held resources. Called once when the owning session is torn down.
    fn close(&self) {}
}

impl<T: ChatTransport> ChatTransport for Arc<T> {
    fn fetch_initial(
        &self,
        request: TransportRequest,
    ) -> impl Future<Output = TransportResult> + Send {
        T::fetch_initial(self, request)
    }

    fn send(&self, request: TransportRequest) -> impl Future<Output = TransportResult> + Send {
        T::send(self, request)
    }

    fn close(&self) {
        T::close(self);
    }
}
