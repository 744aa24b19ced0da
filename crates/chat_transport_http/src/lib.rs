//! HTTP implementation of the `chat_transport` contract.
//!
//! This crate owns request building, header normalization, and failure
//! classification for the two chat exchanges. It never interprets response
//! bodies and never retries: a non-success status is handed back to the
//! session untouched.

pub mod client;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod headers;

pub use client::HttpTransport;
pub use config::HttpTransportConfig;
pub use endpoint::normalize_endpoint_url;
pub use error::HttpTransportError;

/// Stable transport identifier used for explicit startup selection.
pub const HTTP_TRANSPORT_ID: &str = "http";
