//! Failure taxonomy for one initialize or submit attempt.

use chat_transport::TransportError;
use thiserror::Error;

use crate::core::message::DecodeError;

/// Raised by an injected parser when a decoded body has the wrong shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ParseError {
    message: String,
}

impl ParseError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<DecodeError> for ParseError {
    fn from(error: DecodeError) -> Self {
        Self::new(error.to_string())
    }
}

/// Everything that can end an attempt without a result.
///
/// Every variant is funneled into the shared error path; none reaches the
/// renderer as a raised fault.
#[derive(Debug, Error)]
pub enum SessionFailure {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("unexpected HTTP status {status}")]
    Http { status: u16 },
    #[error("malformed response body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("response parser failed: {0}")]
    Parser(#[from] ParseError),
}

impl SessionFailure {
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Http { status } => Some(*status),
            _ => None,
        }
    }

    /// Raw failure text for non-HTTP failures. HTTP failures carry only a
    /// status so the configured table decides their wording.
    pub fn raw_description(&self) -> Option<String> {
        match self {
            Self::Http { .. } => None,
            other => Some(other.to_string()),
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport(error) if error.is_timeout())
    }
}
