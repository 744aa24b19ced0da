//! Embeddable chat session controller.
//!
//! Invariant: at most one send is in flight, and a typing placeholder never
//! outlives the attempt that inserted it.
//!
//! # Public API Overview
//! - Drive a conversation through [`SessionController`] (`initialize`, `submit`, `teardown`).
//! - Plug in a network layer by implementing [`ChatTransport`].
//! - Observe lifecycle events with a [`NotificationSink`] (channel sender, closure, [`EventLog`]).
//! - Map failures to user-facing text with [`ErrorMapper`] and [`ErrorMessages`].
//! - Decode loosely-shaped records with [`Message::from_record`].

pub mod config;
pub mod logging;

pub mod core;
pub mod runtime;

/// Transport contract re-exported for embedders.
pub use chat_transport::{
    ChatTransport, Method, TransportError, TransportRequest, TransportResponse, TransportResult,
};

/// Configuration values.
pub use crate::config::{ConfigError, EnvConfig, InitialFetch, SessionConfig};

/// Message model and storage.
pub use crate::core::message::{DecodeError, Message, MessageId, MessageRole, MessageStatus};
pub use crate::core::store::{MessageStore, StoreError};

/// Failure taxonomy and mapping.
pub use crate::core::error_mapper::{
    ErrorMapper, ErrorMessages, DEFAULT_NETWORK_ERROR, DEFAULT_TIMEOUT_ERROR,
    DEFAULT_UNKNOWN_ERROR,
};
pub use crate::core::failure::{ParseError, SessionFailure};

/// Controller and its outcomes.
pub use crate::runtime::controller::{
    InitializeOutcome, InitializeRejection, SessionController, SessionPhase, SessionSnapshot,
    SubmitOutcome, SubmitRejection,
};
/// Notification sinks.
pub use crate::runtime::events::{EventLog, NoopSink, NotificationSink, SessionEvent};
/// Injected parsers and body builder.
pub use crate::runtime::hooks::{
    default_body, default_initial_messages_parser, default_response_parser, SessionHooks,
};
