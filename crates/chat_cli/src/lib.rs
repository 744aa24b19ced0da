//! Terminal reference renderer for `chat_session`.
//!
//! ## Transport bootstrap
//!
//! - `CHAT_CLI_TRANSPORT=mock` (default) scripted transport: welcome history and echo replies
//! - `CHAT_CLI_TRANSPORT=http` for a real chat endpoint
//!
//! When `CHAT_CLI_TRANSPORT=http`, set `CHAT_SESSION_CONFIG_PATH` to a readable
//! UTF-8 JSON file with this shape:
//!
//! ```json
//! {
//!   "send_url": "https://bot.example.com/chat",
//!   "initial_url": "https://bot.example.com/history",
//!   "headers": { "Authorization": "Bearer <token>" },
//!   "timeout_sec": 30,
//!   "reverse_order": false,
//!   "error_messages": { "by_status": { "404": "Not found" } }
//! }
//! ```
//!
//! Contract notes:
//! - `send_url` is required and must be non-empty.
//! - `timeout_sec` is optional and must be > 0 when provided.
//! - Unknown JSON fields are rejected.
//!
//! ## Logging
//!
//! `CHAT_SESSION_LOG` takes a `tracing` filter directive; `CHAT_SESSION_DEBUG=1`
//! switches the default level to `debug`. Logs go to stderr.

pub mod app;
pub mod commands;
pub mod renderer;
pub mod transports;
