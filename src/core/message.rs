//! Message entity and tolerant decoding from structured records.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use uuid::Uuid;

/// Field names probed for message text, highest priority first.
pub const CONTENT_FIELDS: [&str; 3] = ["content", "message", "text"];
/// Field names probed for the creation time, highest priority first.
pub const TIMESTAMP_FIELDS: [&str; 3] = ["timestamp", "createdAt", "created_at"];

/// Session-unique message identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(String);

impl MessageId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Generates a timestamp-based id: `"{unix_millis}-{8 hex chars}"`.
    ///
    /// The random suffix keeps ids unique when several messages are created
    /// within the same millisecond.
    pub fn generate() -> Self {
        let millis = unix_millis(OffsetDateTime::now_utc());
        let suffix = Uuid::new_v4().simple().to_string();
        Self(format!("{millis}-{}", &suffix[..8]))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MessageId {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for MessageId {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}

/// Who a message is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    User,
    Bot,
    System,
    TypingPlaceholder,
}

/// Delivery status; the only field of a message that changes after creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageStatus {
    Sending,
    Sent,
    Delivered,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub content: String,
    pub role: MessageRole,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub status: MessageStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
}

/// Failure to turn a structured record into a [`Message`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("message record must be a JSON object, got {0}")]
    NotAnObject(&'static str),
    #[error("message record field '{field}' has unsupported type {found}")]
    InvalidField {
        field: &'static str,
        found: &'static str,
    },
}

impl Message {
    pub fn new(role: MessageRole, content: impl Into<String>, status: MessageStatus) -> Self {
        Self {
            id: MessageId::generate(),
            content: content.into(),
            role,
            created_at: OffsetDateTime::now_utc(),
            status,
            metadata: None,
        }
    }

    /// A user message that has not been dispatched yet.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content, MessageStatus::Sending)
    }

    pub fn bot(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Bot, content, MessageStatus::Sent)
    }

    /// An inline error notice shown in the conversation stream.
    pub fn system_error(content: impl Into<String>) -> Self {
        Self::new(MessageRole::System, content, MessageStatus::Failed)
    }

    /// The transient "assistant is composing" entry.
    pub fn typing_placeholder() -> Self {
        Self::new(MessageRole::TypingPlaceholder, String::new(), MessageStatus::Sending)
    }

    pub fn with_id(mut self, id: impl Into<MessageId>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_role(mut self, role: MessageRole) -> Self {
        self.role = role;
        self
    }

    pub fn with_created_at(mut self, created_at: OffsetDateTime) -> Self {
        self.created_at = created_at;
        self
    }

    pub fn is_placeholder(&self) -> bool {
        self.role == MessageRole::TypingPlaceholder
    }

    /// Decodes a message from a loosely-shaped record.
    ///
    /// Missing fields fall back to defaults: a generated id, empty content,
    /// the current time. Role is `Bot` only when `type` or `sender` equals
    /// `"bot"`. Status is always `Sent`.
    pub fn from_record(record: &Value) -> Result<Self, DecodeError> {
        let Value::Object(fields) = record else {
            return Err(DecodeError::NotAnObject(value_type_name(record)));
        };

        let id = match fields.get("id") {
            None | Some(Value::Null) => MessageId::generate(),
            Some(Value::String(raw)) if !raw.is_empty() => MessageId::new(raw.clone()),
            Some(Value::String(_)) => MessageId::generate(),
            Some(Value::Number(raw)) => MessageId::new(raw.to_string()),
            Some(other) => {
                return Err(DecodeError::InvalidField {
                    field: "id",
                    found: value_type_name(other),
                })
            }
        };

        let content = match first_present(fields, &CONTENT_FIELDS) {
            None => String::new(),
            Some((_, Value::String(text))) => text.clone(),
            Some((field, other)) => {
                return Err(DecodeError::InvalidField {
                    field,
                    found: value_type_name(other),
                })
            }
        };

        let is_bot = ["type", "sender"]
            .iter()
            .any(|field| fields.get(*field).and_then(Value::as_str) == Some("bot"));
        let role = if is_bot {
            MessageRole::Bot
        } else {
            MessageRole::User
        };

        let created_at = first_present(fields, &TIMESTAMP_FIELDS)
            .and_then(|(_, value)| parse_timestamp(value))
            .unwrap_or_else(OffsetDateTime::now_utc);

        let metadata = fields
            .get("metadata")
            .and_then(Value::as_object)
            .cloned();

        Ok(Self {
            id,
            content,
            role,
            created_at,
            status: MessageStatus::Sent,
            metadata,
        })
    }
}

fn first_present<'a>(
    fields: &'a Map<String, Value>,
    names: &[&'static str],
) -> Option<(&'static str, &'a Value)> {
    names.iter().find_map(|name| match fields.get(*name) {
        None | Some(Value::Null) => None,
        Some(value) => Some((*name, value)),
    })
}

/// Accepts epoch milliseconds (number or numeric string) or RFC 3339 text.
fn parse_timestamp(value: &Value) -> Option<OffsetDateTime> {
    match value {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().map(|float| float as i64))
            .and_then(from_unix_millis),
        Value::String(text) => {
            let text = text.trim();
            match text.parse::<i64>() {
                Ok(millis) => from_unix_millis(millis),
                Err(_) => OffsetDateTime::parse(text, &Rfc3339).ok(),
            }
        }
        _ => None,
    }
}

fn from_unix_millis(millis: i64) -> Option<OffsetDateTime> {
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(millis) * 1_000_000).ok()
}

fn unix_millis(at: OffsetDateTime) -> i128 {
    at.unix_timestamp_nanos() / 1_000_000
}

fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
