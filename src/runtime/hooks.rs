//! Embedder-supplied parsing and body-building functions.

use std::fmt;
use std::sync::Arc;

use serde_json::{json, Value};

use crate::core::failure::ParseError;
use crate::core::message::{Message, MessageRole};

pub type InitialMessagesParser =
    Arc<dyn Fn(&Value) -> Result<Vec<Message>, ParseError> + Send + Sync>;
pub type ResponseParser = Arc<dyn Fn(&Value) -> Result<Message, ParseError> + Send + Sync>;
pub type BodyBuilder = Arc<dyn Fn(&str) -> Value + Send + Sync>;

#[derive(Clone)]
pub struct SessionHooks {
    pub initial_messages_parser: InitialMessagesParser,
    pub response_parser: ResponseParser,
    /// `None` sends `{"message": text}`.
    pub body_builder: Option<BodyBuilder>,
}

impl Default for SessionHooks {
    fn default() -> Self {
        Self {
            initial_messages_parser: Arc::new(default_initial_messages_parser),
            response_parser: Arc::new(default_response_parser),
            body_builder: None,
        }
    }
}

impl fmt::Debug for SessionHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionHooks")
            .field("custom_body_builder", &self.body_builder.is_some())
            .finish_non_exhaustive()
    }
}

impl SessionHooks {
    pub fn with_initial_messages_parser<F>(mut self, parser: F) -> Self
    where
        F: Fn(&Value) -> Result<Vec<Message>, ParseError> + Send + Sync + 'static,
    {
        self.initial_messages_parser = Arc::new(parser);
        self
    }

    pub fn with_response_parser<F>(mut self, parser: F) -> Self
    where
        F: Fn(&Value) -> Result<Message, ParseError> + Send + Sync + 'static,
    {
        self.response_parser = Arc::new(parser);
        self
    }

    pub fn with_body_builder<F>(mut self, builder: F) -> Self
    where
        F: Fn(&str) -> Value + Send + Sync + 'static,
    {
        self.body_builder = Some(Arc::new(builder));
        self
    }

    pub fn build_body(&self, text: &str) -> Value {
        match &self.body_builder {
            Some(builder) => builder(text),
            None => default_body(text),
        }
    }
}

pub fn default_body(text: &str) -> Value {
    json!({ "message": text })
}

/// Accepts a bare array of records or an object with a `messages` array.
pub fn default_initial_messages_parser(body: &Value) -> Result<Vec<Message>, ParseError> {
    let records = match body {
        Value::Array(records) => records,
        Value::Object(fields) => match fields.get("messages") {
            Some(Value::Array(records)) => records,
            _ => return Err(ParseError::new("expected a 'messages' array")),
        },
        _ => {
            return Err(ParseError::new(
                "expected an array of messages or an object with 'messages'",
            ))
        }
    };

    records
        .iter()
        .map(|record| Message::from_record(record).map_err(ParseError::from))
        .collect()
}

/// Decodes a single record and attributes it to the bot.
pub fn default_response_parser(body: &Value) -> Result<Message, ParseError> {
    Ok(Message::from_record(body)?.with_role(MessageRole::Bot))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{default_initial_messages_parser, default_response_parser, SessionHooks};
    use crate::core::message::MessageRole;

    #[test]
    fn initial_parser_accepts_wrapped_and_bare_arrays() {
        let wrapped = default_initial_messages_parser(&json!({
            "messages": [{"id": "a", "content": "hello", "type": "bot"}]
        }))
        .expect("wrapped");
        let bare = default_initial_messages_parser(&json!([{"text": "x"}, {"text": "y"}]))
            .expect("bare");

        assert_eq!(wrapped.len(), 1);
        assert_eq!(wrapped[0].role, MessageRole::Bot);
        assert_eq!(bare.len(), 2);
    }

    #[test]
    fn initial_parser_rejects_other_shapes() {
        assert!(default_initial_messages_parser(&json!({"items": []})).is_err());
        assert!(default_initial_messages_parser(&json!("hello")).is_err());
        assert!(default_initial_messages_parser(&json!([1, 2])).is_err());
    }

    #[test]
    fn response_parser_forces_bot_role() {
        let message = default_response_parser(&json!({"content": "reply"})).expect("parse");
        assert_eq!(message.role, MessageRole::Bot);
        assert_eq!(message.content, "reply");
    }

    #[test]
    fn body_builder_defaults_to_single_message_field() {
        let hooks = SessionHooks::default();
        assert_eq!(hooks.build_body("hi"), json!({"message": "hi"}));

        let custom = hooks.with_body_builder(|text| json!({"query": text, "stream": false}));
        assert_eq!(custom.build_body("hi"), json!({"query": "hi", "stream": false}));
    }
}
