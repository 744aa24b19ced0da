//! Line-oriented presentation of messages and session events.

use chat_session::{Message, MessageRole, SessionEvent};

pub const USER_PREFIX: &str = "you>";
pub const BOT_PREFIX: &str = "bot>";
pub const ERROR_PREFIX: &str = "!";

pub fn render_message(message: &Message) -> Option<String> {
    let prefix = match message.role {
        MessageRole::User => USER_PREFIX,
        MessageRole::Bot => BOT_PREFIX,
        MessageRole::System => ERROR_PREFIX,
        MessageRole::TypingPlaceholder => return None,
    };
    Some(format!("{prefix} {}", message.content))
}

/// The user's own line is already on screen, so only replies and errors
/// produce output.
pub fn render_event(event: &SessionEvent) -> Option<String> {
    match event {
        SessionEvent::MessageReceived(message) => render_message(message),
        SessionEvent::Error(text) => Some(format!("{ERROR_PREFIX} {text}")),
        SessionEvent::MessageSent(_) | SessionEvent::ScrollToBottom | SessionEvent::CloseRequested => {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use chat_session::{Message, SessionEvent};

    use super::{render_event, render_message};

    #[test]
    fn messages_are_prefixed_by_role() {
        assert_eq!(render_message(&Message::bot("hi")).as_deref(), Some("bot> hi"));
        assert_eq!(render_message(&Message::user("yo")).as_deref(), Some("you> yo"));
        assert_eq!(
            render_message(&Message::system_error("down")).as_deref(),
            Some("! down")
        );
        assert_eq!(render_message(&Message::typing_placeholder()), None);
    }

    #[test]
    fn only_replies_and_errors_are_printed() {
        assert_eq!(
            render_event(&SessionEvent::Error("boom".to_owned())).as_deref(),
            Some("! boom")
        );
        assert_eq!(render_event(&SessionEvent::MessageSent(Message::user("x"))), None);
        assert_eq!(render_event(&SessionEvent::ScrollToBottom), None);
    }
}
