#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use chat_session::{
    EventLog, InitialFetch, Message, MessageRole, SessionConfig, SessionController, SessionEvent,
    SessionHooks,
};
use chat_transport_mock::ScriptedTransport;

pub const SEND_URL: &str = "https://bot.test/chat";
pub const HISTORY_URL: &str = "https://bot.test/history";

pub type Controller = SessionController<Arc<ScriptedTransport>>;

pub fn config() -> SessionConfig {
    SessionConfig::new(SEND_URL)
        .with_initial_fetch(InitialFetch::new(HISTORY_URL))
        .with_response_timeout(Duration::from_secs(5))
}

pub fn session(transport: ScriptedTransport) -> (Controller, Arc<ScriptedTransport>, EventLog) {
    session_with(transport, config(), SessionHooks::default())
}

pub fn session_with(
    transport: ScriptedTransport,
    config: SessionConfig,
    hooks: SessionHooks,
) -> (Controller, Arc<ScriptedTransport>, EventLog) {
    let transport = Arc::new(transport);
    let events = EventLog::new();
    let controller = SessionController::new(Arc::clone(&transport), config, hooks, events.clone());
    (controller, transport, events)
}

pub fn roles(messages: &[Message]) -> Vec<MessageRole> {
    messages.iter().map(|message| message.role).collect()
}

pub fn contents(messages: &[Message]) -> Vec<&str> {
    messages.iter().map(|message| message.content.as_str()).collect()
}

/// Event kinds without payloads, for order assertions.
pub fn kinds(events: &[SessionEvent]) -> Vec<&'static str> {
    events
        .iter()
        .map(|event| match event {
            SessionEvent::MessageSent(_) => "sent",
            SessionEvent::MessageReceived(_) => "received",
            SessionEvent::Error(_) => "error",
            SessionEvent::ScrollToBottom => "scroll",
            SessionEvent::CloseRequested => "close",
        })
        .collect()
}
