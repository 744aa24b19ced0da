use std::time::Duration;

use assert_matches::assert_matches;
use chat_session::{
    InitialFetch, InitializeOutcome, InitializeRejection, Message, MessageRole, MessageStatus,
    SessionConfig, SessionEvent, SessionHooks, SessionPhase, DEFAULT_UNKNOWN_ERROR,
};
use chat_transport::{Method, TransportError};
use chat_transport_mock::{ScriptStep, ScriptedTransport};
use serde_json::json;

mod support;

#[tokio::test]
async fn initial_history_replaces_the_store() {
    let transport = ScriptedTransport::new().with_initial(ScriptStep::json(
        200,
        &json!({"messages": [{"id": "a", "content": "hello", "type": "bot"}]}),
    ));
    let (controller, transport, events) = support::session(transport);

    let outcome = controller.initialize().await;

    assert_eq!(outcome, InitializeOutcome::Loaded { count: 1 });
    let snapshot = controller.snapshot();
    assert!(!snapshot.loading);
    assert_eq!(snapshot.phase, SessionPhase::Ready);
    assert_eq!(snapshot.messages.len(), 1);
    assert_eq!(snapshot.messages[0].role, MessageRole::Bot);
    assert_eq!(snapshot.messages[0].content, "hello");
    assert_eq!(snapshot.messages[0].status, MessageStatus::Sent);
    assert_eq!(events.events(), vec![SessionEvent::ScrollToBottom]);

    let requests = transport.initial_requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, Method::Get);
    assert_eq!(requests[0].url, support::HISTORY_URL);
}

#[tokio::test]
async fn failed_load_leaves_store_untouched_and_returns_to_idle() {
    let transport = ScriptedTransport::new()
        .with_initial(ScriptStep::respond(503, "unavailable"))
        .with_initial(ScriptStep::json(200, &json!([{"content": "retry worked", "type": "bot"}])));
    let (controller, _transport, events) = support::session(transport);
    controller.report_error(Some(418), None);
    events.take();

    let outcome = controller.initialize().await;

    assert_matches!(outcome, InitializeOutcome::Failed { ref message } if message == DEFAULT_UNKNOWN_ERROR);
    let snapshot = controller.snapshot();
    assert_eq!(snapshot.phase, SessionPhase::Idle);
    assert!(!snapshot.loading);
    assert_eq!(
        support::roles(&snapshot.messages),
        [MessageRole::System, MessageRole::System],
        "pre-existing entry kept, one error appended"
    );
    assert_eq!(snapshot.messages[1].status, MessageStatus::Failed);
    assert_eq!(
        support::kinds(&events.take()),
        ["error", "scroll"]
    );

    assert_eq!(controller.initialize().await, InitializeOutcome::Loaded { count: 1 });
    assert_eq!(support::contents(&controller.snapshot().messages), ["retry worked"]);
}

#[tokio::test]
async fn transport_error_text_is_shown_verbatim() {
    let transport = ScriptedTransport::new().with_initial(ScriptStep::Fail(TransportError::Connect(
        "dns lookup failed".to_owned(),
    )));
    let (controller, _transport, events) = support::session(transport);

    let outcome = controller.initialize().await;

    assert_eq!(
        outcome,
        InitializeOutcome::Failed {
            message: "connection failed: dns lookup failed".to_owned()
        }
    );
    assert_eq!(
        events.events()[0],
        SessionEvent::Error("connection failed: dns lookup failed".to_owned())
    );
}

#[tokio::test]
async fn parser_rejection_goes_through_the_error_path() {
    let transport =
        ScriptedTransport::new().with_initial(ScriptStep::json(200, &json!({"items": []})));
    let (controller, _transport, _events) = support::session(transport);

    let outcome = controller.initialize().await;

    assert_matches!(outcome, InitializeOutcome::Failed { ref message } if message.contains("messages"));
    assert_eq!(controller.phase(), SessionPhase::Idle);
}

#[tokio::test]
async fn undecodable_body_is_a_failure() {
    let transport = ScriptedTransport::new().with_initial(ScriptStep::respond(200, "<html>"));
    let (controller, _transport, _events) = support::session(transport);

    assert_matches!(
        controller.initialize().await,
        InitializeOutcome::Failed { ref message } if message.starts_with("malformed response body")
    );
}

#[tokio::test]
async fn no_initial_fetch_means_ready_without_transport_traffic() {
    let (controller, transport, events) = support::session_with(
        ScriptedTransport::new(),
        SessionConfig::new(support::SEND_URL),
        SessionHooks::default(),
    );

    assert_eq!(controller.initialize().await, InitializeOutcome::Loaded { count: 0 });
    assert_eq!(controller.phase(), SessionPhase::Ready);
    assert!(transport.initial_requests().is_empty());
    assert!(events.is_empty());
}

#[tokio::test]
async fn initialize_is_only_valid_from_idle() {
    let (controller, _transport, _events) = support::session(ScriptedTransport::new());

    assert_matches!(controller.initialize().await, InitializeOutcome::Loaded { .. });
    assert_eq!(
        controller.initialize().await,
        InitializeOutcome::Rejected(InitializeRejection::AlreadyInitialized)
    );

    controller.teardown();
    assert_eq!(
        controller.initialize().await,
        InitializeOutcome::Rejected(InitializeRejection::TornDown)
    );
}

#[tokio::test(start_paused = true)]
async fn concurrent_initialize_is_rejected_while_loading() {
    let transport = ScriptedTransport::new().with_initial(ScriptStep::delayed(
        200,
        r#"{"messages":[]}"#,
        Duration::from_millis(200),
    ));
    let (controller, _transport, _events) = support::session(transport);

    let (first, second) = tokio::join!(controller.initialize(), async {
        tokio::task::yield_now().await;
        assert!(controller.is_loading());
        controller.initialize().await
    });

    assert_eq!(first, InitializeOutcome::Loaded { count: 0 });
    assert_eq!(
        second,
        InitializeOutcome::Rejected(InitializeRejection::AlreadyLoading)
    );
}

#[tokio::test]
async fn reverse_order_reverses_loaded_history_and_presentation() {
    let transport = ScriptedTransport::new().with_initial(ScriptStep::json(
        200,
        &json!({"messages": [
            {"id": "3", "content": "newest", "type": "bot"},
            {"id": "2", "content": "middle"},
            {"id": "1", "content": "oldest", "type": "bot"}
        ]}),
    ));
    let config = support::config().with_reverse_order(true);
    let (controller, _transport, _events) =
        support::session_with(transport, config, SessionHooks::default());

    controller.initialize().await;

    let snapshot = controller.snapshot();
    assert_eq!(support::contents(&snapshot.messages), ["oldest", "middle", "newest"]);
    assert_eq!(support::contents(&snapshot.visible), ["newest", "middle", "oldest"]);
}

#[tokio::test]
async fn custom_initial_parser_and_body_are_used() {
    let transport =
        ScriptedTransport::new().with_initial(ScriptStep::json(200, &json!({"greeting": "yo"})));
    let config = SessionConfig::new(support::SEND_URL)
        .with_initial_fetch(InitialFetch::new(support::HISTORY_URL).with_body(json!({"n": 5})))
        .with_header("Authorization", "Bearer t");
    let hooks = SessionHooks::default().with_initial_messages_parser(|body| {
        let greeting = body["greeting"].as_str().unwrap_or_default();
        Ok(vec![Message::bot(greeting)])
    });
    let (controller, transport, _events) = support::session_with(transport, config, hooks);

    assert_eq!(controller.initialize().await, InitializeOutcome::Loaded { count: 1 });
    assert_eq!(support::contents(&controller.snapshot().messages), ["yo"]);

    let request = &transport.initial_requests()[0];
    assert_eq!(request.body, Some(json!({"n": 5})));
    assert_eq!(request.header("authorization"), Some("Bearer t"));
}

#[tokio::test]
async fn reload_fetches_history_again() {
    let transport = ScriptedTransport::new()
        .with_initial(ScriptStep::json(200, &json!([{"content": "first"}])))
        .with_initial(ScriptStep::json(200, &json!([{"content": "second"}])));
    let (controller, transport, _events) = support::session(transport);

    controller.initialize().await;
    assert_eq!(controller.reload().await, InitializeOutcome::Loaded { count: 1 });

    assert_eq!(support::contents(&controller.snapshot().messages), ["second"]);
    assert_eq!(transport.initial_requests().len(), 2);
}

#[tokio::test]
async fn loaded_typing_placeholders_are_discarded() {
    let transport =
        ScriptedTransport::new().with_initial(ScriptStep::json(200, &json!({"ignored": true})));
    let hooks = SessionHooks::default().with_initial_messages_parser(|_body| {
        Ok(vec![
            Message::bot("hello"),
            Message::bot("…").with_role(MessageRole::TypingPlaceholder),
        ])
    });
    let (controller, _transport, _events) =
        support::session_with(transport, support::config(), hooks);

    assert_eq!(controller.initialize().await, InitializeOutcome::Loaded { count: 1 });
    let loaded = controller.snapshot();
    assert_eq!(support::roles(&loaded.messages), [MessageRole::Bot]);
    assert_eq!(loaded.typing_message_id, None);

    controller.submit("hi").await;
    let snapshot = controller.snapshot();
    assert_eq!(
        support::roles(&snapshot.messages),
        [MessageRole::Bot, MessageRole::User, MessageRole::Bot]
    );
    assert_eq!(snapshot.typing_message_id, None);
}
