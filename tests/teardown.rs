use std::time::Duration;

use chat_session::{SessionEvent, SessionPhase, SubmitOutcome, SubmitRejection};
use chat_transport_mock::{ScriptStep, ScriptedTransport};

mod support;

#[tokio::test]
async fn teardown_mid_send_abandons_without_further_effects() {
    let transport = ScriptedTransport::new().with_send(ScriptStep::Hang);
    let (controller, transport, events) = support::session(transport);

    let (outcome, ()) = tokio::join!(controller.submit("hello?"), async {
        tokio::task::yield_now().await;
        controller.teardown();
    });

    assert_eq!(outcome, SubmitOutcome::Abandoned);
    assert_eq!(transport.close_calls(), 1);
    assert_eq!(support::kinds(&events.events()), ["sent", "scroll"]);

    let snapshot = controller.snapshot();
    assert_eq!(snapshot.phase, SessionPhase::TornDown);
    assert!(snapshot.sending, "state is frozen at teardown");
}

#[tokio::test(start_paused = true)]
async fn late_reply_after_teardown_is_dropped() {
    let transport = ScriptedTransport::new().with_send(ScriptStep::delayed(
        200,
        r#"{"content":"too late"}"#,
        Duration::from_millis(50),
    ));
    let (controller, _transport, events) = support::session(transport);

    let (outcome, ()) = tokio::join!(controller.submit("hi"), async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        controller.teardown();
    });

    assert_eq!(outcome, SubmitOutcome::Abandoned);
    assert!(controller
        .snapshot()
        .messages
        .iter()
        .all(|message| message.content != "too late"));
    assert!(!events
        .events()
        .iter()
        .any(|event| matches!(event, SessionEvent::MessageReceived(_))));
}

#[tokio::test]
async fn everything_is_inert_after_teardown() {
    let (controller, transport, events) = support::session(ScriptedTransport::new());
    controller.teardown();
    controller.teardown();

    assert_eq!(
        controller.submit("hi").await,
        SubmitOutcome::Rejected(SubmitRejection::TornDown)
    );
    assert_eq!(controller.report_error(Some(500), None), None);
    controller.request_close();
    controller.set_draft("ignored");
    controller.clear_messages();

    assert!(events.is_empty());
    assert_eq!(controller.draft(), "");
    assert_eq!(transport.close_calls(), 1, "close runs once");
    assert!(transport.send_requests().is_empty());
}

#[tokio::test]
async fn close_request_is_forwarded_without_state_change() {
    let (controller, _transport, events) = support::session(ScriptedTransport::new());
    controller.initialize().await;
    events.take();

    controller.request_close();

    assert_eq!(events.events(), vec![SessionEvent::CloseRequested]);
    assert_eq!(controller.phase(), SessionPhase::Ready);
}

#[tokio::test]
async fn clear_messages_empties_the_store() {
    let (controller, _transport, _events) = support::session(ScriptedTransport::new());
    controller.initialize().await;
    controller.submit("hi").await;

    controller.clear_messages();

    let snapshot = controller.snapshot();
    assert!(snapshot.messages.is_empty());
    assert_eq!(snapshot.phase, SessionPhase::Ready);
}
