//! Deterministic scripted implementation of the `chat_transport` contract.
//!
//! This crate contains no network code and is intended for local
//! development and controller-level integration testing. Each exchange pops
//! the next scripted step for its operation; when a queue runs dry the
//! transport falls back to a welcome history and an echo reply.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use chat_transport::{
    ChatTransport, TransportError, TransportRequest, TransportResponse, TransportResult,
};
use serde_json::{json, Value};

/// Stable transport identifier used for explicit startup selection.
pub const MOCK_TRANSPORT_ID: &str = "mock";

/// Greeting returned by the fallback initial fetch.
pub const WELCOME_TEXT: &str = "Hi! Ask me anything.";

/// One scripted outcome for a transport exchange.
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptStep {
    /// Answer with `status` and `body` after `delay`.
    Respond {
        status: u16,
        body: String,
        delay: Duration,
    },
    /// Fail with a transport-level error.
    Fail(TransportError),
    /// Never resolve; the caller's timeout decides the outcome.
    Hang,
}

impl ScriptStep {
    #[must_use]
    pub fn respond(status: u16, body: impl Into<String>) -> Self {
        Self::Respond {
            status,
            body: body.into(),
            delay: Duration::ZERO,
        }
    }

    #[must_use]
    pub fn json(status: u16, body: &Value) -> Self {
        Self::respond(status, body.to_string())
    }

    #[must_use]
    pub fn delayed(status: u16, body: impl Into<String>, delay: Duration) -> Self {
        Self::Respond {
            status,
            body: body.into(),
            delay,
        }
    }
}

#[derive(Debug, Default)]
struct Scripts {
    initial: VecDeque<ScriptStep>,
    send: VecDeque<ScriptStep>,
    initial_requests: Vec<TransportRequest>,
    send_requests: Vec<TransportRequest>,
}

/// Scripted transport used by session tests and the `mock` CLI mode.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    scripts: Mutex<Scripts>,
    close_calls: AtomicUsize,
}

impl ScriptedTransport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues the next initial-fetch outcome.
    #[must_use]
    pub fn with_initial(self, step: ScriptStep) -> Self {
        self.push_initial(step);
        self
    }

    /// Queues the next send outcome.
    #[must_use]
    pub fn with_send(self, step: ScriptStep) -> Self {
        self.push_send(step);
        self
    }

    pub fn push_initial(&self, step: ScriptStep) {
        self.lock_scripts().initial.push_back(step);
    }

    pub fn push_send(&self, step: ScriptStep) {
        self.lock_scripts().send.push_back(step);
    }

    /// Returns every initial-fetch request received so far, in order.
    #[must_use]
    pub fn initial_requests(&self) -> Vec<TransportRequest> {
        self.lock_scripts().initial_requests.clone()
    }

    /// Returns every send request received so far, in order.
    #[must_use]
    pub fn send_requests(&self) -> Vec<TransportRequest> {
        self.lock_scripts().send_requests.clone()
    }

    #[must_use]
    pub fn close_calls(&self) -> usize {
        self.close_calls.load(Ordering::SeqCst)
    }

    fn lock_scripts(&self) -> MutexGuard<'_, Scripts> {
        lock_unpoisoned(&self.scripts)
    }
}

impl ChatTransport for ScriptedTransport {
    async fn fetch_initial(&self, request: TransportRequest) -> TransportResult {
        let step = {
            let mut scripts = self.lock_scripts();
            scripts.initial_requests.push(request);
            scripts.initial.pop_front()
        };

        match step {
            Some(step) => play(step).await,
            None => Ok(TransportResponse::new(200, welcome_body().to_string())),
        }
    }

    async fn send(&self, request: TransportRequest) -> TransportResult {
        let fallback = echo_body(request.body.as_ref());
        let step = {
            let mut scripts = self.lock_scripts();
            scripts.send_requests.push(request);
            scripts.send.pop_front()
        };

        match step {
            Some(step) => play(step).await,
            None => Ok(TransportResponse::new(200, fallback.to_string())),
        }
    }

    fn close(&self) {
        self.close_calls.fetch_add(1, Ordering::SeqCst);
    }
}

async fn play(step: ScriptStep) -> TransportResult {
    match step {
        ScriptStep::Respond {
            status,
            body,
            delay,
        } => {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            Ok(TransportResponse { status, body })
        }
        ScriptStep::Fail(error) => Err(error),
        ScriptStep::Hang => std::future::pending().await,
    }
}

fn welcome_body() -> Value {
    json!({
        "messages": [
            { "id": "welcome", "content": WELCOME_TEXT, "type": "bot" }
        ]
    })
}

fn echo_body(request_body: Option<&Value>) -> Value {
    let text = request_body
        .and_then(|body| body.get("message"))
        .and_then(Value::as_str)
        .unwrap_or_default();

    json!({ "content": format!("Echo: {text}"), "type": "bot" })
}

fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
