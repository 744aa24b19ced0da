//! Session controller: initial load, send/receive cycle, typing indicator,
//! and failure reporting.
//!
//! The controller is a cheap-clone handle. State lives behind one mutex that
//! is never held across an `.await`; events raised while it is held are
//! buffered and dispatched after release. Every continuation after a
//! transport call re-checks the phase, so nothing is mutated or notified
//! once [`SessionController::teardown`] has run.

use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};

use chat_transport::{ChatTransport, TransportError, TransportResult};
use serde_json::Value;
use tokio::sync::watch;

use crate::config::SessionConfig;
use crate::core::error_mapper::ErrorMapper;
use crate::core::failure::SessionFailure;
use crate::core::message::{Message, MessageId, MessageRole, MessageStatus};
use crate::core::store::MessageStore;
use crate::runtime::events::{NotificationSink, SessionEvent};
use crate::runtime::hooks::SessionHooks;
use crate::runtime::lock_unpoisoned;
use crate::runtime::request::{initial_request, send_request};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    Loading,
    Ready,
    TornDown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitializeRejection {
    AlreadyLoading,
    AlreadyInitialized,
    /// A send is outstanding; a load would replace the store under it.
    Sending,
    TornDown,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InitializeOutcome {
    Loaded { count: usize },
    Failed { message: String },
    Rejected(InitializeRejection),
    /// Teardown happened while the fetch was outstanding.
    Abandoned,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitRejection {
    EmptyText,
    AlreadySending,
    Loading,
    TornDown,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Delivered(Message),
    Failed { message: String },
    Rejected(SubmitRejection),
    Abandoned,
}

/// Point-in-time copy of the session state for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    /// Storage (insertion) order.
    pub messages: Vec<Message>,
    /// Presentation order; reversed when `reverse_order` is configured.
    pub visible: Vec<Message>,
    pub loading: bool,
    pub sending: bool,
    pub typing_message_id: Option<MessageId>,
    pub phase: SessionPhase,
}

#[derive(Debug)]
struct SessionState {
    phase: SessionPhase,
    store: MessageStore,
    sending: bool,
    typing_message_id: Option<MessageId>,
    draft: String,
}

impl SessionState {
    fn new() -> Self {
        Self {
            phase: SessionPhase::Idle,
            store: MessageStore::new(),
            sending: false,
            typing_message_id: None,
            draft: String::new(),
        }
    }

    fn is_torn_down(&self) -> bool {
        self.phase == SessionPhase::TornDown
    }

    fn remove_placeholder(&mut self) {
        if let Some(id) = self.typing_message_id.take() {
            self.store.remove_by_id(&id);
        }
    }

    /// Inserts a fresh typing placeholder, evicting any other one first.
    fn insert_placeholder(&mut self) {
        self.remove_placeholder();
        if let Some(stray) = self.store.placeholder_id().cloned() {
            tracing::warn!(id = %stray, "evicting untracked typing placeholder");
            self.store.remove_by_id(&stray);
        }

        let placeholder = Message::typing_placeholder();
        let id = placeholder.id.clone();
        let appended = self.store.append(placeholder);
        debug_assert!(appended.is_ok(), "placeholder slot was cleared: {appended:?}");
        if appended.is_ok() {
            self.typing_message_id = Some(id);
        }
    }

    /// Appends a non-placeholder message, re-keying it if its id is already
    /// taken. Returns the stored copy.
    fn append_unique(&mut self, mut message: Message) -> Message {
        debug_assert!(!message.is_placeholder(), "placeholders go through insert_placeholder");
        if self.store.get(&message.id).is_some() {
            let fresh = MessageId::generate();
            tracing::warn!(duplicate = %message.id, replacement = %fresh, "re-keying message with duplicate id");
            message.id = fresh;
        }
        let appended = self.store.append(message.clone());
        debug_assert!(appended.is_ok(), "unique non-placeholder append: {appended:?}");
        message
    }

    /// Releases the send slot of an attempt that ended without completing.
    fn release_send(&mut self) {
        self.remove_placeholder();
        self.sending = false;
    }
}

/// Restores the send slot if a `submit` future is dropped mid-flight.
struct SendGuard<'a> {
    state: &'a Mutex<SessionState>,
    armed: bool,
}

impl<'a> SendGuard<'a> {
    fn new(state: &'a Mutex<SessionState>) -> Self {
        Self { state, armed: true }
    }

    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for SendGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut state = lock_unpoisoned(self.state);
        if state.is_torn_down() {
            return;
        }
        state.release_send();
        tracing::debug!("send cancelled by caller; typing placeholder removed");
    }
}

struct Inner<T> {
    transport: T,
    config: SessionConfig,
    hooks: SessionHooks,
    sink: Box<dyn NotificationSink>,
    state: Mutex<SessionState>,
    teardown: watch::Sender<bool>,
}

pub struct SessionController<T: ChatTransport> {
    inner: Arc<Inner<T>>,
}

impl<T: ChatTransport> Clone for SessionController<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: ChatTransport> fmt::Debug for SessionController<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionController")
            .field("config", &self.inner.config)
            .field("state", &*self.lock_state())
            .finish_non_exhaustive()
    }
}

impl<T: ChatTransport> SessionController<T> {
    pub fn new(
        transport: T,
        config: SessionConfig,
        hooks: SessionHooks,
        sink: impl NotificationSink,
    ) -> Self {
        let (teardown, _) = watch::channel(false);
        Self {
            inner: Arc::new(Inner {
                transport,
                config,
                hooks,
                sink: Box::new(sink),
                state: Mutex::new(SessionState::new()),
                teardown,
            }),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.inner.config
    }

    pub fn transport(&self) -> &T {
        &self.inner.transport
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let state = self.lock_state();
        SessionSnapshot {
            messages: state.store.to_vec(),
            visible: state.store.view(self.inner.config.reverse_order),
            loading: state.phase == SessionPhase::Loading,
            sending: state.sending,
            typing_message_id: state.typing_message_id.clone(),
            phase: state.phase,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.lock_state().phase
    }

    pub fn is_sending(&self) -> bool {
        self.lock_state().sending
    }

    pub fn is_loading(&self) -> bool {
        self.phase() == SessionPhase::Loading
    }

    pub fn set_draft(&self, text: impl Into<String>) {
        let mut state = self.lock_state();
        if !state.is_torn_down() {
            state.draft = text.into();
        }
    }

    pub fn draft(&self) -> String {
        self.lock_state().draft.clone()
    }

    /// Loads the initial history. Valid only from [`SessionPhase::Idle`].
    ///
    /// Without a configured initial fetch the session becomes ready without
    /// touching the transport. On failure the store is left as it was and
    /// the phase returns to `Idle`, so a later call may retry.
    pub async fn initialize(&self) -> InitializeOutcome {
        let request = {
            let mut state = self.lock_state();
            match state.phase {
                SessionPhase::TornDown => {
                    return InitializeOutcome::Rejected(InitializeRejection::TornDown)
                }
                SessionPhase::Loading => {
                    return InitializeOutcome::Rejected(InitializeRejection::AlreadyLoading)
                }
                SessionPhase::Ready => {
                    return InitializeOutcome::Rejected(InitializeRejection::AlreadyInitialized)
                }
                SessionPhase::Idle => {}
            }
            if state.sending {
                return InitializeOutcome::Rejected(InitializeRejection::Sending);
            }

            let Some(fetch) = &self.inner.config.initial_fetch else {
                state.phase = SessionPhase::Ready;
                tracing::debug!("no initial fetch configured; session ready");
                return InitializeOutcome::Loaded { count: 0 };
            };
            state.phase = SessionPhase::Loading;
            initial_request(&self.inner.config, fetch)
        };

        tracing::debug!(url = %request.url, "loading initial messages");
        let Some(result) = self.bounded(self.inner.transport.fetch_initial(request)).await else {
            tracing::debug!("initial load abandoned after teardown");
            return InitializeOutcome::Abandoned;
        };
        let parsed = response_body(result).and_then(|body| {
            (self.inner.hooks.initial_messages_parser)(&body).map_err(SessionFailure::from)
        });

        let mut events = Vec::new();
        let outcome = {
            let mut state = self.lock_state();
            if state.is_torn_down() {
                tracing::debug!("initial load completed after teardown; dropped");
                return InitializeOutcome::Abandoned;
            }
            match parsed {
                Ok(mut messages) => {
                    let before = messages.len();
                    messages.retain(|message| !message.is_placeholder());
                    if messages.len() < before {
                        tracing::warn!(
                            dropped = before - messages.len(),
                            "initial messages contained typing placeholders"
                        );
                    }
                    if self.inner.config.reverse_order {
                        messages.reverse();
                    }
                    state.store.replace_all(messages);
                    state.phase = SessionPhase::Ready;
                    events.push(SessionEvent::ScrollToBottom);
                    let count = state.store.len();
                    tracing::debug!(count, "initial messages loaded");
                    InitializeOutcome::Loaded { count }
                }
                Err(failure) => {
                    state.phase = SessionPhase::Idle;
                    tracing::warn!(%failure, "initial load failed");
                    let message = self.fail(&mut state, &failure, &mut events);
                    InitializeOutcome::Failed { message }
                }
            }
        };
        self.dispatch(events);
        outcome
    }

    /// Returns a ready session to `Idle` and loads the history again.
    pub async fn reload(&self) -> InitializeOutcome {
        {
            let mut state = self.lock_state();
            if state.phase == SessionPhase::Ready && !state.sending {
                state.phase = SessionPhase::Idle;
            }
        }
        self.initialize().await
    }

    /// Sends one user message and waits for the bot reply.
    ///
    /// Empty or whitespace-only text, a second call while a send is
    /// outstanding, and calls during the initial load are rejected without
    /// any observable effect.
    pub async fn submit(&self, text: &str) -> SubmitOutcome {
        let text = text.trim();
        let mut events = Vec::new();
        let (request, user_id) = {
            let mut state = self.lock_state();
            if text.is_empty() {
                return SubmitOutcome::Rejected(SubmitRejection::EmptyText);
            }
            match state.phase {
                SessionPhase::TornDown => return SubmitOutcome::Rejected(SubmitRejection::TornDown),
                SessionPhase::Loading => return SubmitOutcome::Rejected(SubmitRejection::Loading),
                SessionPhase::Idle | SessionPhase::Ready => {}
            }
            if state.sending {
                return SubmitOutcome::Rejected(SubmitRejection::AlreadySending);
            }

            let mut user = Message::user(text);
            user.status = MessageStatus::Sent;
            let user = state.append_unique(user);
            let user_id = user.id.clone();
            state.sending = true;
            state.draft.clear();
            events.push(SessionEvent::MessageSent(user));
            events.push(SessionEvent::ScrollToBottom);

            state.insert_placeholder();

            let body = self.inner.hooks.build_body(text);
            (send_request(&self.inner.config, body), user_id)
        };
        let mut guard = SendGuard::new(&self.inner.state);
        self.dispatch(events);

        tracing::debug!(url = %request.url, "sending message");
        let Some(result) = self.bounded(self.inner.transport.send(request)).await else {
            tracing::debug!("send abandoned after teardown");
            return SubmitOutcome::Abandoned;
        };
        let parsed = response_body(result).and_then(|body| {
            (self.inner.hooks.response_parser)(&body).map_err(SessionFailure::from)
        });

        let mut events = Vec::new();
        let outcome = {
            let mut state = self.lock_state();
            guard.disarm();
            if state.is_torn_down() {
                tracing::debug!("send completed after teardown; dropped");
                return SubmitOutcome::Abandoned;
            }
            state.release_send();
            match parsed {
                Ok(reply) => {
                    let reply = state.append_unique(reply.with_role(MessageRole::Bot));
                    state.store.set_status(&user_id, MessageStatus::Delivered);
                    events.push(SessionEvent::MessageReceived(reply.clone()));
                    events.push(SessionEvent::ScrollToBottom);
                    SubmitOutcome::Delivered(reply)
                }
                Err(failure) => {
                    tracing::warn!(%failure, "send failed");
                    let message = self.fail(&mut state, &failure, &mut events);
                    SubmitOutcome::Failed { message }
                }
            }
        };
        self.dispatch(events);
        outcome
    }

    /// Submits the current draft buffer.
    pub async fn submit_draft(&self) -> SubmitOutcome {
        let draft = self.draft();
        self.submit(&draft).await
    }

    /// Shared error path: appends a System/Failed message with the mapped
    /// text and notifies. Returns `None` after teardown.
    pub fn report_error(&self, status: Option<u16>, raw: Option<&str>) -> Option<String> {
        let mut events = Vec::new();
        let message = {
            let mut state = self.lock_state();
            if state.is_torn_down() {
                return None;
            }
            let message = ErrorMapper::new(&self.inner.config.error_messages).map(status, raw);
            self.append_error(&mut state, message.clone(), &mut events);
            message
        };
        self.dispatch(events);
        Some(message)
    }

    pub fn clear_messages(&self) {
        let mut state = self.lock_state();
        if state.is_torn_down() {
            return;
        }
        state.store.clear();
        state.typing_message_id = None;
        tracing::debug!("messages cleared");
    }

    /// Forwards the renderer's close/dismiss signal. No state changes.
    pub fn request_close(&self) {
        if self.lock_state().is_torn_down() {
            return;
        }
        self.inner.sink.notify(SessionEvent::CloseRequested);
    }

    /// Ends the session. Outstanding operations resolve to `Abandoned` and
    /// every later call is a no-op or a rejection.
    pub fn teardown(&self) {
        {
            let mut state = self.lock_state();
            if state.is_torn_down() {
                return;
            }
            state.phase = SessionPhase::TornDown;
            state.draft.clear();
        }
        self.inner.teardown.send_replace(true);
        self.inner.transport.close();
        tracing::debug!("session torn down");
    }

    fn fail(
        &self,
        state: &mut SessionState,
        failure: &SessionFailure,
        events: &mut Vec<SessionEvent>,
    ) -> String {
        let message = ErrorMapper::new(&self.inner.config.error_messages).map_failure(failure);
        self.append_error(state, message.clone(), events);
        message
    }

    fn append_error(&self, state: &mut SessionState, message: String, events: &mut Vec<SessionEvent>) {
        state.append_unique(Message::system_error(message.clone()));
        events.push(SessionEvent::Error(message));
        events.push(SessionEvent::ScrollToBottom);
    }

    /// Runs one transport call under the response timeout. `None` means the
    /// session was torn down first.
    async fn bounded<F>(&self, call: F) -> Option<TransportResult>
    where
        F: Future<Output = TransportResult>,
    {
        let teardown = self.inner.teardown.subscribe();
        tokio::select! {
            result = tokio::time::timeout(self.inner.config.response_timeout, call) => {
                Some(result.unwrap_or_else(|_| Err(TransportError::Timeout)))
            }
            () = wait_for_teardown(teardown) => None,
        }
    }

    fn dispatch(&self, events: Vec<SessionEvent>) {
        for event in events {
            self.inner.sink.notify(event);
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, SessionState> {
        lock_unpoisoned(&self.inner.state)
    }
}

async fn wait_for_teardown(mut receiver: watch::Receiver<bool>) {
    if receiver.wait_for(|torn_down| *torn_down).await.is_err() {
        std::future::pending::<()>().await;
    }
}

fn response_body(result: TransportResult) -> Result<Value, SessionFailure> {
    let response = result?;
    if !response.is_success() {
        return Err(SessionFailure::Http {
            status: response.status,
        });
    }
    Ok(serde_json::from_str(&response.body)?)
}
