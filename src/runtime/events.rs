//! Lifecycle notifications raised by the controller.

use std::sync::{Arc, Mutex};

use tokio::sync::mpsc::UnboundedSender;

use crate::core::message::Message;
use crate::runtime::lock_unpoisoned;

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    MessageSent(Message),
    MessageReceived(Message),
    Error(String),
    ScrollToBottom,
    /// Close/dismiss signal from the renderer. Not a controller transition.
    CloseRequested,
}

/// Receives controller events, always outside the controller's lock.
pub trait NotificationSink: Send + Sync + 'static {
    fn notify(&self, event: SessionEvent);
}

impl NotificationSink for UnboundedSender<SessionEvent> {
    fn notify(&self, event: SessionEvent) {
        if self.send(event).is_err() {
            tracing::debug!("session event dropped: receiver closed");
        }
    }
}

impl<F> NotificationSink for F
where
    F: Fn(SessionEvent) + Send + Sync + 'static,
{
    fn notify(&self, event: SessionEvent) {
        self(event)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl NotificationSink for NoopSink {
    fn notify(&self, _event: SessionEvent) {}
}

/// Recording sink; clones share one log.
#[derive(Debug, Default, Clone)]
pub struct EventLog {
    events: Arc<Mutex<Vec<SessionEvent>>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<SessionEvent> {
        lock_unpoisoned(&self.events).clone()
    }

    pub fn take(&self) -> Vec<SessionEvent> {
        std::mem::take(&mut *lock_unpoisoned(&self.events))
    }

    pub fn len(&self) -> usize {
        lock_unpoisoned(&self.events).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl NotificationSink for EventLog {
    fn notify(&self, event: SessionEvent) {
        lock_unpoisoned(&self.events).push(event);
    }
}
