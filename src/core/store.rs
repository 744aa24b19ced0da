//! Ordered message collection.
//!
//! Invariants: ids are unique among stored messages, and at most one
//! typing placeholder is present. Storage order is insertion order; reversed
//! presentation is a read-time view only.

use std::collections::HashSet;

use thiserror::Error;

use crate::core::message::{Message, MessageId, MessageRole, MessageStatus};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("message id '{0}' is already present")]
    DuplicateId(MessageId),
    #[error("a typing placeholder ('{0}') is already present")]
    PlaceholderExists(MessageId),
}

#[derive(Debug, Clone, Default)]
pub struct MessageStore {
    messages: Vec<Message>,
}

impl MessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn get(&self, id: &MessageId) -> Option<&Message> {
        self.messages.iter().find(|message| &message.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter()
    }

    pub fn to_vec(&self) -> Vec<Message> {
        self.messages.clone()
    }

    /// Snapshot in presentation order.
    pub fn view(&self, reversed: bool) -> Vec<Message> {
        if reversed {
            self.messages.iter().rev().cloned().collect()
        } else {
            self.to_vec()
        }
    }

    pub fn placeholder_id(&self) -> Option<&MessageId> {
        self.messages
            .iter()
            .find(|message| message.is_placeholder())
            .map(|message| &message.id)
    }

    pub fn append(&mut self, message: Message) -> Result<(), StoreError> {
        if self.get(&message.id).is_some() {
            return Err(StoreError::DuplicateId(message.id));
        }
        if message.role == MessageRole::TypingPlaceholder {
            if let Some(existing) = self.placeholder_id() {
                return Err(StoreError::PlaceholderExists(existing.clone()));
            }
        }
        self.messages.push(message);
        Ok(())
    }

    /// Removes at most one entry; returns it when found.
    pub fn remove_by_id(&mut self, id: &MessageId) -> Option<Message> {
        let index = self.messages.iter().position(|message| &message.id == id)?;
        Some(self.messages.remove(index))
    }

    /// Clears and repopulates, dropping entries that would break the store
    /// invariants. Returns how many entries were dropped.
    pub fn replace_all(&mut self, messages: impl IntoIterator<Item = Message>) -> usize {
        self.messages.clear();

        let mut seen = HashSet::new();
        let mut has_placeholder = false;
        let mut dropped = 0;
        for message in messages {
            let is_placeholder = message.is_placeholder();
            if !seen.insert(message.id.clone()) || (is_placeholder && has_placeholder) {
                dropped += 1;
                continue;
            }
            has_placeholder |= is_placeholder;
            self.messages.push(message);
        }

        if dropped > 0 {
            tracing::warn!(dropped, kept = self.messages.len(), "replace_all dropped conflicting messages");
        }
        dropped
    }

    /// Updates the status of one message. Returns false when the id is unknown.
    pub fn set_status(&mut self, id: &MessageId, status: MessageStatus) -> bool {
        match self.messages.iter_mut().find(|message| &message.id == id) {
            Some(message) => {
                message.status = status;
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }
}
