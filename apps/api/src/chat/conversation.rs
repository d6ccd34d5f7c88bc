//! Ordered message history used as generation context.
//!
//! History is append-only while a flow runs. The only in-place edits are on
//! the assistant placeholder of an in-flight turn, which is either filled with
//! the final text or removed when the request fails.

use chrono::Utc;

use crate::chat::message::{Message, MessageId, Role, StoredMessage};

#[derive(Debug, Default, Clone)]
pub struct Conversation {
    messages: Vec<StoredMessage>,
    next_id: u64,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a message and returns its identifier.
    ///
    /// Identifiers keep increasing across `reset` so a renderer never sees a
    /// key reused for a different message.
    pub fn append(&mut self, role: Role, content: impl Into<String>) -> MessageId {
        let id = MessageId(self.next_id);
        self.next_id += 1;
        self.messages.push(StoredMessage {
            id,
            message: Message::new(role, content),
            created_at: Utc::now(),
        });
        id
    }

    /// Replaces the content of an existing message. Returns false if the id is unknown.
    pub fn update(&mut self, id: MessageId, content: impl Into<String>) -> bool {
        match self.messages.iter_mut().find(|m| m.id == id) {
            Some(stored) => {
                stored.message.content = content.into();
                true
            }
            None => false,
        }
    }

    /// Removes a message, returning it if it was present.
    pub fn remove(&mut self, id: MessageId) -> Option<StoredMessage> {
        let index = self.messages.iter().position(|m| m.id == id)?;
        Some(self.messages.remove(index))
    }

    pub fn reset(&mut self) {
        self.messages.clear();
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn messages(&self) -> &[StoredMessage] {
        &self.messages
    }

    /// Role/content pairs in order, as sent with every generation request.
    pub fn history(&self) -> Vec<Message> {
        self.messages.iter().map(|m| m.message.clone()).collect()
    }

    pub fn last(&self) -> Option<&StoredMessage> {
        self.messages.last()
    }

    pub fn last_user_message(&self) -> Option<&StoredMessage> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.message.role == Role::User)
    }
}
