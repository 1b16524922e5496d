//! The client's deduplicated copy of the message log.

use std::collections::HashSet;

use parlor_protocol::Message;
use uuid::Uuid;

/// Ordered set of messages keyed by id.
///
/// Display order is the order in which messages were first merged. A message
/// whose id is already present is ignored, whatever its other fields say.
#[derive(Debug, Default)]
pub struct LocalView {
    messages: Vec<Message>,
    ids: HashSet<Uuid>,
}

impl LocalView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert one message. Returns `false` if its id was already present.
    pub fn insert(&mut self, message: Message) -> bool {
        if !self.ids.insert(message.id) {
            return false;
        }
        self.messages.push(message);
        true
    }

    /// Insert every message whose id is new and return those, in batch order.
    pub fn merge(&mut self, batch: impl IntoIterator<Item = Message>) -> Vec<Message> {
        batch
            .into_iter()
            .filter(|message| self.insert(message.clone()))
            .collect()
    }

    /// All messages in display order.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
