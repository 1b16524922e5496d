//! In-memory, append-only message log.
//!
//! The store is the single source of truth for every message. It assigns ids
//! and timestamps on acceptance and answers "everything after T" queries. One
//! instance is created at startup and shared as `Arc<MessageStore>`; nothing
//! survives a restart.

mod clock;

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use parlor_protocol::Message;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

pub use clock::MonotonicClock;

/// Authoritative message log.
///
/// Writes are serialized by the write lock, so id generation, timestamp
/// assignment and the append happen as one step. Reads clone the requested
/// tail under the read lock and never observe a half-appended message.
#[derive(Debug, Default)]
pub struct MessageStore {
    inner: RwLock<StoreInner>,
}

#[derive(Debug, Default)]
struct StoreInner {
    /// Sorted by timestamp, strictly increasing.
    messages: Vec<Message>,
    ids: HashSet<Uuid>,
    clock: MonotonicClock,
}

impl MessageStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept a message. Assigns a fresh id and the acceptance timestamp.
    ///
    /// Content and sender are stored as given, empty strings included.
    pub async fn submit(&self, content: impl Into<String>, sender: impl Into<String>) -> Message {
        let content = content.into();
        let sender = sender.into();

        let mut inner = self.inner.write().await;

        let mut id = Uuid::new_v4();
        while inner.ids.contains(&id) {
            id = Uuid::new_v4();
        }
        let timestamp = inner.clock.tick();

        let message = Message {
            id,
            content,
            sender,
            timestamp,
        };
        inner.ids.insert(id);
        inner.messages.push(message.clone());

        debug!(
            id = %message.id,
            sender = %message.sender,
            total = inner.messages.len(),
            "accepted message"
        );
        message
    }

    /// All messages with `timestamp > cutoff`, in insertion order.
    ///
    /// The result is a detached copy. A cutoff at or before the first message
    /// (for example `DateTime::<Utc>::MIN_UTC` or the Unix epoch) returns the
    /// full history.
    pub async fn fetch_since(&self, cutoff: DateTime<Utc>) -> Vec<Message> {
        let inner = self.inner.read().await;
        let start = inner.messages.partition_point(|m| m.timestamp <= cutoff);
        inner.messages[start..].to_vec()
    }

    /// Number of stored messages.
    pub async fn len(&self) -> usize {
        self.inner.read().await.messages.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.messages.is_empty()
    }

    /// Timestamp of the newest message, if any.
    pub async fn latest_timestamp(&self) -> Option<DateTime<Utc>> {
        self.inner.read().await.clock.last()
    }
}
