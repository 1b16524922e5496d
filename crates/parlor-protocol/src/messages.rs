//! The chat message record.

use std::hash::{Hash, Hasher};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A chat message as accepted by the store.
///
/// Equality and hashing look at `id` only. Two values with the same id are the
/// same message regardless of the other fields; content is never compared.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Assigned by the store at acceptance.
    pub id: Uuid,

    /// Text payload.
    pub content: String,

    /// Display name of the author.
    pub sender: String,

    /// Server time of acceptance. Strictly increasing within one store.
    pub timestamp: DateTime<Utc>,
}

impl PartialEq for Message {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Message {}

impl Hash for Message {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
