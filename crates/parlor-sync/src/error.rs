//! Client error types.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// Result type for agent operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors surfaced by [`SyncAgent`](crate::SyncAgent).
#[derive(Debug, Error)]
pub enum SyncError {
    /// Blank input, caught before any network call.
    #[error("{field} must not be blank")]
    Validation { field: Field },

    /// Submitting a message failed. The caller keeps the input and may retry.
    #[error("message delivery failed: {0}")]
    Delivery(#[source] TransportError),

    /// A poll failed. Transient; the next scheduled poll retries.
    #[error("fetching messages failed: {0}")]
    Fetch(#[source] TransportError),
}

impl SyncError {
    /// Whether simply trying again may succeed.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::Validation { .. })
    }
}

/// Input field named by a validation error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Content,
    Sender,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Content => write!(f, "content"),
            Self::Sender => write!(f, "sender"),
        }
    }
}

/// Errors from a [`ChatTransport`](crate::ChatTransport).
#[derive(Debug, Error)]
pub enum TransportError {
    /// HTTP request failed (connect, I/O, client timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Server answered with a structured error body.
    #[error("server error {status}: {message} (code: {code})")]
    Api {
        status: u16,
        message: String,
        code: String,
    },

    /// Failed to parse a response.
    #[error("failed to parse response: {0}")]
    Parse(String),

    /// The operation did not finish within the agent's deadline.
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    /// The transport cannot reach its store.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}
