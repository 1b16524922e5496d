//! Wire types for Parlor chat communication.
//!
//! Both the server (`parlor`) and the sync client (`parlor-sync`) speak this
//! protocol:
//!
//! ```text
//! SyncAgent --[POST /api/chat/messages]--> MessageStore   (write path)
//! SyncAgent --[GET  /api/chat/messages?cutoff=T]--> MessageStore   (read path)
//! ```
//!
//! Messages are identified by a server-assigned UUID and ordered by a
//! server-assigned UTC timestamp. Clients never choose either.

pub mod api;
pub mod messages;

pub use api::{ErrorResponse, FetchQuery, HealthResponse, SendMessageRequest};
pub use messages::Message;

/// Route serving both submit (POST) and fetch-since (GET).
pub const MESSAGES_PATH: &str = "/api/chat/messages";

/// Liveness route.
pub const HEALTH_PATH: &str = "/health";
