//! Request handlers.

use axum::{
    Json,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::Uri,
};
use chrono::{DateTime, Utc};
use parlor_protocol::{FetchQuery, HealthResponse, Message, SendMessageRequest};
use tracing::{debug, info};

use super::error::{ApiError, ApiResult};
use super::state::AppState;

/// Liveness probe with the message count and newest timestamp.
///
/// GET /health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        messages: state.store.len().await,
        latest: state.store.latest_timestamp().await,
    })
}

/// Accept a message. The store assigns id and timestamp; the stored message
/// is echoed back.
///
/// POST /api/chat/messages
pub async fn send_message(
    State(state): State<AppState>,
    payload: Result<Json<SendMessageRequest>, JsonRejection>,
) -> ApiResult<Json<Message>> {
    let Json(request) = payload?;
    let message = state.store.submit(request.content, request.sender).await;
    info!(id = %message.id, sender = %message.sender, "message submitted");
    Ok(Json(message))
}

/// Messages strictly newer than `cutoff`, oldest first. Without a cutoff the
/// full history is returned.
///
/// GET /api/chat/messages?cutoff=<RFC 3339>
pub async fn get_messages(
    State(state): State<AppState>,
    query: Result<Query<FetchQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<Message>>> {
    let Query(query) = query?;
    let cutoff = query.cutoff.unwrap_or(DateTime::<Utc>::MIN_UTC);
    let messages = state.store.fetch_since(cutoff).await;
    debug!(%cutoff, returned = messages.len(), "fetch since");
    Ok(Json(messages))
}

/// Fallback for unknown routes.
pub async fn not_found(uri: Uri) -> ApiError {
    ApiError::not_found(uri.path().to_string())
}
