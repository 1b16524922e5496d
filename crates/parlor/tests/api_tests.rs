//! API integration tests.

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
};
use parlor_protocol::{HealthResponse, Message};
use serde_json::json;
use tower::ServiceExt;

mod common;
use common::{body_json, get, post_json, test_app};

fn encode(ts: &chrono::DateTime<chrono::Utc>) -> String {
    ts.to_rfc3339_opts(chrono::SecondsFormat::Micros, true)
}

/// Health endpoint reports status, store size and newest timestamp.
#[tokio::test]
async fn test_health_endpoint() {
    let (app, store) = test_app();
    store.submit("hello", "alice").await;
    let newest = store.submit("again", "bob").await;

    let response = get(&app, "/health").await;
    assert_eq!(response.status(), StatusCode::OK);

    let health: HealthResponse = serde_json::from_value(body_json(response).await).unwrap();
    assert_eq!(health.status, "ok");
    assert_eq!(health.version, env!("CARGO_PKG_VERSION"));
    assert_eq!(health.messages, 2);
    assert_eq!(health.latest, Some(newest.timestamp));
}

#[tokio::test]
async fn test_health_on_empty_store_omits_latest() {
    let (app, _store) = test_app();

    let json = body_json(get(&app, "/health").await).await;
    assert_eq!(json["messages"], 0);
    assert!(json.get("latest").is_none());
}

/// Posting a message returns it with server-assigned fields.
#[tokio::test]
async fn test_send_message_assigns_id_and_timestamp() {
    let (app, store) = test_app();

    let response = post_json(
        &app,
        "/api/chat/messages",
        &json!({ "content": "hi", "sender": "alice" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["content"], "hi");
    assert_eq!(json["sender"], "alice");
    assert!(json["id"].is_string());
    assert!(json["timestamp"].is_string());
    assert_eq!(store.len().await, 1);
}

/// Client-supplied id and timestamp are ignored.
#[tokio::test]
async fn test_send_message_ignores_client_identity() {
    let (app, _store) = test_app();

    let response = post_json(
        &app,
        "/api/chat/messages",
        &json!({
            "id": "00000000-0000-0000-0000-000000000000",
            "timestamp": "1999-01-01T00:00:00Z",
            "content": "spoof",
            "sender": "mallory"
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let message: Message = serde_json::from_value(body_json(response).await).unwrap();
    assert_ne!(message.id.to_string(), "00000000-0000-0000-0000-000000000000");
    assert!(message.timestamp.timestamp() > 946_684_800);
}

/// The store accepts blank fields; validation is the client's job.
#[tokio::test]
async fn test_send_message_accepts_blank_fields() {
    let (app, store) = test_app();

    let response = post_json(&app, "/api/chat/messages", &json!({})).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(store.len().await, 1);
}

/// Malformed JSON is rejected with a structured error.
#[tokio::test]
async fn test_send_message_rejects_malformed_body() {
    let (app, store) = test_app();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/chat/messages")
                .method(Method::POST)
                .header("content-type", "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "BAD_REQUEST");
    assert!(store.is_empty().await);
}

/// Missing content type is reported as 415.
#[tokio::test]
async fn test_send_message_requires_json_content_type() {
    let (app, _store) = test_app();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/chat/messages")
                .method(Method::POST)
                .body(Body::from(r#"{"content":"hi","sender":"alice"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    let json = body_json(response).await;
    assert_eq!(json["code"], "UNSUPPORTED_MEDIA_TYPE");
}

/// Without a cutoff the full history comes back in order.
#[tokio::test]
async fn test_get_messages_full_history() {
    let (app, store) = test_app();
    let a = store.submit("one", "alice").await;
    let b = store.submit("two", "bob").await;

    let response = get(&app, "/api/chat/messages").await;
    assert_eq!(response.status(), StatusCode::OK);

    let messages: Vec<Message> = serde_json::from_value(body_json(response).await).unwrap();
    assert_eq!(messages, vec![a, b]);
}

/// Only messages strictly after the cutoff are returned.
#[tokio::test]
async fn test_get_messages_since_cutoff() {
    let (app, store) = test_app();
    let a = store.submit("one", "alice").await;
    let b = store.submit("two", "bob").await;
    let c = store.submit("three", "carol").await;

    let uri = format!("/api/chat/messages?cutoff={}", encode(&a.timestamp));
    let response = get(&app, &uri).await;
    assert_eq!(response.status(), StatusCode::OK);

    let messages: Vec<Message> = serde_json::from_value(body_json(response).await).unwrap();
    assert_eq!(messages, vec![b, c.clone()]);
    assert_eq!(messages[1].content, c.content);

    let uri = format!("/api/chat/messages?cutoff={}", encode(&c.timestamp));
    let messages: Vec<Message> =
        serde_json::from_value(body_json(get(&app, &uri).await).await).unwrap();
    assert!(messages.is_empty());
}

/// An epoch cutoff returns everything.
#[tokio::test]
async fn test_get_messages_epoch_cutoff() {
    let (app, store) = test_app();
    store.submit("one", "alice").await;
    store.submit("two", "bob").await;

    let response = get(&app, "/api/chat/messages?cutoff=1970-01-01T00:00:00Z").await;
    let messages: Vec<Message> = serde_json::from_value(body_json(response).await).unwrap();
    assert_eq!(messages.len(), 2);
}

/// An unparsable cutoff is a 400 with a structured body.
#[tokio::test]
async fn test_get_messages_rejects_bad_cutoff() {
    let (app, _store) = test_app();

    let response = get(&app, "/api/chat/messages?cutoff=yesterday").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["code"], "BAD_REQUEST");
    assert!(json["error"].as_str().unwrap().starts_with("Bad request"));
}

/// Posting then fetching over HTTP round-trips the message.
#[tokio::test]
async fn test_post_then_fetch_round_trip() {
    let (app, _store) = test_app();

    let posted = post_json(
        &app,
        "/api/chat/messages",
        &json!({ "content": "hi", "sender": "alice" }),
    )
    .await;
    let posted: Message = serde_json::from_value(body_json(posted).await).unwrap();

    let fetched: Vec<Message> =
        serde_json::from_value(body_json(get(&app, "/api/chat/messages").await).await).unwrap();
    assert_eq!(fetched.len(), 1);
    assert_eq!(fetched[0], posted);
    assert_eq!(fetched[0].timestamp, posted.timestamp);
}

/// Unknown routes get a structured 404.
#[tokio::test]
async fn test_unknown_route_not_found() {
    let (app, _store) = test_app();

    let response = get(&app, "/api/chat/rooms").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["code"], "NOT_FOUND");
}
