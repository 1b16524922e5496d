//! Test utilities and common setup.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, header};
use axum::response::Response;
use parlor::MessageStore;
use parlor::api::{self, AppState};
use parlor::config::ServerConfig;
use serde_json::Value;
use tower::ServiceExt;

/// Create a test application backed by a fresh store.
pub fn test_app() -> (Router, Arc<MessageStore>) {
    let store = Arc::new(MessageStore::new());
    let state = AppState::new(store.clone(), ServerConfig::default());
    (api::create_router(state), store)
}

pub async fn get(app: &Router, uri: &str) -> Response {
    app.clone()
        .oneshot(
            Request::builder()
                .uri(uri)
                .method(Method::GET)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap()
}

pub async fn post_json(app: &Router, uri: &str, body: &Value) -> Response {
    app.clone()
        .oneshot(
            Request::builder()
                .uri(uri)
                .method(Method::POST)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_string(body).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap()
}

pub async fn body_json(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}
