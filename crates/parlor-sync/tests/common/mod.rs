//! Test utilities and common setup.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parlor::MessageStore;
use parlor::api::{self, AppState};
use parlor::config::ServerConfig;
use parlor_protocol::{Message, SendMessageRequest};
use parlor_sync::{ChatTransport, SyncAgent, TransportError};
use tokio::net::TcpListener;

/// Calls straight into a [`MessageStore`], with switches to simulate outages.
#[derive(Default)]
pub struct InProcessTransport {
    pub store: Arc<MessageStore>,
    pub submits: AtomicUsize,
    pub fetches: AtomicUsize,
    pub fail_submit: AtomicBool,
    pub fail_fetch: AtomicBool,
}

impl InProcessTransport {
    pub fn new(store: Arc<MessageStore>) -> Self {
        Self {
            store,
            ..Self::default()
        }
    }

    pub fn set_fail_submit(&self, fail: bool) {
        self.fail_submit.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_fetch(&self, fail: bool) {
        self.fail_fetch.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl ChatTransport for InProcessTransport {
    async fn submit(&self, request: SendMessageRequest) -> Result<Message, TransportError> {
        self.submits.fetch_add(1, Ordering::SeqCst);
        if self.fail_submit.load(Ordering::SeqCst) {
            return Err(TransportError::Unavailable("submit disabled".to_string()));
        }
        Ok(self.store.submit(request.content, request.sender).await)
    }

    async fn fetch_since(&self, cutoff: DateTime<Utc>) -> Result<Vec<Message>, TransportError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.fail_fetch.load(Ordering::SeqCst) {
            return Err(TransportError::Unavailable("fetch disabled".to_string()));
        }
        Ok(self.store.fetch_since(cutoff).await)
    }
}

/// An agent wired to a fresh store through [`InProcessTransport`].
pub fn in_process_agent() -> (Arc<SyncAgent>, Arc<InProcessTransport>, Arc<MessageStore>) {
    let store = Arc::new(MessageStore::new());
    let transport = Arc::new(InProcessTransport::new(store.clone()));
    let agent = Arc::new(SyncAgent::new(transport.clone(), Duration::from_secs(5)));
    (agent, transport, store)
}

/// Serve the real router on an ephemeral port. Returns the base URL.
pub async fn spawn_server() -> (String, Arc<MessageStore>) {
    let store = Arc::new(MessageStore::new());
    let state = AppState::new(store.clone(), ServerConfig::default());
    let app = api::create_router(state);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}"), store)
}

/// Ids in display order.
pub fn ids(messages: &[Message]) -> Vec<uuid::Uuid> {
    messages.iter().map(|m| m.id).collect()
}
