//! Network seam between the agent and the message store.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parlor_protocol::{ErrorResponse, FetchQuery, MESSAGES_PATH, Message, SendMessageRequest};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;

use crate::config::SyncConfig;
use crate::error::TransportError;

/// The two store operations the agent relies on.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Submit a message; the store assigns id and timestamp.
    async fn submit(&self, request: SendMessageRequest) -> Result<Message, TransportError>;

    /// Every stored message with `timestamp > cutoff`, oldest first.
    async fn fetch_since(&self, cutoff: DateTime<Utc>) -> Result<Vec<Message>, TransportError>;
}

/// [`ChatTransport`] over the server's JSON API.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    /// Full URL of the messages route.
    messages_url: String,
}

impl HttpTransport {
    /// Create a transport for `base_url` (e.g. "http://127.0.0.1:7000").
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            messages_url: format!("{}{}", base_url.trim_end_matches('/'), MESSAGES_PATH),
        })
    }

    pub fn from_config(config: &SyncConfig) -> Result<Self, TransportError> {
        Self::new(config.base_url(), config.request_timeout())
    }

    /// Parse a success body, or turn an error status into [`TransportError::Api`].
    async fn handle_response<T: DeserializeOwned>(response: Response) -> Result<T, TransportError> {
        let status = response.status();

        if status.is_success() {
            return response
                .json()
                .await
                .map_err(|e| TransportError::Parse(e.to_string()));
        }

        let body = response.text().await.unwrap_or_default();
        match serde_json::from_str::<ErrorResponse>(&body) {
            Ok(error) => Err(TransportError::Api {
                status: status.as_u16(),
                message: error.error,
                code: error.code,
            }),
            Err(_) => Err(TransportError::Api {
                status: status.as_u16(),
                message: body,
                code: status
                    .canonical_reason()
                    .unwrap_or("UNKNOWN")
                    .to_uppercase()
                    .replace(' ', "_"),
            }),
        }
    }
}

#[async_trait]
impl ChatTransport for HttpTransport {
    async fn submit(&self, request: SendMessageRequest) -> Result<Message, TransportError> {
        let response = self
            .client
            .post(&self.messages_url)
            .json(&request)
            .send()
            .await?;

        Self::handle_response(response).await
    }

    async fn fetch_since(&self, cutoff: DateTime<Utc>) -> Result<Vec<Message>, TransportError> {
        let response = self
            .client
            .get(&self.messages_url)
            .query(&FetchQuery::since(cutoff))
            .send()
            .await?;

        Self::handle_response(response).await
    }
}
