//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::ServerConfig;
use crate::store::MessageStore;

/// Handle passed to every request handler.
#[derive(Clone)]
pub struct AppState {
    /// The one store instance for this process.
    pub store: Arc<MessageStore>,
    /// Listener and CORS settings.
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(store: Arc<MessageStore>, config: ServerConfig) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }
}
