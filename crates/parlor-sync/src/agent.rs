//! Polling and merge loop.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use parlor_protocol::{Message, SendMessageRequest};
use tokio::sync::{Mutex, RwLock, broadcast};
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::SyncConfig;
use crate::error::{Field, SyncError, SyncResult, TransportError};
use crate::transport::{ChatTransport, HttpTransport};
use crate::view::LocalView;

/// Capacity of the new-message broadcast channel.
const EVENT_BUFFER_SIZE: usize = 256;

/// What a scheduled tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// The poll completed; this many messages were new to the local view.
    Merged(usize),
    /// Another poll was still in flight, so this tick did nothing.
    Skipped,
    /// The fetch failed; the next tick retries from the same cutoff.
    Failed,
}

/// Keeps a local view in step with the server.
///
/// `last_check` only ever moves to a timestamp the server itself assigned, so
/// a message accepted between two polls is always strictly after the cutoff of
/// the next one. The view is the only mutable state shared with readers, and
/// merge is its only writer.
pub struct SyncAgent {
    transport: Arc<dyn ChatTransport>,
    view: RwLock<LocalView>,
    last_check: RwLock<DateTime<Utc>>,
    /// Held for the duration of a poll.
    in_flight: Mutex<()>,
    request_timeout: Duration,
    consecutive_failures: AtomicU32,
    events: broadcast::Sender<Message>,
}

impl SyncAgent {
    /// Create an agent over any transport. The first poll fetches the full
    /// history.
    pub fn new(transport: Arc<dyn ChatTransport>, request_timeout: Duration) -> Self {
        let (events, _) = broadcast::channel(EVENT_BUFFER_SIZE);
        Self {
            transport,
            view: RwLock::new(LocalView::new()),
            last_check: RwLock::new(DateTime::UNIX_EPOCH),
            in_flight: Mutex::new(()),
            request_timeout,
            consecutive_failures: AtomicU32::new(0),
            events,
        }
    }

    /// Create an agent talking HTTP to `config.server_url`.
    pub fn from_config(config: &SyncConfig) -> Result<Self, TransportError> {
        let transport = HttpTransport::from_config(config)?;
        Ok(Self::new(Arc::new(transport), config.request_timeout()))
    }

    /// Fetch everything newer than `last_check` and merge it.
    ///
    /// Waits for an in-flight poll to finish first. Returns how many messages
    /// were new. On failure `last_check` is left where it was.
    pub async fn poll(&self) -> SyncResult<usize> {
        let _guard = self.in_flight.lock().await;
        self.poll_locked().await
    }

    /// Timer entry point: poll unless a poll is already running.
    ///
    /// Fetch failures are logged and swallowed.
    pub async fn tick(&self) -> PollOutcome {
        let Ok(_guard) = self.in_flight.try_lock() else {
            debug!("poll already in flight, skipping tick");
            return PollOutcome::Skipped;
        };

        match self.poll_locked().await {
            Ok(added) => PollOutcome::Merged(added),
            Err(err) => {
                let failures = self.consecutive_failures.load(Ordering::Relaxed);
                warn!(error = %err, failures, "poll failed, retrying on next tick");
                PollOutcome::Failed
            }
        }
    }

    async fn poll_locked(&self) -> SyncResult<usize> {
        let cutoff = *self.last_check.read().await;

        let fetched = match time::timeout(self.request_timeout, self.transport.fetch_since(cutoff)).await {
            Ok(Ok(messages)) => messages,
            Ok(Err(err)) => return Err(self.fetch_failed(err)),
            Err(_) => return Err(self.fetch_failed(TransportError::Timeout(self.request_timeout))),
        };
        self.consecutive_failures.store(0, Ordering::Relaxed);

        let newest = fetched.iter().map(|m| m.timestamp).max();
        let fetched_count = fetched.len();

        let added = self.view.write().await.merge(fetched);

        if let Some(newest) = newest {
            let mut last_check = self.last_check.write().await;
            if newest > *last_check {
                *last_check = newest;
            }
        }

        debug!(
            %cutoff,
            fetched = fetched_count,
            added = added.len(),
            "merged poll results"
        );

        let count = added.len();
        for message in added {
            // No subscribers is fine.
            let _ = self.events.send(message);
        }
        Ok(count)
    }

    fn fetch_failed(&self, err: TransportError) -> SyncError {
        self.consecutive_failures.fetch_add(1, Ordering::Relaxed);
        SyncError::Fetch(err)
    }

    /// Validate and submit a message, then poll so the author sees it.
    ///
    /// Blank content or sender fails with [`SyncError::Validation`] and makes
    /// no network call. A failed submit is [`SyncError::Delivery`]. If the
    /// follow-up poll fails the message is still delivered; the next tick picks
    /// it up.
    pub async fn send(&self, content: &str, sender: &str) -> SyncResult<Message> {
        validate(content, sender)?;

        let request = SendMessageRequest::new(content, sender);
        let message = match time::timeout(self.request_timeout, self.transport.submit(request)).await {
            Ok(Ok(message)) => message,
            Ok(Err(err)) => return Err(SyncError::Delivery(err)),
            Err(_) => return Err(SyncError::Delivery(TransportError::Timeout(self.request_timeout))),
        };
        info!(id = %message.id, sender = %message.sender, "message delivered");

        if let Err(err) = self.poll().await {
            warn!(error = %err, "refresh after send failed");
        }
        Ok(message)
    }

    /// Copy of the local view in display order.
    pub async fn snapshot(&self) -> Vec<Message> {
        self.view.read().await.messages().to_vec()
    }

    /// Messages at display positions `offset..`.
    pub async fn messages_from(&self, offset: usize) -> Vec<Message> {
        let view = self.view.read().await;
        view.messages().get(offset..).unwrap_or_default().to_vec()
    }

    /// Number of messages in the local view.
    pub async fn len(&self) -> usize {
        self.view.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.view.read().await.is_empty()
    }

    /// Cutoff the next poll will use.
    pub async fn last_check(&self) -> DateTime<Utc> {
        *self.last_check.read().await
    }

    /// Receive every message as it is merged into the view.
    pub fn subscribe(&self) -> broadcast::Receiver<Message> {
        self.events.subscribe()
    }
}

/// Reject blank content or sender.
pub fn validate(content: &str, sender: &str) -> SyncResult<()> {
    if sender.trim().is_empty() {
        return Err(SyncError::Validation {
            field: Field::Sender,
        });
    }
    if content.trim().is_empty() {
        return Err(SyncError::Validation {
            field: Field::Content,
        });
    }
    Ok(())
}

/// Run [`SyncAgent::tick`] every `every` until `shutdown` is cancelled.
///
/// The first tick fires immediately. Each tick runs on its own task, so a slow
/// round trip never delays the timer; a tick that lands while a poll is still
/// running is skipped by the agent.
pub fn spawn_polling(
    agent: Arc<SyncAgent>,
    every: Duration,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = time::interval(every);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                _ = interval.tick() => {
                    let agent = agent.clone();
                    tokio::spawn(async move {
                        agent.tick().await;
                    });
                }
            }
        }
        debug!("polling stopped");
    })
}
