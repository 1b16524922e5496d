//! Outbound message being composed.

use parlor_protocol::Message;

use crate::agent::{SyncAgent, validate};
use crate::error::SyncResult;

/// Lifecycle of one outbound message.
///
/// `Composed -> Validated -> Submitting -> Delivered | Failed`. A draft that
/// fails validation stays `Composed`; a `Failed` draft keeps its content and
/// goes back to `Composed` when edited or resubmitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutboundState {
    Composed,
    Validated,
    Submitting,
    Delivered,
    Failed,
}

/// Input field plus author name, as a chat UI would hold them.
#[derive(Debug, Clone)]
pub struct Draft {
    sender: String,
    content: String,
    state: OutboundState,
}

impl Draft {
    pub fn new(sender: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
            content: String::new(),
            state: OutboundState::Composed,
        }
    }

    pub fn sender(&self) -> &str {
        &self.sender
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn state(&self) -> OutboundState {
        self.state
    }

    pub fn set_sender(&mut self, sender: impl Into<String>) {
        self.sender = sender.into();
        self.state = OutboundState::Composed;
    }

    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
        self.state = OutboundState::Composed;
    }

    /// Validate without sending. Moves to `Validated` on success and back to
    /// `Composed` otherwise.
    pub fn check(&mut self) -> SyncResult<()> {
        self.state = OutboundState::Composed;
        validate(&self.content, &self.sender)?;
        self.state = OutboundState::Validated;
        Ok(())
    }

    /// Send the current content through `agent`.
    ///
    /// The content is cleared only once the message is delivered. Any error
    /// leaves it in place so the caller can resubmit.
    pub async fn submit(&mut self, agent: &SyncAgent) -> SyncResult<Message> {
        self.check()?;

        self.state = OutboundState::Submitting;
        match agent.send(&self.content, &self.sender).await {
            Ok(message) => {
                self.content.clear();
                self.state = OutboundState::Delivered;
                Ok(message)
            }
            Err(err) => {
                self.state = OutboundState::Failed;
                Err(err)
            }
        }
    }
}
