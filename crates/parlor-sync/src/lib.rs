//! Client-side synchronization for Parlor.
//!
//! A [`SyncAgent`] keeps a local, deduplicated copy of the server's message
//! log. A recurring task ([`spawn_polling`]) asks the server for everything
//! newer than the last timestamp it has seen and merges the answer by message
//! id, so overlapping or repeated polls are harmless. Locally authored
//! messages go out through [`SyncAgent::send`] (or a [`Draft`], which keeps
//! the text around when delivery fails) and are followed by an immediate poll.
//!
//! The network sits behind the [`ChatTransport`] trait; [`HttpTransport`] is
//! the production implementation.

mod agent;
mod config;
mod draft;
mod error;
mod transport;
mod view;

pub use agent::{PollOutcome, SyncAgent, spawn_polling, validate};
pub use config::SyncConfig;
pub use draft::{Draft, OutboundState};
pub use error::{Field, SyncError, SyncResult, TransportError};
pub use transport::{ChatTransport, HttpTransport};
pub use view::LocalView;
