//! HTTP API module.
//!
//! Exposes the message store as submit-message and fetch-since endpoints.

mod error;
mod handlers;
mod routes;
mod state;

pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
