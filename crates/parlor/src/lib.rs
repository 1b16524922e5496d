//! Parlor server library.
//!
//! Holds the authoritative message log and exposes it over HTTP. The binary in
//! `main.rs` wires these pieces together; integration tests and the sync
//! client's end-to-end tests build the router directly.

pub mod api;
pub mod config;
pub mod store;

pub use store::MessageStore;
