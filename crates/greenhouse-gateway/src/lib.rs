//! greenhouse gateway library entry.
//!
//! Wires config, storage backends, the HTTP API, ops endpoints, metrics and
//! the board poller. Consumed by the two binaries and by integration tests.

pub mod api;
pub mod app_state;
pub mod board;
pub mod config;
pub mod obs;
pub mod ops;
pub mod router;
pub mod store;
