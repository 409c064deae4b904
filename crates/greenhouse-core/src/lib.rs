//! greenhouse core: storage-agnostic domain types and the shared error surface.
//!
//! This crate defines the counter naming rules, the sensor reading model and
//! the error taxonomy shared by the gateway, its storage backends and the
//! board poller. It carries no runtime or storage dependencies.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! All fallible paths surface as `GreenhouseError`/`Result`.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod clock;
pub mod counter;
pub mod error;
pub mod reading;

/// Shared result type.
pub use error::{GreenhouseError, Result};

pub use counter::{CounterName, DEFAULT_COUNTER};
pub use reading::{NewReading, SensorReading};
