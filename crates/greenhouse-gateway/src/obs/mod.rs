//! Lightweight in-process metrics.
//!
//! Metrics are stored as atomics, fed by the request tracking layer and the
//! handlers, and rendered in Prometheus text format by `/metrics`.

pub mod http;
pub mod metrics;

pub use http::track_requests;
pub use metrics::GatewayMetrics;
