//! Liveness, readiness and metrics for the gateway.
//!
//! Readiness means "new counter and sensor traffic can be served": the
//! process is not draining and the store answers a read. Liveness never
//! touches storage.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};

use greenhouse_core::clock::now_millis;
use greenhouse_core::CounterName;

use crate::app_state::AppState;

const PROMETHEUS_TEXT: &str = "text/plain; version=0.0.4; charset=utf-8";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    Ready,
    Draining,
    StorageUnavailable,
}

impl Readiness {
    /// Draining wins over storage state; the store is only read when the
    /// gateway still accepts traffic.
    pub async fn check(state: &AppState) -> Self {
        if state.is_draining() {
            return Readiness::Draining;
        }
        match state.store().current(&CounterName::default()).await {
            Ok(_) => Readiness::Ready,
            Err(e) => {
                tracing::warn!(error = %e, "readiness: store did not answer");
                Readiness::StorageUnavailable
            }
        }
    }

    pub fn status(self) -> StatusCode {
        match self {
            Readiness::Ready => StatusCode::OK,
            Readiness::Draining | Readiness::StorageUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Readiness::Ready => "ready",
            Readiness::Draining => "draining",
            Readiness::StorageUnavailable => "storage unavailable",
        }
    }
}

pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

pub async fn readyz(State(state): State<AppState>) -> impl IntoResponse {
    let readiness = Readiness::check(&state).await;
    (readiness.status(), readiness.as_str())
}

/// Process gauges appended after the registry families.
fn process_gauges(state: &AppState, now_ms: u64) -> [(&'static str, u64); 3] {
    let started = state.started_at_ms();
    [
        ("greenhouse_started_at_ms", started),
        ("greenhouse_uptime_ms", now_ms.saturating_sub(started)),
        ("greenhouse_history_max_limit", state.cfg().storage.history_max_limit as u64),
    ]
}

pub async fn metrics(State(state): State<AppState>) -> Response {
    let body = state.metrics().render(&process_gauges(&state, now_millis()));
    (StatusCode::OK, [(header::CONTENT_TYPE, PROMETHEUS_TEXT)], body).into_response()
}
