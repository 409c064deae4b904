//! Per-request accounting layer.

use std::time::Instant;

use axum::{
    extract::{MatchedPath, Request, State},
    middleware::Next,
    response::Response,
};

use greenhouse_core::error::ClientCode;

use crate::app_state::AppState;

/// Records request count and latency per route template, and counts
/// storage failures surfaced by handlers.
///
/// Installed with `route_layer` so `MatchedPath` is already resolved.
pub async fn track_requests(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or_else(|| "unmatched".to_owned());
    let started = Instant::now();

    let resp = next.run(req).await;

    let metrics = state.metrics();
    metrics.observe_request(&route, resp.status().as_u16(), started.elapsed());
    if let Some(code) = resp.extensions().get::<ClientCode>() {
        if code.is_retryable() {
            metrics.storage_errors.inc(&[("code", code.as_str())]);
        }
    }
    resp
}
