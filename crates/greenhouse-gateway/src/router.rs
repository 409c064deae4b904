//! Axum router wiring.

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::{api, app_state::AppState, obs, ops};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/hello", get(api::hello))
        .route("/count", get(api::counter::count_global))
        .route("/count/:name", get(api::counter::count_named))
        .route("/counters/:name", get(api::counter::counter_value))
        .route("/sensor", post(api::sensor::ingest))
        .route("/sensor/latest", get(api::sensor::latest))
        .route("/sensor/history", get(api::sensor::history))
        .route("/pump/:action", post(api::pump::command))
        .route("/healthz", get(ops::healthz))
        .route("/readyz", get(ops::readyz))
        .route("/metrics", get(ops::metrics))
        .route_layer(middleware::from_fn_with_state(state.clone(), obs::track_requests))
        .with_state(state)
}
