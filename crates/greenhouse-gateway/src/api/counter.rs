//! Counter endpoints.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;

use greenhouse_core::error::{GreenhouseError, Result};
use greenhouse_core::CounterName;

use super::error::ApiResult;
use crate::app_state::AppState;

#[derive(Debug, Serialize)]
pub struct CountResponse {
    pub count: u64,
}

#[derive(Debug, Serialize)]
pub struct NamedCountResponse {
    pub name: CounterName,
    pub count: u64,
}

#[derive(Debug, Serialize)]
pub struct CounterValueResponse {
    pub name: CounterName,
    pub value: u64,
}

/// `GET /count`: increment the `global` counter.
pub async fn count_global(State(state): State<AppState>) -> ApiResult<Json<CountResponse>> {
    let count = increment(&state, &CounterName::default()).await?;
    Ok(Json(CountResponse { count }))
}

/// `GET /count/:name`
pub async fn count_named(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Json<NamedCountResponse>> {
    let name = CounterName::parse(name)?;
    let count = increment(&state, &name).await?;
    Ok(Json(NamedCountResponse { name, count }))
}

/// `GET /counters/:name`: read without incrementing.
pub async fn counter_value(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Json<CounterValueResponse>> {
    let name = CounterName::parse(name)?;
    let value = state
        .store()
        .current(&name)
        .await?
        .ok_or_else(|| GreenhouseError::NotFound(format!("counter {name}")))?;
    Ok(Json(CounterValueResponse { name, value }))
}

async fn increment(state: &AppState, name: &CounterName) -> Result<u64> {
    let value = state.store().increment_and_get(name).await?;
    state.metrics().counter_increments.inc(&[]);
    Ok(value)
}
