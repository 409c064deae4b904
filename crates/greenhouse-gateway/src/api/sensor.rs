//! Sensor ingestion and latest/history queries.
//!
//! Every read goes to the store; there is no in-process "latest" cache, so
//! several gateway instances over one database agree and restarts lose nothing.

use axum::{
    extract::{rejection::JsonRejection, rejection::QueryRejection, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use greenhouse_core::error::GreenhouseError;
use greenhouse_core::{NewReading, SensorReading};

use super::error::ApiResult;
use crate::app_state::AppState;

const DEFAULT_HISTORY_LIMIT: usize = 100;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HistoryQuery {
    pub limit: Option<usize>,
}

/// `POST /sensor`
pub async fn ingest(
    State(state): State<AppState>,
    body: Result<Json<NewReading>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<SensorReading>)> {
    let Json(reading) =
        body.map_err(|e| GreenhouseError::BadRequest(format!("invalid reading: {e}")))?;
    let stored = state.store().insert(reading).await?;

    state.metrics().readings_ingested.inc(&[("sensor_id", &stored.sensor_id)]);
    tracing::debug!(id = stored.id, sensor_id = %stored.sensor_id, "reading stored");
    Ok((StatusCode::CREATED, Json(stored)))
}

/// `GET /sensor/latest`: JSON `null` when nothing has been stored.
pub async fn latest(State(state): State<AppState>) -> ApiResult<Json<Option<SensorReading>>> {
    Ok(Json(state.store().latest().await?))
}

/// `GET /sensor/history?limit=N`: newest first, limit clamped to the configured maximum.
pub async fn history(
    State(state): State<AppState>,
    query: Result<Query<HistoryQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<SensorReading>>> {
    let Query(q) = query.map_err(|e| GreenhouseError::BadRequest(format!("invalid query: {e}")))?;
    let max = state.cfg().storage.history_max_limit;
    let limit = q.limit.unwrap_or(DEFAULT_HISTORY_LIMIT).clamp(1, max);
    Ok(Json(state.store().history(limit).await?))
}
