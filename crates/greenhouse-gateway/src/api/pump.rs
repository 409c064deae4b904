//! Pump control mock. No actuator is attached; commands are acknowledged and counted.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;

use greenhouse_core::error::{GreenhouseError, Result};

use super::error::ApiResult;
use crate::app_state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PumpAction {
    On,
    Off,
}

impl PumpAction {
    pub fn parse(raw: &str) -> Result<Self> {
        match raw {
            "on" => Ok(PumpAction::On),
            "off" => Ok(PumpAction::Off),
            other => Err(GreenhouseError::BadRequest(format!(
                "unknown pump action {other:?} (expected on|off)"
            ))),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PumpAction::On => "on",
            PumpAction::Off => "off",
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PumpResponse {
    pub pump: PumpAction,
    pub accepted: bool,
}

/// `POST /pump/:action`
pub async fn command(
    State(state): State<AppState>,
    Path(action): Path<String>,
) -> ApiResult<Json<PumpResponse>> {
    let action = PumpAction::parse(&action)?;
    state.metrics().pump_commands.inc(&[("action", action.as_str())]);
    tracing::info!(action = action.as_str(), "pump command accepted");
    Ok(Json(PumpResponse { pump: action, accepted: true }))
}
