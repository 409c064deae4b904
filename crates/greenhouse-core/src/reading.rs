//! Sensor reading model.
//!
//! Readings arrive from field devices as [`NewReading`] and are persisted as
//! [`SensorReading`] with a store-assigned id. Timestamps are UTC epoch
//! milliseconds; presentation layers convert to local time.

use serde::{Deserialize, Serialize};

use crate::error::{GreenhouseError, Result};

/// Sensor id used when a device does not identify itself.
pub const DEFAULT_SENSOR_ID: &str = "default";

const MAX_SENSOR_ID_LEN: usize = 64;

/// Largest timestamp a store can hold (signed 64-bit INTEGER column).
pub const MAX_RECORDED_AT_MS: u64 = i64::MAX as u64;

/// Reading as submitted by a device.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewReading {
    #[serde(default)]
    pub sensor_id: Option<String>,
    /// Celsius.
    #[serde(default, alias = "temp")]
    pub temperature: Option<f64>,
    /// Relative humidity, percent.
    #[serde(default)]
    pub humidity: Option<f64>,
    /// Percent.
    #[serde(default)]
    pub soil_moisture: Option<f64>,
    /// Percent of tank.
    #[serde(default)]
    pub water_level: Option<f64>,
    /// Device-side capture time; the server stamps it when absent.
    #[serde(default)]
    pub recorded_at_ms: Option<u64>,
}

impl NewReading {
    /// Check the reading carries at least one finite metric, a usable id and
    /// a storable timestamp.
    pub fn validate(&self) -> Result<()> {
        if let Some(id) = &self.sensor_id {
            if id.is_empty() || id.len() > MAX_SENSOR_ID_LEN {
                return Err(GreenhouseError::BadRequest(format!(
                    "sensor_id must be 1..={MAX_SENSOR_ID_LEN} bytes"
                )));
            }
        }
        if matches!(self.recorded_at_ms, Some(ms) if ms > MAX_RECORDED_AT_MS) {
            return Err(GreenhouseError::BadRequest(format!(
                "recorded_at_ms must be <= {MAX_RECORDED_AT_MS}"
            )));
        }

        let metrics = [
            ("temperature", self.temperature),
            ("humidity", self.humidity),
            ("soil_moisture", self.soil_moisture),
            ("water_level", self.water_level),
        ];
        if metrics.iter().all(|(_, v)| v.is_none()) {
            return Err(GreenhouseError::BadRequest(
                "reading must carry at least one metric".into(),
            ));
        }
        for (field, v) in metrics {
            if matches!(v, Some(x) if !x.is_finite()) {
                return Err(GreenhouseError::BadRequest(format!("{field} must be finite")));
            }
        }
        Ok(())
    }

    pub fn sensor_id_or_default(&self) -> &str {
        self.sensor_id.as_deref().unwrap_or(DEFAULT_SENSOR_ID)
    }

    /// Capture time, falling back to `now_ms`.
    pub fn recorded_at_or(&self, now_ms: u64) -> u64 {
        self.recorded_at_ms.unwrap_or(now_ms)
    }
}

/// Reading as persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    /// Monotonic store key; breaks ties between equal timestamps.
    pub id: u64,
    pub sensor_id: String,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub soil_moisture: Option<f64>,
    pub water_level: Option<f64>,
    pub recorded_at_ms: u64,
}

impl SensorReading {
    /// Build the stored form of a validated reading.
    pub fn from_new(id: u64, new: &NewReading, recorded_at_ms: u64) -> Self {
        Self {
            id,
            sensor_id: new.sensor_id_or_default().to_string(),
            temperature: new.temperature,
            humidity: new.humidity,
            soil_moisture: new.soil_moisture,
            water_level: new.water_level,
            recorded_at_ms,
        }
    }

    /// Ordering key for "most recent": newer time first, then higher id.
    pub fn recency_key(&self) -> (u64, u64) {
        (self.recorded_at_ms, self.id)
    }
}
