//! Public HTTP API: counters, sensor readings and the pump mock.

pub mod counter;
pub mod error;
pub mod pump;
pub mod sensor;

use axum::Json;
use serde_json::{json, Value};

pub use error::{ApiError, ApiResult};

/// `GET /hello`
pub async fn hello() -> Json<Value> {
    Json(json!({ "message": "Hello, World!" }))
}
