//! HTTP mapping of the shared error type.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use greenhouse_core::error::{ClientCode, GreenhouseError};

/// Handler error: wraps [`GreenhouseError`] and renders it as
/// `{"error": {"code": ..., "msg": ...}}`.
///
/// The [`ClientCode`] is attached to the response extensions so the request
/// tracking layer can count storage failures.
#[derive(Debug)]
pub struct ApiError(pub GreenhouseError);

impl From<GreenhouseError> for ApiError {
    fn from(e: GreenhouseError) -> Self {
        Self(e)
    }
}

pub fn status_for(code: ClientCode) -> StatusCode {
    match code {
        ClientCode::BadRequest | ClientCode::UnsupportedVersion => StatusCode::BAD_REQUEST,
        ClientCode::NotFound => StatusCode::NOT_FOUND,
        ClientCode::TransactionConflict => StatusCode::CONFLICT,
        ClientCode::StorageUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ClientCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let code = self.0.client_code();
        let status = status_for(code);

        if code.is_retryable() || status.is_server_error() {
            tracing::warn!(code = code.as_str(), error = %self.0, "request failed");
        } else {
            tracing::debug!(code = code.as_str(), error = %self.0, "request rejected");
        }

        let body = Json(json!({
            "error": {
                "code": code.as_str(),
                "msg": self.0.to_string(),
            }
        }));
        let mut resp = (status, body).into_response();
        resp.extensions_mut().insert(code);
        resp
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;
