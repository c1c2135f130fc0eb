use crate::transport::http::error::ApiError;
use axum::extract::rejection::JsonRejection;
use axum::Json;
use serde_json::Value as JsonValue;

/// Unwraps a JSON body, turning axum's rejection into the API error envelope.
pub fn json_body(request: Result<Json<JsonValue>, JsonRejection>) -> Result<JsonValue, ApiError> {
    request
        .map(|Json(v)| v)
        .map_err(|e| ApiError::BadRequest(format!("Invalid JSON body: {}", e.body_text())))
}
