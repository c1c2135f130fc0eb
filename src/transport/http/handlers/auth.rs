//! `/auth/*` routes.

use crate::transport::http::error::ApiError;
use crate::transport::http::handlers::common::json_body;
use crate::transport::http::extract::AuthUser;
use crate::transport::http::types::{ApiResponse, AppState};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::Value as JsonValue;

#[utoipa::path(
    post,
    path = "/auth/signup",
    request_body = crate::transport::http::types::SignUpRequest,
    responses(
        (status = 201, description = "Account created; the first account is admin", body = ApiResponse),
        (status = 400, description = "Invalid payload or email already registered", body = ApiResponse),
        (status = 409, description = "Email already registered", body = ApiResponse)
    )
)]
pub async fn signup_handler(
    State(state): State<AppState>,
    request: Result<Json<JsonValue>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let payload = json_body(request)?;
    let profile = state.accounts.sign_up(&payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(profile).with_message("Account created")),
    ))
}

#[utoipa::path(
    post,
    path = "/auth/signin",
    request_body = crate::transport::http::types::SignInRequest,
    responses(
        (status = 200, description = "Session with bearer token", body = ApiResponse),
        (status = 400, description = "Invalid payload", body = ApiResponse),
        (status = 401, description = "Invalid credentials", body = ApiResponse)
    )
)]
pub async fn signin_handler(
    State(state): State<AppState>,
    request: Result<Json<JsonValue>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let payload = json_body(request)?;
    let session = state.accounts.sign_in(&payload).await?;
    Ok((StatusCode::OK, Json(ApiResponse::ok(session))))
}

#[utoipa::path(
    post,
    path = "/auth/signout",
    responses(
        (status = 200, description = "Token revoked", body = ApiResponse),
        (status = 401, description = "Missing or invalid token", body = ApiResponse)
    ),
    security(("bearer" = []))
)]
pub async fn signout_handler(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    state.accounts.sign_out(&user.token).await?;
    Ok((StatusCode::OK, Json(ApiResponse::message("Signed out"))))
}

#[utoipa::path(
    get,
    path = "/auth/me",
    responses(
        (status = 200, description = "The caller and their role", body = ApiResponse),
        (status = 401, description = "Missing or invalid token", body = ApiResponse)
    ),
    security(("bearer" = []))
)]
pub async fn me_handler(user: AuthUser) -> impl IntoResponse {
    (StatusCode::OK, Json(ApiResponse::ok(user.profile)))
}
