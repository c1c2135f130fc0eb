use crate::transport::http::error::ApiError;
use crate::transport::http::extract::AuthUser;
use crate::transport::http::types::{ApiResponse, AppState, ResumenQuery};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

#[utoipa::path(
    get,
    path = "/api/reportes/resumen",
    params(ResumenQuery),
    responses(
        (status = 200, description = "Farm summary for the range", body = ApiResponse),
        (status = 400, description = "Malformed or inverted dates", body = ApiResponse),
        (status = 401, description = "Missing or invalid token", body = ApiResponse)
    ),
    security(("bearer" = []))
)]
pub async fn resumen_handler(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(query): Query<ResumenQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let resumen = state
        .reports
        .resumen(query.desde.as_deref(), query.hasta.as_deref())
        .await?;
    Ok((StatusCode::OK, Json(ApiResponse::ok(resumen))))
}
