//! Generic CRUD routes: `/api/{entity}` and `/api/{entity}/{id}`.

use crate::app::ListParams;
use crate::auth::Role;
use crate::transport::http::error::ApiError;
use crate::transport::http::handlers::common::json_body;
use crate::transport::http::extract::AuthUser;
use crate::transport::http::types::{ApiResponse, AppState};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::Value as JsonValue;
use std::collections::HashMap;

#[utoipa::path(
    get,
    path = "/api/{entity}",
    params(
        ("entity" = String, Path, description = "Entity name (e.g. aves, jaulas, huevos)"),
        ("limit" = Option<u32>, Query, description = "Page size (default 50, max 500)"),
        ("offset" = Option<u32>, Query, description = "Rows to skip"),
        ("order_by" = Option<String>, Query, description = "Field to order by (default: id)"),
        ("direction" = Option<String>, Query, description = "asc | desc (default desc)")
    ),
    responses(
        (status = 200, description = "Matching records", body = ApiResponse),
        (status = 400, description = "Unknown filter field or bad paging", body = ApiResponse),
        (status = 401, description = "Missing or invalid token", body = ApiResponse),
        (status = 404, description = "Unknown entity", body = ApiResponse)
    ),
    security(("bearer" = []))
)]
pub async fn list_records_handler(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(entity): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, ApiError> {
    let params = ListParams::from_query(&query).map_err(crate::app::ServiceError::Validation)?;
    let rows = state.records.list(&entity, &params).await?;
    Ok((StatusCode::OK, Json(ApiResponse::ok(rows))))
}

#[utoipa::path(
    get,
    path = "/api/{entity}/{id}",
    params(
        ("entity" = String, Path, description = "Entity name"),
        ("id" = String, Path, description = "Record key")
    ),
    responses(
        (status = 200, description = "The record", body = ApiResponse),
        (status = 404, description = "No such record", body = ApiResponse)
    ),
    security(("bearer" = []))
)]
pub async fn get_record_handler(
    State(state): State<AppState>,
    _user: AuthUser,
    Path((entity, id)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let record = state.records.get(&entity, &id).await?;
    Ok((StatusCode::OK, Json(ApiResponse::ok(record))))
}

#[utoipa::path(
    post,
    path = "/api/{entity}",
    params(("entity" = String, Path, description = "Entity name")),
    request_body(content = Object, description = "Record fields"),
    responses(
        (status = 201, description = "Record created", body = ApiResponse),
        (status = 400, description = "Validation failure or business rule violation", body = ApiResponse),
        (status = 409, description = "Duplicate value", body = ApiResponse),
        (status = 500, description = "Business rules could not be verified", body = ApiResponse)
    ),
    security(("bearer" = []))
)]
pub async fn create_record_handler(
    State(state): State<AppState>,
    user: AuthUser,
    Path(entity): Path<String>,
    request: Result<Json<JsonValue>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let payload = json_body(request)?;
    let saved = state.records.create(&entity, &payload).await?;
    tracing::info!(entity = %entity, by = %user.profile.identity.email, "create accepted");
    Ok((
        StatusCode::CREATED,
        Json(
            ApiResponse::ok(saved.record)
                .with_message(format!("{} record created", entity))
                .with_warnings(saved.warnings),
        ),
    ))
}

#[utoipa::path(
    put,
    path = "/api/{entity}/{id}",
    params(
        ("entity" = String, Path, description = "Entity name"),
        ("id" = String, Path, description = "Record key")
    ),
    request_body(content = Object, description = "Fields to change"),
    responses(
        (status = 200, description = "Record updated", body = ApiResponse),
        (status = 400, description = "Validation failure or business rule violation", body = ApiResponse),
        (status = 404, description = "No such record", body = ApiResponse),
        (status = 409, description = "Duplicate value", body = ApiResponse)
    ),
    security(("bearer" = []))
)]
pub async fn update_record_handler(
    State(state): State<AppState>,
    user: AuthUser,
    Path((entity, id)): Path<(String, String)>,
    request: Result<Json<JsonValue>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let payload = json_body(request)?;
    let saved = state.records.update(&entity, &id, &payload).await?;
    tracing::info!(entity = %entity, id = %id, by = %user.profile.identity.email, "update accepted");
    Ok((
        StatusCode::OK,
        Json(
            ApiResponse::ok(saved.record)
                .with_message(format!("{} record updated", entity))
                .with_warnings(saved.warnings),
        ),
    ))
}

#[utoipa::path(
    delete,
    path = "/api/{entity}/{id}",
    params(
        ("entity" = String, Path, description = "Entity name"),
        ("id" = String, Path, description = "Record key")
    ),
    responses(
        (status = 200, description = "Record deleted", body = ApiResponse),
        (status = 403, description = "Caller is not an admin", body = ApiResponse),
        (status = 404, description = "No such record", body = ApiResponse)
    ),
    security(("bearer" = []))
)]
pub async fn delete_record_handler(
    State(state): State<AppState>,
    user: AuthUser,
    Path((entity, id)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    user.require(Role::Admin)?;
    state.records.delete(&entity, &id).await?;
    tracing::info!(entity = %entity, id = %id, by = %user.profile.identity.email, "record deleted");
    Ok((
        StatusCode::OK,
        Json(ApiResponse::message(format!("{} {} deleted", entity, id))),
    ))
}
