//! Error type returned by every handler; renders the `ApiResponse` envelope.

use crate::app::ServiceError;
use crate::auth::AuthError;
use crate::rules::CheckError;
use crate::storage::StoreError;
use crate::transport::http::types::ApiResponse;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

const INTERNAL_MESSAGE: &str = "Internal server error";

/// Marks a response whose body carries internal error detail.
#[derive(Debug, Clone, Copy)]
struct InternalDetail;

/// Response mapper installed by the router; `production` comes from [`AppState`].
///
/// [`AppState`]: crate::transport::http::AppState
pub async fn redact_internal_errors(State(production): State<bool>, response: Response) -> Response {
    if !production || response.extensions().get::<InternalDetail>().is_none() {
        return response;
    }
    (response.status(), Json(ApiResponse::failure(INTERNAL_MESSAGE))).into_response()
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{message}")]
    Invalid {
        message: String,
        errors: Vec<String>,
        warnings: Vec<String>,
    },

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Only {0} users may do this")]
    Forbidden(&'static str),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UniqueViolation { constraint } => {
                ApiError::Conflict(format!("Duplicate value violates unique constraint {}", constraint))
            }
            StoreError::ForeignKeyViolation { detail } => {
                ApiError::BadRequest(format!("Referenced record does not exist: {}", detail))
            }
            StoreError::InvalidQuery(msg) => ApiError::BadRequest(msg),
            StoreError::NotFound { table } => ApiError::NotFound(format!("No matching record in {}", table)),
            other @ StoreError::Backend(_) => ApiError::Internal(other.into()),
        }
    }
}

impl From<CheckError> for ApiError {
    fn from(err: CheckError) -> Self {
        ApiError::Internal(anyhow::Error::new(err).context("Could not verify business rules"))
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::UnknownEntity(name) => ApiError::NotFound(format!("Unknown entity '{}'", name)),
            ServiceError::Validation(result) => ApiError::Invalid {
                message: "Validation failed".to_string(),
                warnings: result.warnings().to_vec(),
                errors: result.into_errors(),
            },
            ServiceError::BusinessRule(outcome) => ApiError::Invalid {
                message: "Business rule violation".to_string(),
                warnings: outcome.warnings().to_vec(),
                errors: outcome.into_errors(),
            },
            e @ ServiceError::NotFound { .. } => ApiError::NotFound(e.to_string()),
            ServiceError::Check(e) => e.into(),
            ServiceError::Store(e) => e.into(),
            ServiceError::Auth(e) => e.into(),
        }
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Invalid { .. } | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::Auth(e) => {
                StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            }
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = ?self, "request failed");
        }

        let body = match self {
            ApiError::Invalid {
                message,
                errors,
                warnings,
            } => ApiResponse::failure(message)
                .with_errors(errors)
                .with_warnings(warnings),
            ApiError::Internal(e) => ApiResponse::failure(format!("{:#}", e)),
            other => ApiResponse::failure(other.to_string()),
        };
        let mut response = (status, Json(body)).into_response();
        if status.is_server_error() {
            response.extensions_mut().insert(InternalDetail);
        }
        response
    }
}
