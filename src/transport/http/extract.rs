//! Bearer-token authentication as an axum extractor.

use crate::app::Profile;
use crate::auth::{AuthError, Role};
use crate::transport::http::error::ApiError;
use crate::transport::http::types::AppState;
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

/// The verified caller of a request.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub profile: Profile,
    pub token: String,
}

impl AuthUser {
    pub fn require(&self, role: Role) -> Result<(), ApiError> {
        if self.profile.rol == role {
            Ok(())
        } else {
            Err(ApiError::Forbidden(role.as_str()))
        }
    }
}

pub fn bearer_token(parts: &Parts) -> Result<&str, AuthError> {
    let header = parts
        .headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingToken)?
        .to_str()
        .map_err(|_| AuthError::MalformedToken)?;
    let token = header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))
        .ok_or(AuthError::MalformedToken)?
        .trim();
    if token.is_empty() {
        return Err(AuthError::MissingToken);
    }
    Ok(token)
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?.to_string();
        let profile = state.accounts.authenticate(&token).await?;
        tracing::debug!(email = %profile.identity.email, rol = %profile.rol, "request authenticated");
        Ok(AuthUser { profile, token })
    }
}
