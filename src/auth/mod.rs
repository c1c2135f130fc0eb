//! # Auth Module
//!
//! Identity for the API: who is calling (`AuthProvider`) and what they may
//! do (`roles`). The HTTP layer only sees the trait, so the local
//! argon2 + JWT implementation can be swapped for a hosted provider.

pub mod crypto;
pub mod errors;
pub mod jwt;
pub mod local;
pub mod roles;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub use errors::{AuthError, AuthResult};
pub use jwt::{JwtClaims, JwtConfig, JwtManager};
pub use local::LocalAuth;
pub use roles::{resolve_role, Role};

/// An authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Identity {
    pub user_id: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Session {
    pub access_token: String,
    pub token_type: String,
    /// Unix epoch seconds
    pub expires_at: i64,
    pub user: Identity,
}

#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Resolves a bearer token to the identity it was issued for.
    async fn verify(&self, token: &str) -> AuthResult<Identity>;

    async fn sign_up(&self, email: &str, password: &str) -> AuthResult<Identity>;

    async fn sign_in(&self, email: &str, password: &str) -> AuthResult<Session>;

    /// Invalidates the token. Signing out twice is not an error.
    async fn sign_out(&self, token: &str) -> AuthResult<()>;
}

/// Emails are compared case-insensitively and without surrounding blanks.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
