//! # Auth Errors
//!
//! Error types for the authentication collaborator.

use crate::storage::StoreError;
use thiserror::Error;

/// Result type for auth operations
pub type AuthResult<T> = Result<T, AuthError>;

#[derive(Debug, Clone, Error)]
pub enum AuthError {
    /// Unknown email or wrong password (deliberately indistinguishable)
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Email already registered")]
    EmailAlreadyExists,

    #[error("Authentication required")]
    MissingToken,

    #[error("Malformed token")]
    MalformedToken,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token signature")]
    InvalidSignature,

    #[error("Session has been signed out")]
    TokenRevoked,

    #[error("Internal error: password hashing failed")]
    HashingFailed,

    #[error("Internal error: token generation failed")]
    TokenGenerationFailed,

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),
}

impl AuthError {
    /// Returns the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            AuthError::MalformedToken => 400,

            AuthError::InvalidCredentials
            | AuthError::MissingToken
            | AuthError::TokenExpired
            | AuthError::InvalidSignature
            | AuthError::TokenRevoked => 401,

            AuthError::EmailAlreadyExists => 409,

            AuthError::HashingFailed
            | AuthError::TokenGenerationFailed
            | AuthError::Storage(_) => 500,
        }
    }
}
