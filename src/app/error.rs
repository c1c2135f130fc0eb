use crate::auth::AuthError;
use crate::rules::{BusinessRuleOutcome, CheckError};
use crate::storage::StoreError;
use crate::validation::ValidationResult;
use thiserror::Error;

/// Why a service operation did not complete.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Unknown entity '{0}'")]
    UnknownEntity(String),

    /// The payload failed schema validation; nothing was looked up or written.
    #[error("Validation failed")]
    Validation(ValidationResult),

    /// The payload is well-formed but conflicts with persisted data.
    #[error("Business rule violation")]
    BusinessRule(BusinessRuleOutcome),

    #[error("{entity} {id} not found")]
    NotFound { entity: String, id: String },

    #[error(transparent)]
    Check(#[from] CheckError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Auth(#[from] AuthError),
}

pub type ServiceResult<T> = Result<T, ServiceError>;
