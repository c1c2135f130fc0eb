use thiserror::Error;

pub type StoreResult<T> = Result<T, StoreError>;

/// Failures reported by the persistence collaborator.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("no matching row in {table}")]
    NotFound { table: String },

    #[error("unique constraint violated: {constraint}")]
    UniqueViolation { constraint: String },

    #[error("foreign key violation: {detail}")]
    ForeignKeyViolation { detail: String },

    #[error("invalid query: {0}")]
    InvalidQuery(String),

    #[error("storage backend error: {0}")]
    Backend(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => StoreError::NotFound {
                table: "unknown".to_string(),
            },
            sqlx::Error::Database(db) => match db.code().as_deref() {
                Some("23505") => StoreError::UniqueViolation {
                    constraint: db.constraint().unwrap_or("unique").to_string(),
                },
                Some("23503") => StoreError::ForeignKeyViolation {
                    detail: db.message().to_string(),
                },
                // undefined_table / undefined_column / invalid_text_representation
                Some("42P01") | Some("42703") | Some("22P02") => {
                    StoreError::InvalidQuery(db.message().to_string())
                }
                _ => StoreError::Backend(err.to_string()),
            },
            _ => StoreError::Backend(err.to_string()),
        }
    }
}
