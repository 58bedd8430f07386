use thiserror::Error;

/// Failures of the data-access layer.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("A record with this key already exists")]
    DuplicateKey,

    #[error("Record not found")]
    NotFound,

    #[error("Password hashing failed: {0}")]
    Hash(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl StoreError {
    /// Map a unique-constraint violation to `DuplicateKey`, leaving other
    /// database errors as they are.
    pub(crate) fn from_insert(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => StoreError::DuplicateKey,
            _ => StoreError::Database(err),
        }
    }
}
