use thiserror::Error;

/// Failures surfaced by repository implementations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique constraint rejected the write.
    #[error("unique constraint violated: {0}")]
    Unique(String),

    /// A foreign key constraint rejected the write or delete.
    #[error("foreign key constraint violated: {0}")]
    ForeignKey(String),

    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Classify a sqlx error by its Postgres SQLSTATE code.
pub fn map_sqlx_error(e: sqlx::Error) -> StoreError {
    match e {
        sqlx::Error::Database(db_err) => {
            let constraint = db_err.constraint().unwrap_or_default().to_string();
            match db_err.code().as_deref() {
                Some("23505") => StoreError::Unique(constraint),
                Some("23503") => StoreError::ForeignKey(constraint),
                Some(code) => StoreError::Backend(format!("database error ({}): {}", code, db_err)),
                None => StoreError::Backend(db_err.to_string()),
            }
        }
        sqlx::Error::PoolTimedOut => {
            StoreError::Backend("database connection pool timeout".to_string())
        }
        other => StoreError::Backend(other.to_string()),
    }
}
