use sqlx::Error as SqlxError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Database error: {0}")]
    Sqlx(#[from] SqlxError),

    #[error("Custom: {0}")]
    Custom(String),
}

impl RepositoryError {
    /// The pool could not hand out a connection in time.
    pub fn is_pool_exhausted(&self) -> bool {
        matches!(
            self,
            RepositoryError::Sqlx(SqlxError::PoolTimedOut | SqlxError::PoolClosed)
        )
    }
}
