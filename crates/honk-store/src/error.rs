//! Store adapter error types

use honk_core::DomainError;

/// Error type for store adapter operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Failed to create Redis pool: {0}")]
    CreatePool(String),

    #[error("Failed to get connection from pool: {0}")]
    GetConnection(#[from] deadpool_redis::PoolError),

    #[error("Redis command error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Corrupt room record: {0}")]
    CorruptRecord(String),
}

/// Result type for store adapter operations
pub type StoreErrorResult<T> = Result<T, StoreError>;

impl From<StoreError> for DomainError {
    fn from(err: StoreError) -> Self {
        DomainError::Store(err.to_string())
    }
}
