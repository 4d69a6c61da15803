//! Error types for the store adapters

use thiserror::Error;

/// Errors that can occur when working with the stores
#[derive(Debug, Error)]
pub enum StoreError {
    /// Error from SQLx
    #[error("Database error: {0}")]
    SqlxError(#[from] sqlx::Error),

    /// Error with the store configuration
    #[error("Store configuration error: {0}")]
    ConfigError(String),

    /// Error with database pool creation
    #[error("Database pool error: {0}")]
    PoolError(String),

    /// Error with a database query
    #[error("Database query error: {0}")]
    QueryError(String),

    /// Error encoding a JSON column
    #[error("Serialization error: {0}")]
    SerializeError(#[from] serde_json::Error),
}
