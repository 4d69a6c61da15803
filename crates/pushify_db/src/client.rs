//! Database client for Pushify
//!
//! This module provides a database client that is designed to be database agnostic,
//! using SQLx as the underlying database library.

use crate::error::StoreError;
use pushify_config::{AppConfig, DatabaseConfig};
use sqlx::pool::PoolOptions;
use sqlx::Pool;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

/// Database client for Pushify
///
/// This client provides a database-agnostic interface to the database,
/// using SQLx as the underlying database library.
#[derive(Debug, Clone)]
pub struct DbClient {
    /// The database connection pool
    pool: Pool<sqlx::Any>,
}

impl DbClient {
    /// Create a new database client from the application configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the `database` section is missing, the URL is
    /// empty, or the connection fails.
    pub async fn new(config: &Arc<AppConfig>) -> Result<Self, StoreError> {
        let db_config = config.database.as_ref().ok_or_else(|| {
            StoreError::ConfigError("Database configuration is missing".to_string())
        })?;

        Self::from_config(db_config).await
    }

    /// Create a new database client from a database configuration.
    pub async fn from_config(db_config: &DatabaseConfig) -> Result<Self, StoreError> {
        Self::from_url(&db_config.url).await
    }

    /// Create a new database client from a database URL.
    pub async fn from_url(db_url: &str) -> Result<Self, StoreError> {
        if db_url.is_empty() {
            return Err(StoreError::ConfigError("Database URL is empty".to_string()));
        }

        let pool = Self::create_pool(db_url).await?;
        Ok(Self { pool })
    }

    /// Create the connection pool behind the client.
    async fn create_pool(db_url: &str) -> Result<Pool<sqlx::Any>, StoreError> {
        debug!("Creating database pool with URL: {}", db_url);

        // Register every driver compiled in via the sqlite/postgres/mysql
        // features with the Any driver.
        sqlx::any::install_default_drivers();

        let pool_options = PoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .idle_timeout(Duration::from_secs(600));

        // AnyConnectOptions cannot express create_if_missing, so file-backed
        // SQLite databases get their directory and file created up front.
        if let Some(db_path) = sqlite_file_path(db_url) {
            if let Some(dir) = std::path::Path::new(&db_path).parent() {
                if !dir.exists() {
                    debug!("Creating directory for SQLite database: {:?}", dir);
                    std::fs::create_dir_all(dir).map_err(|e| {
                        error!("Failed to create directory for SQLite database: {}", e);
                        StoreError::PoolError(format!("Failed to create directory: {}", e))
                    })?;
                }
            }

            if !std::path::Path::new(&db_path).exists() {
                debug!("Creating empty SQLite database file: {}", db_path);
                std::fs::File::create(&db_path).map_err(|e| {
                    error!("Failed to create SQLite database file: {}", e);
                    StoreError::PoolError(format!("Failed to create database file: {}", e))
                })?;
            }
        }

        let pool = pool_options
            .connect_with(sqlx::any::AnyConnectOptions::from_str(db_url)?)
            .await
            .map_err(|e| {
                error!("Failed to create database pool: {}", e);
                StoreError::PoolError(e.to_string())
            })?;

        info!("Database pool created successfully");
        Ok(pool)
    }

    /// Get the database connection pool.
    pub fn pool(&self) -> &Pool<sqlx::Any> {
        &self.pool
    }

    /// Execute a query that returns no rows, returning the number of rows
    /// affected.
    pub async fn execute(&self, query: &str) -> Result<u64, StoreError> {
        sqlx::query(query)
            .execute(&self.pool)
            .await
            .map(|r| r.rows_affected())
            .map_err(|e| StoreError::QueryError(e.to_string()))
    }

    /// Check if the database is healthy by executing a trivial query.
    pub async fn is_healthy(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

/// The filesystem path of a file-backed SQLite URL, if that is what this is.
fn sqlite_file_path(db_url: &str) -> Option<String> {
    let path = db_url
        .strip_prefix("sqlite://")
        .or_else(|| db_url.strip_prefix("sqlite:"))?;

    if path.is_empty() || path.contains(":memory:") || path.starts_with('?') {
        return None;
    }

    // Strip query parameters like ?mode=rwc
    let path = path.split('?').next().unwrap_or(path);
    Some(path.to_string())
}
