//! Database integration for Pushify
//!
//! This crate provides a database client that is designed to be database
//! agnostic, using SQLx as the underlying database library. It supports
//! SQLite, PostgreSQL, and MySQL databases through feature flags, plus the
//! SQL-backed implementations of the registration and push profile stores.
//!
//! # Features
//!
//! - Database agnostic design
//! - Connection pooling
//! - Integration with the Pushify configuration system
//! - Support for SQLite, PostgreSQL, and MySQL
//!
//! # Usage
//!
//! Add the crate to your dependencies:
//!
//! ```toml
//! [dependencies]
//! pushify-db = { version = "0.1.0" }
//! ```
//!
//! To use a specific database backend:
//!
//! ```toml
//! [dependencies]
//! pushify-db = { version = "0.1.0", features = ["postgres"] }
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use pushify_db::DbClient;
//!
//! async fn setup_db() -> Result<DbClient, Box<dyn std::error::Error>> {
//!     let db_client = DbClient::from_url("sqlite://data/pushify.db").await?;
//!     Ok(db_client)
//! }
//! ```

pub mod client;
pub mod error;
pub mod repositories;

// Re-export the client and error type for ease of use
pub use client::DbClient;
pub use error::StoreError;

// Re-export the store implementations for ease of use
pub use repositories::{SqlPushProfileStore, SqlRegistrationStore};
pub use repositories::registration_store_sql::DEFAULT_REGISTRATIONS_TABLE;
