//! Store implementations backed by the database client
//!
//! The store traits themselves live in `pushify_common::services`; this
//! module provides their SQL implementations.

pub mod push_profile_store_sql;
pub mod registration_store_sql;

pub use push_profile_store_sql::SqlPushProfileStore;
pub use registration_store_sql::SqlRegistrationStore;
