//! Error types for the notification service

use pushify_common::error::HttpStatusCode;
use pushify_common::services::BoxedError;
use thiserror::Error;

/// Errors that can occur while orchestrating notifications.
///
/// Gateway and store failures arrive through the trait objects as
/// [`BoxedError`]s and keep their source chain; the variants here only add
/// which collaborator failed, which drives the HTTP status mapping.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// Error related to missing or invalid configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Error from the push gateway
    #[error("Push gateway error: {0}")]
    GatewayError(#[source] BoxedError),

    /// Error from the registration or profile store
    #[error("Storage error: {0}")]
    StoreError(#[source] BoxedError),

    /// The user is unknown to the push system
    #[error("User not found: {0}")]
    UserNotFound(String),

    /// The user has no device registered
    #[error("No device registered for user: {0}")]
    NotRegistered(String),
}

impl HttpStatusCode for NotifyError {
    fn status_code(&self) -> u16 {
        match self {
            NotifyError::ConfigError(_) => 500,
            NotifyError::GatewayError(_) => 502,
            NotifyError::StoreError(_) => 500,
            NotifyError::UserNotFound(_) => 404,
            NotifyError::NotRegistered(_) => 400,
        }
    }
}
