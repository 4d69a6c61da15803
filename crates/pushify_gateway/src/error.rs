// --- File: crates/pushify_gateway/src/error.rs ---
use thiserror::Error;

/// Errors that can occur when talking to the push gateway.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Error during the HTTP request to the gateway
    #[error("HTTP request error: {0}")]
    RequestError(#[from] reqwest::Error),

    /// Non-success response returned by the gateway API
    #[error("Gateway API error ({status_code}): {message}")]
    ApiError { status_code: u16, message: String },

    /// Response body could not be decoded
    #[error("Failed to parse gateway response: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Missing required configuration
    #[error("Missing configuration: {0}")]
    ConfigError(String),
}
