// --- File: crates/pushify_common/src/http.rs ---
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::error::HttpStatusCode;

// Include the client module
pub mod client;

/// Extension trait for converting a domain error into an Axum HTTP response.
///
/// Blanket-implemented for every error that knows its status code, so
/// handlers can write `err.into_http_response()` without per-crate glue.
pub trait IntoHttpResponse {
    /// Converts the error into an Axum HTTP response.
    fn into_http_response(&self) -> Response;
}

impl<E> IntoHttpResponse for E
where
    E: HttpStatusCode + std::fmt::Display,
{
    fn into_http_response(&self) -> Response {
        let status_code =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let error_message = self.to_string();

        // Create a JSON response with the error message
        let body = Json(json!({
            "error": {
                "message": error_message,
                "code": status_code.as_u16(),
            }
        }));

        // Combine the status code and body into a response
        (status_code, body).into_response()
    }
}
