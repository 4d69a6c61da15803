// --- File: crates/pushify_common/src/lib.rs ---

// Declare modules within this crate
pub mod error; // Error handling
pub mod http; // HTTP utilities
pub mod logging; // Logging utilities
pub mod models; // Shared data structures
pub mod services; // Service abstractions

// Re-export error types and utilities for easier access
pub use error::HttpStatusCode;

// Re-export HTTP utilities for easier access
pub use http::{
    client::{create_client, HTTP_CLIENT},
    IntoHttpResponse,
};

// Re-export the service seam types used throughout the workspace
pub use services::{BoxFuture, BoxedError};

// This crate provides common functionality that can be used across the application.
// It includes shared models, service traits, error handling, and HTTP utilities.
