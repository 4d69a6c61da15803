//! Push notification orchestration for Pushify
//!
//! This crate ties the push gateway and the persistence layer together
//! behind an HTTP API: device registration and unregistration, targeted and
//! bulk sends, broadcasts, per-user preferences, and templated notifications
//! triggered by application events.
//!
//! # Features
//!
//! - Device registration with rollback when a step fails partway
//! - Single active endpoint per user; re-registration replaces the old one
//! - Targeted, bulk, and broadcast sends with per-platform payloads
//! - Six built-in event templates (messages, followers, projects, events,
//!   likes, replies) gated on per-user preferences
//! - Opt-outs and unregistered users are skips, never failures
//! - Integration with Axum for HTTP API endpoints
//! - OpenAPI/Swagger documentation (with the `openapi` feature)
//!
//! # Usage
//!
//! Add the crate to your dependencies:
//!
//! ```toml
//! [dependencies]
//! pushify-notify = { version = "0.1.0" }
//! ```
//!
//! To enable OpenAPI documentation:
//!
//! ```toml
//! [dependencies]
//! pushify-notify = { version = "0.1.0", features = ["openapi"] }
//! ```

pub mod error;
pub mod handlers;
pub mod routes;
pub mod service;
pub mod templates;

#[cfg(feature = "openapi")]
pub mod doc;

// Re-export the routes function to be used by the main backend service
pub use routes::routes;
// Re-export the orchestrator and its result types
pub use error::NotifyError;
pub use service::{PushNotificationService, SendOutcome};

#[cfg(feature = "openapi")]
pub mod openapi {
    pub use crate::doc::NotifyApiDoc;
}
