// --- File: crates/pushify_common/src/services.rs ---
//! Service abstractions for external collaborators.
//!
//! This module provides trait definitions for the push gateway and the two
//! stores the notification service depends on. The traits allow for
//! dependency injection and easier testing by decoupling the orchestration
//! logic from specific implementations.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::error::Error as StdError;
use std::fmt;
use std::future::Future;
use std::pin::Pin;

use crate::models::{
    DeviceRegistration, NotificationMessage, NotificationPreferences, Platform, PushProfile,
};

/// Type alias for a boxed future that returns a Result
pub type BoxFuture<'a, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'a>>;

/// Type alias for a boxed future with an infallible output
pub type BoxInfallibleFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A wrapper error type that implements std::error::Error for Box<dyn std::error::Error + Send + Sync>
#[derive(Debug)]
pub struct BoxedError(pub Box<dyn StdError + Send + Sync>);

impl fmt::Display for BoxedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl StdError for BoxedError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.0.source()
    }
}

impl From<Box<dyn StdError + Send + Sync>> for BoxedError {
    fn from(err: Box<dyn StdError + Send + Sync>) -> Self {
        BoxedError(err)
    }
}

/// A trait for push gateway operations.
///
/// This trait defines the operations the managed push-delivery service
/// exposes: device endpoints, broadcast topics, topic subscriptions, and
/// message publishing. Implementations do not retry; failures propagate
/// unchanged to the caller.
pub trait PushGateway: Send + Sync {
    /// Error type returned by gateway operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Register a device token under a platform application, returning the
    /// new endpoint id. `user_data` is attached as opaque string attributes.
    fn create_endpoint(
        &self,
        application_id: &str,
        device_token: &str,
        user_data: &HashMap<String, String>,
    ) -> BoxFuture<'_, String, Self::Error>;

    /// Delete a device endpoint.
    fn delete_endpoint(&self, endpoint_id: &str) -> BoxFuture<'_, (), Self::Error>;

    /// Read the attributes stored on an endpoint.
    fn endpoint_attributes(
        &self,
        endpoint_id: &str,
    ) -> BoxFuture<'_, HashMap<String, String>, Self::Error>;

    /// Replace attributes stored on an endpoint.
    fn set_endpoint_attributes(
        &self,
        endpoint_id: &str,
        attributes: &HashMap<String, String>,
    ) -> BoxFuture<'_, (), Self::Error>;

    /// Publish a notification to a single endpoint, formatted for the given
    /// platform name. Returns the gateway message id.
    fn publish(
        &self,
        endpoint_id: &str,
        message: &NotificationMessage,
        platform: &str,
    ) -> BoxFuture<'_, String, Self::Error>;

    /// Publish a notification to every subscriber of a topic.
    fn publish_to_topic(
        &self,
        topic_id: &str,
        message: &NotificationMessage,
    ) -> BoxFuture<'_, String, Self::Error>;

    /// Create (or return) a named broadcast topic.
    fn create_topic(&self, name: &str) -> BoxFuture<'_, String, Self::Error>;

    /// Subscribe an endpoint to a topic, returning the subscription id.
    fn subscribe(&self, topic_id: &str, endpoint_id: &str) -> BoxFuture<'_, String, Self::Error>;

    /// Remove a topic subscription.
    fn unsubscribe(&self, subscription_id: &str) -> BoxFuture<'_, (), Self::Error>;

    /// List the platform applications visible to the configured credentials.
    fn list_applications(&self) -> BoxFuture<'_, Vec<PlatformApplication>, Self::Error>;

    /// Report whether the gateway is reachable with the configured
    /// credentials. Never fails; any error maps to `false`.
    fn check_configuration(&self) -> BoxInfallibleFuture<'_, bool>;

    /// Publish to many endpoints sequentially, each formatted for its own
    /// platform. One failing endpoint never aborts the rest; the outcome for
    /// every target is captured in the returned entries.
    fn send_bulk(
        &self,
        targets: &[BulkTarget],
        message: &NotificationMessage,
    ) -> BoxInfallibleFuture<'_, Vec<BulkSendEntry>>;
}

/// A trait for the device registration store.
///
/// Persists one record per registration attempt against the key-value
/// registration table; at most one record per user is active.
pub trait RegistrationStore: Send + Sync {
    /// Error type returned by registration store operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Persist a registration record.
    fn save(
        &self,
        registration: DeviceRegistration,
    ) -> BoxFuture<'_, DeviceRegistration, Self::Error>;

    /// The user's current (active) registration, if any.
    fn find_active_by_user(
        &self,
        user_id: &str,
    ) -> BoxFuture<'_, Option<DeviceRegistration>, Self::Error>;

    /// Every registration record for a user, newest first.
    fn find_by_user(&self, user_id: &str) -> BoxFuture<'_, Vec<DeviceRegistration>, Self::Error>;

    /// Mark all of a user's active registrations revoked. Returns the number
    /// of rows touched.
    fn revoke_for_user(&self, user_id: &str) -> BoxFuture<'_, u64, Self::Error>;
}

/// A trait for the per-user push profile store.
///
/// The wider user document lives elsewhere; this store owns only the push
/// sub-document (enabled flag, token, platform, endpoint, preferences).
pub trait PushProfileStore: Send + Sync {
    /// Error type returned by profile store operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load a user's push profile. `None` means the user is unknown to the
    /// push system entirely.
    fn load(&self, user_id: &str) -> BoxFuture<'_, Option<PushProfile>, Self::Error>;

    /// Record a successful registration: enable push and store the token,
    /// platform, and endpoint.
    fn activate(
        &self,
        user_id: &str,
        device_token: &str,
        platform: Platform,
        endpoint_id: &str,
    ) -> BoxFuture<'_, (), Self::Error>;

    /// Disable push and clear the token, platform, and endpoint. Preferences
    /// survive deactivation.
    fn deactivate(&self, user_id: &str) -> BoxFuture<'_, (), Self::Error>;

    /// Overwrite the user's preferences, returning the saved value.
    fn set_preferences(
        &self,
        user_id: &str,
        preferences: NotificationPreferences,
    ) -> BoxFuture<'_, NotificationPreferences, Self::Error>;
}

/// A platform application visible at the gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformApplication {
    /// The gateway's identifier for the application.
    pub application_id: String,
    /// Human-readable application name.
    pub name: String,
    /// The platform the application delivers to.
    pub platform: String,
}

/// One recipient of a bulk send, carrying its own platform so mixed-platform
/// batches format every message correctly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkTarget {
    pub endpoint_id: String,
    pub platform: String,
}

/// Outcome of one endpoint within a bulk send.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkSendEntry {
    pub endpoint_id: String,
    pub success: bool,
    /// The gateway message id when the publish succeeded.
    pub message_id: Option<String>,
    /// The gateway error text when it failed.
    pub error: Option<String>,
}
