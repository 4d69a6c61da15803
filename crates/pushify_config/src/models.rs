// --- File: crates/pushify_config/src/models.rs ---

use serde::{Deserialize, Serialize};

// --- General Server Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

// --- Database Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DatabaseConfig {
    pub url: String, // e.g., DATABASE_URL loaded via PUSHIFY__DATABASE__URL or DATABASE_URL
    /// Logical name of the device registration table. Defaults to
    /// `device_registrations` when absent. Deployment-chosen, never request data.
    #[serde(default)]
    pub registrations_table: Option<String>,
}

// --- Push Gateway Config ---
// Holds non-secret gateway config. The API key may be given literally or as the
// "secret_from_env" marker, in which case it is read from GATEWAY_API_KEY.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct GatewayConfig {
    pub base_url: String, // Mandatory
    pub api_key: String,  // Mandatory
    /// Platform application the gateway registers device endpoints under.
    /// Required by the notification service constructor; optional here so a
    /// partially configured deployment still parses and fails with a clear error.
    #[serde(default)]
    pub platform_application_id: Option<String>,
    /// Topic used for broadcast sends. When absent, broadcast is disabled and
    /// registrations skip the topic subscription.
    #[serde(default)]
    pub broadcast_topic_id: Option<String>,
}

// --- Unified App Configuration ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    // Server config is mandatory
    pub server: ServerConfig,

    // --- Optional Feature Configurations ---
    #[serde(default)]
    pub database: Option<DatabaseConfig>,
    #[serde(default)]
    pub gateway: Option<GatewayConfig>,
}
