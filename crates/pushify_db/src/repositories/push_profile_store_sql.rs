//! SQL implementation of the per-user push profile store
//!
//! One row per user in the `push_profiles` table, holding the push-facing
//! slice of the user record: enabled flag, current token and endpoint, and
//! notification preferences. Rows are created lazily on first activation or
//! preference update.

use crate::error::StoreError;
use crate::DbClient;
use chrono::Utc;
use pushify_common::models::{NotificationPreferences, Platform, PushProfile};
use pushify_common::services::{BoxFuture, PushProfileStore};
use sqlx::Row;
use tracing::{debug, error, info};

const PROFILES_TABLE: &str = "push_profiles";

/// SQL implementation of the push profile store.
#[derive(Debug, Clone)]
pub struct SqlPushProfileStore {
    /// The database client
    db_client: DbClient,
}

impl SqlPushProfileStore {
    /// Create a new SQL push profile store.
    pub fn new(db_client: DbClient) -> Self {
        Self { db_client }
    }

    /// Create the profile table if it does not exist.
    pub async fn init_schema(&self) -> Result<(), StoreError> {
        debug!("Initializing push profile schema");

        let create_table = format!(
            r#"
            CREATE TABLE IF NOT EXISTS {PROFILES_TABLE} (
                user_id TEXT PRIMARY KEY,
                enabled INTEGER NOT NULL DEFAULT 0,
                device_token TEXT,
                platform TEXT,
                endpoint_id TEXT,
                preferences TEXT,
                updated_at TEXT
            )
            "#
        );
        self.db_client.execute(&create_table).await?;

        info!("Push profile schema initialized successfully");
        Ok(())
    }

    async fn profile_exists(&self, user_id: &str) -> Result<bool, StoreError> {
        let query = format!("SELECT user_id FROM {PROFILES_TABLE} WHERE user_id = $1");
        let row = sqlx::query(&query)
            .bind(user_id)
            .fetch_optional(self.db_client.pool())
            .await
            .map_err(|e| StoreError::QueryError(e.to_string()))?;
        Ok(row.is_some())
    }
}

impl PushProfileStore for SqlPushProfileStore {
    type Error = StoreError;

    fn load(&self, user_id: &str) -> BoxFuture<'_, Option<PushProfile>, Self::Error> {
        let user_id = user_id.to_string();

        Box::pin(async move {
            debug!("Loading push profile for user: {}", user_id);

            let query = format!(
                r#"
                SELECT enabled, device_token, platform, endpoint_id, preferences
                FROM {PROFILES_TABLE}
                WHERE user_id = $1
                "#
            );

            let row = sqlx::query(&query)
                .bind(&user_id)
                .fetch_optional(self.db_client.pool())
                .await
                .map_err(|e| {
                    error!("Failed to load push profile: {}", e);
                    StoreError::QueryError(e.to_string())
                })?;

            let Some(row) = row else {
                return Ok(None);
            };

            let enabled: i64 = row.try_get("enabled").unwrap_or_default();
            let platform: Option<String> = row.try_get("platform").ok();
            let preferences: Option<String> = row.try_get("preferences").ok();

            Ok(Some(PushProfile {
                enabled: enabled != 0,
                device_token: row.try_get("device_token").ok(),
                platform: platform.and_then(|p| p.parse::<Platform>().ok()),
                endpoint_id: row.try_get("endpoint_id").ok(),
                preferences: preferences.and_then(|p| serde_json::from_str(&p).ok()),
            }))
        })
    }

    fn activate(
        &self,
        user_id: &str,
        device_token: &str,
        platform: Platform,
        endpoint_id: &str,
    ) -> BoxFuture<'_, (), Self::Error> {
        let user_id = user_id.to_string();
        let device_token = device_token.to_string();
        let endpoint_id = endpoint_id.to_string();

        Box::pin(async move {
            debug!("Activating push profile for user: {}", user_id);

            let now = Utc::now().to_rfc3339();
            if self.profile_exists(&user_id).await? {
                let query = format!(
                    r#"
                    UPDATE {PROFILES_TABLE}
                    SET enabled = 1, device_token = $1, platform = $2,
                        endpoint_id = $3, updated_at = $4
                    WHERE user_id = $5
                    "#
                );
                sqlx::query(&query)
                    .bind(&device_token)
                    .bind(platform.as_str())
                    .bind(&endpoint_id)
                    .bind(&now)
                    .bind(&user_id)
                    .execute(self.db_client.pool())
                    .await
                    .map_err(|e| {
                        error!("Failed to activate push profile: {}", e);
                        StoreError::QueryError(e.to_string())
                    })?;
            } else {
                let query = format!(
                    r#"
                    INSERT INTO {PROFILES_TABLE}
                        (user_id, enabled, device_token, platform, endpoint_id, preferences, updated_at)
                    VALUES ($1, 1, $2, $3, $4, NULL, $5)
                    "#
                );
                sqlx::query(&query)
                    .bind(&user_id)
                    .bind(&device_token)
                    .bind(platform.as_str())
                    .bind(&endpoint_id)
                    .bind(&now)
                    .execute(self.db_client.pool())
                    .await
                    .map_err(|e| {
                        error!("Failed to create push profile: {}", e);
                        StoreError::QueryError(e.to_string())
                    })?;
            }

            info!("Push profile activated for user {}", user_id);
            Ok(())
        })
    }

    fn deactivate(&self, user_id: &str) -> BoxFuture<'_, (), Self::Error> {
        let user_id = user_id.to_string();

        Box::pin(async move {
            debug!("Deactivating push profile for user: {}", user_id);

            // Preferences are kept so a later re-registration restores them.
            let query = format!(
                r#"
                UPDATE {PROFILES_TABLE}
                SET enabled = 0, device_token = NULL, platform = NULL,
                    endpoint_id = NULL, updated_at = $1
                WHERE user_id = $2
                "#
            );
            sqlx::query(&query)
                .bind(Utc::now().to_rfc3339())
                .bind(&user_id)
                .execute(self.db_client.pool())
                .await
                .map_err(|e| {
                    error!("Failed to deactivate push profile: {}", e);
                    StoreError::QueryError(e.to_string())
                })?;

            info!("Push profile deactivated for user {}", user_id);
            Ok(())
        })
    }

    fn set_preferences(
        &self,
        user_id: &str,
        preferences: NotificationPreferences,
    ) -> BoxFuture<'_, NotificationPreferences, Self::Error> {
        let user_id = user_id.to_string();

        Box::pin(async move {
            debug!("Updating notification preferences for user: {}", user_id);

            let serialized = serde_json::to_string(&preferences)?;
            let now = Utc::now().to_rfc3339();

            if self.profile_exists(&user_id).await? {
                let query = format!(
                    "UPDATE {PROFILES_TABLE} SET preferences = $1, updated_at = $2 WHERE user_id = $3"
                );
                sqlx::query(&query)
                    .bind(&serialized)
                    .bind(&now)
                    .bind(&user_id)
                    .execute(self.db_client.pool())
                    .await
                    .map_err(|e| {
                        error!("Failed to update preferences: {}", e);
                        StoreError::QueryError(e.to_string())
                    })?;
            } else {
                // Unknown users get a disabled profile carrying only the
                // preferences, picked up by their first registration.
                let query = format!(
                    r#"
                    INSERT INTO {PROFILES_TABLE}
                        (user_id, enabled, device_token, platform, endpoint_id, preferences, updated_at)
                    VALUES ($1, 0, NULL, NULL, NULL, $2, $3)
                    "#
                );
                sqlx::query(&query)
                    .bind(&user_id)
                    .bind(&serialized)
                    .bind(&now)
                    .execute(self.db_client.pool())
                    .await
                    .map_err(|e| {
                        error!("Failed to insert preferences: {}", e);
                        StoreError::QueryError(e.to_string())
                    })?;
            }

            info!("Preferences updated for user {}", user_id);
            Ok(preferences)
        })
    }
}
