//! SQL implementation of the device registration store
//!
//! One row per registration attempt, keyed by the generated registration id.
//! Unregistration and re-registration mark previous rows revoked instead of
//! deleting them, so at most one row per user is ever active.

use crate::error::StoreError;
use crate::DbClient;
use chrono::{DateTime, Utc};
use pushify_common::models::DeviceRegistration;
use pushify_common::services::{BoxFuture, RegistrationStore};
use sqlx::any::AnyRow;
use sqlx::Row;
use std::collections::HashMap;
use tracing::{debug, error, info};

/// Default logical name of the registration table.
pub const DEFAULT_REGISTRATIONS_TABLE: &str = "device_registrations";

/// SQL implementation of the device registration store.
///
/// The table name comes from deployment configuration; it is validated at
/// construction because it is interpolated into query text.
#[derive(Debug, Clone)]
pub struct SqlRegistrationStore {
    /// The database client
    db_client: DbClient,
    /// The validated table name
    table: String,
}

impl SqlRegistrationStore {
    /// Create a new SQL registration store.
    ///
    /// # Arguments
    ///
    /// * `db_client` - The database client
    /// * `table` - Logical table name; `None` means the default
    ///
    /// # Errors
    ///
    /// Returns a configuration error when the table name is not a plain
    /// identifier.
    pub fn new(db_client: DbClient, table: Option<String>) -> Result<Self, StoreError> {
        let table = table.unwrap_or_else(|| DEFAULT_REGISTRATIONS_TABLE.to_string());

        if !is_valid_table_name(&table) {
            return Err(StoreError::ConfigError(format!(
                "Invalid registration table name: {table:?}"
            )));
        }

        Ok(Self { db_client, table })
    }

    /// Create the registration table and its user index if they do not exist.
    pub async fn init_schema(&self) -> Result<(), StoreError> {
        debug!("Initializing registration schema in table {}", self.table);

        let create_table = format!(
            r#"
            CREATE TABLE IF NOT EXISTS {table} (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                device_token TEXT NOT NULL,
                platform TEXT NOT NULL,
                endpoint_id TEXT NOT NULL,
                subscription_id TEXT,
                device_info TEXT NOT NULL DEFAULT '{{}}',
                registered_at TEXT NOT NULL,
                is_active INTEGER NOT NULL DEFAULT 1,
                revoked_at TEXT
            )
            "#,
            table = self.table
        );
        self.db_client.execute(&create_table).await?;

        let create_index = format!(
            "CREATE INDEX IF NOT EXISTS idx_{table}_user_id ON {table} (user_id)",
            table = self.table
        );
        self.db_client.execute(&create_index).await?;

        info!("Registration schema initialized successfully");
        Ok(())
    }

    fn row_to_registration(row: &AnyRow) -> Result<DeviceRegistration, StoreError> {
        let platform: String = row
            .try_get("platform")
            .map_err(|e| StoreError::QueryError(e.to_string()))?;
        let platform = platform
            .parse()
            .map_err(|e| StoreError::QueryError(format!("invalid platform column: {e}")))?;

        let device_info: String = row.try_get("device_info").unwrap_or_default();
        let device_info: HashMap<String, String> =
            serde_json::from_str(&device_info).unwrap_or_default();

        let registered_at: String = row
            .try_get("registered_at")
            .map_err(|e| StoreError::QueryError(e.to_string()))?;
        let registered_at = parse_timestamp(&registered_at)?;

        let revoked_at: Option<String> = row.try_get("revoked_at").ok();
        let revoked_at = match revoked_at {
            Some(raw) => Some(parse_timestamp(&raw)?),
            None => None,
        };

        let is_active: i64 = row.try_get("is_active").unwrap_or_default();

        Ok(DeviceRegistration {
            id: row.try_get("id").unwrap_or_default(),
            user_id: row.try_get("user_id").unwrap_or_default(),
            device_token: row.try_get("device_token").unwrap_or_default(),
            platform,
            endpoint_id: row.try_get("endpoint_id").unwrap_or_default(),
            subscription_id: row.try_get("subscription_id").ok(),
            device_info,
            registered_at,
            is_active: is_active != 0,
            revoked_at,
        })
    }
}

impl RegistrationStore for SqlRegistrationStore {
    type Error = StoreError;

    fn save(
        &self,
        registration: DeviceRegistration,
    ) -> BoxFuture<'_, DeviceRegistration, Self::Error> {
        Box::pin(async move {
            debug!(
                "Saving registration {} for user: {}",
                registration.id, registration.user_id
            );

            let device_info = serde_json::to_string(&registration.device_info)?;
            let query = format!(
                r#"
                INSERT INTO {table}
                    (id, user_id, device_token, platform, endpoint_id, subscription_id,
                     device_info, registered_at, is_active, revoked_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
                "#,
                table = self.table
            );

            sqlx::query(&query)
                .bind(&registration.id)
                .bind(&registration.user_id)
                .bind(&registration.device_token)
                .bind(registration.platform.as_str())
                .bind(&registration.endpoint_id)
                .bind(registration.subscription_id.as_deref())
                .bind(&device_info)
                .bind(registration.registered_at.to_rfc3339())
                .bind(registration.is_active as i64)
                .bind(registration.revoked_at.map(|t| t.to_rfc3339()))
                .execute(self.db_client.pool())
                .await
                .map_err(|e| {
                    error!("Failed to save device registration: {}", e);
                    StoreError::QueryError(e.to_string())
                })?;

            info!("Registration {} saved successfully", registration.id);
            Ok(registration)
        })
    }

    fn find_active_by_user(
        &self,
        user_id: &str,
    ) -> BoxFuture<'_, Option<DeviceRegistration>, Self::Error> {
        let user_id = user_id.to_string();

        Box::pin(async move {
            debug!("Finding active registration for user: {}", user_id);

            let query = format!(
                r#"
                SELECT id, user_id, device_token, platform, endpoint_id, subscription_id,
                       device_info, registered_at, is_active, revoked_at
                FROM {table}
                WHERE user_id = $1 AND is_active = 1
                ORDER BY registered_at DESC
                LIMIT 1
                "#,
                table = self.table
            );

            let row = sqlx::query(&query)
                .bind(&user_id)
                .fetch_optional(self.db_client.pool())
                .await
                .map_err(|e| {
                    error!("Failed to find active registration: {}", e);
                    StoreError::QueryError(e.to_string())
                })?;

            row.as_ref().map(Self::row_to_registration).transpose()
        })
    }

    fn find_by_user(&self, user_id: &str) -> BoxFuture<'_, Vec<DeviceRegistration>, Self::Error> {
        let user_id = user_id.to_string();

        Box::pin(async move {
            debug!("Finding all registrations for user: {}", user_id);

            let query = format!(
                r#"
                SELECT id, user_id, device_token, platform, endpoint_id, subscription_id,
                       device_info, registered_at, is_active, revoked_at
                FROM {table}
                WHERE user_id = $1
                ORDER BY registered_at DESC
                "#,
                table = self.table
            );

            let rows = sqlx::query(&query)
                .bind(&user_id)
                .fetch_all(self.db_client.pool())
                .await
                .map_err(|e| {
                    error!("Failed to find registrations: {}", e);
                    StoreError::QueryError(e.to_string())
                })?;

            rows.iter().map(Self::row_to_registration).collect()
        })
    }

    fn revoke_for_user(&self, user_id: &str) -> BoxFuture<'_, u64, Self::Error> {
        let user_id = user_id.to_string();

        Box::pin(async move {
            debug!("Revoking active registrations for user: {}", user_id);

            let query = format!(
                "UPDATE {table} SET is_active = 0, revoked_at = $1 WHERE user_id = $2 AND is_active = 1",
                table = self.table
            );

            let result = sqlx::query(&query)
                .bind(Utc::now().to_rfc3339())
                .bind(&user_id)
                .execute(self.db_client.pool())
                .await
                .map_err(|e| {
                    error!("Failed to revoke registrations: {}", e);
                    StoreError::QueryError(e.to_string())
                })?;

            let revoked = result.rows_affected();
            if revoked > 0 {
                info!("Revoked {} registration(s) for user {}", revoked, user_id);
            }
            Ok(revoked)
        })
    }
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StoreError::QueryError(format!("invalid timestamp column: {e}")))
}

/// Table names come from configuration, but they are still interpolated into
/// SQL text, so only plain identifiers are accepted.
fn is_valid_table_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
