// --- File: crates/services/pushify_backend/src/service_factory.rs ---
//! Service wiring for the backend binary.
//!
//! This module adapts the concrete gateway client and SQL stores to the
//! service traits consumed by [`PushNotificationService`], then builds the
//! service from configuration. Construction fails loudly: a deployment
//! without a usable gateway or database stops at startup instead of serving
//! requests that can only fail.

use std::collections::HashMap;
use std::sync::Arc;

use pushify_common::models::{
    DeviceRegistration, NotificationMessage, NotificationPreferences, Platform, PushProfile,
};
use pushify_common::services::{
    BoxFuture, BoxInfallibleFuture, BoxedError, BulkSendEntry, BulkTarget, PlatformApplication,
    PushGateway, PushProfileStore, RegistrationStore,
};
use pushify_config::AppConfig;
use pushify_db::{DbClient, SqlPushProfileStore, SqlRegistrationStore};
use pushify_gateway::{GatewayPushService, PushGatewayClient};
use pushify_notify::{NotifyError, PushNotificationService};
use tracing::info;

/// Wrapper that converts `GatewayError` into the boxed error the
/// orchestrator consumes.
struct BoxedPushGateway {
    inner: GatewayPushService,
}

impl PushGateway for BoxedPushGateway {
    type Error = BoxedError;

    fn create_endpoint(
        &self,
        application_id: &str,
        device_token: &str,
        user_data: &HashMap<String, String>,
    ) -> BoxFuture<'_, String, Self::Error> {
        let fut = self
            .inner
            .create_endpoint(application_id, device_token, user_data);

        Box::pin(async move { fut.await.map_err(|e| BoxedError(Box::new(e))) })
    }

    fn delete_endpoint(&self, endpoint_id: &str) -> BoxFuture<'_, (), Self::Error> {
        let fut = self.inner.delete_endpoint(endpoint_id);

        Box::pin(async move { fut.await.map_err(|e| BoxedError(Box::new(e))) })
    }

    fn endpoint_attributes(
        &self,
        endpoint_id: &str,
    ) -> BoxFuture<'_, HashMap<String, String>, Self::Error> {
        let fut = self.inner.endpoint_attributes(endpoint_id);

        Box::pin(async move { fut.await.map_err(|e| BoxedError(Box::new(e))) })
    }

    fn set_endpoint_attributes(
        &self,
        endpoint_id: &str,
        attributes: &HashMap<String, String>,
    ) -> BoxFuture<'_, (), Self::Error> {
        let fut = self.inner.set_endpoint_attributes(endpoint_id, attributes);

        Box::pin(async move { fut.await.map_err(|e| BoxedError(Box::new(e))) })
    }

    fn publish(
        &self,
        endpoint_id: &str,
        message: &NotificationMessage,
        platform: &str,
    ) -> BoxFuture<'_, String, Self::Error> {
        let fut = self.inner.publish(endpoint_id, message, platform);

        Box::pin(async move { fut.await.map_err(|e| BoxedError(Box::new(e))) })
    }

    fn publish_to_topic(
        &self,
        topic_id: &str,
        message: &NotificationMessage,
    ) -> BoxFuture<'_, String, Self::Error> {
        let fut = self.inner.publish_to_topic(topic_id, message);

        Box::pin(async move { fut.await.map_err(|e| BoxedError(Box::new(e))) })
    }

    fn create_topic(&self, name: &str) -> BoxFuture<'_, String, Self::Error> {
        let fut = self.inner.create_topic(name);

        Box::pin(async move { fut.await.map_err(|e| BoxedError(Box::new(e))) })
    }

    fn subscribe(&self, topic_id: &str, endpoint_id: &str) -> BoxFuture<'_, String, Self::Error> {
        let fut = self.inner.subscribe(topic_id, endpoint_id);

        Box::pin(async move { fut.await.map_err(|e| BoxedError(Box::new(e))) })
    }

    fn unsubscribe(&self, subscription_id: &str) -> BoxFuture<'_, (), Self::Error> {
        let fut = self.inner.unsubscribe(subscription_id);

        Box::pin(async move { fut.await.map_err(|e| BoxedError(Box::new(e))) })
    }

    fn list_applications(&self) -> BoxFuture<'_, Vec<PlatformApplication>, Self::Error> {
        let fut = self.inner.list_applications();

        Box::pin(async move { fut.await.map_err(|e| BoxedError(Box::new(e))) })
    }

    fn check_configuration(&self) -> BoxInfallibleFuture<'_, bool> {
        self.inner.check_configuration()
    }

    fn send_bulk(
        &self,
        targets: &[BulkTarget],
        message: &NotificationMessage,
    ) -> BoxInfallibleFuture<'_, Vec<BulkSendEntry>> {
        self.inner.send_bulk(targets, message)
    }
}

/// Wrapper that converts `StoreError` from the registration table into the
/// boxed error the orchestrator consumes.
struct BoxedRegistrationStore {
    inner: SqlRegistrationStore,
}

impl RegistrationStore for BoxedRegistrationStore {
    type Error = BoxedError;

    fn save(
        &self,
        registration: DeviceRegistration,
    ) -> BoxFuture<'_, DeviceRegistration, Self::Error> {
        let fut = self.inner.save(registration);

        Box::pin(async move { fut.await.map_err(|e| BoxedError(Box::new(e))) })
    }

    fn find_active_by_user(
        &self,
        user_id: &str,
    ) -> BoxFuture<'_, Option<DeviceRegistration>, Self::Error> {
        let fut = self.inner.find_active_by_user(user_id);

        Box::pin(async move { fut.await.map_err(|e| BoxedError(Box::new(e))) })
    }

    fn find_by_user(&self, user_id: &str) -> BoxFuture<'_, Vec<DeviceRegistration>, Self::Error> {
        let fut = self.inner.find_by_user(user_id);

        Box::pin(async move { fut.await.map_err(|e| BoxedError(Box::new(e))) })
    }

    fn revoke_for_user(&self, user_id: &str) -> BoxFuture<'_, u64, Self::Error> {
        let fut = self.inner.revoke_for_user(user_id);

        Box::pin(async move { fut.await.map_err(|e| BoxedError(Box::new(e))) })
    }
}

/// Wrapper that converts `StoreError` from the profile table into the boxed
/// error the orchestrator consumes.
struct BoxedProfileStore {
    inner: SqlPushProfileStore,
}

impl PushProfileStore for BoxedProfileStore {
    type Error = BoxedError;

    fn load(&self, user_id: &str) -> BoxFuture<'_, Option<PushProfile>, Self::Error> {
        let fut = self.inner.load(user_id);

        Box::pin(async move { fut.await.map_err(|e| BoxedError(Box::new(e))) })
    }

    fn activate(
        &self,
        user_id: &str,
        device_token: &str,
        platform: Platform,
        endpoint_id: &str,
    ) -> BoxFuture<'_, (), Self::Error> {
        let fut = self
            .inner
            .activate(user_id, device_token, platform, endpoint_id);

        Box::pin(async move { fut.await.map_err(|e| BoxedError(Box::new(e))) })
    }

    fn deactivate(&self, user_id: &str) -> BoxFuture<'_, (), Self::Error> {
        let fut = self.inner.deactivate(user_id);

        Box::pin(async move { fut.await.map_err(|e| BoxedError(Box::new(e))) })
    }

    fn set_preferences(
        &self,
        user_id: &str,
        preferences: NotificationPreferences,
    ) -> BoxFuture<'_, NotificationPreferences, Self::Error> {
        let fut = self.inner.set_preferences(user_id, preferences);

        Box::pin(async move { fut.await.map_err(|e| BoxedError(Box::new(e))) })
    }
}

fn store_error(err: impl std::error::Error + Send + Sync + 'static) -> NotifyError {
    NotifyError::StoreError(BoxedError(Box::new(err)))
}

/// Build the push notification service from the application configuration.
///
/// Creates the gateway client, prepares both store schemas, and wires the
/// adapters into [`PushNotificationService`]. Every failure propagates to
/// the caller.
///
/// # Errors
///
/// Returns a configuration error when the `gateway` section is missing or
/// carries no platform application id, and a store error when schema
/// preparation fails.
pub async fn build_notification_service(
    config: &Arc<AppConfig>,
    db_client: &DbClient,
) -> Result<Arc<PushNotificationService>, NotifyError> {
    let gateway_config = config.gateway.as_ref().ok_or_else(|| {
        NotifyError::ConfigError("Gateway configuration section is missing".to_string())
    })?;

    info!("ℹ️ Initializing push gateway client...");
    let client = Arc::new(PushGatewayClient::new(gateway_config.clone()));
    let gateway = BoxedPushGateway {
        inner: GatewayPushService::new(client),
    };
    info!("✅ Push gateway client initialized.");

    info!("ℹ️ Preparing store schemas...");
    let registrations_table = config
        .database
        .as_ref()
        .and_then(|db| db.registrations_table.clone());

    let registration_store =
        SqlRegistrationStore::new(db_client.clone(), registrations_table).map_err(store_error)?;
    registration_store
        .init_schema()
        .await
        .map_err(store_error)?;

    let profile_store = SqlPushProfileStore::new(db_client.clone());
    profile_store.init_schema().await.map_err(store_error)?;
    info!("✅ Store schemas ready.");

    let service = PushNotificationService::new(
        Arc::new(gateway),
        Arc::new(BoxedRegistrationStore {
            inner: registration_store,
        }),
        Arc::new(BoxedProfileStore {
            inner: profile_store,
        }),
        gateway_config,
    )?;
    info!("✅ Push notification service initialized.");

    Ok(Arc::new(service))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pushify_config::{GatewayConfig, ServerConfig};
    use tempfile::TempDir;

    fn config_with_gateway(gateway: Option<GatewayConfig>) -> Arc<AppConfig> {
        Arc::new(AppConfig {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
            },
            database: None,
            gateway,
        })
    }

    async fn test_db() -> (TempDir, DbClient) {
        let tmp = TempDir::new().unwrap();
        let url = format!("sqlite://{}", tmp.path().join("pushify.db").display());
        let client = DbClient::from_url(&url).await.unwrap();
        (tmp, client)
    }

    #[tokio::test]
    async fn missing_gateway_section_fails_startup() {
        let config = config_with_gateway(None);
        let (_tmp, db_client) = test_db().await;

        let err = build_notification_service(&config, &db_client)
            .await
            .err()
            .unwrap();
        assert!(matches!(err, NotifyError::ConfigError(_)));
    }

    #[tokio::test]
    async fn gateway_without_application_id_fails_startup() {
        let config = config_with_gateway(Some(GatewayConfig {
            base_url: "https://push.example.com".to_string(),
            api_key: "key".to_string(),
            platform_application_id: None,
            broadcast_topic_id: None,
        }));
        let (_tmp, db_client) = test_db().await;

        let err = build_notification_service(&config, &db_client)
            .await
            .err()
            .unwrap();
        assert!(matches!(err, NotifyError::ConfigError(_)));
    }
}
