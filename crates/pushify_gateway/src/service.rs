// --- File: crates/pushify_gateway/src/service.rs ---
//! Push gateway service implementation.
//!
//! This module adapts the concrete [`PushGatewayClient`] to the
//! [`PushGateway`] trait so the notification service can depend on the seam
//! instead of the REST client.

use pushify_common::models::NotificationMessage;
use pushify_common::services::{
    BoxFuture, BoxInfallibleFuture, BulkSendEntry, BulkTarget, PlatformApplication, PushGateway,
};
use std::collections::HashMap;
use std::sync::Arc;

use crate::client::PushGatewayClient;
use crate::error::GatewayError;

/// [`PushGateway`] implementation backed by the REST client.
pub struct GatewayPushService {
    client: Arc<PushGatewayClient>,
}

impl GatewayPushService {
    /// Create a new gateway service around a client.
    pub fn new(client: Arc<PushGatewayClient>) -> Self {
        Self { client }
    }
}

impl PushGateway for GatewayPushService {
    type Error = GatewayError;

    fn create_endpoint(
        &self,
        application_id: &str,
        device_token: &str,
        user_data: &HashMap<String, String>,
    ) -> BoxFuture<'_, String, Self::Error> {
        let application_id = application_id.to_string();
        let device_token = device_token.to_string();
        let user_data = user_data.clone();
        let client = self.client.clone();

        Box::pin(async move {
            client
                .create_endpoint(&application_id, &device_token, &user_data)
                .await
        })
    }

    fn delete_endpoint(&self, endpoint_id: &str) -> BoxFuture<'_, (), Self::Error> {
        let endpoint_id = endpoint_id.to_string();
        let client = self.client.clone();

        Box::pin(async move { client.delete_endpoint(&endpoint_id).await })
    }

    fn endpoint_attributes(
        &self,
        endpoint_id: &str,
    ) -> BoxFuture<'_, HashMap<String, String>, Self::Error> {
        let endpoint_id = endpoint_id.to_string();
        let client = self.client.clone();

        Box::pin(async move { client.endpoint_attributes(&endpoint_id).await })
    }

    fn set_endpoint_attributes(
        &self,
        endpoint_id: &str,
        attributes: &HashMap<String, String>,
    ) -> BoxFuture<'_, (), Self::Error> {
        let endpoint_id = endpoint_id.to_string();
        let attributes = attributes.clone();
        let client = self.client.clone();

        Box::pin(async move {
            client
                .set_endpoint_attributes(&endpoint_id, &attributes)
                .await
        })
    }

    fn publish(
        &self,
        endpoint_id: &str,
        message: &NotificationMessage,
        platform: &str,
    ) -> BoxFuture<'_, String, Self::Error> {
        let endpoint_id = endpoint_id.to_string();
        let message = message.clone();
        let platform = platform.to_string();
        let client = self.client.clone();

        Box::pin(async move { client.publish(&endpoint_id, &message, &platform).await })
    }

    fn publish_to_topic(
        &self,
        topic_id: &str,
        message: &NotificationMessage,
    ) -> BoxFuture<'_, String, Self::Error> {
        let topic_id = topic_id.to_string();
        let message = message.clone();
        let client = self.client.clone();

        Box::pin(async move { client.publish_to_topic(&topic_id, &message).await })
    }

    fn create_topic(&self, name: &str) -> BoxFuture<'_, String, Self::Error> {
        let name = name.to_string();
        let client = self.client.clone();

        Box::pin(async move { client.create_topic(&name).await })
    }

    fn subscribe(&self, topic_id: &str, endpoint_id: &str) -> BoxFuture<'_, String, Self::Error> {
        let topic_id = topic_id.to_string();
        let endpoint_id = endpoint_id.to_string();
        let client = self.client.clone();

        Box::pin(async move { client.subscribe(&topic_id, &endpoint_id).await })
    }

    fn unsubscribe(&self, subscription_id: &str) -> BoxFuture<'_, (), Self::Error> {
        let subscription_id = subscription_id.to_string();
        let client = self.client.clone();

        Box::pin(async move { client.unsubscribe(&subscription_id).await })
    }

    fn list_applications(&self) -> BoxFuture<'_, Vec<PlatformApplication>, Self::Error> {
        let client = self.client.clone();

        Box::pin(async move { client.list_applications().await })
    }

    fn check_configuration(&self) -> BoxInfallibleFuture<'_, bool> {
        let client = self.client.clone();

        Box::pin(async move { client.check_configuration().await })
    }

    fn send_bulk(
        &self,
        targets: &[BulkTarget],
        message: &NotificationMessage,
    ) -> BoxInfallibleFuture<'_, Vec<BulkSendEntry>> {
        let targets = targets.to_vec();
        let message = message.clone();
        let client = self.client.clone();

        Box::pin(async move { client.send_bulk(&targets, &message).await })
    }
}
