//! Push gateway client module
//!
//! This module provides a client for the managed push gateway's REST API.
//! It covers the full endpoint lifecycle (create, inspect, update, delete),
//! broadcast topics and their subscriptions, and message publishing to a
//! single endpoint, a list of endpoints, or a topic.
//!
//! The main component is the `PushGatewayClient` struct, which handles
//! authentication (a bearer API key from configuration) and request/response
//! handling against the gateway. Payload formatting lives in [`crate::payload`].

use pushify_common::models::NotificationMessage;
use pushify_common::services::{BulkSendEntry, BulkTarget, PlatformApplication};
use pushify_common::HTTP_CLIENT;
use pushify_config::GatewayConfig;
use reqwest::{header, Client, Response};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, error, info, warn};

use crate::error::GatewayError;
use crate::payload::{build_envelope, build_topic_payload, PushEnvelope, TopicPayload};

#[derive(Debug, Serialize)]
struct CreateEndpointRequest<'a> {
    device_token: &'a str,
    attributes: &'a HashMap<String, String>,
}

#[derive(Debug, Serialize)]
struct SetAttributesRequest<'a> {
    attributes: &'a HashMap<String, String>,
}

#[derive(Debug, Serialize)]
struct PublishRequest {
    payload: PushEnvelope,
}

#[derive(Debug, Serialize)]
struct TopicPublishRequest {
    subject: String,
    payload: TopicPayload,
}

#[derive(Debug, Serialize)]
struct CreateTopicRequest<'a> {
    name: &'a str,
}

#[derive(Debug, Serialize)]
struct SubscribeRequest<'a> {
    endpoint_id: &'a str,
}

/// Response from creating a device endpoint.
#[derive(Debug, Deserialize)]
pub struct CreateEndpointResponse {
    pub endpoint_id: String,
}

/// Response from a publish call (endpoint or topic).
#[derive(Debug, Deserialize)]
pub struct PublishResponse {
    pub message_id: String,
}

/// Response from creating a topic.
#[derive(Debug, Deserialize)]
pub struct CreateTopicResponse {
    pub topic_id: String,
}

/// Response from subscribing an endpoint to a topic.
#[derive(Debug, Deserialize)]
pub struct SubscribeResponse {
    pub subscription_id: String,
}

/// Response from reading endpoint attributes.
#[derive(Debug, Deserialize)]
pub struct EndpointAttributesResponse {
    pub attributes: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct ListApplicationsResponse {
    applications: Vec<PlatformApplication>,
}

/// Client for the push gateway's REST API.
///
/// Holds the shared HTTP client and the gateway configuration (base URL and
/// API key). All calls are sequential request/response against the gateway;
/// nothing is retried locally, failures propagate to the caller.
pub struct PushGatewayClient {
    /// HTTP client for making requests to the gateway
    client: Client,

    /// Gateway configuration, including base URL and API key
    config: GatewayConfig,
}

impl PushGatewayClient {
    /// Creates a new gateway client with the given configuration.
    pub fn new(config: GatewayConfig) -> Self {
        Self {
            client: HTTP_CLIENT.clone(),
            config,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request.header(
            header::AUTHORIZATION,
            format!("Bearer {}", self.config.api_key),
        )
    }

    async fn ensure_success(response: Response) -> Result<Response, GatewayError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().await?;
        Err(GatewayError::ApiError {
            status_code: status.as_u16(),
            message,
        })
    }

    /// Registers a device token under a platform application.
    ///
    /// # Arguments
    ///
    /// * `application_id` - The platform application to register under
    /// * `device_token` - The push token supplied by the device
    /// * `user_data` - Opaque string attributes stored on the endpoint
    ///
    /// # Returns
    ///
    /// The id of the newly created endpoint.
    ///
    /// # Errors
    ///
    /// Returns a `GatewayError` if the HTTP request fails or the gateway
    /// rejects the token.
    pub async fn create_endpoint(
        &self,
        application_id: &str,
        device_token: &str,
        user_data: &HashMap<String, String>,
    ) -> Result<String, GatewayError> {
        debug!(
            "Creating endpoint under application {} for token ending {}",
            application_id,
            token_suffix(device_token)
        );

        let url = self.url(&format!("/v1/apps/{}/endpoints", application_id));
        let body = CreateEndpointRequest {
            device_token,
            attributes: user_data,
        };

        let response = self.authorized(self.client.post(&url)).json(&body).send().await?;
        let response = Self::ensure_success(response).await?;

        let created: CreateEndpointResponse = response.json().await?;
        info!("Created endpoint {}", created.endpoint_id);
        Ok(created.endpoint_id)
    }

    /// Deletes a device endpoint.
    pub async fn delete_endpoint(&self, endpoint_id: &str) -> Result<(), GatewayError> {
        debug!("Deleting endpoint {}", endpoint_id);

        let url = self.url(&format!("/v1/endpoints/{}", endpoint_id));
        let response = self.authorized(self.client.delete(&url)).send().await?;
        Self::ensure_success(response).await?;

        info!("Deleted endpoint {}", endpoint_id);
        Ok(())
    }

    /// Reads the attributes stored on an endpoint.
    pub async fn endpoint_attributes(
        &self,
        endpoint_id: &str,
    ) -> Result<HashMap<String, String>, GatewayError> {
        debug!("Reading attributes of endpoint {}", endpoint_id);

        let url = self.url(&format!("/v1/endpoints/{}/attributes", endpoint_id));
        let response = self.authorized(self.client.get(&url)).send().await?;
        let response = Self::ensure_success(response).await?;

        let attributes: EndpointAttributesResponse = response.json().await?;
        Ok(attributes.attributes)
    }

    /// Replaces the attributes stored on an endpoint.
    pub async fn set_endpoint_attributes(
        &self,
        endpoint_id: &str,
        attributes: &HashMap<String, String>,
    ) -> Result<(), GatewayError> {
        debug!("Updating attributes of endpoint {}", endpoint_id);

        let url = self.url(&format!("/v1/endpoints/{}/attributes", endpoint_id));
        let body = SetAttributesRequest { attributes };

        let response = self.authorized(self.client.put(&url)).json(&body).send().await?;
        Self::ensure_success(response).await?;
        Ok(())
    }

    /// Publishes a notification to a single endpoint.
    ///
    /// The payload format is chosen from `platform`: `ios` (matched
    /// case-insensitively) gets the APNS envelope, anything else the FCM
    /// envelope. Unrecognized platform names are not an error.
    ///
    /// # Returns
    ///
    /// The gateway's message id for the publish.
    pub async fn publish(
        &self,
        endpoint_id: &str,
        message: &NotificationMessage,
        platform: &str,
    ) -> Result<String, GatewayError> {
        debug!(
            "Publishing '{}' to endpoint {} ({})",
            message.title, endpoint_id, platform
        );

        let url = self.url(&format!("/v1/endpoints/{}/messages", endpoint_id));
        let body = PublishRequest {
            payload: build_envelope(message, platform),
        };

        let response = self.authorized(self.client.post(&url)).json(&body).send().await?;
        let response = Self::ensure_success(response).await?;

        let published: PublishResponse = response.json().await?;
        info!(
            "Published message {} to endpoint {}",
            published.message_id, endpoint_id
        );
        Ok(published.message_id)
    }

    /// Publishes a notification to every subscriber of a topic.
    ///
    /// The body carries a plain-text default plus both platform envelopes;
    /// the gateway picks the right one per subscriber. The subject line is
    /// the notification title.
    pub async fn publish_to_topic(
        &self,
        topic_id: &str,
        message: &NotificationMessage,
    ) -> Result<String, GatewayError> {
        debug!("Publishing '{}' to topic {}", message.title, topic_id);

        let url = self.url(&format!("/v1/topics/{}/messages", topic_id));
        let body = TopicPublishRequest {
            subject: message.title.clone(),
            payload: build_topic_payload(message),
        };

        let response = self.authorized(self.client.post(&url)).json(&body).send().await?;
        let response = Self::ensure_success(response).await?;

        let published: PublishResponse = response.json().await?;
        info!(
            "Published message {} to topic {}",
            published.message_id, topic_id
        );
        Ok(published.message_id)
    }

    /// Creates (or returns) a named broadcast topic.
    pub async fn create_topic(&self, name: &str) -> Result<String, GatewayError> {
        debug!("Creating topic '{}'", name);

        let url = self.url("/v1/topics");
        let body = CreateTopicRequest { name };

        let response = self.authorized(self.client.post(&url)).json(&body).send().await?;
        let response = Self::ensure_success(response).await?;

        let created: CreateTopicResponse = response.json().await?;
        info!("Created topic {}", created.topic_id);
        Ok(created.topic_id)
    }

    /// Subscribes an endpoint to a topic.
    ///
    /// # Returns
    ///
    /// The subscription id, needed later to unsubscribe.
    pub async fn subscribe(
        &self,
        topic_id: &str,
        endpoint_id: &str,
    ) -> Result<String, GatewayError> {
        debug!("Subscribing endpoint {} to topic {}", endpoint_id, topic_id);

        let url = self.url(&format!("/v1/topics/{}/subscriptions", topic_id));
        let body = SubscribeRequest { endpoint_id };

        let response = self.authorized(self.client.post(&url)).json(&body).send().await?;
        let response = Self::ensure_success(response).await?;

        let subscribed: SubscribeResponse = response.json().await?;
        info!(
            "Subscribed endpoint {} to topic {} as {}",
            endpoint_id, topic_id, subscribed.subscription_id
        );
        Ok(subscribed.subscription_id)
    }

    /// Removes a topic subscription.
    pub async fn unsubscribe(&self, subscription_id: &str) -> Result<(), GatewayError> {
        debug!("Removing subscription {}", subscription_id);

        let url = self.url(&format!("/v1/subscriptions/{}", subscription_id));
        let response = self.authorized(self.client.delete(&url)).send().await?;
        Self::ensure_success(response).await?;

        info!("Removed subscription {}", subscription_id);
        Ok(())
    }

    /// Lists the platform applications visible to the configured credentials.
    pub async fn list_applications(&self) -> Result<Vec<PlatformApplication>, GatewayError> {
        debug!("Listing platform applications");

        let url = self.url("/v1/apps");
        let response = self.authorized(self.client.get(&url)).send().await?;
        let response = Self::ensure_success(response).await?;

        let list: ListApplicationsResponse = response.json().await?;
        Ok(list.applications)
    }

    /// Reports whether the gateway is reachable with the configured
    /// credentials, using a harmless read-only call.
    ///
    /// This method never fails: any transport or API error is logged and
    /// reported as `false`.
    pub async fn check_configuration(&self) -> bool {
        match self.list_applications().await {
            Ok(applications) => {
                debug!(
                    "Gateway configuration check passed ({} applications visible)",
                    applications.len()
                );
                true
            }
            Err(err) => {
                warn!("Gateway configuration check failed: {}", err);
                false
            }
        }
    }

    /// Publishes a notification to many endpoints, one at a time.
    ///
    /// Every target carries its own platform, so mixed batches format each
    /// message correctly. A failing endpoint is recorded in its entry and
    /// never aborts the remaining sends.
    pub async fn send_bulk(
        &self,
        targets: &[BulkTarget],
        message: &NotificationMessage,
    ) -> Vec<BulkSendEntry> {
        let mut entries = Vec::with_capacity(targets.len());

        for target in targets {
            match self
                .publish(&target.endpoint_id, message, &target.platform)
                .await
            {
                Ok(message_id) => entries.push(BulkSendEntry {
                    endpoint_id: target.endpoint_id.clone(),
                    success: true,
                    message_id: Some(message_id),
                    error: None,
                }),
                Err(err) => {
                    error!(
                        "Bulk publish to endpoint {} failed: {}",
                        target.endpoint_id, err
                    );
                    entries.push(BulkSendEntry {
                        endpoint_id: target.endpoint_id.clone(),
                        success: false,
                        message_id: None,
                        error: Some(err.to_string()),
                    });
                }
            }
        }

        entries
    }
}

/// Last few characters of a device token, safe to log.
fn token_suffix(token: &str) -> &str {
    match token.char_indices().nth_back(5) {
        Some((idx, _)) => &token[idx..],
        None => token,
    }
}
