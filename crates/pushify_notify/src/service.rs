// --- File: crates/pushify_notify/src/service.rs ---
//! Push notification orchestration
//!
//! [`PushNotificationService`] ties the gateway and the two stores together:
//! device registration and unregistration, targeted and bulk sends,
//! broadcasts, event-driven notifications rendered from templates, and the
//! status/config read paths. It depends only on the service traits from
//! `pushify_common`, so tests and alternative backends plug in behind
//! trait objects.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use pushify_common::models::{
    DeviceRegistration, NotificationMessage, NotificationPreferences, Platform,
    PreferenceCategory,
};
use pushify_common::services::{
    BoxedError, BulkSendEntry, BulkTarget, PushGateway, PushProfileStore, RegistrationStore,
};
use pushify_config::GatewayConfig;

use crate::error::NotifyError;
use crate::templates::{self, NotificationKind};

/// Result of registering a device: the gateway endpoint created for it and
/// the broadcast topic subscription, when a topic is configured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationOutcome {
    pub endpoint_id: String,
    pub subscription_id: Option<String>,
}

/// Outcome of a targeted send.
///
/// Skips are successful no-ops: the user cannot or does not want to receive
/// the notification, and the gateway publish path was never invoked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// The notification was published; the gateway message id is carried.
    Sent { message_id: String },
    /// The notification was deliberately not published.
    Skipped { reason: String },
}

/// A user's push status as reported to clients.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationStatus {
    /// Whether push is currently enabled for the user
    pub enabled: bool,
    /// The platform of the registered device, if any
    pub platform: Option<String>,
    /// Whether a gateway endpoint is on record
    pub has_valid_endpoint: bool,
    /// The user's preferences; the all-enabled default if never set
    pub preferences: NotificationPreferences,
}

/// Deployment-level configuration status for the admin surface.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigStatus {
    /// Whether the service holds everything registration needs
    pub configured: bool,
    /// The platform application registrations are created under
    pub platform_application: Option<String>,
    /// The broadcast topic, when one is configured
    pub broadcast_topic: Option<String>,
    /// Live reachability probe against the gateway
    pub gateway_reachable: bool,
}

/// The push notification orchestrator.
///
/// Constructed once at startup with its collaborators injected;
/// construction fails when the gateway configuration cannot support
/// registration, instead of deferring the failure to the first request.
pub struct PushNotificationService {
    gateway: Arc<dyn PushGateway<Error = BoxedError>>,
    registrations: Arc<dyn RegistrationStore<Error = BoxedError>>,
    profiles: Arc<dyn PushProfileStore<Error = BoxedError>>,
    application_id: String,
    broadcast_topic_id: Option<String>,
}

impl fmt::Debug for PushNotificationService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PushNotificationService")
            .field("application_id", &self.application_id)
            .field("broadcast_topic_id", &self.broadcast_topic_id)
            .finish_non_exhaustive()
    }
}

impl PushNotificationService {
    /// Create the service from its collaborators and the gateway settings.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when `platform_application_id` is
    /// missing or empty; devices could not be registered without it.
    pub fn new(
        gateway: Arc<dyn PushGateway<Error = BoxedError>>,
        registrations: Arc<dyn RegistrationStore<Error = BoxedError>>,
        profiles: Arc<dyn PushProfileStore<Error = BoxedError>>,
        config: &GatewayConfig,
    ) -> Result<Self, NotifyError> {
        let application_id = match config.platform_application_id.as_deref() {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => {
                return Err(NotifyError::ConfigError(
                    "gateway.platform_application_id is required for push registration"
                        .to_string(),
                ))
            }
        };

        let broadcast_topic_id = config.broadcast_topic_id.clone().filter(|id| !id.is_empty());
        if broadcast_topic_id.is_none() {
            warn!("No broadcast topic configured; broadcasts will be rejected");
        }

        info!(
            "Push notification service initialized for application {}",
            application_id
        );

        Ok(Self {
            gateway,
            registrations,
            profiles,
            application_id,
            broadcast_topic_id,
        })
    }

    /// Register a device for push notifications.
    ///
    /// Runs as a compensated sequence: the gateway endpoint is created
    /// first, then the broadcast subscription, then the registration record
    /// and profile are persisted. A failure at any later step tears the
    /// earlier gateway resources back down before the error propagates, so
    /// a failed registration leaves nothing behind.
    ///
    /// Re-registration replaces the previous device: the old gateway
    /// endpoint is deleted (best-effort) and earlier registration rows are
    /// marked revoked, keeping a single active endpoint per user.
    pub async fn register_device(
        &self,
        user_id: &str,
        device_token: &str,
        platform: Platform,
        device_info: HashMap<String, String>,
    ) -> Result<RegistrationOutcome, NotifyError> {
        info!("Registering {} device for user: {}", platform, user_id);

        let previous = self
            .profiles
            .load(user_id)
            .await
            .map_err(NotifyError::StoreError)?;
        if let Some(old_endpoint) = previous.as_ref().and_then(|p| p.endpoint_id.as_deref()) {
            debug!("Replacing existing endpoint {} for user {}", old_endpoint, user_id);
            if let Err(err) = self.gateway.delete_endpoint(old_endpoint).await {
                warn!("Could not delete previous endpoint {}: {}", old_endpoint, err);
            }
        }

        let mut attributes = device_info.clone();
        attributes.insert("user_id".to_string(), user_id.to_string());
        attributes.insert("platform".to_string(), platform.as_str().to_string());

        let endpoint_id = self
            .gateway
            .create_endpoint(&self.application_id, device_token, &attributes)
            .await
            .map_err(|err| {
                error!("Failed to create endpoint for user {}: {}", user_id, err);
                NotifyError::GatewayError(err)
            })?;

        let subscription_id = match &self.broadcast_topic_id {
            Some(topic_id) => match self.gateway.subscribe(topic_id, &endpoint_id).await {
                Ok(id) => Some(id),
                Err(err) => {
                    error!("Topic subscription failed for user {}: {}", user_id, err);
                    self.roll_back_gateway(&endpoint_id, None).await;
                    return Err(NotifyError::GatewayError(err));
                }
            },
            None => None,
        };

        let registration = DeviceRegistration::new(
            user_id.to_string(),
            device_token.to_string(),
            platform,
            endpoint_id.clone(),
            subscription_id.clone(),
            device_info,
        );

        if let Err(err) = self.persist_registration(user_id, registration).await {
            error!("Failed to persist registration for user {}: {}", user_id, err);
            self.roll_back_gateway(&endpoint_id, subscription_id.as_deref())
                .await;
            return Err(NotifyError::StoreError(err));
        }

        if let Err(err) = self
            .profiles
            .activate(user_id, device_token, platform, &endpoint_id)
            .await
        {
            error!("Failed to activate push profile for user {}: {}", user_id, err);
            if let Err(revoke_err) = self.registrations.revoke_for_user(user_id).await {
                warn!(
                    "Rollback could not revoke registration rows for {}: {}",
                    user_id, revoke_err
                );
            }
            self.roll_back_gateway(&endpoint_id, subscription_id.as_deref())
                .await;
            return Err(NotifyError::StoreError(err));
        }

        info!(
            "Registered device for user {}: endpoint {}",
            user_id, endpoint_id
        );
        Ok(RegistrationOutcome {
            endpoint_id,
            subscription_id,
        })
    }

    async fn persist_registration(
        &self,
        user_id: &str,
        registration: DeviceRegistration,
    ) -> Result<(), BoxedError> {
        self.registrations.revoke_for_user(user_id).await?;
        self.registrations.save(registration).await?;
        Ok(())
    }

    /// Best-effort teardown of gateway resources created during a failed
    /// registration. Failures here are logged, never propagated; the
    /// original error is what the caller needs to see.
    async fn roll_back_gateway(&self, endpoint_id: &str, subscription_id: Option<&str>) {
        if let Some(subscription_id) = subscription_id {
            if let Err(err) = self.gateway.unsubscribe(subscription_id).await {
                warn!(
                    "Rollback could not remove subscription {}: {}",
                    subscription_id, err
                );
            }
        }
        if let Err(err) = self.gateway.delete_endpoint(endpoint_id).await {
            warn!("Rollback could not delete endpoint {}: {}", endpoint_id, err);
        }
    }

    /// Unregister a user's device.
    ///
    /// The recorded topic subscription is removed best-effort; deleting the
    /// gateway endpoint must succeed for the unregistration to count.
    /// Afterwards the profile is disabled and cleared and all active
    /// registration rows are marked revoked.
    pub async fn unregister_device(&self, user_id: &str) -> Result<(), NotifyError> {
        info!("Unregistering device for user: {}", user_id);

        let profile = self
            .profiles
            .load(user_id)
            .await
            .map_err(NotifyError::StoreError)?;
        let Some(endpoint_id) = profile.and_then(|p| p.endpoint_id) else {
            return Err(NotifyError::NotRegistered(user_id.to_string()));
        };

        let registration = self
            .registrations
            .find_active_by_user(user_id)
            .await
            .map_err(NotifyError::StoreError)?;
        if let Some(subscription_id) = registration.and_then(|r| r.subscription_id) {
            if let Err(err) = self.gateway.unsubscribe(&subscription_id).await {
                warn!("Could not remove subscription {}: {}", subscription_id, err);
            }
        }

        self.gateway
            .delete_endpoint(&endpoint_id)
            .await
            .map_err(|err| {
                error!("Failed to delete endpoint {}: {}", endpoint_id, err);
                NotifyError::GatewayError(err)
            })?;

        self.profiles
            .deactivate(user_id)
            .await
            .map_err(NotifyError::StoreError)?;
        self.registrations
            .revoke_for_user(user_id)
            .await
            .map_err(NotifyError::StoreError)?;

        info!("Unregistered device for user {}", user_id);
        Ok(())
    }

    /// Send a notification to a single user.
    ///
    /// Users who are unknown, disabled, or without an endpoint yield a
    /// [`SendOutcome::Skipped`]; the gateway is only contacted for users
    /// who can actually receive.
    pub async fn send_to_user(
        &self,
        user_id: &str,
        message: NotificationMessage,
    ) -> Result<SendOutcome, NotifyError> {
        self.send_gated(user_id, message, None).await
    }

    async fn send_gated(
        &self,
        user_id: &str,
        message: NotificationMessage,
        category: Option<PreferenceCategory>,
    ) -> Result<SendOutcome, NotifyError> {
        debug!("Sending notification to user: {}", user_id);

        let profile = self
            .profiles
            .load(user_id)
            .await
            .map_err(NotifyError::StoreError)?;
        let Some(profile) = profile else {
            debug!("User {} has no push profile, skipping", user_id);
            return Ok(SendOutcome::Skipped {
                reason: "user has no push profile".to_string(),
            });
        };

        if !profile.enabled {
            debug!("Push disabled for user {}, skipping", user_id);
            return Ok(SendOutcome::Skipped {
                reason: "push notifications are disabled".to_string(),
            });
        }

        if let Some(category) = category {
            if !profile.preferences_or_default().allows(category) {
                debug!(
                    "User {} opted out of {} notifications, skipping",
                    user_id,
                    category_label(category)
                );
                return Ok(SendOutcome::Skipped {
                    reason: format!(
                        "user opted out of {} notifications",
                        category_label(category)
                    ),
                });
            }
        }

        let Some(endpoint_id) = profile.endpoint_id else {
            debug!("User {} has no device endpoint, skipping", user_id);
            return Ok(SendOutcome::Skipped {
                reason: "no device endpoint registered".to_string(),
            });
        };

        let platform = profile
            .platform
            .map(|p| p.as_str().to_string())
            .unwrap_or_default();

        let message_id = self
            .gateway
            .publish(&endpoint_id, &message, &platform)
            .await
            .map_err(|err| {
                error!("Failed to publish to endpoint {}: {}", endpoint_id, err);
                NotifyError::GatewayError(err)
            })?;

        info!("Notification sent to user {}: {}", user_id, message_id);
        Ok(SendOutcome::Sent { message_id })
    }

    /// Send one notification to many users.
    ///
    /// Users who cannot receive (unknown, disabled, no endpoint) are
    /// filtered out; each remaining target carries its own platform so
    /// mixed iOS/Android batches are formatted per recipient. Returns one
    /// entry per targeted endpoint; individual failures are captured in
    /// the entries rather than aborting the batch.
    pub async fn send_to_users(
        &self,
        user_ids: &[String],
        message: NotificationMessage,
    ) -> Result<Vec<BulkSendEntry>, NotifyError> {
        debug!("Sending bulk notification to {} users", user_ids.len());

        let mut targets = Vec::new();
        for user_id in user_ids {
            let profile = self
                .profiles
                .load(user_id)
                .await
                .map_err(NotifyError::StoreError)?;
            let Some(profile) = profile else { continue };
            if !profile.enabled {
                continue;
            }
            let Some(endpoint_id) = profile.endpoint_id else {
                continue;
            };
            targets.push(BulkTarget {
                endpoint_id,
                platform: profile
                    .platform
                    .map(|p| p.as_str().to_string())
                    .unwrap_or_default(),
            });
        }

        if targets.is_empty() {
            debug!("No eligible recipients in bulk send");
            return Ok(Vec::new());
        }

        let results = self.gateway.send_bulk(&targets, &message).await;
        info!(
            "Bulk notification dispatched to {} of {} users",
            results.iter().filter(|r| r.success).count(),
            user_ids.len()
        );
        Ok(results)
    }

    /// Publish a notification to every subscriber of the broadcast topic.
    pub async fn send_broadcast(
        &self,
        message: NotificationMessage,
    ) -> Result<String, NotifyError> {
        let Some(topic_id) = &self.broadcast_topic_id else {
            return Err(NotifyError::ConfigError(
                "no broadcast topic configured".to_string(),
            ));
        };

        let message_id = self
            .gateway
            .publish_to_topic(topic_id, &message)
            .await
            .map_err(|err| {
                error!("Broadcast publish failed: {}", err);
                NotifyError::GatewayError(err)
            })?;

        info!("Broadcast sent: {}", message_id);
        Ok(message_id)
    }

    /// Notify a user that someone sent them a message.
    pub async fn send_new_message_notification(
        &self,
        user_id: &str,
        sender_id: &str,
        sender_name: &str,
    ) -> Result<SendOutcome, NotifyError> {
        let mut params = HashMap::new();
        params.insert("senderName".to_string(), sender_name.to_string());

        let mut message = templates::render(NotificationKind::NewMessage, &params);
        message
            .data
            .insert("senderId".to_string(), sender_id.to_string());

        self.send_gated(user_id, message, Some(PreferenceCategory::Messages))
            .await
    }

    /// Notify a user that someone started following them.
    pub async fn send_new_follower_notification(
        &self,
        user_id: &str,
        follower_id: &str,
        follower_name: &str,
    ) -> Result<SendOutcome, NotifyError> {
        let mut params = HashMap::new();
        params.insert("followerName".to_string(), follower_name.to_string());

        let mut message = templates::render(NotificationKind::NewFollower, &params);
        message
            .data
            .insert("followerId".to_string(), follower_id.to_string());

        self.send_gated(user_id, message, Some(PreferenceCategory::Followers))
            .await
    }

    /// Notify a user that they were invited to a project.
    pub async fn send_project_invitation_notification(
        &self,
        user_id: &str,
        inviter_name: &str,
        project_id: &str,
        project_title: &str,
    ) -> Result<SendOutcome, NotifyError> {
        let mut params = HashMap::new();
        params.insert("inviterName".to_string(), inviter_name.to_string());
        params.insert("projectTitle".to_string(), project_title.to_string());

        let mut message = templates::render(NotificationKind::ProjectInvitation, &params);
        message
            .data
            .insert("projectId".to_string(), project_id.to_string());

        self.send_gated(user_id, message, Some(PreferenceCategory::Projects))
            .await
    }

    /// Remind a user that an event is about to start.
    pub async fn send_event_reminder_notification(
        &self,
        user_id: &str,
        event_id: &str,
        event_title: &str,
        start_time: &str,
    ) -> Result<SendOutcome, NotifyError> {
        let mut params = HashMap::new();
        params.insert("eventTitle".to_string(), event_title.to_string());
        params.insert("startTime".to_string(), start_time.to_string());

        let mut message = templates::render(NotificationKind::EventReminder, &params);
        message
            .data
            .insert("eventId".to_string(), event_id.to_string());

        self.send_gated(user_id, message, Some(PreferenceCategory::Events))
            .await
    }

    /// Notify a user that someone liked their post.
    pub async fn send_post_like_notification(
        &self,
        user_id: &str,
        liker_name: &str,
        post_id: &str,
    ) -> Result<SendOutcome, NotifyError> {
        let mut params = HashMap::new();
        params.insert("likerName".to_string(), liker_name.to_string());

        let mut message = templates::render(NotificationKind::PostLike, &params);
        message.data.insert("postId".to_string(), post_id.to_string());

        self.send_gated(user_id, message, Some(PreferenceCategory::Posts))
            .await
    }

    /// Notify a user that someone replied to their comment.
    pub async fn send_comment_reply_notification(
        &self,
        user_id: &str,
        replier_name: &str,
        comment_id: &str,
    ) -> Result<SendOutcome, NotifyError> {
        let mut params = HashMap::new();
        params.insert("replierName".to_string(), replier_name.to_string());

        let mut message = templates::render(NotificationKind::CommentReply, &params);
        message
            .data
            .insert("commentId".to_string(), comment_id.to_string());

        self.send_gated(user_id, message, Some(PreferenceCategory::Comments))
            .await
    }

    /// Overwrite a user's notification preferences.
    pub async fn update_notification_preferences(
        &self,
        user_id: &str,
        preferences: NotificationPreferences,
    ) -> Result<NotificationPreferences, NotifyError> {
        debug!("Updating notification preferences for user: {}", user_id);
        let saved = self
            .profiles
            .set_preferences(user_id, preferences)
            .await
            .map_err(NotifyError::StoreError)?;
        info!("Preferences updated for user {}", user_id);
        Ok(saved)
    }

    /// Report a user's push status.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError::UserNotFound`] when the user is unknown to
    /// the push system.
    pub async fn get_notification_status(
        &self,
        user_id: &str,
    ) -> Result<NotificationStatus, NotifyError> {
        let profile = self
            .profiles
            .load(user_id)
            .await
            .map_err(NotifyError::StoreError)?;
        let Some(profile) = profile else {
            return Err(NotifyError::UserNotFound(user_id.to_string()));
        };

        Ok(NotificationStatus {
            enabled: profile.enabled,
            platform: profile.platform.map(|p| p.as_str().to_string()),
            has_valid_endpoint: profile.endpoint_id.is_some(),
            preferences: profile.preferences_or_default(),
        })
    }

    /// Report the deployment's push configuration, with a live gateway
    /// reachability probe.
    pub async fn config_status(&self) -> ConfigStatus {
        let gateway_reachable = self.gateway.check_configuration().await;

        ConfigStatus {
            // Construction already demanded the application id.
            configured: true,
            platform_application: Some(self.application_id.clone()),
            broadcast_topic: self.broadcast_topic_id.clone(),
            gateway_reachable,
        }
    }
}

fn category_label(category: PreferenceCategory) -> &'static str {
    match category {
        PreferenceCategory::Messages => "message",
        PreferenceCategory::Followers => "follower",
        PreferenceCategory::Projects => "project",
        PreferenceCategory::Events => "event",
        PreferenceCategory::Posts => "post",
        PreferenceCategory::Comments => "comment",
    }
}
