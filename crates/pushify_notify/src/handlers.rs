//! HTTP handlers for the push notification API
//!
//! This module provides the Axum handlers for device registration, targeted
//! and bulk sends, broadcasts, event-driven notifications, preference
//! updates, and the status/config read endpoints, together with their
//! request and response types.
//!
//! Handlers validate the request shape, delegate to
//! [`PushNotificationService`], and map service errors to HTTP statuses
//! through the shared [`HttpStatusCode`] mapping. OpenAPI annotations are
//! included when the `openapi` feature is enabled.
//!
//! [`HttpStatusCode`]: pushify_common::error::HttpStatusCode

use axum::{
    extract::{Json, Query, State},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use pushify_common::http::IntoHttpResponse;
use pushify_common::models::{NotificationMessage, NotificationPreferences, Platform};
use pushify_common::services::BulkSendEntry;

use crate::service::{PushNotificationService, SendOutcome};

/// Shared state for the notification handlers.
#[derive(Clone)]
pub struct NotifyState {
    /// The orchestrator all handlers delegate to
    pub service: Arc<PushNotificationService>,
}

/// Request body for registering a device
///
/// The platform must be `ios` or `android` (case-insensitive); anything
/// else is rejected with a 400 before the service runs.
#[derive(Debug, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct RegisterDeviceRequest {
    /// The user the device belongs to
    pub user_id: String,

    /// The push token issued to the device by its platform
    pub device_token: String,

    /// The device platform: `ios` or `android`
    pub platform: String,

    /// Optional device metadata (model, OS version, app version) stored as
    /// endpoint attributes and on the registration record
    pub device_info: Option<HashMap<String, String>>,
}

/// Response body for the register endpoint
#[derive(Debug, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct RegisterDeviceResponse {
    /// Whether the registration succeeded
    pub success: bool,

    /// The gateway endpoint created for the device
    pub endpoint_id: String,

    /// The broadcast topic subscription, when a topic is configured
    pub subscription_id: Option<String>,

    /// Human-readable confirmation
    pub message: String,
}

/// Request body for unregistering a device
#[derive(Debug, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UnregisterDeviceRequest {
    /// The user whose device should be unregistered
    pub user_id: String,
}

/// Response body for the unregister endpoint
#[derive(Debug, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UnregisterDeviceResponse {
    pub success: bool,
    pub message: String,
}

/// Request body for sending a notification to a single user
#[derive(Debug, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct SendNotificationRequest {
    /// The recipient user
    pub user_id: String,

    /// The notification title
    pub title: String,

    /// The notification body
    pub body: String,

    /// Custom key-value data delivered alongside the notification
    pub data: Option<HashMap<String, String>>,
}

/// Response body for targeted sends, test sends, broadcasts, and event
/// notifications
///
/// A skipped send is still `success: true`; `message` then explains why
/// nothing was published and `message_id` is absent.
#[derive(Debug, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct SendNotificationResponse {
    /// Whether the operation completed
    pub success: bool,

    /// The gateway message id, when a notification was published
    pub message_id: Option<String>,

    /// Why the send was skipped, when it was
    pub message: Option<String>,
}

/// Request body for sending one notification to many users
#[derive(Debug, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct SendBatchRequest {
    /// The recipient users
    pub user_ids: Vec<String>,

    /// The notification title
    pub title: String,

    /// The notification body
    pub body: String,

    /// Custom key-value data delivered alongside the notification
    pub data: Option<HashMap<String, String>>,
}

/// Response body for the batch send endpoint
///
/// `sent + failed == total`; users without a usable registration are not
/// counted at all.
#[derive(Debug, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct SendBatchResponse {
    pub success: bool,

    /// Number of endpoints the gateway accepted the message for
    pub sent: usize,

    /// Number of endpoints that failed
    pub failed: usize,

    /// Number of endpoints targeted
    pub total: usize,

    /// Per-endpoint outcomes, in target order
    pub results: Vec<BulkSendEntry>,
}

/// Request body for broadcasting to all subscribed devices
#[derive(Debug, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct BroadcastRequest {
    pub title: String,
    pub body: String,
    pub data: Option<HashMap<String, String>>,
}

/// Request body for sending a test notification to oneself
#[derive(Debug, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct TestNotificationRequest {
    pub user_id: String,

    /// Defaults to "Test Notification"
    pub title: Option<String>,

    /// Defaults to "This is a test notification"
    pub body: Option<String>,
}

/// Query parameters for the status endpoint
#[derive(Debug, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams))]
pub struct StatusQuery {
    /// The user to report push status for
    pub user_id: String,
}

/// Request body for replacing a user's notification preferences
///
/// Omitted preference fields default to enabled.
#[derive(Debug, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UpdatePreferencesRequest {
    pub user_id: String,
    pub preferences: NotificationPreferences,
}

/// Response body for the preferences endpoint
#[derive(Debug, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UpdatePreferencesResponse {
    pub success: bool,

    /// The preferences as stored
    pub preferences: NotificationPreferences,
}

/// Event payload: a user received a chat message
#[derive(Debug, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct NewMessageEventRequest {
    pub user_id: String,
    pub sender_id: String,
    pub sender_name: String,
}

/// Event payload: a user gained a follower
#[derive(Debug, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct NewFollowerEventRequest {
    pub user_id: String,
    pub follower_id: String,
    pub follower_name: String,
}

/// Event payload: a user was invited to a project
#[derive(Debug, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ProjectInvitationEventRequest {
    pub user_id: String,
    pub inviter_name: String,
    pub project_id: String,
    pub project_title: String,
}

/// Event payload: an event a user attends is starting soon
#[derive(Debug, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct EventReminderEventRequest {
    pub user_id: String,
    pub event_id: String,
    pub event_title: String,
    /// Already formatted for display, for example "3:00 PM"
    pub start_time: String,
}

/// Event payload: a user's post was liked
#[derive(Debug, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct PostLikeEventRequest {
    pub user_id: String,
    pub liker_name: String,
    pub post_id: String,
}

/// Event payload: a user's comment got a reply
#[derive(Debug, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CommentReplyEventRequest {
    pub user_id: String,
    pub replier_name: String,
    pub comment_id: String,
}

fn outcome_response(outcome: SendOutcome) -> Response {
    match outcome {
        SendOutcome::Sent { message_id } => {
            info!("Notification sent: {}", message_id);
            Json(SendNotificationResponse {
                success: true,
                message_id: Some(message_id),
                message: None,
            })
            .into_response()
        }
        SendOutcome::Skipped { reason } => {
            info!("Notification skipped: {}", reason);
            Json(SendNotificationResponse {
                success: true,
                message_id: None,
                message: Some(reason),
            })
            .into_response()
        }
    }
}

/// Handler for registering a device for push notifications
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/notifications/register",
    request_body = RegisterDeviceRequest,
    responses(
        (status = 200, description = "Device registered successfully", body = RegisterDeviceResponse),
        (status = 400, description = "Unknown platform"),
        (status = 500, description = "Internal Server Error"),
        (status = 502, description = "Push gateway failure")
    ),
    tag = "Notifications"
))]
pub async fn register_device_handler(
    State(state): State<Arc<NotifyState>>,
    Json(payload): Json<RegisterDeviceRequest>,
) -> Response {
    debug!("Registering device for user: {}", payload.user_id);

    let platform = match payload.platform.parse::<Platform>() {
        Ok(platform) => platform,
        Err(err) => {
            warn!("Rejected registration for {}: {}", payload.user_id, err);
            return err.into_http_response();
        }
    };

    match state
        .service
        .register_device(
            &payload.user_id,
            &payload.device_token,
            platform,
            payload.device_info.unwrap_or_default(),
        )
        .await
    {
        Ok(outcome) => {
            info!(
                "Successfully registered device for user: {}",
                payload.user_id
            );
            Json(RegisterDeviceResponse {
                success: true,
                endpoint_id: outcome.endpoint_id,
                subscription_id: outcome.subscription_id,
                message: "Device registered successfully".to_string(),
            })
            .into_response()
        }
        Err(err) => {
            error!("Failed to register device: {:?}", err);
            err.into_http_response()
        }
    }
}

/// Handler for unregistering a user's device
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/notifications/unregister",
    request_body = UnregisterDeviceRequest,
    responses(
        (status = 200, description = "Device unregistered successfully", body = UnregisterDeviceResponse),
        (status = 400, description = "No device registered for this user"),
        (status = 502, description = "Push gateway failure")
    ),
    tag = "Notifications"
))]
pub async fn unregister_device_handler(
    State(state): State<Arc<NotifyState>>,
    Json(payload): Json<UnregisterDeviceRequest>,
) -> Response {
    debug!("Unregistering device for user: {}", payload.user_id);

    match state.service.unregister_device(&payload.user_id).await {
        Ok(()) => {
            info!(
                "Successfully unregistered device for user: {}",
                payload.user_id
            );
            Json(UnregisterDeviceResponse {
                success: true,
                message: "Device unregistered successfully".to_string(),
            })
            .into_response()
        }
        Err(err) => {
            error!("Failed to unregister device: {:?}", err);
            err.into_http_response()
        }
    }
}

/// Handler for sending a notification to a single user
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/notifications/send",
    request_body = SendNotificationRequest,
    responses(
        (status = 200, description = "Notification sent or skipped", body = SendNotificationResponse),
        (status = 500, description = "Internal Server Error"),
        (status = 502, description = "Push gateway failure")
    ),
    tag = "Notifications"
))]
pub async fn send_notification_handler(
    State(state): State<Arc<NotifyState>>,
    Json(payload): Json<SendNotificationRequest>,
) -> Response {
    debug!("Sending notification to user: {}", payload.user_id);

    let message = NotificationMessage::new(payload.title, payload.body)
        .with_data(payload.data.unwrap_or_default());

    match state.service.send_to_user(&payload.user_id, message).await {
        Ok(outcome) => outcome_response(outcome),
        Err(err) => {
            error!("Failed to send notification: {:?}", err);
            err.into_http_response()
        }
    }
}

/// Handler for sending one notification to many users
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/notifications/send-batch",
    request_body = SendBatchRequest,
    responses(
        (status = 200, description = "Batch dispatched", body = SendBatchResponse),
        (status = 500, description = "Internal Server Error")
    ),
    tag = "Notifications"
))]
pub async fn send_batch_handler(
    State(state): State<Arc<NotifyState>>,
    Json(payload): Json<SendBatchRequest>,
) -> Response {
    debug!("Sending batch notification to {} users", payload.user_ids.len());

    let message = NotificationMessage::new(payload.title, payload.body)
        .with_data(payload.data.unwrap_or_default());

    match state
        .service
        .send_to_users(&payload.user_ids, message)
        .await
    {
        Ok(results) => {
            let sent = results.iter().filter(|r| r.success).count();
            let failed = results.len() - sent;
            info!(
                "Batch notification: {} sent, {} failed of {} targeted",
                sent,
                failed,
                results.len()
            );
            Json(SendBatchResponse {
                success: true,
                sent,
                failed,
                total: results.len(),
                results,
            })
            .into_response()
        }
        Err(err) => {
            error!("Failed to send batch notification: {:?}", err);
            err.into_http_response()
        }
    }
}

/// Handler for broadcasting to every subscribed device
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/notifications/broadcast",
    request_body = BroadcastRequest,
    responses(
        (status = 200, description = "Broadcast sent", body = SendNotificationResponse),
        (status = 500, description = "No broadcast topic configured"),
        (status = 502, description = "Push gateway failure")
    ),
    tag = "Notifications"
))]
pub async fn broadcast_handler(
    State(state): State<Arc<NotifyState>>,
    Json(payload): Json<BroadcastRequest>,
) -> Response {
    debug!("Broadcasting notification: {}", payload.title);

    let message = NotificationMessage::new(payload.title, payload.body)
        .with_data(payload.data.unwrap_or_default());

    match state.service.send_broadcast(message).await {
        Ok(message_id) => {
            info!("Broadcast sent: {}", message_id);
            Json(SendNotificationResponse {
                success: true,
                message_id: Some(message_id),
                message: None,
            })
            .into_response()
        }
        Err(err) => {
            error!("Failed to broadcast notification: {:?}", err);
            err.into_http_response()
        }
    }
}

/// Handler for sending a test notification to the calling user
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/notifications/test",
    request_body = TestNotificationRequest,
    responses(
        (status = 200, description = "Test notification sent or skipped", body = SendNotificationResponse),
        (status = 502, description = "Push gateway failure")
    ),
    tag = "Notifications"
))]
pub async fn test_notification_handler(
    State(state): State<Arc<NotifyState>>,
    Json(payload): Json<TestNotificationRequest>,
) -> Response {
    debug!("Sending test notification to user: {}", payload.user_id);

    let message = NotificationMessage::new(
        payload
            .title
            .unwrap_or_else(|| "Test Notification".to_string()),
        payload
            .body
            .unwrap_or_else(|| "This is a test notification".to_string()),
    );

    match state.service.send_to_user(&payload.user_id, message).await {
        Ok(outcome) => outcome_response(outcome),
        Err(err) => {
            error!("Failed to send test notification: {:?}", err);
            err.into_http_response()
        }
    }
}

/// Handler for reading a user's push status
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/notifications/status",
    params(StatusQuery),
    responses(
        (status = 200, description = "The user's push status", body = crate::service::NotificationStatus),
        (status = 404, description = "User unknown to the push system")
    ),
    tag = "Notifications"
))]
pub async fn notification_status_handler(
    State(state): State<Arc<NotifyState>>,
    Query(query): Query<StatusQuery>,
) -> Response {
    debug!("Reading push status for user: {}", query.user_id);

    match state.service.get_notification_status(&query.user_id).await {
        Ok(status) => Json(status).into_response(),
        Err(err) => {
            error!("Failed to read push status: {:?}", err);
            err.into_http_response()
        }
    }
}

/// Handler for replacing a user's notification preferences
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    put,
    path = "/notifications/preferences",
    request_body = UpdatePreferencesRequest,
    responses(
        (status = 200, description = "Preferences updated", body = UpdatePreferencesResponse),
        (status = 500, description = "Internal Server Error")
    ),
    tag = "Notifications"
))]
pub async fn update_preferences_handler(
    State(state): State<Arc<NotifyState>>,
    Json(payload): Json<UpdatePreferencesRequest>,
) -> Response {
    debug!("Updating preferences for user: {}", payload.user_id);

    match state
        .service
        .update_notification_preferences(&payload.user_id, payload.preferences)
        .await
    {
        Ok(preferences) => {
            info!("Preferences updated for user: {}", payload.user_id);
            Json(UpdatePreferencesResponse {
                success: true,
                preferences,
            })
            .into_response()
        }
        Err(err) => {
            error!("Failed to update preferences: {:?}", err);
            err.into_http_response()
        }
    }
}

/// Handler for reading the deployment's push configuration
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/notifications/config",
    responses(
        (status = 200, description = "Configuration status", body = crate::service::ConfigStatus)
    ),
    tag = "Notifications"
))]
pub async fn notification_config_handler(State(state): State<Arc<NotifyState>>) -> Response {
    debug!("Reading push configuration status");
    Json(state.service.config_status().await).into_response()
}

/// Handler for the new-message application event
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/notifications/events/new-message",
    request_body = NewMessageEventRequest,
    responses(
        (status = 200, description = "Notification sent or skipped", body = SendNotificationResponse)
    ),
    tag = "Notification Events"
))]
pub async fn new_message_event_handler(
    State(state): State<Arc<NotifyState>>,
    Json(payload): Json<NewMessageEventRequest>,
) -> Response {
    debug!("New message notification for user: {}", payload.user_id);

    match state
        .service
        .send_new_message_notification(&payload.user_id, &payload.sender_id, &payload.sender_name)
        .await
    {
        Ok(outcome) => outcome_response(outcome),
        Err(err) => {
            error!("Failed to send new message notification: {:?}", err);
            err.into_http_response()
        }
    }
}

/// Handler for the new-follower application event
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/notifications/events/new-follower",
    request_body = NewFollowerEventRequest,
    responses(
        (status = 200, description = "Notification sent or skipped", body = SendNotificationResponse)
    ),
    tag = "Notification Events"
))]
pub async fn new_follower_event_handler(
    State(state): State<Arc<NotifyState>>,
    Json(payload): Json<NewFollowerEventRequest>,
) -> Response {
    debug!("New follower notification for user: {}", payload.user_id);

    match state
        .service
        .send_new_follower_notification(
            &payload.user_id,
            &payload.follower_id,
            &payload.follower_name,
        )
        .await
    {
        Ok(outcome) => outcome_response(outcome),
        Err(err) => {
            error!("Failed to send new follower notification: {:?}", err);
            err.into_http_response()
        }
    }
}

/// Handler for the project-invitation application event
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/notifications/events/project-invitation",
    request_body = ProjectInvitationEventRequest,
    responses(
        (status = 200, description = "Notification sent or skipped", body = SendNotificationResponse)
    ),
    tag = "Notification Events"
))]
pub async fn project_invitation_event_handler(
    State(state): State<Arc<NotifyState>>,
    Json(payload): Json<ProjectInvitationEventRequest>,
) -> Response {
    debug!("Project invitation notification for user: {}", payload.user_id);

    match state
        .service
        .send_project_invitation_notification(
            &payload.user_id,
            &payload.inviter_name,
            &payload.project_id,
            &payload.project_title,
        )
        .await
    {
        Ok(outcome) => outcome_response(outcome),
        Err(err) => {
            error!("Failed to send project invitation notification: {:?}", err);
            err.into_http_response()
        }
    }
}

/// Handler for the event-reminder application event
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/notifications/events/event-reminder",
    request_body = EventReminderEventRequest,
    responses(
        (status = 200, description = "Notification sent or skipped", body = SendNotificationResponse)
    ),
    tag = "Notification Events"
))]
pub async fn event_reminder_event_handler(
    State(state): State<Arc<NotifyState>>,
    Json(payload): Json<EventReminderEventRequest>,
) -> Response {
    debug!("Event reminder notification for user: {}", payload.user_id);

    match state
        .service
        .send_event_reminder_notification(
            &payload.user_id,
            &payload.event_id,
            &payload.event_title,
            &payload.start_time,
        )
        .await
    {
        Ok(outcome) => outcome_response(outcome),
        Err(err) => {
            error!("Failed to send event reminder notification: {:?}", err);
            err.into_http_response()
        }
    }
}

/// Handler for the post-like application event
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/notifications/events/post-like",
    request_body = PostLikeEventRequest,
    responses(
        (status = 200, description = "Notification sent or skipped", body = SendNotificationResponse)
    ),
    tag = "Notification Events"
))]
pub async fn post_like_event_handler(
    State(state): State<Arc<NotifyState>>,
    Json(payload): Json<PostLikeEventRequest>,
) -> Response {
    debug!("Post like notification for user: {}", payload.user_id);

    match state
        .service
        .send_post_like_notification(&payload.user_id, &payload.liker_name, &payload.post_id)
        .await
    {
        Ok(outcome) => outcome_response(outcome),
        Err(err) => {
            error!("Failed to send post like notification: {:?}", err);
            err.into_http_response()
        }
    }
}

/// Handler for the comment-reply application event
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/notifications/events/comment-reply",
    request_body = CommentReplyEventRequest,
    responses(
        (status = 200, description = "Notification sent or skipped", body = SendNotificationResponse)
    ),
    tag = "Notification Events"
))]
pub async fn comment_reply_event_handler(
    State(state): State<Arc<NotifyState>>,
    Json(payload): Json<CommentReplyEventRequest>,
) -> Response {
    debug!("Comment reply notification for user: {}", payload.user_id);

    match state
        .service
        .send_comment_reply_notification(
            &payload.user_id,
            &payload.replier_name,
            &payload.comment_id,
        )
        .await
    {
        Ok(outcome) => outcome_response(outcome),
        Err(err) => {
            error!("Failed to send comment reply notification: {:?}", err);
            err.into_http_response()
        }
    }
}
