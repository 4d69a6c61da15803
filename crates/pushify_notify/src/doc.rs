#![allow(dead_code)]
use utoipa::OpenApi;

use crate::handlers::{
    BroadcastRequest, CommentReplyEventRequest, EventReminderEventRequest,
    NewFollowerEventRequest, NewMessageEventRequest, PostLikeEventRequest,
    ProjectInvitationEventRequest, RegisterDeviceRequest, RegisterDeviceResponse,
    SendBatchRequest, SendBatchResponse, SendNotificationRequest, SendNotificationResponse,
    StatusQuery, TestNotificationRequest, UnregisterDeviceRequest, UnregisterDeviceResponse,
    UpdatePreferencesRequest, UpdatePreferencesResponse,
};
use crate::service::{ConfigStatus, NotificationStatus};
use pushify_common::models::{NotificationPreferences, Platform};
use pushify_common::services::BulkSendEntry;

#[utoipa::path(
    post,
    path = "/notifications/register",
    request_body(content = RegisterDeviceRequest, example = json!({
        "user_id": "user123",
        "device_token": "fcm-registration-token-example",
        "platform": "android",
        "device_info": {
            "model": "Pixel 8",
            "os_version": "14"
        }
    })),
    responses(
        (status = 200, description = "Device registered successfully", body = RegisterDeviceResponse,
         example = json!({
             "success": true,
             "endpoint_id": "endpoint-abc123",
             "subscription_id": "subscription-def456",
             "message": "Device registered successfully"
         })
        ),
        (status = 400, description = "Unknown platform",
         example = json!({
             "error": {
                 "message": "unknown platform: windows",
                 "code": 400
             }
         })
        ),
        (status = 502, description = "Push gateway failure")
    ),
    tag = "Notifications"
)]
fn doc_register_device_handler() {}

#[utoipa::path(
    post,
    path = "/notifications/send",
    request_body(content = SendNotificationRequest, example = json!({
        "user_id": "user123",
        "title": "Welcome",
        "body": "Thanks for joining!",
        "data": {
            "screen": "home"
        }
    })),
    responses(
        (status = 200, description = "Notification sent or skipped", body = SendNotificationResponse,
         example = json!({
             "success": true,
             "message_id": "message-789",
             "message": null
         })
        ),
        (status = 502, description = "Push gateway failure")
    ),
    tag = "Notifications"
)]
fn doc_send_notification_handler() {}

#[utoipa::path(
    post,
    path = "/notifications/send-batch",
    request_body(content = SendBatchRequest, example = json!({
        "user_ids": ["user123", "user456"],
        "title": "Maintenance tonight",
        "body": "The service will be briefly unavailable at 02:00 UTC"
    })),
    responses(
        (status = 200, description = "Batch dispatched", body = SendBatchResponse,
         example = json!({
             "success": true,
             "sent": 1,
             "failed": 1,
             "total": 2,
             "results": [
                 {"endpoint_id": "endpoint-1", "success": true, "message_id": "message-1", "error": null},
                 {"endpoint_id": "endpoint-2", "success": false, "message_id": null, "error": "endpoint disabled"}
             ]
         })
        )
    ),
    tag = "Notifications"
)]
fn doc_send_batch_handler() {}

#[utoipa::path(
    get,
    path = "/notifications/status",
    params(StatusQuery),
    responses(
        (status = 200, description = "The user's push status", body = NotificationStatus,
         example = json!({
             "enabled": true,
             "platform": "android",
             "has_valid_endpoint": true,
             "preferences": {
                 "messages": true,
                 "followers": true,
                 "projects": true,
                 "events": true,
                 "posts": false,
                 "comments": true
             }
         })
        ),
        (status = 404, description = "User unknown to the push system")
    ),
    tag = "Notifications"
)]
fn doc_notification_status_handler() {}

#[utoipa::path(
    get,
    path = "/notifications/config",
    responses(
        (status = 200, description = "Configuration status", body = ConfigStatus,
         example = json!({
             "configured": true,
             "platform_application": "app-mobile-prod",
             "broadcast_topic": "topic-all-users",
             "gateway_reachable": true
         })
        )
    ),
    tag = "Notifications"
)]
fn doc_notification_config_handler() {}

#[utoipa::path(
    post,
    path = "/notifications/events/new-message",
    request_body(content = NewMessageEventRequest, example = json!({
        "user_id": "user123",
        "sender_id": "user456",
        "sender_name": "Alex"
    })),
    responses(
        (status = 200, description = "Notification sent or skipped", body = SendNotificationResponse)
    ),
    tag = "Notification Events"
)]
fn doc_new_message_event_handler() {}

#[derive(OpenApi)]
#[openapi(
    paths(
        doc_register_device_handler,
        doc_send_notification_handler,
        doc_send_batch_handler,
        doc_notification_status_handler,
        doc_notification_config_handler,
        doc_new_message_event_handler,
    ),
    components(
        schemas(
            RegisterDeviceRequest,
            RegisterDeviceResponse,
            UnregisterDeviceRequest,
            UnregisterDeviceResponse,
            SendNotificationRequest,
            SendNotificationResponse,
            SendBatchRequest,
            SendBatchResponse,
            BroadcastRequest,
            TestNotificationRequest,
            UpdatePreferencesRequest,
            UpdatePreferencesResponse,
            NewMessageEventRequest,
            NewFollowerEventRequest,
            ProjectInvitationEventRequest,
            EventReminderEventRequest,
            PostLikeEventRequest,
            CommentReplyEventRequest,
            NotificationStatus,
            ConfigStatus,
            NotificationPreferences,
            BulkSendEntry,
            Platform,
        )
    ),
    tags(
        (name = "Notifications", description = "Push notification API"),
        (name = "Notification Events", description = "Application events that fan out as push notifications")
    ),
    servers(
        (url = "/api", description = "Push notification API server")
    )
)]
pub struct NotifyApiDoc;
