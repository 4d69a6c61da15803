use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tracing::info;

use crate::handlers::{
    broadcast_handler, comment_reply_event_handler, event_reminder_event_handler,
    new_follower_event_handler, new_message_event_handler, notification_config_handler,
    notification_status_handler, post_like_event_handler, project_invitation_event_handler,
    register_device_handler, send_batch_handler, send_notification_handler,
    test_notification_handler, unregister_device_handler, update_preferences_handler,
    NotifyState,
};
use crate::service::PushNotificationService;

/// Create the notification routes.
///
/// Takes the already-constructed orchestrator; the backend wires the
/// gateway and store implementations before any route exists, so a
/// misconfigured deployment fails at startup rather than on the first
/// request.
///
/// # Arguments
///
/// * `service` - The push notification orchestrator
///
/// # Returns
///
/// An Axum router with the notification API endpoints
pub fn routes(service: Arc<PushNotificationService>) -> Router {
    info!("Notification routes initialized");

    let state = Arc::new(NotifyState { service });

    Router::new()
        .route("/notifications/register", post(register_device_handler))
        .route("/notifications/unregister", post(unregister_device_handler))
        .route("/notifications/send", post(send_notification_handler))
        .route("/notifications/send-batch", post(send_batch_handler))
        .route("/notifications/broadcast", post(broadcast_handler))
        .route("/notifications/test", post(test_notification_handler))
        .route("/notifications/status", get(notification_status_handler))
        .route(
            "/notifications/preferences",
            put(update_preferences_handler),
        )
        .route("/notifications/config", get(notification_config_handler))
        .route(
            "/notifications/events/new-message",
            post(new_message_event_handler),
        )
        .route(
            "/notifications/events/new-follower",
            post(new_follower_event_handler),
        )
        .route(
            "/notifications/events/project-invitation",
            post(project_invitation_event_handler),
        )
        .route(
            "/notifications/events/event-reminder",
            post(event_reminder_event_handler),
        )
        .route(
            "/notifications/events/post-like",
            post(post_like_event_handler),
        )
        .route(
            "/notifications/events/comment-reply",
            post(comment_reply_event_handler),
        )
        .with_state(state)
}
