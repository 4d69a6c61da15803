//! Notification templates
//!
//! Fixed title/body templates for the notification kinds the service sends
//! on behalf of application events. Bodies carry `{{placeholder}}` tokens
//! substituted from a string map at render time; every template also ships
//! default data with a `type` discriminant and a `click_action` hint the
//! mobile clients route on.

use pushify_common::models::NotificationMessage;
use std::collections::HashMap;

/// The notification kinds with a built-in template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    NewMessage,
    NewFollower,
    ProjectInvitation,
    EventReminder,
    PostLike,
    CommentReply,
}

/// A static notification template.
pub struct NotificationTemplate {
    /// The notification title
    pub title: &'static str,
    /// The notification body, with `{{placeholder}}` tokens
    pub body: &'static str,
    /// Data fields attached to every notification of this kind
    pub default_data: &'static [(&'static str, &'static str)],
}

const NEW_MESSAGE: NotificationTemplate = NotificationTemplate {
    title: "New Message",
    body: "{{senderName}} sent you a message",
    default_data: &[("type", "new_message"), ("click_action", "OPEN_MESSAGES")],
};

const NEW_FOLLOWER: NotificationTemplate = NotificationTemplate {
    title: "New Follower",
    body: "{{followerName}} started following you",
    default_data: &[("type", "new_follower"), ("click_action", "OPEN_PROFILE")],
};

const PROJECT_INVITATION: NotificationTemplate = NotificationTemplate {
    title: "Project Invitation",
    body: "{{inviterName}} invited you to join {{projectTitle}}",
    default_data: &[
        ("type", "project_invitation"),
        ("click_action", "OPEN_PROJECT"),
    ],
};

const EVENT_REMINDER: NotificationTemplate = NotificationTemplate {
    title: "Event Reminder",
    body: "{{eventTitle}} starts at {{startTime}}",
    default_data: &[("type", "event_reminder"), ("click_action", "OPEN_EVENT")],
};

const POST_LIKE: NotificationTemplate = NotificationTemplate {
    title: "New Like",
    body: "{{likerName}} liked your post",
    default_data: &[("type", "post_like"), ("click_action", "OPEN_POST")],
};

const COMMENT_REPLY: NotificationTemplate = NotificationTemplate {
    title: "New Reply",
    body: "{{replierName}} replied to your comment",
    default_data: &[("type", "comment_reply"), ("click_action", "OPEN_POST")],
};

/// Look up the template for a notification kind.
pub fn template(kind: NotificationKind) -> &'static NotificationTemplate {
    match kind {
        NotificationKind::NewMessage => &NEW_MESSAGE,
        NotificationKind::NewFollower => &NEW_FOLLOWER,
        NotificationKind::ProjectInvitation => &PROJECT_INVITATION,
        NotificationKind::EventReminder => &EVENT_REMINDER,
        NotificationKind::PostLike => &POST_LIKE,
        NotificationKind::CommentReply => &COMMENT_REPLY,
    }
}

/// Render a template into a dispatchable message.
///
/// `params` supplies values for the `{{placeholder}}` tokens. Tokens with no
/// matching key stay literal in the output; callers own supplying the fields
/// their kind needs. The returned message carries the template's default
/// data; callers merge their own fields on top.
pub fn render(kind: NotificationKind, params: &HashMap<String, String>) -> NotificationMessage {
    let template = template(kind);

    let mut data = HashMap::new();
    for (key, value) in template.default_data {
        data.insert((*key).to_string(), (*value).to_string());
    }

    NotificationMessage {
        title: substitute(template.title, params),
        body: substitute(template.body, params),
        data,
    }
}

fn substitute(text: &str, params: &HashMap<String, String>) -> String {
    let mut rendered = text.to_string();
    for (key, value) in params {
        rendered = rendered.replace(&format!("{{{{{key}}}}}"), value);
    }
    rendered
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn new_message_renders_sender_name() {
        let message = render(
            NotificationKind::NewMessage,
            &params(&[("senderName", "Alex")]),
        );

        assert_eq!(message.title, "New Message");
        assert_eq!(message.body, "Alex sent you a message");
        assert_eq!(message.data.get("type").unwrap(), "new_message");
        assert_eq!(message.data.get("click_action").unwrap(), "OPEN_MESSAGES");
    }

    #[test]
    fn missing_placeholders_stay_literal() {
        let message = render(NotificationKind::NewMessage, &HashMap::new());
        assert_eq!(message.body, "{{senderName}} sent you a message");
    }

    #[test]
    fn multiple_placeholders_substitute_independently() {
        let message = render(
            NotificationKind::ProjectInvitation,
            &params(&[("inviterName", "Dana"), ("projectTitle", "Skyline")]),
        );
        assert_eq!(message.body, "Dana invited you to join Skyline");

        // A partially supplied map substitutes what it can.
        let message = render(
            NotificationKind::EventReminder,
            &params(&[("eventTitle", "Standup")]),
        );
        assert_eq!(message.body, "Standup starts at {{startTime}}");
    }

    #[test]
    fn unused_params_are_ignored() {
        let message = render(
            NotificationKind::PostLike,
            &params(&[("likerName", "Sam"), ("unrelated", "value")]),
        );
        assert_eq!(message.body, "Sam liked your post");
        assert!(!message.data.contains_key("unrelated"));
    }

    #[test]
    fn every_kind_carries_type_and_click_action() {
        let kinds = [
            (NotificationKind::NewMessage, "new_message", "OPEN_MESSAGES"),
            (NotificationKind::NewFollower, "new_follower", "OPEN_PROFILE"),
            (
                NotificationKind::ProjectInvitation,
                "project_invitation",
                "OPEN_PROJECT",
            ),
            (
                NotificationKind::EventReminder,
                "event_reminder",
                "OPEN_EVENT",
            ),
            (NotificationKind::PostLike, "post_like", "OPEN_POST"),
            (NotificationKind::CommentReply, "comment_reply", "OPEN_POST"),
        ];

        for (kind, expected_type, expected_action) in kinds {
            let message = render(kind, &HashMap::new());
            assert_eq!(message.data.get("type").unwrap(), expected_type);
            assert_eq!(message.data.get("click_action").unwrap(), expected_action);
        }
    }
}
