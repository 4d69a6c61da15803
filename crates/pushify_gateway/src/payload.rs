//! Platform payload construction.
//!
//! The gateway delivers raw per-platform envelopes: an APNS-style `aps`
//! dictionary for iOS devices and an FCM-style notification/data pair for
//! everything else. Platform names are matched case-insensitively and
//! unrecognized values fall through to the FCM format; that keeps dispatch
//! working for tokens registered before a platform was recognized here.

use pushify_common::models::NotificationMessage;
use serde::Serialize;
use std::collections::HashMap;

/// Sound played for every notification.
pub const DEFAULT_SOUND: &str = "default";
/// Badge count attached to APNS envelopes.
pub const DEFAULT_BADGE: u32 = 1;
/// Small-icon resource name for FCM envelopes.
pub const DEFAULT_ICON: &str = "ic_notification";
/// Accent color for FCM envelopes.
pub const DEFAULT_COLOR: &str = "#4A90E2";
/// Data key carrying the client-side tap action.
pub const CLICK_ACTION_KEY: &str = "click_action";
/// Tap action used when the caller supplied none.
pub const DEFAULT_CLICK_ACTION: &str = "FLUTTER_NOTIFICATION_CLICK";

/// The alert block of an APNS `aps` dictionary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApnsAlert {
    pub title: String,
    pub body: String,
}

/// The `aps` dictionary APNS requires.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Aps {
    pub alert: ApnsAlert,
    pub badge: u32,
    pub sound: String,
}

/// Full APNS envelope: the `aps` dictionary plus custom data keys at the
/// top level, as APNS expects them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApnsEnvelope {
    pub aps: Aps,
    #[serde(flatten)]
    pub data: HashMap<String, String>,
}

/// The notification block of an FCM envelope.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FcmNotification {
    pub title: String,
    pub body: String,
    pub icon: String,
    pub color: String,
    pub sound: String,
}

/// Full FCM envelope: visible notification plus the string data payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FcmEnvelope {
    pub notification: FcmNotification,
    pub data: HashMap<String, String>,
}

/// A single-endpoint publish body, formatted for the target platform.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PushEnvelope {
    Apns(ApnsEnvelope),
    Fcm(FcmEnvelope),
}

/// A topic publish body: plain-text fallback plus both platform envelopes,
/// so every subscriber receives a correctly formatted message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopicPayload {
    pub default: String,
    pub apns: ApnsEnvelope,
    pub fcm: FcmEnvelope,
}

/// Build the publish envelope for one endpoint.
///
/// `platform` is compared case-insensitively; only `ios` selects the APNS
/// format, everything else gets the FCM format.
pub fn build_envelope(message: &NotificationMessage, platform: &str) -> PushEnvelope {
    if platform.eq_ignore_ascii_case("ios") {
        PushEnvelope::Apns(apns_envelope(message))
    } else {
        PushEnvelope::Fcm(fcm_envelope(message))
    }
}

/// Build the topic payload carrying both platform envelopes.
pub fn build_topic_payload(message: &NotificationMessage) -> TopicPayload {
    TopicPayload {
        default: message.body.clone(),
        apns: apns_envelope(message),
        fcm: fcm_envelope(message),
    }
}

fn apns_envelope(message: &NotificationMessage) -> ApnsEnvelope {
    ApnsEnvelope {
        aps: Aps {
            alert: ApnsAlert {
                title: message.title.clone(),
                body: message.body.clone(),
            },
            badge: DEFAULT_BADGE,
            sound: DEFAULT_SOUND.to_string(),
        },
        data: message.data.clone(),
    }
}

fn fcm_envelope(message: &NotificationMessage) -> FcmEnvelope {
    let mut data = message.data.clone();
    data.entry(CLICK_ACTION_KEY.to_string())
        .or_insert_with(|| DEFAULT_CLICK_ACTION.to_string());

    FcmEnvelope {
        notification: FcmNotification {
            title: message.title.clone(),
            body: message.body.clone(),
            icon: DEFAULT_ICON.to_string(),
            color: DEFAULT_COLOR.to_string(),
            sound: DEFAULT_SOUND.to_string(),
        },
        data,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message() -> NotificationMessage {
        let mut data = HashMap::new();
        data.insert("postId".to_string(), "p-1".to_string());
        NotificationMessage::new("Hello", "World").with_data(data)
    }

    #[test]
    fn ios_platform_selects_apns_format() {
        let envelope = build_envelope(&message(), "ios");
        match envelope {
            PushEnvelope::Apns(apns) => {
                assert_eq!(apns.aps.alert.title, "Hello");
                assert_eq!(apns.aps.alert.body, "World");
                assert_eq!(apns.aps.badge, DEFAULT_BADGE);
                assert_eq!(apns.data.get("postId").map(String::as_str), Some("p-1"));
            }
            PushEnvelope::Fcm(_) => panic!("expected APNS envelope for ios"),
        }
    }

    #[test]
    fn platform_match_is_case_insensitive() {
        assert!(matches!(
            build_envelope(&message(), "iOS"),
            PushEnvelope::Apns(_)
        ));
        assert!(matches!(
            build_envelope(&message(), "IOS"),
            PushEnvelope::Apns(_)
        ));
    }

    #[test]
    fn unknown_platform_falls_through_to_fcm() {
        let envelope = build_envelope(&message(), "huawei");
        match envelope {
            PushEnvelope::Fcm(fcm) => {
                assert_eq!(fcm.notification.icon, DEFAULT_ICON);
                assert_eq!(
                    fcm.data.get(CLICK_ACTION_KEY).map(String::as_str),
                    Some(DEFAULT_CLICK_ACTION)
                );
            }
            PushEnvelope::Apns(_) => panic!("expected FCM envelope for unknown platform"),
        }
    }

    #[test]
    fn caller_click_action_is_preserved() {
        let mut data = HashMap::new();
        data.insert(CLICK_ACTION_KEY.to_string(), "OPEN_POST".to_string());
        let message = NotificationMessage::new("t", "b").with_data(data);

        let envelope = build_envelope(&message, "android");
        match envelope {
            PushEnvelope::Fcm(fcm) => {
                assert_eq!(
                    fcm.data.get(CLICK_ACTION_KEY).map(String::as_str),
                    Some("OPEN_POST")
                );
            }
            PushEnvelope::Apns(_) => unreachable!(),
        }
    }

    #[test]
    fn apns_custom_data_serializes_beside_aps() {
        let envelope = build_envelope(&message(), "ios");
        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["aps"]["alert"]["title"], "Hello");
        assert_eq!(json["postId"], "p-1");
    }

    #[test]
    fn topic_payload_carries_both_envelopes_and_plain_default() {
        let payload = build_topic_payload(&message());
        assert_eq!(payload.default, "World");
        assert_eq!(payload.apns.aps.alert.title, "Hello");
        assert_eq!(payload.fcm.notification.title, "Hello");
    }
}
