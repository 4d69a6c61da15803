// --- File: crates/pushify_common/src/models.rs ---

// Data structures shared across the workspace: the mobile platform enum,
// the notification message produced by template rendering, the device
// registration record, and the per-user push profile.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Mobile platform a device token belongs to.
///
/// The HTTP boundary parses this case-insensitively via [`FromStr`] and
/// rejects anything else. Deeper layers that only forward the platform name
/// to the gateway (envelope selection) work on strings and fall through to
/// the default format for unknown values instead of erroring.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Ios,
    Android,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Ios => "ios",
            Platform::Android => "android",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = UnknownPlatform;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ios" => Ok(Platform::Ios),
            "android" => Ok(Platform::Android),
            other => Err(UnknownPlatform(other.to_string())),
        }
    }
}

/// Error returned when parsing an unrecognized platform name.
#[derive(Debug, Clone)]
pub struct UnknownPlatform(pub String);

impl fmt::Display for UnknownPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown platform: {}", self.0)
    }
}

impl std::error::Error for UnknownPlatform {}

impl crate::error::HttpStatusCode for UnknownPlatform {
    fn status_code(&self) -> u16 {
        400
    }
}

/// A rendered notification ready for dispatch: title, body, and a flat
/// string-to-string data payload delivered alongside the visible message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationMessage {
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub data: HashMap<String, String>,
}

impl NotificationMessage {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            data: HashMap::new(),
        }
    }

    pub fn with_data(mut self, data: HashMap<String, String>) -> Self {
        self.data = data;
        self
    }
}

/// Represents a device registration record.
///
/// One row per registration attempt; the current registration for a user is
/// the single active row. Unregistration and re-registration mark previous
/// rows revoked rather than deleting them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceRegistration {
    /// The unique identifier for this registration (UUID v4)
    pub id: String,

    /// The user ID associated with this registration
    pub user_id: String,

    /// The platform push token supplied by the device
    pub device_token: String,

    /// The platform the token belongs to
    pub platform: Platform,

    /// The gateway endpoint created for this token
    pub endpoint_id: String,

    /// The broadcast topic subscription, when one was created
    pub subscription_id: Option<String>,

    /// Free-form device metadata captured at registration time
    #[serde(default)]
    pub device_info: HashMap<String, String>,

    /// The timestamp when this registration was created
    pub registered_at: DateTime<Utc>,

    /// Whether this row is the user's current registration
    pub is_active: bool,

    /// When this registration was revoked, if it has been
    pub revoked_at: Option<DateTime<Utc>>,
}

impl DeviceRegistration {
    /// Create a new active registration record with a generated id.
    pub fn new(
        user_id: String,
        device_token: String,
        platform: Platform,
        endpoint_id: String,
        subscription_id: Option<String>,
        device_info: HashMap<String, String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id,
            device_token,
            platform,
            endpoint_id,
            subscription_id,
            device_info,
            registered_at: Utc::now(),
            is_active: true,
            revoked_at: None,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Per-category notification opt-outs. Every category defaults to enabled,
/// so a profile that has never touched preferences receives everything.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPreferences {
    #[serde(default = "default_true")]
    pub messages: bool,
    #[serde(default = "default_true")]
    pub followers: bool,
    #[serde(default = "default_true")]
    pub projects: bool,
    #[serde(default = "default_true")]
    pub events: bool,
    #[serde(default = "default_true")]
    pub posts: bool,
    #[serde(default = "default_true")]
    pub comments: bool,
}

impl Default for NotificationPreferences {
    fn default() -> Self {
        Self {
            messages: true,
            followers: true,
            projects: true,
            events: true,
            posts: true,
            comments: true,
        }
    }
}

impl NotificationPreferences {
    pub fn allows(&self, category: PreferenceCategory) -> bool {
        match category {
            PreferenceCategory::Messages => self.messages,
            PreferenceCategory::Followers => self.followers,
            PreferenceCategory::Projects => self.projects,
            PreferenceCategory::Events => self.events,
            PreferenceCategory::Posts => self.posts,
            PreferenceCategory::Comments => self.comments,
        }
    }
}

/// Preference category an event notification is gated on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreferenceCategory {
    Messages,
    Followers,
    Projects,
    Events,
    Posts,
    Comments,
}

/// The push sub-document stored per user: whether push is enabled, the
/// current token/platform/endpoint, and the category preferences.
///
/// `preferences: None` means the user never set them; reads treat that as
/// the all-enabled default.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PushProfile {
    #[serde(default)]
    pub enabled: bool,
    pub device_token: Option<String>,
    pub platform: Option<Platform>,
    pub endpoint_id: Option<String>,
    pub preferences: Option<NotificationPreferences>,
}

impl PushProfile {
    pub fn preferences_or_default(&self) -> NotificationPreferences {
        self.preferences.unwrap_or_default()
    }

    /// True when targeted sends can reach this profile.
    pub fn can_receive(&self) -> bool {
        self.enabled && self.endpoint_id.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn platform_parses_case_insensitively() {
        assert_eq!("ios".parse::<Platform>().unwrap(), Platform::Ios);
        assert_eq!("iOS".parse::<Platform>().unwrap(), Platform::Ios);
        assert_eq!("ANDROID".parse::<Platform>().unwrap(), Platform::Android);
        assert!("windows".parse::<Platform>().is_err());
    }

    #[test]
    fn preferences_default_to_all_enabled() {
        let prefs: NotificationPreferences = serde_json::from_str("{}").unwrap();
        assert!(prefs.messages);
        assert!(prefs.comments);
        assert_eq!(prefs, NotificationPreferences::default());
    }

    #[test]
    fn partial_preferences_keep_unlisted_categories_enabled() {
        let prefs: NotificationPreferences =
            serde_json::from_str(r#"{"messages": false}"#).unwrap();
        assert!(!prefs.messages);
        assert!(prefs.followers);
        assert!(!prefs.allows(PreferenceCategory::Messages));
        assert!(prefs.allows(PreferenceCategory::Posts));
    }

    #[test]
    fn profile_without_endpoint_cannot_receive() {
        let profile = PushProfile {
            enabled: true,
            ..Default::default()
        };
        assert!(!profile.can_receive());
    }
}
