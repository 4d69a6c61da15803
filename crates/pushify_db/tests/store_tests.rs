//! Integration tests for the SQL-backed stores, run against a throwaway
//! SQLite file per test.

use std::collections::HashMap;

use chrono::{Duration, Utc};
use pushify_common::models::{DeviceRegistration, NotificationPreferences, Platform};
use pushify_common::services::{PushProfileStore, RegistrationStore};
use pushify_db::{DbClient, SqlPushProfileStore, SqlRegistrationStore, StoreError};
use tempfile::TempDir;

struct TestDb {
    _tmp: TempDir,
    client: DbClient,
}

impl TestDb {
    async fn new() -> Self {
        let tmp = TempDir::new().expect("create temp dir");
        let url = format!("sqlite://{}", tmp.path().join("pushify.db").display());
        let client = DbClient::from_url(&url).await.expect("open sqlite database");
        Self { _tmp: tmp, client }
    }

    async fn registration_store(&self) -> SqlRegistrationStore {
        let store =
            SqlRegistrationStore::new(self.client.clone(), None).expect("valid default table");
        store.init_schema().await.expect("create registration schema");
        store
    }

    async fn profile_store(&self) -> SqlPushProfileStore {
        let store = SqlPushProfileStore::new(self.client.clone());
        store.init_schema().await.expect("create profile schema");
        store
    }
}

fn sample_registration(user_id: &str) -> DeviceRegistration {
    let mut device_info = HashMap::new();
    device_info.insert("model".to_string(), "Pixel 8".to_string());
    device_info.insert("os_version".to_string(), "14".to_string());

    DeviceRegistration::new(
        user_id.to_string(),
        "token-abc123".to_string(),
        Platform::Android,
        "arn:endpoint/1".to_string(),
        Some("arn:subscription/1".to_string()),
        device_info,
    )
}

#[tokio::test]
async fn saved_registration_is_found_active_with_all_fields() {
    let db = TestDb::new().await;
    let store = db.registration_store().await;

    let registration = sample_registration("user-1");
    let saved = store.save(registration.clone()).await.expect("save");
    assert_eq!(saved.id, registration.id);

    let found = store
        .find_active_by_user("user-1")
        .await
        .expect("find")
        .expect("registration should be active");

    assert_eq!(found.id, registration.id);
    assert_eq!(found.user_id, "user-1");
    assert_eq!(found.device_token, "token-abc123");
    assert_eq!(found.platform, Platform::Android);
    assert_eq!(found.endpoint_id, "arn:endpoint/1");
    assert_eq!(found.subscription_id.as_deref(), Some("arn:subscription/1"));
    assert_eq!(found.device_info, registration.device_info);
    assert_eq!(found.registered_at, registration.registered_at);
    assert!(found.is_active);
    assert!(found.revoked_at.is_none());
}

#[tokio::test]
async fn revoke_marks_rows_inactive_with_timestamp() {
    let db = TestDb::new().await;
    let store = db.registration_store().await;

    store
        .save(sample_registration("user-2"))
        .await
        .expect("save");

    let revoked = store.revoke_for_user("user-2").await.expect("revoke");
    assert_eq!(revoked, 1);

    assert!(store
        .find_active_by_user("user-2")
        .await
        .expect("find")
        .is_none());

    let all = store.find_by_user("user-2").await.expect("find all");
    assert_eq!(all.len(), 1);
    assert!(!all[0].is_active);
    assert!(all[0].revoked_at.is_some());

    // Nothing left to revoke.
    assert_eq!(store.revoke_for_user("user-2").await.expect("revoke"), 0);
}

#[tokio::test]
async fn re_registration_keeps_history_and_single_active_row() {
    let db = TestDb::new().await;
    let store = db.registration_store().await;

    let first = sample_registration("user-3");
    store.save(first.clone()).await.expect("save first");
    store.revoke_for_user("user-3").await.expect("revoke");

    let mut second = DeviceRegistration::new(
        "user-3".to_string(),
        "token-new".to_string(),
        Platform::Ios,
        "arn:endpoint/2".to_string(),
        None,
        HashMap::new(),
    );
    // Force a strictly later timestamp so ordering is deterministic.
    second.registered_at = first.registered_at + Duration::seconds(1);
    store.save(second.clone()).await.expect("save second");

    let active = store
        .find_active_by_user("user-3")
        .await
        .expect("find")
        .expect("second registration should be active");
    assert_eq!(active.id, second.id);
    assert_eq!(active.platform, Platform::Ios);
    assert!(active.subscription_id.is_none());

    let all = store.find_by_user("user-3").await.expect("find all");
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].id, second.id, "newest first");
    assert_eq!(all[1].id, first.id);
}

#[tokio::test]
async fn profile_activation_round_trip_and_deactivation() {
    let db = TestDb::new().await;
    let store = db.profile_store().await;

    assert!(store.load("user-4").await.expect("load").is_none());

    store
        .activate("user-4", "token-xyz", Platform::Ios, "arn:endpoint/9")
        .await
        .expect("activate");

    let profile = store
        .load("user-4")
        .await
        .expect("load")
        .expect("profile should exist");
    assert!(profile.enabled);
    assert_eq!(profile.device_token.as_deref(), Some("token-xyz"));
    assert_eq!(profile.platform, Some(Platform::Ios));
    assert_eq!(profile.endpoint_id.as_deref(), Some("arn:endpoint/9"));
    assert!(profile.preferences.is_none());

    store.deactivate("user-4").await.expect("deactivate");

    let profile = store
        .load("user-4")
        .await
        .expect("load")
        .expect("profile row survives deactivation");
    assert!(!profile.enabled);
    assert!(profile.device_token.is_none());
    assert!(profile.platform.is_none());
    assert!(profile.endpoint_id.is_none());
}

#[tokio::test]
async fn preferences_can_be_set_before_first_registration() {
    let db = TestDb::new().await;
    let store = db.profile_store().await;

    let preferences = NotificationPreferences {
        messages: false,
        ..Default::default()
    };
    let saved = store
        .set_preferences("user-5", preferences)
        .await
        .expect("set preferences");
    assert_eq!(saved, preferences);

    let profile = store
        .load("user-5")
        .await
        .expect("load")
        .expect("preference update creates the profile row");
    assert!(!profile.enabled, "preference-only rows stay disabled");
    assert_eq!(profile.preferences, Some(preferences));
}

#[tokio::test]
async fn preferences_survive_deactivation() {
    let db = TestDb::new().await;
    let store = db.profile_store().await;

    store
        .activate("user-6", "token-1", Platform::Android, "arn:endpoint/6")
        .await
        .expect("activate");
    let preferences = NotificationPreferences {
        posts: false,
        comments: false,
        ..Default::default()
    };
    store
        .set_preferences("user-6", preferences)
        .await
        .expect("set preferences");

    store.deactivate("user-6").await.expect("deactivate");

    let profile = store
        .load("user-6")
        .await
        .expect("load")
        .expect("profile should exist");
    assert!(!profile.enabled);
    assert_eq!(profile.preferences, Some(preferences));
}

#[tokio::test]
async fn registration_table_name_is_configurable_but_validated() {
    let db = TestDb::new().await;

    let store = SqlRegistrationStore::new(db.client.clone(), Some("push_regs_v2".to_string()))
        .expect("plain identifier accepted");
    store.init_schema().await.expect("create schema");

    store
        .save(sample_registration("user-7"))
        .await
        .expect("save");
    assert!(store
        .find_active_by_user("user-7")
        .await
        .expect("find")
        .is_some());

    let err = SqlRegistrationStore::new(db.client.clone(), Some("regs; --".to_string()))
        .expect_err("injection-shaped names are rejected");
    assert!(matches!(err, StoreError::ConfigError(_)));
}
