//! Contract tests for the push gateway client against a mock gateway.

use pushify_common::models::NotificationMessage;
use pushify_common::services::BulkTarget;
use pushify_config::GatewayConfig;
use pushify_gateway::client::PushGatewayClient;
use pushify_gateway::error::GatewayError;
use serde_json::json;
use std::collections::HashMap;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn gateway_config(base_url: String) -> GatewayConfig {
    GatewayConfig {
        base_url,
        api_key: "test-key".to_string(),
        platform_application_id: Some("app-1".to_string()),
        broadcast_topic_id: Some("topic-1".to_string()),
    }
}

fn client_for(server: &MockServer) -> PushGatewayClient {
    PushGatewayClient::new(gateway_config(server.uri()))
}

#[tokio::test]
async fn create_endpoint_then_read_attributes_round_trip() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/apps/app-1/endpoints"))
        .and(header("Authorization", "Bearer test-key"))
        .and(body_partial_json(json!({"device_token": "tok-1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"endpoint_id": "end-1"})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/endpoints/end-1/attributes"))
        .and(header("Authorization", "Bearer test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "attributes": {"device_token": "tok-1", "userId": "u1"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);

    let mut user_data = HashMap::new();
    user_data.insert("userId".to_string(), "u1".to_string());

    let endpoint_id = client
        .create_endpoint("app-1", "tok-1", &user_data)
        .await
        .unwrap();
    assert_eq!(endpoint_id, "end-1");

    let attributes = client.endpoint_attributes(&endpoint_id).await.unwrap();
    assert_eq!(
        attributes.get("device_token").map(String::as_str),
        Some("tok-1")
    );
    assert_eq!(attributes.get("userId").map(String::as_str), Some("u1"));
}

#[tokio::test]
async fn publish_to_ios_endpoint_sends_apns_envelope() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/endpoints/end-9/messages"))
        .and(body_partial_json(json!({
            "payload": {"aps": {"alert": {"title": "Hi", "body": "There"}}}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message_id": "msg-1"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let message = NotificationMessage::new("Hi", "There");

    // Mixed-case platform still selects the APNS format.
    let message_id = client.publish("end-9", &message, "iOS").await.unwrap();
    assert_eq!(message_id, "msg-1");
}

#[tokio::test]
async fn publish_to_android_endpoint_sends_fcm_envelope() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/endpoints/end-2/messages"))
        .and(body_partial_json(json!({
            "payload": {
                "notification": {"title": "Hi", "body": "There"},
                "data": {"click_action": "FLUTTER_NOTIFICATION_CLICK"}
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message_id": "msg-2"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let message = NotificationMessage::new("Hi", "There");

    let message_id = client.publish("end-2", &message, "android").await.unwrap();
    assert_eq!(message_id, "msg-2");
}

#[tokio::test]
async fn topic_publish_carries_subject_and_both_envelopes() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/topics/topic-1/messages"))
        .and(body_partial_json(json!({
            "subject": "Release",
            "payload": {
                "default": "Version 2 is out",
                "apns": {"aps": {"alert": {"title": "Release"}}},
                "fcm": {"notification": {"title": "Release"}}
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message_id": "msg-3"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let message = NotificationMessage::new("Release", "Version 2 is out");

    let message_id = client.publish_to_topic("topic-1", &message).await.unwrap();
    assert_eq!(message_id, "msg-3");
}

#[tokio::test]
async fn subscription_lifecycle_round_trip() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/topics/topic-1/subscriptions"))
        .and(body_partial_json(json!({"endpoint_id": "end-1"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"subscription_id": "sub-1"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/v1/subscriptions/sub-1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);

    let subscription_id = client.subscribe("topic-1", "end-1").await.unwrap();
    assert_eq!(subscription_id, "sub-1");
    client.unsubscribe(&subscription_id).await.unwrap();
}

#[tokio::test]
async fn api_failure_surfaces_status_and_body() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/v1/endpoints/gone"))
        .respond_with(ResponseTemplate::new(404).set_body_string("endpoint not found"))
        .mount(&server)
        .await;

    let client = client_for(&server);

    match client.delete_endpoint("gone").await {
        Err(GatewayError::ApiError {
            status_code,
            message,
        }) => {
            assert_eq!(status_code, 404);
            assert_eq!(message, "endpoint not found");
        }
        other => panic!("expected ApiError, got {other:?}"),
    }
}

#[tokio::test]
async fn bulk_send_records_per_endpoint_outcomes() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/endpoints/end-ok/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message_id": "msg-ok"})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/endpoints/end-bad/messages"))
        .respond_with(ResponseTemplate::new(500).set_body_string("delivery backend down"))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/endpoints/end-late/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message_id": "msg-late"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let targets = vec![
        BulkTarget {
            endpoint_id: "end-ok".to_string(),
            platform: "android".to_string(),
        },
        BulkTarget {
            endpoint_id: "end-bad".to_string(),
            platform: "ios".to_string(),
        },
        BulkTarget {
            endpoint_id: "end-late".to_string(),
            platform: "android".to_string(),
        },
    ];
    let message = NotificationMessage::new("Bulk", "Hello");

    let entries = client.send_bulk(&targets, &message).await;

    // One entry per target, in order; the middle failure aborts nothing.
    assert_eq!(entries.len(), 3);
    assert!(entries[0].success);
    assert_eq!(entries[0].message_id.as_deref(), Some("msg-ok"));
    assert!(!entries[1].success);
    assert!(entries[1]
        .error
        .as_deref()
        .unwrap()
        .contains("delivery backend down"));
    assert!(entries[2].success);
    assert_eq!(entries[2].message_id.as_deref(), Some("msg-late"));
}

#[tokio::test]
async fn check_configuration_true_when_gateway_lists_applications() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/apps"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "applications": [
                {"application_id": "app-1", "name": "Pushify iOS", "platform": "ios"}
            ]
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    assert!(client.check_configuration().await);
}

#[tokio::test]
async fn check_configuration_is_false_never_an_error_on_server_failure() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/apps"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    assert!(!client.check_configuration().await);
}

#[tokio::test]
async fn check_configuration_is_false_when_gateway_unreachable() {
    // Nothing listens on this port; the transport error maps to false.
    let client = PushGatewayClient::new(gateway_config("http://127.0.0.1:9".to_string()));
    assert!(!client.check_configuration().await);
}
