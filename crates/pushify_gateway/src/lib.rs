//! Push gateway integration for Pushify
//!
//! This crate provides the client for the managed push gateway's REST API:
//! device endpoint lifecycle, broadcast topics and subscriptions, and
//! message publishing with per-platform payload formatting.
//!
//! # Features
//!
//! - Bearer-key authentication from the `gateway` configuration section
//! - Endpoint create/inspect/update/delete
//! - Topic create, subscribe, unsubscribe, and topic publishing
//! - APNS/FCM envelope construction with case-insensitive platform matching
//! - Sequential bulk publishing with per-endpoint outcomes
//! - A [`services::PushGateway`](pushify_common::services::PushGateway)
//!   adapter for dependency injection
//!
//! # Example
//!
//! ```rust,no_run
//! use pushify_config::GatewayConfig;
//! use pushify_gateway::client::PushGatewayClient;
//! use std::collections::HashMap;
//!
//! async fn register() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = GatewayConfig {
//!         base_url: "https://push.example.com".to_string(),
//!         api_key: "key".to_string(),
//!         platform_application_id: Some("app-1".to_string()),
//!         broadcast_topic_id: None,
//!     };
//!
//!     let client = PushGatewayClient::new(config);
//!     let endpoint_id = client
//!         .create_endpoint("app-1", "device-token", &HashMap::new())
//!         .await?;
//!     println!("endpoint: {endpoint_id}");
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod error;
pub mod payload;
pub mod service;

pub use client::PushGatewayClient;
pub use error::GatewayError;
pub use service::GatewayPushService;
