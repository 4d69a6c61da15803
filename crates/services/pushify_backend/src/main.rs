// File: services/pushify_backend/src/main.rs
use axum::{routing::get, Router};
use pushify_common::logging;
use pushify_config::load_config;
use pushify_db::DbClient;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

mod service_factory;

use axum::{extract::State, Json};
#[axum::debug_handler]
async fn health(State(db_client): State<DbClient>) -> Json<serde_json::Value> {
    let database = db_client.is_healthy().await;
    let status = if database { "ok" } else { "degraded" };
    Json(serde_json::json!({
        "status": status,
        "database": database,
    }))
}

#[tokio::main]
async fn main() {
    logging::init();

    let config = Arc::new(load_config().expect("Failed to load config"));

    let db_client = DbClient::new(&config)
        .await
        .expect("Failed to connect to database");

    let notification_service = service_factory::build_notification_service(&config, &db_client)
        .await
        .expect("Failed to initialize notification service");

    let api_router = Router::new()
        .route("/", get(|| async { "Welcome to Pushify API!" }))
        .route("/health", get(health))
        .with_state(db_client.clone());

    let notification_router = pushify_notify::routes(notification_service);

    let api_router = Router::new().nest("/api", api_router.merge(notification_router));

    #[allow(unused_mut)] // for the openapi feature it needs to be mutable
    let mut app = api_router;

    // Conditionally add Swagger UI and JSON endpoint if openapi feature enabled
    #[cfg(feature = "openapi")]
    {
        use pushify_notify::openapi::NotifyApiDoc;
        use utoipa::OpenApi;
        use utoipa_swagger_ui::SwaggerUi;

        // Define the Merged OpenAPI Documentation struct
        #[derive(OpenApi)]
        #[openapi(
            info(
                title = "Pushify API",
                version = "0.1.0",
                description = "Pushify Service API Docs",
                license(name = "MIT", url = "https://opensource.org/licenses/MIT")
            ),
            components(),
            tags( (name = "Pushify", description = "Core service endpoints")),
            servers( (url = "/api", description = "Main API Prefix")),
        )]
        struct ApiDoc;

        // Create the merged OpenAPI document
        let mut openapi_doc = ApiDoc::openapi();
        openapi_doc.merge(NotifyApiDoc::openapi());
        println!("📖 Adding Swagger UI at /api/docs");

        // Create the Swagger UI route, referencing the merged doc
        let swagger_ui =
            SwaggerUi::new("/api/docs").url("/api/docs/openapi.json", openapi_doc.clone());
        // Merge the Swagger UI into the main app router
        app = app.merge(swagger_ui);
    }

    let app = app.layer(TraceLayer::new_for_http());

    // Bind and serve
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await.unwrap();
    println!("Starting server at http://{}", addr);
    println!("API endpoints available at http://{}/api", addr);

    axum::serve(listener, app.into_make_service())
        .await
        .unwrap();
}
