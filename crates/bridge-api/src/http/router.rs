//! Axum router configuration with middleware.
//!
//! Inbound: `POST /hooks/{path}` plus a health check. Outbound actions
//! live under `/api/v1/`. Middleware: CORS, tracing.

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        // Agent metadata
        .route("/agents", get(handlers::action::list_agents))
        .route("/agents/{id}", get(handlers::action::get_agent))
        // Outbound dispatch
        .route("/agents/{id}/message", post(handlers::action::send_message))
        .route("/agents/{id}/typing", post(handlers::action::send_typing))
        .route("/reply", post(handlers::action::send_reply))
        // Queue
        .route("/poll", post(handlers::action::poll_once))
        // Remote webhook entities
        .route("/webhooks", get(handlers::action::list_webhooks));

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/hooks/{path}", post(handlers::webhook::receive_webhook))
        .route("/events", get(handlers::events::event_stream))
        .route("/health", get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /health - Simple health check endpoint (no auth required).
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use bridge_core::bus::EventBus;
    use bridge_core::ingest::WebhookIngestor;
    use bridge_core::reply::ReplyRouter;
    use bridge_infra::platform::HttpPlatformClient;
    use bridge_types::config::WebhookConfig;

    fn app(config: WebhookConfig) -> (Router, EventBus) {
        let bus = EventBus::new(16);
        // Unroutable base URL: the routes under test never reach the network.
        let client = Arc::new(HttpPlatformClient::new(
            "http://127.0.0.1:9",
            secrecy::SecretString::from("test-token"),
        ));
        let state = AppState {
            webhook_path: config.path.clone(),
            ingestor: Arc::new(WebhookIngestor::new(&config, bus.clone())),
            reply: Arc::new(ReplyRouter::new(Arc::clone(&client))),
            poller: None,
            client,
            bus: bus.clone(),
        };
        (build_router(state), bus)
    }

    fn post_hook(path: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(format!("/hooks/{path}"))
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_endpoint_responds() {
        let (app, _bus) = app(WebhookConfig::default());
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "ok");
    }

    #[tokio::test]
    async fn event_stream_route_responds_with_sse() {
        let (app, _bus) = app(WebhookConfig::default());
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/events")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response
            .headers()
            .get("content-type")
            .unwrap()
            .to_str()
            .unwrap();
        assert!(content_type.starts_with("text/event-stream"));
    }

    // -------------------------------------------------------------------
    // Webhook receiver
    // -------------------------------------------------------------------

    #[tokio::test]
    async fn accepted_webhook_returns_received_true() {
        let (app, bus) = app(WebhookConfig::default());
        let mut rx = bus.subscribe();

        let response = app
            .oneshot(post_hook("cribops", r#"{"content":"hi","thread_id":"c1"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json, serde_json::json!({"received": true}));

        let event = rx.try_recv().unwrap();
        assert_eq!(event.conversation_id.as_deref(), Some("c1"));
    }

    #[tokio::test]
    async fn missing_secret_returns_401_and_emits_nothing() {
        let config = WebhookConfig {
            secret: Some("s3cr3t".to_string()),
            ..WebhookConfig::default()
        };
        let (app, bus) = app(config);
        let mut rx = bus.subscribe();

        let response = app
            .oneshot(post_hook("cribops", r#"{"content":"hi"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let json = body_json(response).await;
        assert_eq!(json, serde_json::json!({"error": "Unauthorized"}));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn valid_signature_header_is_accepted() {
        let config = WebhookConfig {
            secret: Some("s3cr3t".to_string()),
            ..WebhookConfig::default()
        };
        let (app, _bus) = app(config);

        let request = Request::builder()
            .method("POST")
            .uri("/hooks/cribops")
            .header("content-type", "application/json")
            .header("x-cribops-signature", "s3cr3t")
            .body(Body::from(r#"{"content":"hi"}"#))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn filtered_event_type_returns_filtered_true() {
        let config = WebhookConfig {
            allowed_events: vec!["message".to_string()],
            ..WebhookConfig::default()
        };
        let (app, bus) = app(config);
        let mut rx = bus.subscribe();

        let response = app
            .oneshot(post_hook("cribops", r#"{"event_type":"presence"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["filtered"], true);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn unconfigured_path_is_404() {
        let (app, _bus) = app(WebhookConfig::default());
        let response = app.oneshot(post_hook("other", "{}")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    // -------------------------------------------------------------------
    // Actions (network-free paths only)
    // -------------------------------------------------------------------

    #[tokio::test]
    async fn reply_with_template_syntax_is_rejected_before_dispatch() {
        let (app, _bus) = app(WebhookConfig::default());

        let response = app
            .oneshot(post_json(
                "/api/v1/reply",
                r#"{"conversation_id":"{{ $json.thread }}","content":"hi","agent_id":"ag-1"}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "VALIDATION_ERROR");
        assert!(
            json["error"]["message"]
                .as_str()
                .unwrap()
                .contains("{{ $json.thread }}")
        );
    }

    #[tokio::test]
    async fn poll_without_tenant_is_not_configured() {
        let (app, _bus) = app(WebhookConfig::default());

        let response = app
            .oneshot(post_json("/api/v1/poll", "{}"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "NOT_CONFIGURED");
    }
}
