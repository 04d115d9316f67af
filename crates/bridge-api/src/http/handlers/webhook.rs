//! Webhook receiver handler.
//!
//! Receives `POST /hooks/{path}`, hands the request to the ingestor, and
//! maps the outcome onto the fixed protocol responses:
//! - accepted:     `200 {"received":true}`
//! - filtered:     `200 {"received":true,"filtered":true}`
//! - unauthorized: `401 {"error":"Unauthorized"}`
//!
//! A request to a path other than the configured one is a plain 404 --
//! authentication only applies to the configured path.

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use serde_json::{Value, json};
use uuid::Uuid;

use bridge_core::ingest::{InboundRequest, IngestOutcome};

use crate::state::AppState;

/// Signature headers consulted in order.
const SIGNATURE_HEADERS: &[&str] = &["x-cribops-signature", "x-webhook-signature"];

/// POST /hooks/{path} - Receive an inbound platform event.
pub async fn receive_webhook(
    State(state): State<AppState>,
    Path(path): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, Json<Value>) {
    let request_id = Uuid::now_v7().to_string();

    if path != state.webhook_path {
        tracing::debug!(%request_id, %path, "webhook path not configured");
        return (StatusCode::NOT_FOUND, Json(json!({"error": "Not Found"})));
    }

    let signature = SIGNATURE_HEADERS
        .iter()
        .find_map(|name| headers.get(*name).and_then(|v| v.to_str().ok()));
    let authorization = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok());

    let raw_headers = if state.ingestor.includes_headers() {
        Some(headers_to_json(&headers))
    } else {
        None
    };

    let outcome = state.ingestor.handle(InboundRequest {
        signature,
        authorization,
        body: &body,
        raw_headers,
    });

    match outcome {
        IngestOutcome::Unauthorized => (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "Unauthorized"})),
        ),
        IngestOutcome::Filtered => (
            StatusCode::OK,
            Json(json!({"received": true, "filtered": true})),
        ),
        IngestOutcome::Accepted(event) => {
            tracing::info!(
                %request_id,
                event_type = event.event_type.as_deref().unwrap_or("unknown"),
                "webhook event emitted"
            );
            (StatusCode::OK, Json(json!({"received": true})))
        }
    }
}

/// Render the header map as a JSON object (first value per name).
fn headers_to_json(headers: &HeaderMap) -> Value {
    let map: serde_json::Map<String, Value> = headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_string(), Value::String(v.to_string())))
        })
        .collect();
    Value::Object(map)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headers_to_json() {
        let mut headers = HeaderMap::new();
        headers.insert("x-request-id", "r-1".parse().unwrap());
        headers.insert("content-type", "application/json".parse().unwrap());

        let value = headers_to_json(&headers);
        assert_eq!(value["x-request-id"], "r-1");
        assert_eq!(value["content-type"], "application/json");
    }
}
