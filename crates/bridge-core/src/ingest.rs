//! Webhook ingestion: validation, filtering, normalization, emission.
//!
//! The ingestor is the push-side entry point. It never errors past its
//! boundary: every inbound request maps to one of three outcomes
//! (unauthorized, filtered, accepted), and normalization failures degrade
//! to empty fields rather than aborting the HTTP response.

use hmac::{Hmac, Mac};
use serde_json::Value;
use sha2::Sha256;

use bridge_types::config::WebhookConfig;
use bridge_types::event::{CanonicalEvent, EventSource};

use crate::bus::EventBus;
use crate::normalize::{EVENT_TYPE_KEYS, normalize_event, pick_str};

type HmacSha256 = Hmac<Sha256>;

/// The authentication-relevant parts of an inbound webhook request.
#[derive(Debug, Default)]
pub struct InboundRequest<'a> {
    /// Value of `x-cribops-signature`, falling back to `x-webhook-signature`.
    pub signature: Option<&'a str>,
    /// Value of the `Authorization` header.
    pub authorization: Option<&'a str>,
    /// Raw request body bytes.
    pub body: &'a [u8],
    /// Inbound headers as a JSON object, when header attachment is on.
    pub raw_headers: Option<Value>,
}

/// Outcome of one inbound webhook request.
#[derive(Debug)]
pub enum IngestOutcome {
    /// Secret configured and no credential matched; respond 401, emit nothing.
    Unauthorized,
    /// Event type present but not on the allow-list; respond 200 with
    /// `filtered: true`, emit nothing.
    Filtered,
    /// Event normalized and published; respond 200.
    Accepted(CanonicalEvent),
}

/// Push-side receiver: validates, filters, normalizes, and emits.
pub struct WebhookIngestor {
    secret: Option<String>,
    allowed_events: Vec<String>,
    include_headers: bool,
    bus: EventBus,
}

impl WebhookIngestor {
    pub fn new(config: &WebhookConfig, bus: EventBus) -> Self {
        Self {
            secret: config.secret.clone(),
            allowed_events: config.allowed_events.clone(),
            include_headers: config.include_headers,
            bus,
        }
    }

    /// Whether emitted events carry the raw inbound headers.
    pub fn includes_headers(&self) -> bool {
        self.include_headers
    }

    /// Process one inbound request.
    pub fn handle(&self, request: InboundRequest<'_>) -> IngestOutcome {
        if let Some(secret) = &self.secret {
            if !authenticate(secret, &request) {
                tracing::warn!("webhook request rejected: no credential matched");
                return IngestOutcome::Unauthorized;
            }
        }

        // Non-JSON bodies normalize from an empty object.
        let payload: Value =
            serde_json::from_slice(request.body).unwrap_or_else(|_| Value::Object(Default::default()));

        let event_type = pick_str(&payload, EVENT_TYPE_KEYS);
        if !self.allowed_events.is_empty() {
            if let Some(event_type) = &event_type {
                if !self.allowed_events.contains(event_type) {
                    tracing::debug!(%event_type, "webhook event filtered by allow-list");
                    return IngestOutcome::Filtered;
                }
            }
        }

        let raw_headers = if self.include_headers {
            request.raw_headers
        } else {
            None
        };
        let event = normalize_event(EventSource::Webhook, &payload, raw_headers);

        tracing::info!(
            event_type = event.event_type.as_deref().unwrap_or("unknown"),
            conversation_id = event.conversation_id.as_deref().unwrap_or(""),
            "webhook event accepted"
        );
        self.bus.publish(event.clone());
        IngestOutcome::Accepted(event)
    }
}

/// Check the three accepted credential forms against the shared secret.
///
/// 1. signature header equals the secret (constant-time)
/// 2. signature header carries `sha256=<hex>` HMAC-SHA256 of the body
/// 3. `Authorization: Bearer <secret>` (constant-time)
fn authenticate(secret: &str, request: &InboundRequest<'_>) -> bool {
    if let Some(signature) = request.signature {
        if constant_time_eq(secret.as_bytes(), signature.as_bytes()) {
            return true;
        }
        if let Some(hex_sig) = signature.strip_prefix("sha256=") {
            if verify_hmac_sha256(secret.as_bytes(), request.body, hex_sig) {
                return true;
            }
        }
    }
    if let Some(auth) = request.authorization {
        let token = auth.strip_prefix("Bearer ").unwrap_or(auth);
        if constant_time_eq(secret.as_bytes(), token.as_bytes()) {
            return true;
        }
    }
    false
}

/// Verify an HMAC-SHA256 signature against the request body.
fn verify_hmac_sha256(secret: &[u8], body: &[u8], signature_hex: &str) -> bool {
    let Ok(expected) = hex_decode(signature_hex) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(secret) else {
        return false;
    };
    mac.update(body);
    mac.verify_slice(&expected).is_ok()
}

/// Constant-time byte comparison (XOR-based).
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut result: u8 = 0;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}

/// Decode a hex string to bytes.
fn hex_decode(hex: &str) -> Result<Vec<u8>, ()> {
    if hex.len() % 2 != 0 {
        return Err(());
    }
    (0..hex.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| ()))
        .collect()
}
