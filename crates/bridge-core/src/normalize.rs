//! Canonical-event normalization.
//!
//! Vendor payloads spell the same field many ways (snake_case, camelCase,
//! alternate names). Each canonical field has one ordered candidate-key
//! list evaluated first-present-wins; the mapping is total -- absence maps
//! to `None`, never an error.

use serde_json::Value;

use bridge_types::event::{CanonicalEvent, EventSource};

/// Candidate keys for the event type, in priority order.
pub const EVENT_TYPE_KEYS: &[&str] = &["event_type", "eventType", "type", "event"];

/// Candidate keys for the message text.
pub const MESSAGE_KEYS: &[&str] = &["message", "content", "text", "body"];

/// Candidate keys for the conversation identifier.
pub const CONVERSATION_KEYS: &[&str] = &[
    "conversation_id",
    "conversationId",
    "thread_id",
    "threadId",
    "chat_id",
];

/// Candidate keys for the end-user identifier.
pub const USER_KEYS: &[&str] = &["user_id", "userId", "sender_id", "senderId", "from"];

/// Candidate keys for the agent identifier.
pub const AGENT_KEYS: &[&str] = &["agent_id", "agentId"];

/// Candidate keys for the remote webhook identifier.
pub const WEBHOOK_KEYS: &[&str] = &["webhook_id", "webhookId"];

/// Candidate keys for the reply callback URL.
pub const RESPONSE_WEBHOOK_KEYS: &[&str] = &[
    "response_webhook",
    "responseWebhook",
    "callback_url",
    "callbackUrl",
];

/// Candidate keys for the event timestamp.
pub const TIMESTAMP_KEYS: &[&str] = &["timestamp", "created_at", "createdAt"];

/// Candidate keys for the attachment list.
pub const ATTACHMENT_KEYS: &[&str] = &["attachments", "files", "media"];

/// Candidate keys for the metadata bag.
pub const METADATA_KEYS: &[&str] = &["metadata", "meta"];

/// First-present-wins string lookup over a candidate-key list.
///
/// Numbers are accepted and rendered as strings (vendors send numeric ids);
/// other value types are skipped so a later candidate can still match.
pub fn pick_str(payload: &Value, candidates: &[&str]) -> Option<String> {
    let obj = payload.as_object()?;
    for key in candidates {
        match obj.get(*key) {
            Some(Value::String(s)) if !s.is_empty() => return Some(s.clone()),
            Some(Value::Number(n)) => return Some(n.to_string()),
            _ => continue,
        }
    }
    None
}

/// First-present-wins raw-value lookup over a candidate-key list.
pub fn pick_value<'a>(payload: &'a Value, candidates: &[&str]) -> Option<&'a Value> {
    let obj = payload.as_object()?;
    for key in candidates {
        if let Some(v) = obj.get(*key) {
            if !v.is_null() {
                return Some(v);
            }
        }
    }
    None
}

/// Parse a possibly JSON-encoded string; a parse failure keeps the raw string.
pub fn parse_data(data: &str) -> Value {
    serde_json::from_str(data).unwrap_or_else(|_| Value::String(data.to_string()))
}

/// Normalize a raw payload into a canonical event.
///
/// Total: any payload shape (including non-objects) yields an event; fields
/// the payload does not carry stay `None`. Both ingestion paths run their
/// payloads through this single chain.
pub fn normalize_event(
    source: EventSource,
    payload: &Value,
    raw_headers: Option<Value>,
) -> CanonicalEvent {
    let mut event = CanonicalEvent::empty(source);

    event.event_type = pick_str(payload, EVENT_TYPE_KEYS);
    event.webhook_id = pick_str(payload, WEBHOOK_KEYS);
    event.agent_id = pick_str(payload, AGENT_KEYS);
    event.conversation_id = pick_str(payload, CONVERSATION_KEYS);
    event.user_id = pick_str(payload, USER_KEYS);
    event.message = pick_str(payload, MESSAGE_KEYS);
    event.response_webhook = pick_str(payload, RESPONSE_WEBHOOK_KEYS);
    event.timestamp = pick_str(payload, TIMESTAMP_KEYS);

    event.attachments = pick_value(payload, ATTACHMENT_KEYS)
        .and_then(|v| v.as_array().cloned())
        .unwrap_or_default();
    event.metadata = pick_value(payload, METADATA_KEYS)
        .cloned()
        .unwrap_or(Value::Null);
    event.raw_headers = raw_headers;

    event
}
