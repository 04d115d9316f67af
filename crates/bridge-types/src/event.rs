//! Canonical workflow events.
//!
//! Both ingestion paths (webhook push and queue pull) terminate in a
//! `CanonicalEvent` published on the event bus. The mapping from raw
//! vendor payloads to this record is total: a missing source field maps
//! to `None` or an empty container, never an error.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Which ingestion path produced an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventSource {
    Webhook,
    Queue,
}

/// The normalized record emitted to the workflow regardless of ingestion path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanonicalEvent {
    /// Ingestion path that produced this event.
    pub source: EventSource,
    /// Event type, first-present of the vendor field-name variants.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,
    /// Remote webhook identifier, when the payload carries one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook_id: Option<String>,
    /// Agent identifier, when the payload carries one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<String>,
    /// Conversation/thread identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
    /// End-user identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// Message text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Callback URL a reply to this event should be dispatched to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_webhook: Option<String>,
    /// Attachments, passed through untouched.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Value>,
    /// Vendor metadata bag, passed through untouched.
    #[serde(default)]
    pub metadata: Value,
    /// Event timestamp as supplied by the vendor payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    /// Raw inbound HTTP headers, attached only when configured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_headers: Option<Value>,
    /// Queue delivery metadata, present only for queue-sourced events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub queue: Option<QueueMeta>,
}

impl CanonicalEvent {
    /// An empty event for the given source; normalization fills fields in.
    pub fn empty(source: EventSource) -> Self {
        Self {
            source,
            event_type: None,
            webhook_id: None,
            agent_id: None,
            conversation_id: None,
            user_id: None,
            message: None,
            response_webhook: None,
            attachments: Vec::new(),
            metadata: Value::Null,
            timestamp: None,
            raw_headers: None,
            queue: None,
        }
    }
}

/// Delivery metadata for a queue-sourced event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueMeta {
    /// The queue message id this event was built from.
    pub message_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub queue_name: Option<String>,
    /// `payload.data` parsed as JSON, or the raw string when not JSON.
    pub payload: Value,
    #[serde(default)]
    pub params: Value,
    #[serde(default)]
    pub headers: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inserted_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
}
