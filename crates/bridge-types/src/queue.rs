//! Message-queue wire types.
//!
//! `QueueMessage` is the platform's pending-message record as returned by
//! the poll endpoint. A message transitions to acknowledged (deleted from
//! the queue) or failed (annotated with an error) exactly once per delivery
//! attempt; both transitions are batch operations keyed by message id.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A pending message fetched from the platform queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueMessage {
    /// Platform-assigned numeric message id (acknowledge/fail key).
    pub id: i64,
    /// Correlation id linking the message to its originating exchange.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
    /// Name of the queue the message was read from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub queue_name: Option<String>,
    /// The message payload.
    #[serde(default)]
    pub payload: QueuePayload,
    /// When the platform inserted the message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inserted_at: Option<DateTime<Utc>>,
}

/// Payload of a queue message.
///
/// `data` is a string that frequently holds JSON-encoded content; the
/// poller attempts to parse it and falls back to the raw string.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueuePayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(default)]
    pub params: serde_json::Value,
    #[serde(default)]
    pub headers: serde_json::Value,
}

/// Batch acknowledge request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcknowledgeRequest {
    pub message_ids: Vec<i64>,
}

/// Batch fail request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailRequest {
    pub message_ids: Vec<i64>,
    pub error_message: String,
}
