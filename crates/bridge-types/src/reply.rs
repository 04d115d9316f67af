//! Outbound reply types.
//!
//! A reply resolves to a `ReplyTarget` per call (never persisted): either a
//! direct callback URL dispatched form-encoded, or an agent endpoint
//! dispatched as JSON. The `UpstreamContext` is the explicit pass-through
//! context the caller threads from a prior trigger emission or
//! typing-indicator call.

use serde::{Deserialize, Serialize};

use crate::event::CanonicalEvent;

/// Resolved destination for an outbound reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyTarget {
    /// Dispatch form-encoded to a callback URL.
    Callback { url: String },
    /// Dispatch JSON to the agent messaging endpoint.
    Agent { agent_id: String },
}

/// An outbound reply request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplyRequest {
    /// Conversation the reply belongs to.
    pub conversation_id: String,
    /// Reply text.
    pub content: String,
    /// Agent to fall back to when no callback URL resolves.
    pub agent_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<String>,
}

/// Context threaded forward from an upstream trigger emission.
///
/// Replaces ambient lookup by node name: the caller passes the triggering
/// node's last-emitted event and any pass-through bag explicitly.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpstreamContext {
    /// Pass-through bag forwarded from an earlier call in the workflow.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pass_through: Option<serde_json::Value>,
    /// The triggering node's last-emitted canonical event.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger_event: Option<CanonicalEvent>,
}
