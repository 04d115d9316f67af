//! Outbound reply routing.
//!
//! A reply's destination is resolved per call, in priority order: a
//! callback field on the current item, the explicit upstream pass-through
//! bag, the upstream trigger event, and finally direct agent dispatch.
//! Callback dispatch is form-encoded; agent dispatch is JSON. Identifiers
//! are validated before any network call.

use std::sync::Arc;

use chrono::Utc;
use serde_json::{Value, json};
use thiserror::Error;

use bridge_types::error::{TransportError, ValidationError};
use bridge_types::reply::{ReplyRequest, ReplyTarget, UpstreamContext};

use crate::client::PlatformClient;
use crate::normalize::{RESPONSE_WEBHOOK_KEYS, pick_str};

/// Errors surfaced to the caller of a reply dispatch.
#[derive(Debug, Error)]
pub enum ReplyError {
    /// A required identifier failed validation; no network call was made.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The dispatch itself failed. For a 422 the display carries the
    /// platform's structured detail, which callers rely on to diagnose
    /// malformed conversation/agent identifiers.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Resolve where a reply goes, first-present-wins.
pub fn resolve_target(
    item: &Value,
    upstream: Option<&UpstreamContext>,
    agent_id: &str,
) -> ReplyTarget {
    if let Some(url) = pick_str(item, RESPONSE_WEBHOOK_KEYS) {
        return ReplyTarget::Callback { url };
    }
    if let Some(ctx) = upstream {
        if let Some(bag) = &ctx.pass_through {
            if let Some(url) = pick_str(bag, RESPONSE_WEBHOOK_KEYS) {
                return ReplyTarget::Callback { url };
            }
        }
        if let Some(event) = &ctx.trigger_event {
            if let Some(url) = &event.response_webhook {
                if !url.is_empty() {
                    return ReplyTarget::Callback { url: url.clone() };
                }
            }
        }
    }
    ReplyTarget::Agent {
        agent_id: agent_id.to_string(),
    }
}

/// Reject empty identifiers and unresolved `{{ ... }}` template syntax.
fn validate_identifier(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::EmptyField { field });
    }
    if value.contains("{{") || value.contains("}}") {
        return Err(ValidationError::UnresolvedTemplate {
            field,
            value: value.to_string(),
        });
    }
    Ok(())
}

/// Dispatches outbound replies over the correct wire shape for the target.
pub struct ReplyRouter<C> {
    client: Arc<C>,
}

impl<C: PlatformClient> ReplyRouter<C> {
    pub fn new(client: Arc<C>) -> Self {
        Self { client }
    }

    /// Resolve the destination and dispatch the reply.
    pub async fn send_reply(
        &self,
        request: &ReplyRequest,
        item: &Value,
        upstream: Option<&UpstreamContext>,
    ) -> Result<Value, ReplyError> {
        validate_identifier("conversation_id", &request.conversation_id)?;

        let target = resolve_target(item, upstream, &request.agent_id);
        match target {
            ReplyTarget::Callback { url } => {
                tracing::debug!(url = %url, "dispatching reply to callback URL");
                let timestamp = Utc::now().to_rfc3339();
                let form = [
                    ("conversation_id", request.conversation_id.clone()),
                    ("content", request.content.clone()),
                    ("message_id", request.message_id.clone().unwrap_or_default()),
                    ("timestamp", timestamp),
                    ("user_id", request.user_id.clone().unwrap_or_default()),
                    (
                        "organization_id",
                        request.organization_id.clone().unwrap_or_default(),
                    ),
                ];
                Ok(self.client.post_callback(&url, &form).await?)
            }
            ReplyTarget::Agent { agent_id } => {
                validate_identifier("agent_id", &agent_id)?;
                tracing::debug!(agent_id = %agent_id, "dispatching reply to agent endpoint");
                let body = json!({
                    "conversation_id": request.conversation_id,
                    "content": request.content,
                    "message_id": request.message_id,
                    "user_id": request.user_id,
                    "organization_id": request.organization_id,
                });
                Ok(self.client.send_message(&agent_id, &body).await?)
            }
        }
    }
}
