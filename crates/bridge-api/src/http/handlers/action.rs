//! Outbound action handlers.
//!
//! The host workflow engine drives outbound platform operations through
//! these routes: agent metadata, direct messages, typing indicators,
//! replies with response routing, webhook listing, and on-demand queue
//! polls.

use axum::Json;
use axum::extract::{Path, State};
use serde::Deserialize;
use serde_json::Value;

use bridge_core::client::PlatformClient;
use bridge_core::poller::TickOutcome;
use bridge_types::agent::Agent;
use bridge_types::binding::RemoteWebhook;
use bridge_types::reply::{ReplyRequest, UpstreamContext};

use crate::http::error::AppError;
use crate::state::AppState;

/// GET /api/v1/agents - List the platform's agents.
pub async fn list_agents(
    State(state): State<AppState>,
) -> Result<Json<Vec<Agent>>, AppError> {
    Ok(Json(state.client.list_agents().await?))
}

/// GET /api/v1/agents/{id} - Agent metadata.
pub async fn get_agent(
    State(state): State<AppState>,
    Path(agent_id): Path<String>,
) -> Result<Json<Agent>, AppError> {
    Ok(Json(state.client.get_agent(&agent_id).await?))
}

/// POST /api/v1/agents/{id}/message - Direct agent dispatch (JSON).
pub async fn send_message(
    State(state): State<AppState>,
    Path(agent_id): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, AppError> {
    Ok(Json(state.client.send_message(&agent_id, &body).await?))
}

#[derive(Debug, Deserialize)]
pub struct TypingBody {
    pub conversation_id: String,
    #[serde(default = "default_typing")]
    pub typing: bool,
}

fn default_typing() -> bool {
    true
}

/// POST /api/v1/agents/{id}/typing - Typing indicator.
///
/// The platform response is returned verbatim; workflows thread it
/// forward as the pass-through bag for later reply routing.
pub async fn send_typing(
    State(state): State<AppState>,
    Path(agent_id): Path<String>,
    Json(body): Json<TypingBody>,
) -> Result<Json<Value>, AppError> {
    let response = state
        .client
        .send_typing(&agent_id, &body.conversation_id, body.typing)
        .await?;
    Ok(Json(response))
}

#[derive(Debug, Deserialize)]
pub struct ReplyBody {
    #[serde(flatten)]
    pub request: ReplyRequest,
    /// The current workflow item, inspected for a callback field.
    #[serde(default)]
    pub item: Value,
    /// Explicit upstream trigger context.
    #[serde(default)]
    pub upstream: Option<UpstreamContext>,
}

/// POST /api/v1/reply - Route and dispatch a reply.
pub async fn send_reply(
    State(state): State<AppState>,
    Json(body): Json<ReplyBody>,
) -> Result<Json<Value>, AppError> {
    let response = state
        .reply
        .send_reply(&body.request, &body.item, body.upstream.as_ref())
        .await?;
    Ok(Json(response))
}

/// GET /api/v1/webhooks - List linkable remote webhooks.
pub async fn list_webhooks(
    State(state): State<AppState>,
) -> Result<Json<Vec<RemoteWebhook>>, AppError> {
    Ok(Json(state.client.list_webhooks().await?))
}

/// POST /api/v1/poll - Run one queue poll tick on demand.
///
/// Returns once emission (and acknowledgement) for the tick completes.
pub async fn poll_once(State(state): State<AppState>) -> Result<Json<TickOutcome>, AppError> {
    let poller = state.poller.as_ref().ok_or_else(|| {
        AppError::NotConfigured("queue polling requires platform.tenant_id".to_string())
    })?;
    Ok(Json(poller.run_once().await))
}
