//! PlatformClient trait definition.
//!
//! The single seam between bridge logic and the CribOps HTTP API. Uses
//! native async fn in traits (RPITIT, Rust 2024 edition); the concrete
//! reqwest-backed implementation lives in bridge-infra, and tests use
//! in-memory fakes.

use serde_json::Value;

use bridge_types::agent::Agent;
use bridge_types::binding::{LinkRequest, RemoteWebhook};
use bridge_types::error::TransportError;
use bridge_types::queue::QueueMessage;

/// Trait for the remote platform's HTTP surface.
///
/// Every method maps to exactly one platform endpoint; no method retries on
/// its own -- callers decide retry policy.
pub trait PlatformClient: Send + Sync {
    /// GET /api/v1/agents
    fn list_agents(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<Agent>, TransportError>> + Send;

    /// GET /api/v1/agents/{id}
    fn get_agent(
        &self,
        agent_id: &str,
    ) -> impl std::future::Future<Output = Result<Agent, TransportError>> + Send;

    /// POST /webhooks/agents/{id}/message -- direct agent dispatch (JSON).
    fn send_message(
        &self,
        agent_id: &str,
        body: &Value,
    ) -> impl std::future::Future<Output = Result<Value, TransportError>> + Send;

    /// POST /api/agents/{id}/callback with `callback_type: "typing"`.
    fn send_typing(
        &self,
        agent_id: &str,
        conversation_id: &str,
        typing: bool,
    ) -> impl std::future::Future<Output = Result<Value, TransportError>> + Send;

    /// GET /api/queue/{tenant}/poll
    fn poll_queue(
        &self,
        tenant_id: &str,
        limit: u32,
        queue_name: Option<&str>,
    ) -> impl std::future::Future<Output = Result<Vec<QueueMessage>, TransportError>> + Send;

    /// POST /api/queue/{tenant}/acknowledge
    fn acknowledge(
        &self,
        tenant_id: &str,
        message_ids: &[i64],
    ) -> impl std::future::Future<Output = Result<(), TransportError>> + Send;

    /// POST /api/queue/{tenant}/fail
    fn fail_messages(
        &self,
        tenant_id: &str,
        message_ids: &[i64],
        error_message: &str,
    ) -> impl std::future::Future<Output = Result<(), TransportError>> + Send;

    /// GET /api/v1/webhooks -- tolerant of bare-array, `.data`, and
    /// `.webhooks` response shapes.
    fn list_webhooks(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<RemoteWebhook>, TransportError>> + Send;

    /// POST /api/v1/webhooks/{id}/link
    fn link_webhook(
        &self,
        webhook_id: &str,
        request: &LinkRequest,
    ) -> impl std::future::Future<Output = Result<Value, TransportError>> + Send;

    /// DELETE /api/v1/webhooks/{id}/link
    fn unlink_webhook(
        &self,
        webhook_id: &str,
    ) -> impl std::future::Future<Output = Result<(), TransportError>> + Send;

    /// POST to a resolved callback URL, `application/x-www-form-urlencoded`.
    fn post_callback(
        &self,
        url: &str,
        form: &[(&str, String)],
    ) -> impl std::future::Future<Output = Result<Value, TransportError>> + Send;
}
