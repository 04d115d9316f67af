//! In-memory PlatformClient fake shared by the core test modules.

use std::sync::Mutex;

use serde_json::{Value, json};

use bridge_types::agent::Agent;
use bridge_types::binding::{LinkRequest, RemoteWebhook};
use bridge_types::error::TransportError;
use bridge_types::queue::QueueMessage;

use crate::client::PlatformClient;

/// Records every call and serves scripted results.
#[derive(Default)]
pub struct FakeClient {
    /// Batches returned by successive poll_queue calls; empty when drained.
    pub poll_batches: Mutex<Vec<Vec<QueueMessage>>>,
    /// When set, poll_queue fails with this detail.
    pub poll_error: Mutex<Option<String>>,
    /// When true, acknowledge fails.
    pub ack_fails: Mutex<bool>,
    /// Id batches passed to acknowledge.
    pub ack_calls: Mutex<Vec<Vec<i64>>>,
    /// (ids, error_message) batches passed to fail_messages.
    pub fail_calls: Mutex<Vec<(Vec<i64>, String)>>,
    /// Number of poll_queue invocations.
    pub poll_calls: Mutex<u32>,
    /// (agent_id, body) pairs passed to send_message.
    pub message_calls: Mutex<Vec<(String, Value)>>,
    /// (url, form fields) pairs passed to post_callback.
    pub callback_calls: Mutex<Vec<(String, Vec<(String, String)>)>>,
    /// When set, send_message fails with this error.
    pub message_error: Mutex<Option<(u16, String)>>,
    /// When set, post_callback fails with this error.
    pub callback_error: Mutex<Option<(u16, String)>>,
    /// When set, link_webhook fails with this detail.
    pub link_error: Mutex<Option<String>>,
    /// Webhook ids passed to link_webhook.
    pub link_calls: Mutex<Vec<(String, LinkRequest)>>,
    /// When true, unlink_webhook fails.
    pub unlink_fails: Mutex<bool>,
    /// Webhook ids passed to unlink_webhook.
    pub unlink_calls: Mutex<Vec<String>>,
}

impl FakeClient {
    pub fn with_batches(batches: Vec<Vec<QueueMessage>>) -> Self {
        let client = Self::default();
        *client.poll_batches.lock().unwrap() = batches;
        client
    }
}

impl PlatformClient for FakeClient {
    async fn list_agents(&self) -> Result<Vec<Agent>, TransportError> {
        Ok(Vec::new())
    }

    async fn get_agent(&self, agent_id: &str) -> Result<Agent, TransportError> {
        Ok(Agent {
            id: agent_id.to_string(),
            name: "fake".to_string(),
            status: Default::default(),
            tenant_id: None,
            organization_id: None,
            metadata: Value::Null,
        })
    }

    async fn send_message(&self, agent_id: &str, body: &Value) -> Result<Value, TransportError> {
        if let Some((status, detail)) = self.message_error.lock().unwrap().clone() {
            return Err(TransportError::Http { status, detail });
        }
        self.message_calls
            .lock()
            .unwrap()
            .push((agent_id.to_string(), body.clone()));
        Ok(json!({"sent": true}))
    }

    async fn send_typing(
        &self,
        agent_id: &str,
        conversation_id: &str,
        typing: bool,
    ) -> Result<Value, TransportError> {
        Ok(json!({
            "agent_id": agent_id,
            "conversation_id": conversation_id,
            "typing": typing,
        }))
    }

    async fn poll_queue(
        &self,
        _tenant_id: &str,
        _limit: u32,
        _queue_name: Option<&str>,
    ) -> Result<Vec<QueueMessage>, TransportError> {
        *self.poll_calls.lock().unwrap() += 1;
        if let Some(detail) = self.poll_error.lock().unwrap().clone() {
            return Err(TransportError::Network(detail));
        }
        let mut batches = self.poll_batches.lock().unwrap();
        if batches.is_empty() {
            Ok(Vec::new())
        } else {
            Ok(batches.remove(0))
        }
    }

    async fn acknowledge(
        &self,
        _tenant_id: &str,
        message_ids: &[i64],
    ) -> Result<(), TransportError> {
        self.ack_calls.lock().unwrap().push(message_ids.to_vec());
        if *self.ack_fails.lock().unwrap() {
            return Err(TransportError::Http {
                status: 500,
                detail: "acknowledge failed".to_string(),
            });
        }
        Ok(())
    }

    async fn fail_messages(
        &self,
        _tenant_id: &str,
        message_ids: &[i64],
        error_message: &str,
    ) -> Result<(), TransportError> {
        self.fail_calls
            .lock()
            .unwrap()
            .push((message_ids.to_vec(), error_message.to_string()));
        Ok(())
    }

    async fn list_webhooks(&self) -> Result<Vec<RemoteWebhook>, TransportError> {
        Ok(Vec::new())
    }

    async fn link_webhook(
        &self,
        webhook_id: &str,
        request: &LinkRequest,
    ) -> Result<Value, TransportError> {
        if let Some(detail) = self.link_error.lock().unwrap().clone() {
            return Err(TransportError::Http { status: 500, detail });
        }
        self.link_calls
            .lock()
            .unwrap()
            .push((webhook_id.to_string(), request.clone()));
        Ok(json!({"linked": true}))
    }

    async fn unlink_webhook(&self, webhook_id: &str) -> Result<(), TransportError> {
        self.unlink_calls.lock().unwrap().push(webhook_id.to_string());
        if *self.unlink_fails.lock().unwrap() {
            return Err(TransportError::Network("connection reset".to_string()));
        }
        Ok(())
    }

    async fn post_callback(
        &self,
        url: &str,
        form: &[(&str, String)],
    ) -> Result<Value, TransportError> {
        if let Some((status, detail)) = self.callback_error.lock().unwrap().clone() {
            return Err(TransportError::Http { status, detail });
        }
        let fields = form
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect();
        self.callback_calls
            .lock()
            .unwrap()
            .push((url.to_string(), fields));
        Ok(json!({"delivered": true}))
    }
}
