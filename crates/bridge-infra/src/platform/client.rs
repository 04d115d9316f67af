//! HttpPlatformClient -- concrete [`PlatformClient`] over reqwest.
//!
//! Every call attaches `Authorization: Bearer <token>` and JSON content
//! headers. GET requests encode their body object as a query string.
//! Non-2xx responses become `TransportError::Http` with a detail
//! best-effort extracted from the body's `message`/`error` field;
//! connection failures become `TransportError::Network`. No automatic
//! retry -- callers decide retry policy.
//!
//! The API token is wrapped in [`secrecy::SecretString`] and is only
//! exposed when constructing request headers.

use std::time::Duration;

use reqwest::Method;
use reqwest::header::AUTHORIZATION;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;

use bridge_core::client::PlatformClient;
use bridge_types::agent::Agent;
use bridge_types::binding::{LinkRequest, RemoteWebhook};
use bridge_types::error::TransportError;
use bridge_types::queue::{AcknowledgeRequest, FailRequest, QueueMessage};

/// Reqwest-backed client for the CribOps platform API.
pub struct HttpPlatformClient {
    client: reqwest::Client,
    api_token: SecretString,
    base_url: String,
}

impl HttpPlatformClient {
    /// Create a new client against the given base URL.
    pub fn new(base_url: impl Into<String>, api_token: SecretString) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("failed to create reqwest client");

        Self {
            client,
            api_token,
            base_url: trim_trailing_slash(base_url.into()),
        }
    }

    /// Override the base URL (useful for testing or proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = trim_trailing_slash(base_url.into());
        self
    }

    /// Build the full API URL for a given path.
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn bearer(&self) -> String {
        format!("Bearer {}", self.api_token.expose_secret())
    }

    /// Perform one request against the platform API.
    ///
    /// `body` rides as JSON for non-GET methods and as a query string for
    /// GET. The parsed JSON body is returned; an empty 2xx body maps to
    /// `Value::Null`.
    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Value, TransportError> {
        let url = self.url(path);
        let mut builder = self
            .client
            .request(method.clone(), &url)
            .header(AUTHORIZATION, self.bearer());

        if let Some(body) = body {
            if method == Method::GET {
                builder = builder.query(&query_pairs(body));
            } else {
                builder = builder.json(body);
            }
        }

        let response = builder
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        if !status.is_success() {
            return Err(TransportError::Http {
                status: status.as_u16(),
                detail: extract_error_detail(&text),
            });
        }

        if text.is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| TransportError::Decode(e.to_string()))
    }
}

/// Encode a JSON object's scalar fields as query pairs.
///
/// Null values and nested containers are skipped; GET endpoints on the
/// platform only take scalar parameters.
fn query_pairs(body: &Value) -> Vec<(String, String)> {
    let Some(obj) = body.as_object() else {
        return Vec::new();
    };
    obj.iter()
        .filter_map(|(key, value)| match value {
            Value::String(s) => Some((key.clone(), s.clone())),
            Value::Number(n) => Some((key.clone(), n.to_string())),
            Value::Bool(b) => Some((key.clone(), b.to_string())),
            _ => None,
        })
        .collect()
}

/// Best-effort extraction of an error detail from a response body.
fn extract_error_detail(text: &str) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(text) {
        for key in ["message", "error"] {
            if let Some(detail) = value.get(key).and_then(|v| v.as_str()) {
                return detail.to_string();
            }
        }
    }
    text.to_string()
}

/// Pull the webhook list out of the platform's variable response shapes:
/// a bare array, `.data`, or `.webhooks`.
fn extract_webhook_list(value: Value) -> Result<Vec<RemoteWebhook>, TransportError> {
    let list = if value.is_array() {
        value
    } else if value.get("data").is_some_and(Value::is_array) {
        value["data"].clone()
    } else if value.get("webhooks").is_some_and(Value::is_array) {
        value["webhooks"].clone()
    } else {
        return Err(TransportError::Decode(
            "webhook list response has no recognizable array".to_string(),
        ));
    };
    serde_json::from_value(list).map_err(|e| TransportError::Decode(e.to_string()))
}

fn trim_trailing_slash(mut url: String) -> String {
    while url.ends_with('/') {
        url.pop();
    }
    url
}

impl PlatformClient for HttpPlatformClient {
    async fn list_agents(&self) -> Result<Vec<Agent>, TransportError> {
        let value = self.request(Method::GET, "/api/v1/agents", None).await?;
        serde_json::from_value(value).map_err(|e| TransportError::Decode(e.to_string()))
    }

    async fn get_agent(&self, agent_id: &str) -> Result<Agent, TransportError> {
        let value = self
            .request(Method::GET, &format!("/api/v1/agents/{agent_id}"), None)
            .await?;
        serde_json::from_value(value).map_err(|e| TransportError::Decode(e.to_string()))
    }

    async fn send_message(&self, agent_id: &str, body: &Value) -> Result<Value, TransportError> {
        self.request(
            Method::POST,
            &format!("/webhooks/agents/{agent_id}/message"),
            Some(body),
        )
        .await
    }

    async fn send_typing(
        &self,
        agent_id: &str,
        conversation_id: &str,
        typing: bool,
    ) -> Result<Value, TransportError> {
        let body = serde_json::json!({
            "data": { "typing": typing },
            "conversation_id": conversation_id,
            "callback_type": "typing",
        });
        self.request(
            Method::POST,
            &format!("/api/agents/{agent_id}/callback"),
            Some(&body),
        )
        .await
    }

    async fn poll_queue(
        &self,
        tenant_id: &str,
        limit: u32,
        queue_name: Option<&str>,
    ) -> Result<Vec<QueueMessage>, TransportError> {
        let mut params = serde_json::json!({ "limit": limit });
        if let Some(queue_name) = queue_name {
            params["queue_name"] = Value::String(queue_name.to_string());
        }
        let value = self
            .request(
                Method::GET,
                &format!("/api/queue/{tenant_id}/poll"),
                Some(&params),
            )
            .await?;
        serde_json::from_value(value).map_err(|e| TransportError::Decode(e.to_string()))
    }

    async fn acknowledge(
        &self,
        tenant_id: &str,
        message_ids: &[i64],
    ) -> Result<(), TransportError> {
        let body = serde_json::to_value(AcknowledgeRequest {
            message_ids: message_ids.to_vec(),
        })
        .map_err(|e| TransportError::Decode(e.to_string()))?;
        self.request(
            Method::POST,
            &format!("/api/queue/{tenant_id}/acknowledge"),
            Some(&body),
        )
        .await?;
        Ok(())
    }

    async fn fail_messages(
        &self,
        tenant_id: &str,
        message_ids: &[i64],
        error_message: &str,
    ) -> Result<(), TransportError> {
        let body = serde_json::to_value(FailRequest {
            message_ids: message_ids.to_vec(),
            error_message: error_message.to_string(),
        })
        .map_err(|e| TransportError::Decode(e.to_string()))?;
        self.request(
            Method::POST,
            &format!("/api/queue/{tenant_id}/fail"),
            Some(&body),
        )
        .await?;
        Ok(())
    }

    async fn list_webhooks(&self) -> Result<Vec<RemoteWebhook>, TransportError> {
        let value = self.request(Method::GET, "/api/v1/webhooks", None).await?;
        extract_webhook_list(value)
    }

    async fn link_webhook(
        &self,
        webhook_id: &str,
        request: &LinkRequest,
    ) -> Result<Value, TransportError> {
        let body = serde_json::to_value(request)
            .map_err(|e| TransportError::Decode(e.to_string()))?;
        self.request(
            Method::POST,
            &format!("/api/v1/webhooks/{webhook_id}/link"),
            Some(&body),
        )
        .await
    }

    async fn unlink_webhook(&self, webhook_id: &str) -> Result<(), TransportError> {
        self.request(
            Method::DELETE,
            &format!("/api/v1/webhooks/{webhook_id}/link"),
            None,
        )
        .await?;
        Ok(())
    }

    async fn post_callback(
        &self,
        url: &str,
        form: &[(&str, String)],
    ) -> Result<Value, TransportError> {
        let response = self
            .client
            .post(url)
            .header(AUTHORIZATION, self.bearer())
            .form(form)
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        if !status.is_success() {
            return Err(TransportError::Http {
                status: status.as_u16(),
                detail: extract_error_detail(&text),
            });
        }

        // Callback receivers are third parties; tolerate non-JSON bodies.
        Ok(serde_json::from_str(&text).unwrap_or(Value::String(text)))
    }
}
