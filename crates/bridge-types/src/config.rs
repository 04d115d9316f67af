//! Bridge configuration types.
//!
//! `BridgeConfig` represents `config.toml`. Every field has a default so a
//! missing or partial file still yields a runnable configuration; the API
//! token may instead come from the environment (see bridge-infra's loader).

use serde::{Deserialize, Serialize};

/// Top-level configuration for the bridge.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BridgeConfig {
    #[serde(default)]
    pub platform: PlatformConfig,
    #[serde(default)]
    pub poll: PollConfig,
    #[serde(default)]
    pub webhook: WebhookConfig,
    #[serde(default)]
    pub server: ServerConfig,
    /// When present, the bridge links itself to this remote webhook on
    /// startup and unlinks on shutdown.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<LinkConfig>,
}

/// Remote platform connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformConfig {
    /// Base URL of the CribOps platform.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Bearer token; prefer the CRIBOPS_API_TOKEN environment variable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,
    /// Tenant scope for queue operations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
}

fn default_base_url() -> String {
    "https://api.cribops.com".to_string()
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_token: None,
            tenant_id: None,
        }
    }
}

/// Queue polling settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollConfig {
    /// Timer period in seconds.
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    /// Messages fetched per tick; clamped to the platform cap of 100.
    #[serde(default = "default_batch_size")]
    pub batch_size: u32,
    /// Restrict polling to one named queue.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub queue_name: Option<String>,
}

fn default_interval_secs() -> u64 {
    30
}

fn default_batch_size() -> u32 {
    10
}

/// The platform rejects poll limits above this.
pub const MAX_BATCH_SIZE: u32 = 100;

impl PollConfig {
    /// Batch size clamped to the platform cap.
    pub fn effective_batch_size(&self) -> u32 {
        self.batch_size.min(MAX_BATCH_SIZE)
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            batch_size: default_batch_size(),
            queue_name: None,
        }
    }
}

/// Inbound webhook settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookConfig {
    /// Path segment the receiver listens on (`POST /hooks/{path}`).
    #[serde(default = "default_webhook_path")]
    pub path: String,
    /// Shared secret; when set, every inbound request must authenticate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,
    /// Allow-list of event types; empty means accept all.
    #[serde(default)]
    pub allowed_events: Vec<String>,
    /// Attach the raw inbound headers to emitted events.
    #[serde(default)]
    pub include_headers: bool,
}

fn default_webhook_path() -> String {
    "cribops".to_string()
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            path: default_webhook_path(),
            secret: None,
            allowed_events: Vec::new(),
            include_headers: false,
        }
    }
}

/// Remote webhook registration performed at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkConfig {
    /// Remote webhook entity to link against.
    pub webhook_id: String,
    /// Host-side workflow identifier reported to the platform.
    pub workflow_id: String,
    /// Workflow display name reported to the platform.
    pub workflow_name: String,
    /// Publicly reachable URL of this bridge's webhook receiver.
    pub callback_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_callback_url: Option<String>,
    /// Key the binding is stored under.
    #[serde(default = "default_node_key")]
    pub node_key: String,
}

fn default_node_key() -> String {
    "default".to_string()
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    /// Directory for persisted trigger bindings.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

fn default_bind_addr() -> String {
    "127.0.0.1:8321".to_string()
}

fn default_data_dir() -> String {
    ".cribops-bridge".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            data_dir: default_data_dir(),
        }
    }
}
