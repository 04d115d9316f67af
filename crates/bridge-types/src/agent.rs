//! Remote agent identity types.
//!
//! Agents are owned by the CribOps platform; the bridge only reads them
//! (list/get) and addresses them when dispatching messages.

use serde::{Deserialize, Serialize};

/// A conversational agent as described by the platform's agent endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    /// Platform-assigned agent identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Activation status.
    #[serde(default)]
    pub status: AgentStatus,
    /// Tenant scope the agent belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
    /// Organization scope the agent belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<String>,
    /// Opaque platform-side metadata, passed through untouched.
    #[serde(default)]
    pub metadata: serde_json::Value,
}

/// Activation status of an agent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentStatus {
    Active,
    #[default]
    Inactive,
}
