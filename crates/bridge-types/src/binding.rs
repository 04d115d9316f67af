//! Webhook registration types.
//!
//! A `TriggerBinding` records the link between one activated workflow
//! trigger and a remote webhook entity. It is created on activation,
//! destroyed on deactivation, and persisted in the binding store so it
//! survives process restarts matching the activation state.

use serde::{Deserialize, Serialize};

/// The persisted binding between a trigger activation and a remote webhook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerBinding {
    /// Identifier of the remote webhook entity the workflow is linked to.
    pub remote_webhook_id: String,
    /// Host-side workflow identifier.
    pub workflow_id: String,
    /// Production callback URL registered with the platform.
    pub callback_url: String,
    /// Test-mode callback URL, when the host distinguishes one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_callback_url: Option<String>,
    /// Workflow display name, sent to the platform for operator visibility.
    pub workflow_name: String,
}

/// A platform-side webhook entity as returned by the list endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteWebhook {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Wire body of the link-registration call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkRequest {
    pub workflow_id: String,
    pub webhook_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_webhook_url: Option<String>,
    pub workflow_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binding_serde_roundtrip() {
        let binding = TriggerBinding {
            remote_webhook_id: "wh-1".to_string(),
            workflow_id: "wf-9".to_string(),
            callback_url: "https://host.example/hooks/abc".to_string(),
            test_callback_url: None,
            workflow_name: "Support intake".to_string(),
        };
        let json = serde_json::to_string(&binding).unwrap();
        let parsed: TriggerBinding = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, binding);
        assert!(!json.contains("test_callback_url"));
    }

    #[test]
    fn test_link_request_serialize() {
        let req = LinkRequest {
            workflow_id: "wf-9".to_string(),
            webhook_url: "https://host.example/hooks/abc".to_string(),
            test_webhook_url: Some("https://host.example/hooks-test/abc".to_string()),
            workflow_name: "Support intake".to_string(),
        };
        let json = serde_json::to_string(&req).unwrap();
        assert!(json.contains("\"workflow_id\":\"wf-9\""));
        assert!(json.contains("\"test_webhook_url\""));
    }

    #[test]
    fn test_remote_webhook_deserialize_minimal() {
        let hook: RemoteWebhook = serde_json::from_str(r#"{"id":"wh-2"}"#).unwrap();
        assert_eq!(hook.id, "wh-2");
        assert!(hook.name.is_none());
    }
}
