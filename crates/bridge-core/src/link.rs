//! Trigger link/registration lifecycle.
//!
//! Binds a workflow activation to a remote webhook: link on activate,
//! unlink on deactivate, binding persisted in the `BindingStore` so it
//! survives restarts matching the activation state. A remote failure
//! during unlink never blocks deactivation.

use std::sync::Arc;

use bridge_types::binding::{LinkRequest, TriggerBinding};
use bridge_types::error::RegistrationError;

use crate::client::PlatformClient;
use crate::store::BindingStore;

/// Manages the binding between a workflow activation and a remote webhook.
pub struct LinkManager<C, S> {
    client: Arc<C>,
    store: Arc<S>,
}

impl<C: PlatformClient, S: BindingStore> LinkManager<C, S> {
    pub fn new(client: Arc<C>, store: Arc<S>) -> Self {
        Self { client, store }
    }

    /// Whether a registration already exists for this node.
    ///
    /// The platform has no existence-check endpoint, so this reports
    /// absent and forces re-registration on every activation; `create`
    /// tolerates duplicate links on the platform side.
    pub async fn check_exists(&self, _node_key: &str) -> Result<bool, RegistrationError> {
        Ok(false)
    }

    /// Link the workflow's callback URL to a remote webhook and persist
    /// the binding. A remote failure aborts activation.
    pub async fn create(
        &self,
        node_key: &str,
        webhook_id: &str,
        request: LinkRequest,
    ) -> Result<TriggerBinding, RegistrationError> {
        self.client
            .link_webhook(webhook_id, &request)
            .await
            .map_err(|e| RegistrationError::LinkFailed {
                webhook_id: webhook_id.to_string(),
                detail: e.to_string(),
            })?;

        let binding = TriggerBinding {
            remote_webhook_id: webhook_id.to_string(),
            workflow_id: request.workflow_id,
            callback_url: request.webhook_url,
            test_callback_url: request.test_webhook_url,
            workflow_name: request.workflow_name,
        };
        self.store.set(node_key, &binding).await?;

        tracing::info!(
            node_key,
            webhook_id,
            workflow_id = %binding.workflow_id,
            "webhook linked"
        );
        Ok(binding)
    }

    /// Unlink the remote webhook and clear the stored binding.
    ///
    /// A remote failure is logged and suppressed; the local binding is
    /// cleared regardless so deactivation always proceeds.
    pub async fn delete(&self, node_key: &str) -> Result<(), RegistrationError> {
        match self.store.get(node_key).await {
            Ok(Some(binding)) => {
                if let Err(e) = self
                    .client
                    .unlink_webhook(&binding.remote_webhook_id)
                    .await
                {
                    tracing::warn!(
                        node_key,
                        webhook_id = %binding.remote_webhook_id,
                        error = %e,
                        "remote unlink failed, clearing local binding anyway"
                    );
                }
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(node_key, error = %e, "could not read stored binding");
            }
        }

        self.store.delete(node_key).await?;
        tracing::info!(node_key, "webhook unlinked");
        Ok(())
    }
}
