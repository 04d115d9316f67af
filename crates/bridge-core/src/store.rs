//! Binding store trait.
//!
//! Per-node persisted storage for trigger bindings, keyed by the
//! trigger-node instance. Uses RPITIT (native async fn in traits, Rust
//! 2024 edition). Implementations live in bridge-infra.

use bridge_types::binding::TriggerBinding;
use bridge_types::error::StoreError;

/// Trait for per-node trigger-binding persistence.
pub trait BindingStore: Send + Sync {
    /// Get the binding for a node key. Returns None if absent.
    fn get(
        &self,
        node_key: &str,
    ) -> impl std::future::Future<Output = Result<Option<TriggerBinding>, StoreError>> + Send;

    /// Store the binding for a node key (upsert).
    fn set(
        &self,
        node_key: &str,
        binding: &TriggerBinding,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;

    /// Delete the binding for a node key. No-op if absent.
    fn delete(
        &self,
        node_key: &str,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;
}
