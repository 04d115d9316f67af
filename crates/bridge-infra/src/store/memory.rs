//! In-memory binding store.
//!
//! DashMap-backed implementation for tests and embedded hosts that manage
//! persistence themselves.

use dashmap::DashMap;

use bridge_core::store::BindingStore;
use bridge_types::binding::TriggerBinding;
use bridge_types::error::StoreError;

/// Non-persistent `BindingStore` over a concurrent map.
#[derive(Default)]
pub struct MemoryBindingStore {
    entries: DashMap<String, TriggerBinding>,
}

impl MemoryBindingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored bindings.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl BindingStore for MemoryBindingStore {
    async fn get(&self, node_key: &str) -> Result<Option<TriggerBinding>, StoreError> {
        Ok(self.entries.get(node_key).map(|r| r.value().clone()))
    }

    async fn set(&self, node_key: &str, binding: &TriggerBinding) -> Result<(), StoreError> {
        self.entries.insert(node_key.to_string(), binding.clone());
        Ok(())
    }

    async fn delete(&self, node_key: &str) -> Result<(), StoreError> {
        self.entries.remove(node_key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn binding() -> TriggerBinding {
        TriggerBinding {
            remote_webhook_id: "wh-1".to_string(),
            workflow_id: "wf-1".to_string(),
            callback_url: "https://host.example/hooks/a".to_string(),
            test_callback_url: None,
            workflow_name: "wf".to_string(),
        }
    }

    #[tokio::test]
    async fn set_get_delete_roundtrip() {
        let store = MemoryBindingStore::new();
        assert!(store.get("n1").await.unwrap().is_none());

        store.set("n1", &binding()).await.unwrap();
        assert_eq!(store.get("n1").await.unwrap(), Some(binding()));
        assert_eq!(store.len(), 1);

        store.delete("n1").await.unwrap();
        assert!(store.get("n1").await.unwrap().is_none());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn delete_missing_key_is_noop() {
        let store = MemoryBindingStore::new();
        store.delete("missing").await.unwrap();
    }
}
