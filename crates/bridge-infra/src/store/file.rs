//! File-backed binding store.
//!
//! One JSON document per node key under the data directory. Survives
//! process restarts so bindings match the workflow activation state.

use std::path::PathBuf;

use bridge_core::store::BindingStore;
use bridge_types::binding::TriggerBinding;
use bridge_types::error::StoreError;

/// Persistent `BindingStore` writing one `<key>.json` per binding.
pub struct FileBindingStore {
    dir: PathBuf,
}

impl FileBindingStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, node_key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", sanitize_key(node_key)))
    }
}

/// Map a node key to a filesystem-safe name.
fn sanitize_key(node_key: &str) -> String {
    node_key
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '-' })
        .collect()
}

impl BindingStore for FileBindingStore {
    async fn get(&self, node_key: &str) -> Result<Option<TriggerBinding>, StoreError> {
        let path = self.path_for(node_key);
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(StoreError::Io(err.to_string())),
        };
        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| StoreError::Corrupt(e.to_string()))
    }

    async fn set(&self, node_key: &str, binding: &TriggerBinding) -> Result<(), StoreError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| StoreError::Io(e.to_string()))?;
        let content = serde_json::to_string_pretty(binding)
            .map_err(|e| StoreError::Corrupt(e.to_string()))?;
        tokio::fs::write(self.path_for(node_key), content)
            .await
            .map_err(|e| StoreError::Io(e.to_string()))
    }

    async fn delete(&self, node_key: &str) -> Result<(), StoreError> {
        match tokio::fs::remove_file(self.path_for(node_key)).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(StoreError::Io(err.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn binding() -> TriggerBinding {
        TriggerBinding {
            remote_webhook_id: "wh-1".to_string(),
            workflow_id: "wf-1".to_string(),
            callback_url: "https://host.example/hooks/a".to_string(),
            test_callback_url: Some("https://host.example/hooks-test/a".to_string()),
            workflow_name: "Support intake".to_string(),
        }
    }

    #[tokio::test]
    async fn roundtrip_through_disk() {
        let tmp = TempDir::new().unwrap();
        let store = FileBindingStore::new(tmp.path());

        store.set("node-1", &binding()).await.unwrap();
        let loaded = store.get("node-1").await.unwrap();
        assert_eq!(loaded, Some(binding()));
    }

    #[tokio::test]
    async fn missing_key_reads_none() {
        let tmp = TempDir::new().unwrap();
        let store = FileBindingStore::new(tmp.path());
        assert!(store.get("absent").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_clears_and_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let store = FileBindingStore::new(tmp.path());

        store.set("node-1", &binding()).await.unwrap();
        store.delete("node-1").await.unwrap();
        assert!(store.get("node-1").await.unwrap().is_none());

        // second delete is a no-op
        store.delete("node-1").await.unwrap();
    }

    #[tokio::test]
    async fn corrupt_file_is_reported() {
        let tmp = TempDir::new().unwrap();
        let store = FileBindingStore::new(tmp.path());

        tokio::fs::write(tmp.path().join("node-1.json"), "not { json")
            .await
            .unwrap();
        let err = store.get("node-1").await.unwrap_err();
        assert!(matches!(err, StoreError::Corrupt(_)));
    }

    #[tokio::test]
    async fn node_keys_are_sanitized_for_the_filesystem() {
        let tmp = TempDir::new().unwrap();
        let store = FileBindingStore::new(tmp.path());

        store.set("trigger/node:1", &binding()).await.unwrap();
        assert!(tmp.path().join("trigger-node-1.json").exists());
        assert_eq!(store.get("trigger/node:1").await.unwrap(), Some(binding()));
    }
}
