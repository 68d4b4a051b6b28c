use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::application::KeyValueStore;
use crate::domain::DomainError;

const STORE_FILE_NAME: &str = "storage.json";

/// Key-value store persisted as one JSON object on disk.
///
/// Every write rewrites the whole file through a temporary sibling and a
/// rename, so a crash mid-write leaves the previous contents intact.
pub struct FileKeyValueStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileKeyValueStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Store file `storage.json` inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join(STORE_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_map(&self) -> Result<BTreeMap<String, String>, DomainError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) if contents.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(contents) => serde_json::from_str(&contents).map_err(|e| {
                DomainError::storage(format!("corrupt store {}: {e}", self.path.display()))
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Like `read_map`, but a corrupt file is replaced instead of blocking
    /// every future write.
    async fn read_map_for_update(&self) -> Result<BTreeMap<String, String>, DomainError> {
        match self.read_map().await {
            Err(DomainError::StorageError(msg)) => {
                warn!("Overwriting unreadable key-value store: {}", msg);
                Ok(BTreeMap::new())
            }
            other => other,
        }
    }

    async fn write_map(&self, map: &BTreeMap<String, String>) -> Result<(), DomainError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_string_pretty(map)
            .map_err(|e| DomainError::storage(format!("failed to encode store: {e}")))?;

        let tmp_path = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, json).await?;
        tokio::fs::rename(&tmp_path, &self.path).await?;

        debug!("Wrote {} keys to {}", map.len(), self.path.display());
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for FileKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, DomainError> {
        let _guard = self.lock.lock().await;
        let mut map = self.read_map().await?;
        Ok(map.remove(key))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), DomainError> {
        let _guard = self.lock.lock().await;
        let mut map = self.read_map_for_update().await?;
        map.insert(key.to_string(), value.to_string());
        self.write_map(&map).await
    }

    async fn delete(&self, key: &str) -> Result<(), DomainError> {
        let _guard = self.lock.lock().await;
        let mut map = self.read_map_for_update().await?;
        if map.remove(key).is_none() {
            return Ok(());
        }
        self.write_map(&map).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn missing_file_reads_as_empty() {
        let dir = tempdir().unwrap();
        let store = FileKeyValueStore::in_dir(dir.path());
        assert_eq!(store.get("anything").await.unwrap(), None);
    }

    #[tokio::test]
    async fn values_survive_a_new_instance() {
        let dir = tempdir().unwrap();
        FileKeyValueStore::in_dir(dir.path())
            .set("greeting", "hello")
            .await
            .unwrap();

        let reopened = FileKeyValueStore::in_dir(dir.path());
        assert_eq!(
            reopened.get("greeting").await.unwrap().as_deref(),
            Some("hello")
        );
    }

    #[tokio::test]
    async fn delete_keeps_other_keys() {
        let dir = tempdir().unwrap();
        let store = FileKeyValueStore::in_dir(dir.path());
        store.set("a", "1").await.unwrap();
        store.set("b", "2").await.unwrap();

        store.delete("a").await.unwrap();
        store.delete("missing").await.unwrap();

        assert_eq!(store.get("a").await.unwrap(), None);
        assert_eq!(store.get("b").await.unwrap().as_deref(), Some("2"));
    }

    #[tokio::test]
    async fn corrupt_file_fails_reads_but_not_writes() {
        let dir = tempdir().unwrap();
        let store = FileKeyValueStore::in_dir(dir.path());
        std::fs::write(store.path(), "not json").unwrap();

        assert!(store.get("k").await.is_err());
        store.set("k", "v").await.unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("v"));
    }
}
