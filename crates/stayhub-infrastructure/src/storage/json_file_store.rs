//! File-backed `KeyValueStore`.

use super::atomic_json::AtomicJsonFile;
use async_trait::async_trait;
use stayhub_core::storage::KeyValueStore;
use stayhub_core::{Result, StayhubError};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

type Document = BTreeMap<String, String>;

/// Durable key-value store kept in a single JSON document.
///
/// Every call re-reads the file, so writes made by another process sharing
/// the same data directory are visible on the next access. Blocking file I/O
/// runs on the blocking pool. Writers sharing a handle (or its clones) queue
/// on an async mutex; writers in other processes queue on the file lock.
///
/// # Example
///
/// ```ignore
/// use stayhub_infrastructure::JsonFileStore;
///
/// let store = JsonFileStore::new(StayhubPaths::storage_file()?);
/// store.set("accessToken", "\"abc\"".to_string()).await?;
/// ```
#[derive(Clone)]
pub struct JsonFileStore {
    file: Arc<AtomicJsonFile<Document>>,
    writer: Arc<Mutex<()>>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            file: Arc::new(AtomicJsonFile::new(path.into())),
            writer: Arc::new(Mutex::new(())),
        }
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    async fn blocking<F, R>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&AtomicJsonFile<Document>) -> Result<R> + Send + 'static,
        R: Send + 'static,
    {
        let file = Arc::clone(&self.file);
        tokio::task::spawn_blocking(move || f(&file))
            .await
            .map_err(|e| StayhubError::internal(format!("storage task failed: {}", e)))?
    }
}

#[async_trait]
impl KeyValueStore for JsonFileStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let key = key.to_string();
        self.blocking(move |file| Ok(file.load()?.and_then(|mut doc| doc.remove(&key))))
            .await
    }

    async fn set(&self, key: &str, value: String) -> Result<()> {
        let key = key.to_string();
        let _writer = self.writer.lock().await;
        self.blocking(move |file| {
            file.update(Document::new(), |doc| {
                doc.insert(key, value);
            })
        })
        .await
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let key = key.to_string();
        let _writer = self.writer.lock().await;
        self.blocking(move |file| {
            if !file.path().exists() {
                return Ok(());
            }
            file.update(Document::new(), |doc| {
                doc.remove(&key);
            })
        })
        .await
    }

    async fn clear(&self) -> Result<()> {
        let _writer = self.writer.lock().await;
        self.blocking(|file| {
            if !file.path().exists() {
                return Ok(());
            }
            file.update(Document::new(), |doc| doc.clear())
        })
        .await
    }

    async fn keys(&self) -> Result<Vec<String>> {
        self.blocking(|file| {
            Ok(file
                .load()?
                .map(|doc| doc.into_keys().collect())
                .unwrap_or_default())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_values_survive_a_new_handle() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("storage.json");

        let store = JsonFileStore::new(&path);
        store.set("accessToken", "\"a1\"".to_string()).await.unwrap();
        store.set("refreshToken", "\"r1\"".to_string()).await.unwrap();
        drop(store);

        let reopened = JsonFileStore::new(&path);
        assert_eq!(
            reopened.get("accessToken").await.unwrap().as_deref(),
            Some("\"a1\"")
        );
        assert_eq!(reopened.keys().await.unwrap(), vec!["accessToken", "refreshToken"]);
    }

    #[tokio::test]
    async fn test_remove_and_clear_on_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(temp_dir.path().join("nested").join("storage.json"));

        store.remove("profile").await.unwrap();
        store.clear().await.unwrap();
        assert!(store.get("profile").await.unwrap().is_none());
        assert!(!store.path().exists());
    }

    #[tokio::test]
    async fn test_clear_removes_everything() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(temp_dir.path().join("storage.json"));
        store.set("a", "1".to_string()).await.unwrap();
        store.set("b", "2".to_string()).await.unwrap();

        store.clear().await.unwrap();
        assert!(store.keys().await.unwrap().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_sets_keep_every_key() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(temp_dir.path().join("storage.json"));

        let writers: Vec<_> = (0..16)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move { store.set(&format!("k{}", i), i.to_string()).await })
            })
            .collect();
        for writer in writers {
            writer.await.unwrap().unwrap();
        }

        assert_eq!(store.keys().await.unwrap().len(), 16);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_sets_through_separate_handles_keep_every_key() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("storage.json");

        let writers: Vec<_> = (0..16)
            .map(|i| {
                let store = JsonFileStore::new(&path);
                tokio::spawn(async move { store.set(&format!("k{}", i), i.to_string()).await })
            })
            .collect();
        for writer in writers {
            writer.await.unwrap().unwrap();
        }

        assert_eq!(JsonFileStore::new(&path).keys().await.unwrap().len(), 16);
        assert!(temp_dir.path().join("storage.lock").exists());
    }
}
