//! # Durable Object Storage
//!
//! Port for persisting one environment block per batch, keyed by result version,
//! plus a local-filesystem adapter used by the standalone dispatcher binary.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::config::DispatcherConfig;
use crate::error::{EvalError, Result};
use crate::models::ResultVersion;

/// Storage key for a batch's environment block: `{folder}/file-{result_version}.env`
pub fn object_key(folder: &str, result_version: ResultVersion) -> String {
    if folder.is_empty() {
        format!("file-{result_version}.env")
    } else {
        format!("{}/file-{result_version}.env", folder.trim_end_matches('/'))
    }
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `body` under `key`, replacing any existing object
    async fn put_object(&self, key: &str, body: String, content_type: &str) -> Result<()>;

    /// Location a worker uses to fetch the object
    fn object_uri(&self, key: &str) -> String;
}

/// Object store rooted at a local directory
#[derive(Debug, Clone)]
pub struct LocalObjectStore {
    root: PathBuf,
}

impl LocalObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Store laid out as `{storage_root}/{bucket_name}`, one directory per bucket
    pub fn from_config(config: &DispatcherConfig) -> Self {
        if config.bucket_name.is_empty() {
            Self::new(config.storage_root.clone())
        } else {
            Self::new(config.storage_root.join(&config.bucket_name))
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        if key.split('/').any(|segment| segment == ".." || segment.is_empty()) {
            return Err(EvalError::Storage(format!("invalid object key: {key}")));
        }
        Ok(self.root.join(key))
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn put_object(&self, key: &str, body: String, content_type: &str) -> Result<()> {
        let path = self.path_for(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                EvalError::Storage(format!("failed to create {}: {e}", parent.display()))
            })?;
        }
        tokio::fs::write(&path, body)
            .await
            .map_err(|e| EvalError::Storage(format!("failed to write {}: {e}", path.display())))?;

        debug!(key = %key, content_type = %content_type, path = %path.display(), "Stored object");
        Ok(())
    }

    fn object_uri(&self, key: &str) -> String {
        format!("file://{}", self.root.join(key).display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_object_key_layout() {
        let version = ResultVersion::new();
        assert_eq!(object_key("files", version), format!("files/file-{version}.env"));
        assert_eq!(object_key("files/", version), format!("files/file-{version}.env"));
        assert_eq!(object_key("", version), format!("file-{version}.env"));
    }

    #[tokio::test]
    async fn test_local_store_writes_and_replaces() {
        let dir = TempDir::new().unwrap();
        let store = LocalObjectStore::new(dir.path());
        let key = object_key("files", ResultVersion::new());

        store.put_object(&key, "first".to_string(), "application/json").await.unwrap();
        store.put_object(&key, "second".to_string(), "application/json").await.unwrap();

        let stored = std::fs::read_to_string(dir.path().join(&key)).unwrap();
        assert_eq!(stored, "second");
        assert!(store.object_uri(&key).starts_with("file://"));
    }

    #[tokio::test]
    async fn test_store_from_config_writes_under_bucket() {
        let dir = TempDir::new().unwrap();
        let config = DispatcherConfig {
            storage_root: dir.path().to_path_buf(),
            bucket_name: "evaluation-files".to_string(),
            ..DispatcherConfig::default()
        };
        let store = LocalObjectStore::from_config(&config);
        let key = object_key(&config.folder_name, ResultVersion::new());

        store.put_object(&key, "body".to_string(), "application/json").await.unwrap();

        let expected = dir.path().join("evaluation-files").join(&key);
        assert_eq!(std::fs::read_to_string(&expected).unwrap(), "body");
        assert_eq!(store.object_uri(&key), format!("file://{}", expected.display()));
    }

    #[tokio::test]
    async fn test_local_store_rejects_traversal() {
        let dir = TempDir::new().unwrap();
        let store = LocalObjectStore::new(dir.path());
        let result = store
            .put_object("../escape.env", String::new(), "application/json")
            .await;
        assert!(matches!(result, Err(EvalError::Storage(_))));
    }
}
