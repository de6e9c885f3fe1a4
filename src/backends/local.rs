//! Local filesystem container for development and integration tests.
//!
//! Keys map onto paths under a root directory; the directory itself plays the
//! role of the container. Server-side copies complete synchronously, so
//! `copy_status` reports `Success` as soon as the target file exists.

use async_trait::async_trait;
use bytes::Bytes;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

use crate::container::{BlobContainer, CopyStatus, ObjectMeta};
use crate::errors::{StoreError, StoreResult};

/// Directory-backed container
pub struct LocalContainer {
    root: PathBuf,
}

impl LocalContainer {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn key_path(&self, key: &str) -> PathBuf {
        let mut path = self.root.clone();
        for component in key.split('/') {
            if !component.is_empty() {
                path = path.join(component);
            }
        }
        path
    }

    fn path_to_key(&self, path: &Path) -> StoreResult<String> {
        let relative = path
            .strip_prefix(&self.root)
            .map_err(|_| StoreError::List {
                prefix: String::new(),
                details: format!("path {path:?} outside container root"),
            })?;
        Ok(relative.to_string_lossy().replace('\\', "/"))
    }

    async fn ensure_parent_dir(&self, path: &Path) -> StoreResult<()> {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent).await?;
            }
        }
        Ok(())
    }

    async fn list_recursive(
        &self,
        dir: &Path,
        prefix: &str,
        objects: &mut Vec<ObjectMeta>,
    ) -> StoreResult<()> {
        let mut entries = fs::read_dir(dir).await.map_err(|e| StoreError::List {
            prefix: prefix.to_string(),
            details: format!("failed to read {dir:?}: {e}"),
        })?;

        while let Some(entry) = entries.next_entry().await.map_err(|e| StoreError::List {
            prefix: prefix.to_string(),
            details: e.to_string(),
        })? {
            let path = entry.path();
            if path.is_dir() {
                Box::pin(self.list_recursive(&path, prefix, objects)).await?;
            } else if path.is_file() {
                let key = self.path_to_key(&path)?;
                if key.starts_with(prefix) {
                    let metadata = entry.metadata().await?;
                    objects.push(ObjectMeta::new(key, metadata.len()));
                }
            }
        }
        Ok(())
    }
}

#[async_trait]
impl BlobContainer for LocalContainer {
    async fn container_exists(&self) -> StoreResult<bool> {
        Ok(self.root.is_dir())
    }

    async fn create_container(&self) -> StoreResult<()> {
        fs::create_dir_all(&self.root)
            .await
            .map_err(|e| StoreError::Container {
                name: self.root.to_string_lossy().to_string(),
                details: e.to_string(),
            })?;
        debug!(root = ?self.root, "created local container");
        Ok(())
    }

    async fn exists(&self, key: &str) -> StoreResult<bool> {
        Ok(self.key_path(key).is_file())
    }

    async fn put(&self, key: &str, data: Bytes) -> StoreResult<()> {
        let path = self.key_path(key);
        self.ensure_parent_dir(&path).await?;
        fs::write(&path, &data).await.map_err(|e| StoreError::Write {
            key: key.to_string(),
            details: e.to_string(),
        })?;
        debug!(key, bytes = data.len(), "wrote object");
        Ok(())
    }

    async fn get(&self, key: &str) -> StoreResult<Bytes> {
        let path = self.key_path(key);
        if !path.is_file() {
            return Err(StoreError::NotFound {
                key: key.to_string(),
            });
        }
        let data = fs::read(&path).await.map_err(|e| StoreError::Read {
            key: key.to_string(),
            details: e.to_string(),
        })?;
        Ok(Bytes::from(data))
    }

    async fn delete(&self, key: &str) -> StoreResult<()> {
        let path = self.key_path(key);
        if !path.is_file() {
            return Err(StoreError::NotFound {
                key: key.to_string(),
            });
        }
        fs::remove_file(&path).await.map_err(|e| StoreError::Delete {
            key: key.to_string(),
            details: e.to_string(),
        })?;
        Ok(())
    }

    async fn list(&self, prefix: &str) -> StoreResult<Vec<ObjectMeta>> {
        let mut objects = Vec::new();
        if self.root.is_dir() {
            let root = self.root.clone();
            self.list_recursive(&root, prefix, &mut objects).await?;
        }
        debug!(prefix, count = objects.len(), "listed objects");
        Ok(objects)
    }

    async fn start_copy(&self, from_key: &str, to_key: &str) -> StoreResult<()> {
        let from = self.key_path(from_key);
        let to = self.key_path(to_key);
        if !from.is_file() {
            return Err(StoreError::NotFound {
                key: from_key.to_string(),
            });
        }
        self.ensure_parent_dir(&to).await?;
        fs::copy(&from, &to).await.map_err(|e| StoreError::Write {
            key: to_key.to_string(),
            details: e.to_string(),
        })?;
        Ok(())
    }

    async fn copy_status(&self, key: &str) -> StoreResult<CopyStatus> {
        // Filesystem copies are synchronous; the target's presence is the
        // whole copy state.
        if self.key_path(key).is_file() {
            Ok(CopyStatus::Success)
        } else {
            Ok(CopyStatus::Unspecified)
        }
    }
}
