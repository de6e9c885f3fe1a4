//! Blob container client seam.
//!
//! The concrete HTTP/SDK client sits behind [`BlobContainer`]; everything the
//! transfer layer needs from the store is expressed here. Keys are passed
//! fresh on every call so no handle with stale connection state is ever
//! carried across network calls.

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::errors::StoreResult;

/// State of an asynchronous server-side copy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CopyStatus {
    /// No copy state recorded for the object
    Unspecified,
    /// Copy is in flight
    Pending,
    /// Copy completed
    Success,
    /// Copy was aborted by the store
    Aborted,
    /// Copy failed
    Failed,
}

impl CopyStatus {
    /// Unspecified and Pending are the only non-terminal states.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, CopyStatus::Unspecified | CopyStatus::Pending)
    }
}

/// Metadata of one listed object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectMeta {
    /// Flat key in the container namespace
    pub key: String,
    /// Object size in bytes
    pub size: u64,
    /// Last modified timestamp (milliseconds since epoch)
    pub last_modified: u64,
}

impl ObjectMeta {
    pub fn new(key: impl Into<String>, size: u64) -> Self {
        Self {
            key: key.into(),
            size,
            last_modified: chrono::Utc::now().timestamp_millis() as u64,
        }
    }

    /// Text after the final path separator. The sync engine addresses files
    /// by leaf name; duplicate leaves under nested sub-paths are not
    /// reconciled here.
    pub fn leaf_name(&self) -> &str {
        self.key.rsplit('/').next().unwrap_or(self.key.as_str())
    }
}

/// Single-container object operations needed by the transfer layer
#[async_trait]
pub trait BlobContainer: Send + Sync {
    /// Probe whether the backing container exists
    async fn container_exists(&self) -> StoreResult<bool>;

    /// Create the backing container
    async fn create_container(&self) -> StoreResult<()>;

    /// Check whether an object exists
    async fn exists(&self, key: &str) -> StoreResult<bool>;

    /// Write the full byte stream to an object
    async fn put(&self, key: &str, data: Bytes) -> StoreResult<()>;

    /// Read an object's full contents
    async fn get(&self, key: &str) -> StoreResult<Bytes>;

    /// Delete an object
    async fn delete(&self, key: &str) -> StoreResult<()>;

    /// Enumerate objects whose key starts with `prefix`. Order follows the
    /// store's own enumeration and is not guaranteed sorted.
    async fn list(&self, prefix: &str) -> StoreResult<Vec<ObjectMeta>>;

    /// Begin an asynchronous server-side copy of `from_key` to `to_key`
    async fn start_copy(&self, from_key: &str, to_key: &str) -> StoreResult<()>;

    /// Read the current copy state of the target object
    async fn copy_status(&self, key: &str) -> StoreResult<CopyStatus>;
}
