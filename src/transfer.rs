//! Transfer manager: atomic upload, move, listing, and capability probes on
//! top of a [`BlobContainer`].
//!
//! The store only offers create/read/delete plus asynchronous server-side
//! copy. Rename and move are emulated with copy-confirm-then-delete: the
//! visible target is only ever produced by a single copy step, so a reader
//! polling it observes either nothing, the prior content, or the complete new
//! content, never a partial write. Two concurrent writers targeting the same
//! path race at the final copy step and the last copy to complete wins; that
//! is the store's native semantics and is not masked here.

use bytes::Bytes;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tokio::fs;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::config::TransferSettings;
use crate::container::{BlobContainer, ObjectMeta};
use crate::copy_wait::{wait_for_copy, WaitOptions};
use crate::errors::{StoreError, StoreResult};
use crate::metrics::TransferMetrics;
use crate::remote_file::{RemoteFile, RemoteFileKind};

/// Root-level canary object used by the write-capability probe.
const WRITE_PROBE_KEY: &str = "write-probe";

/// Adapter satisfying the sync engine's transfer contract
pub struct TransferManager {
    container: Arc<dyn BlobContainer>,
    settings: TransferSettings,
    wait_options: WaitOptions,
    metrics: TransferMetrics,
}

impl TransferManager {
    /// Create a transfer manager. Settings problems are fatal here, before
    /// any remote call is made.
    pub fn new(
        container: Arc<dyn BlobContainer>,
        settings: TransferSettings,
    ) -> StoreResult<Self> {
        settings.validate()?;
        Ok(Self {
            container,
            settings,
            wait_options: WaitOptions::default(),
            metrics: TransferMetrics::new(),
        })
    }

    /// Override the copy wait bounds (deadline, cancellation signal).
    pub fn with_wait_options(mut self, wait_options: WaitOptions) -> Self {
        self.wait_options = wait_options;
        self
    }

    pub fn metrics(&self) -> &TransferMetrics {
        &self.metrics
    }

    /// Ensure the backing container is usable, creating it when absent and
    /// `create_if_required` holds. Creation failures are fatal.
    #[instrument(skip(self))]
    pub async fn init(&self, create_if_required: bool) -> StoreResult<()> {
        if !self.target_exists().await && create_if_required {
            self.container
                .create_container()
                .await
                .map_err(|e| StoreError::Container {
                    name: self.settings.container_name.clone(),
                    details: format!("cannot create container: {e}"),
                })?;
            info!(container = %self.settings.container_name, "created container");
        }
        Ok(())
    }

    /// Upload `data` so that a concurrent reader of `target` never observes a
    /// partial object: stage under a unique temporary key, promote via
    /// server-side copy, then drop the staging object.
    #[instrument(skip(self, data), fields(bytes = data.len()))]
    pub async fn upload(&self, data: Bytes, target: &RemoteFile) -> StoreResult<()> {
        let target_path = target.full_path();
        let staging_path = staging_key(target.name());

        debug!(%target_path, %staging_path, "staging upload");
        self.container.put(&staging_path, data.clone()).await?;

        // A failure from here on may leave the staging object behind; that is
        // cleanup debt, not a correctness problem, since staging keys are
        // never listed under a logical kind.
        self.copy_and_wait(&staging_path, &target_path)
            .await
            .inspect_err(|_| self.metrics.record_error("upload"))?;

        debug!(%staging_path, "removing staging object");
        self.container.delete(&staging_path).await?;

        self.metrics.record_operation("upload");
        self.metrics.record_bytes_uploaded(data.len() as u64);
        Ok(())
    }

    /// Read the full contents of a remote file.
    #[instrument(skip(self))]
    pub async fn download(&self, source: &RemoteFile) -> StoreResult<Bytes> {
        let data = self.container.get(&source.full_path()).await?;
        self.metrics.record_operation("download");
        self.metrics.record_bytes_downloaded(data.len() as u64);
        Ok(data)
    }

    /// Download into `local_path`, staging in a sibling temporary file and
    /// renaming into place so local readers never see a partial file either.
    #[instrument(skip(self))]
    pub async fn download_to_file(
        &self,
        source: &RemoteFile,
        local_path: &Path,
    ) -> StoreResult<()> {
        let data = self.download(source).await?;

        let file_name = local_path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| StoreError::InvalidName {
                name: local_path.display().to_string(),
                reason: "destination has no file name".to_string(),
            })?;
        let staging = local_path.with_file_name(format!(".{file_name}.{}.part", Uuid::new_v4()));

        fs::write(&staging, &data).await?;
        if let Err(e) = fs::rename(&staging, local_path).await {
            let _ = fs::remove_file(&staging).await;
            return Err(e.into());
        }
        debug!(?local_path, bytes = data.len(), "downloaded to file");
        Ok(())
    }

    /// Error-absorbing delete. Failures are logged and reported as `false`.
    #[instrument(skip(self))]
    pub async fn delete(&self, file: &RemoteFile) -> bool {
        let path = file.full_path();
        match self.container.delete(&path).await {
            Ok(()) => {
                self.metrics.record_operation("delete");
                true
            }
            Err(err) => {
                warn!(%path, %err, "delete failed");
                self.metrics.record_error("delete");
                false
            }
        }
    }

    /// Atomic move: copy source to target, confirm the copy, then delete the
    /// source. At no observable instant does neither object exist. A failed
    /// copy leaves the source untouched; a delete failure after a confirmed
    /// copy propagates and is not treated as rollback.
    #[instrument(skip(self))]
    pub async fn move_file(&self, source: &RemoteFile, target: &RemoteFile) -> StoreResult<()> {
        let source_path = source.full_path();
        let target_path = target.full_path();

        debug!(%source_path, %target_path, "moving object");
        self.copy_and_wait(&source_path, &target_path)
            .await
            .inspect_err(|_| self.metrics.record_error("move"))?;

        self.container.delete(&source_path).await?;
        self.metrics.record_operation("move");
        Ok(())
    }

    /// Enumerate the files of one kind, keyed by leaf name. Duplicate leaf
    /// names under nested sub-paths silently overwrite each other; leaf names
    /// that are not valid file names ("." and "..") are skipped.
    #[instrument(skip(self))]
    pub async fn list(&self, kind: RemoteFileKind) -> StoreResult<HashMap<String, RemoteFile>> {
        let prefix = kind.prefix();
        let objects = self.container.list(prefix).await?;

        let mut files = HashMap::new();
        for meta in &objects {
            let name = meta.leaf_name();
            if let Ok(file) = RemoteFile::new(kind, name) {
                files.insert(name.to_string(), file);
            }
        }

        debug!(prefix, count = files.len(), "listed remote files");
        self.metrics.record_operation("list");
        Ok(files)
    }

    /// Probe for the backing container. Probe failures count as absent; the
    /// host engine treats this as a capability signal, not a hard guarantee.
    pub async fn target_exists(&self) -> bool {
        match self.container.container_exists().await {
            Ok(exists) => exists,
            Err(err) => {
                warn!(%err, "container existence probe failed");
                false
            }
        }
    }

    /// Advisory write probe: the container must exist and a canary object
    /// must be both created and deleted successfully.
    #[instrument(skip(self))]
    pub async fn can_write(&self) -> bool {
        if !self.target_exists().await {
            info!("write probe: container does not exist");
            return false;
        }

        let probe = async {
            self.container.put(WRITE_PROBE_KEY, Bytes::new()).await?;
            self.container.delete(WRITE_PROBE_KEY).await
        };
        match probe.await {
            Ok(()) => {
                info!("write probe: canary created and deleted");
                true
            }
            Err(err) => {
                warn!(%err, "write probe failed");
                false
            }
        }
    }

    /// Container creation is always permitted given valid credentials.
    pub fn can_create(&self) -> bool {
        true
    }

    /// Read-after-write consistency probe. No internal retry; the host engine
    /// polls this with its own backoff until the object becomes visible.
    pub async fn file_exists(&self, file: &RemoteFile) -> StoreResult<bool> {
        self.container.exists(&file.full_path()).await
    }

    /// Whether the root repository marker is present. Errors count as absent.
    pub async fn repo_file_exists(&self) -> bool {
        match self.file_exists(&RemoteFile::repo_marker()).await {
            Ok(exists) => exists,
            Err(err) => {
                warn!(%err, "repo marker probe failed");
                false
            }
        }
    }

    /// Raw listing of one prefix, exposed for diagnostics.
    pub async fn list_raw(&self, prefix: &str) -> StoreResult<Vec<ObjectMeta>> {
        self.container.list(prefix).await
    }

    async fn copy_and_wait(&self, from: &str, to: &str) -> StoreResult<()> {
        self.container.start_copy(from, to).await?;
        wait_for_copy(self.container.as_ref(), to, &self.wait_options).await
    }
}

/// Unique root-level staging key for an upload. The uuid closes the collision
/// window between concurrent uploads targeting the same name.
fn staging_key(name: &str) -> String {
    format!("temp-{}-{}", Uuid::new_v4(), name)
}
