//! Atomic transfer layer for synchronizing files into a flat blob container.
//!
//! A file-synchronization engine wants a small filesystem with atomic rename
//! and move; blob stores offer create/read/delete and an asynchronous
//! server-side copy. This crate bridges the two:
//!
//! - Atomic upload: stage under a unique temporary key, promote with a single
//!   server-side copy, so readers never observe a partial object
//! - Atomic move: copy, confirm the copy by polling its state, then delete
//!   the source
//! - Logical namespace: typed file kinds mapped onto fixed container prefixes
//!   (`multichunks`, `databases`, `actions`, `transactions`, `temporary`)
//! - Capability probes: container existence, write canary, read-after-write
//!   visibility checks
//!
//! The concrete store client is injected behind the [`BlobContainer`] trait;
//! in-memory and local-filesystem backends are included for tests and
//! development.

pub mod backends;
pub mod config;
pub mod container;
pub mod copy_wait;
pub mod errors;
pub mod metrics;
pub mod remote_file;
pub mod transfer;

pub use backends::{LocalContainer, MemoryContainer};
pub use config::TransferSettings;
pub use container::{BlobContainer, CopyStatus, ObjectMeta};
pub use copy_wait::{wait_for_copy, CancelSignal, WaitOptions, POLL_INTERVAL};
pub use errors::{CopyError, StoreError, StoreResult};
pub use metrics::TransferMetrics;
pub use remote_file::{RemoteFile, RemoteFileKind, REPO_MARKER_NAME};
pub use transfer::TransferManager;
