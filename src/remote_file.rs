//! Logical file kinds and their mapping into the flat container namespace.
//!
//! The sync engine addresses content as a (kind, name) pair. Each kind owns a
//! fixed top-level prefix in the container; the prefix table is a persisted
//! convention that other tools reading the same container depend on.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::{StoreError, StoreResult};

/// Name of the root-level marker object identifying an initialized repository.
pub const REPO_MARKER_NAME: &str = "syncrepo";

/// Kind of a logical file in the synced repository
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemoteFileKind {
    /// Content chunk containers
    Multichunk,
    /// Metadata databases
    Database,
    /// Cleanup markers, stored alongside the databases
    Cleanup,
    /// Short-lived action markers
    Action,
    /// Transaction logs
    Transaction,
    /// Temporary staging files
    Temp,
    /// Root-level repository marker
    Repo,
    /// Anything without a dedicated namespace
    Other,
}

impl RemoteFileKind {
    /// Fixed container prefix for this kind. `Repo` and `Other` live at the
    /// container root and map to the empty prefix, keeping the mapping total.
    pub fn prefix(&self) -> &'static str {
        match self {
            RemoteFileKind::Multichunk => "multichunks",
            RemoteFileKind::Database | RemoteFileKind::Cleanup => "databases",
            RemoteFileKind::Action => "actions",
            RemoteFileKind::Transaction => "transactions",
            RemoteFileKind::Temp => "temporary",
            RemoteFileKind::Repo | RemoteFileKind::Other => "",
        }
    }
}

/// A (kind, name) pair addressing one object in the container
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RemoteFile {
    kind: RemoteFileKind,
    name: String,
}

impl RemoteFile {
    /// Create a remote file reference. Names must be non-empty and must not
    /// be the directory self-references "." or "..".
    pub fn new(kind: RemoteFileKind, name: impl Into<String>) -> StoreResult<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(StoreError::InvalidName {
                name,
                reason: "name must not be empty".to_string(),
            });
        }
        if name == "." || name == ".." {
            return Err(StoreError::InvalidName {
                name,
                reason: "name must not be a directory reference".to_string(),
            });
        }
        Ok(Self { kind, name })
    }

    /// The root-level repository marker object.
    pub fn repo_marker() -> Self {
        Self {
            kind: RemoteFileKind::Repo,
            name: REPO_MARKER_NAME.to_string(),
        }
    }

    pub fn kind(&self) -> RemoteFileKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Resolve to the flat container key: `prefix + "/" + name`, with any
    /// leading separator stripped since the container namespace is flat.
    pub fn full_path(&self) -> String {
        let path = format!("{}/{}", self.kind.prefix(), self.name);
        path.trim_start_matches('/').to_string()
    }
}

impl fmt::Display for RemoteFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.full_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multichunk_resolves_under_multichunks() {
        let file = RemoteFile::new(RemoteFileKind::Multichunk, "abc123").unwrap();
        assert_eq!(file.full_path(), "multichunks/abc123");
    }

    #[test]
    fn database_and_cleanup_share_a_prefix() {
        let db = RemoteFile::new(RemoteFileKind::Database, "db-1").unwrap();
        let cleanup = RemoteFile::new(RemoteFileKind::Cleanup, "db-1").unwrap();
        assert_eq!(db.full_path(), "databases/db-1");
        assert_eq!(db.full_path(), cleanup.full_path());
    }

    #[test]
    fn root_kinds_resolve_without_prefix() {
        let marker = RemoteFile::repo_marker();
        assert_eq!(marker.full_path(), REPO_MARKER_NAME);

        let other = RemoteFile::new(RemoteFileKind::Other, "loose-object").unwrap();
        assert_eq!(other.full_path(), "loose-object");
    }

    #[test]
    fn all_kinds_resolve() {
        for (kind, expected) in [
            (RemoteFileKind::Action, "actions/a"),
            (RemoteFileKind::Transaction, "transactions/a"),
            (RemoteFileKind::Temp, "temporary/a"),
        ] {
            let file = RemoteFile::new(kind, "a").unwrap();
            assert_eq!(file.full_path(), expected);
        }
    }

    #[test]
    fn invalid_names_are_rejected() {
        for name in ["", ".", ".."] {
            let result = RemoteFile::new(RemoteFileKind::Database, name);
            assert!(matches!(result, Err(StoreError::InvalidName { .. })), "accepted {name:?}");
        }
    }
}
