//! Error types for transfer operations.

use std::time::Duration;
use thiserror::Error;

use crate::container::CopyStatus;

/// Result type for transfer operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Error types for operations against the blob container
#[derive(Error, Debug)]
pub enum StoreError {
    /// Bad credentials or endpoint, fatal at construction. The bundled
    /// backends have no connection phase; SDK-backed [`BlobContainer`]
    /// implementations map credential and endpoint failures onto this.
    ///
    /// [`BlobContainer`]: crate::container::BlobContainer
    #[error("Connection error: {details}")]
    Connection { details: String },

    /// Missing or misnamed container, fatal at init
    #[error("Container error for {name}: {details}")]
    Container { name: String, details: String },

    /// Server-side copy did not complete successfully
    #[error(transparent)]
    Copy(#[from] CopyError),

    /// Object not found
    #[error("Object not found: {key}")]
    NotFound { key: String },

    /// Write error
    #[error("Write error for key {key}: {details}")]
    Write { key: String, details: String },

    /// Read error
    #[error("Read error for key {key}: {details}")]
    Read { key: String, details: String },

    /// Delete error
    #[error("Delete error for key {key}: {details}")]
    Delete { key: String, details: String },

    /// List error
    #[error("List error for prefix {prefix}: {details}")]
    List { prefix: String, details: String },

    /// Rejected remote file name
    #[error("Invalid remote file name {name:?}: {reason}")]
    InvalidName { name: String, reason: String },

    /// Invalid settings
    #[error("Invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    /// I/O error (local staging files)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Terminal failures of the copy wait loop
#[derive(Error, Debug)]
pub enum CopyError {
    /// The copy reached a terminal state other than success
    #[error("Server-side copy ended in state {status:?}")]
    Failed { status: CopyStatus },

    /// The waiter was cancelled before the copy reached a terminal state
    #[error("Copy wait was interrupted")]
    Interrupted,

    /// The caller-supplied deadline expired before the copy completed
    #[error("Copy did not complete within {waited:?}")]
    Timeout { waited: Duration },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn copy_error_converts_into_store_error() {
        let err: StoreError = CopyError::Failed {
            status: CopyStatus::Aborted,
        }
        .into();

        match err {
            StoreError::Copy(CopyError::Failed { status }) => {
                assert_eq!(status, CopyStatus::Aborted);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn connection_error_carries_details() {
        let err = StoreError::Connection {
            details: "invalid account key".to_string(),
        };
        assert_eq!(err.to_string(), "Connection error: invalid account key");
    }

    #[test]
    fn error_messages_carry_keys() {
        let err = StoreError::Write {
            key: "multichunks/abc".to_string(),
            details: "connection reset".to_string(),
        };
        assert!(err.to_string().contains("multichunks/abc"));
    }
}
