//! Namespace error kinds
//!
//! Every error is an advisory value reported back to the collaborator for
//! display; the session continues regardless.

use block_store::BlockStoreError;
use thiserror::Error;

/// Errors produced by namespace and node-content operations
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FsError {
    /// Path did not resolve to a node
    #[error("\"{0}\" not found")]
    NotFound(String),

    /// Creation target already exists
    #[error("File or directory \"{0}\" already exists")]
    AlreadyExists(String),

    /// Path cannot name a valid target (empty name, reserved name, file
    /// used as a parent, ...)
    #[error("Path \"{0}\" is invalid")]
    InvalidPath(String),

    /// Directory operation on a non-directory node
    #[error("\"{0}\" is not a directory")]
    NotADirectory(String),

    /// File-content operation on a node that does not support it
    #[error("\"{0}\" does not support this operation")]
    DeviceUnsupportedOperation(String),

    /// Open on a file that already has a staging buffer
    #[error("\"{0}\" is already open")]
    AlreadyOpen(String),

    /// Content access on a file that was never opened
    #[error("\"{0}\" is not open")]
    NotOpen(String),

    /// Block store failure (disk full, corrupt chain, image I/O)
    #[error(transparent)]
    Storage(#[from] BlockStoreError),
}

impl FsError {
    /// True for allocation failures, which leave all state unchanged
    pub fn is_disk_full(&self) -> bool {
        matches!(self, FsError::Storage(BlockStoreError::DiskFull { .. }))
    }
}
