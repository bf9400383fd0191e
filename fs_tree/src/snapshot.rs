//! Whole-namespace snapshot persistence
//!
//! The entire node graph (the "."/".." cycles included, since children are
//! ids) round-trips through a single JSON envelope carrying a format
//! version and a CRC32 checksum. Loading verifies both; the safe loader
//! falls back to a fresh root so a damaged snapshot never aborts startup.

use crate::namespace::Namespace;
use std::fs;
use std::path::Path;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during snapshot persistence
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SnapshotError {
    /// Failed to serialize the namespace
    #[error("Failed to serialize snapshot: {0}")]
    SerializationFailed(String),

    /// Failed to deserialize the namespace
    #[error("Failed to deserialize snapshot: {0}")]
    DeserializationFailed(String),

    /// Snapshot was written by an unknown format version
    #[error("Unsupported snapshot version: {0}")]
    UnsupportedVersion(u32),

    /// Snapshot bytes do not match their recorded checksum
    #[error("Snapshot checksum mismatch")]
    ChecksumMismatch,

    /// Underlying file I/O failed
    #[error("I/O error: {0}")]
    Io(String),
}

/// Serialized namespace with integrity metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    /// Format version (for future migrations)
    pub version: u32,
    /// CRC32 of the snapshot with this field zeroed
    pub checksum: u32,
    /// The whole node graph
    pub namespace: Namespace,
}

impl Snapshot {
    /// Current snapshot format version
    pub const CURRENT_VERSION: u32 = 1;

    /// Wraps a namespace, computing its checksum
    pub fn new(namespace: Namespace) -> Self {
        let mut snapshot = Self {
            version: Self::CURRENT_VERSION,
            checksum: 0,
            namespace,
        };
        snapshot.checksum = snapshot.compute_checksum();
        snapshot
    }

    /// CRC32 of the snapshot serialized with a zeroed checksum field
    fn compute_checksum(&self) -> u32 {
        let mut zeroed = self.clone();
        zeroed.checksum = 0;
        let bytes = serde_json::to_vec(&zeroed).unwrap_or_default();
        crc32fast::hash(&bytes)
    }

    /// Validates the recorded checksum
    pub fn is_valid(&self) -> bool {
        self.compute_checksum() == self.checksum
    }
}

/// Serializes a namespace into snapshot bytes
pub fn serialize_snapshot(namespace: &Namespace) -> Result<Vec<u8>, SnapshotError> {
    let snapshot = Snapshot::new(namespace.clone());
    serde_json::to_vec(&snapshot).map_err(|e| SnapshotError::SerializationFailed(e.to_string()))
}

/// Deserializes snapshot bytes, verifying version and checksum
pub fn deserialize_snapshot(bytes: &[u8]) -> Result<Namespace, SnapshotError> {
    let snapshot: Snapshot = serde_json::from_slice(bytes)
        .map_err(|e| SnapshotError::DeserializationFailed(e.to_string()))?;

    if snapshot.version != Snapshot::CURRENT_VERSION {
        return Err(SnapshotError::UnsupportedVersion(snapshot.version));
    }
    if !snapshot.is_valid() {
        return Err(SnapshotError::ChecksumMismatch);
    }
    Ok(snapshot.namespace)
}

/// Writes a namespace snapshot to `path`, replacing any previous file
pub fn save_snapshot(namespace: &Namespace, path: &Path) -> Result<(), SnapshotError> {
    let bytes = serialize_snapshot(namespace)?;
    fs::write(path, bytes).map_err(|e| SnapshotError::Io(e.to_string()))
}

/// Loads a namespace snapshot from `path`
pub fn load_snapshot(path: &Path) -> Result<Namespace, SnapshotError> {
    let bytes = fs::read(path).map_err(|e| SnapshotError::Io(e.to_string()))?;
    deserialize_snapshot(&bytes)
}

/// Loads the snapshot at `path`, falling back to a fresh root if the file
/// is missing, damaged or from an unknown version
pub fn load_snapshot_safe(path: &Path, timestamp: u64) -> Namespace {
    load_snapshot(path).unwrap_or_else(|_| Namespace::new(timestamp))
}
