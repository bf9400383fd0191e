//! Flat-image file persistence
//!
//! The arena persists as a single binary file of exactly
//! `block_count * block_size` bytes, loaded wholesale at startup and
//! rewritten wholesale after any mutating operation. There is no
//! partial-write atomicity; a crash mid-save can corrupt the image.

use crate::block::Geometry;
use crate::store::{BlockStore, BlockStoreError};
use std::fs;
use std::path::Path;

/// Writes the store's image to `path`, replacing any previous file
pub fn save_image(store: &BlockStore, path: &Path) -> Result<(), BlockStoreError> {
    fs::write(path, store.as_image()).map_err(|e| BlockStoreError::Io(e.to_string()))
}

/// Loads a store from the image file at `path`
///
/// A wrong-length file is rejected as `InvalidImage` rather than silently
/// truncated or padded.
pub fn load_image(geometry: Geometry, path: &Path) -> Result<BlockStore, BlockStoreError> {
    let bytes = fs::read(path).map_err(|e| BlockStoreError::Io(e.to_string()))?;
    BlockStore::from_image(geometry, bytes)
}

/// Loads the image at `path` if it exists, otherwise starts a fresh arena
pub fn load_or_create(geometry: Geometry, path: &Path) -> Result<BlockStore, BlockStoreError> {
    if path.exists() {
        load_image(geometry, path)
    } else {
        Ok(BlockStore::new(geometry))
    }
}
