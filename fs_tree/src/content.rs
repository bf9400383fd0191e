//! Node content semantics: open, write, read, close
//!
//! Regular files stage bytes in memory between open and close; close
//! flushes the staging buffer to the block store and records the resulting
//! chain. Devices synthesize their content on every read and never touch
//! the store. Directories support none of these operations.

use crate::error::FsError;
use crate::namespace::Namespace;
use crate::node::{NodeId, NodeKind};
use block_store::BlockStore;
use hal::PointerSource;

impl Namespace {
    /// Opens a node for content access
    ///
    /// For a regular file this loads the stored bytes (trimmed to the exact
    /// written length) into a fresh staging buffer; a second open without a
    /// close in between is `AlreadyOpen`. Opening a device is a no-op.
    pub fn open(&mut self, id: NodeId, store: &BlockStore) -> Result<(), FsError> {
        let path = self.node(id)?.absolute_path.clone();
        match &self.node(id)?.kind {
            NodeKind::RegularFile {
                staging: Some(_), ..
            } => return Err(FsError::AlreadyOpen(path)),
            NodeKind::RegularFile { .. } => {}
            NodeKind::ZeroDevice | NodeKind::PointerDevice => return Ok(()),
            NodeKind::Directory { .. } => {
                return Err(FsError::DeviceUnsupportedOperation(path))
            }
        }

        let content = self.stored_content(id, store)?;
        if let NodeKind::RegularFile { staging, .. } = &mut self.node_mut(id)?.kind {
            *staging = Some(content);
        }
        Ok(())
    }

    /// Appends bytes to an open file's staging buffer
    ///
    /// Writes to devices are silently discarded.
    pub fn write(&mut self, id: NodeId, data: &[u8]) -> Result<(), FsError> {
        let path = self.node(id)?.absolute_path.clone();
        match &mut self.node_mut(id)?.kind {
            NodeKind::RegularFile { staging, .. } => {
                let buffer = staging.as_mut().ok_or(FsError::NotOpen(path))?;
                buffer.extend_from_slice(data);
                Ok(())
            }
            NodeKind::ZeroDevice | NodeKind::PointerDevice => Ok(()),
            NodeKind::Directory { .. } => Err(FsError::DeviceUnsupportedOperation(path)),
        }
    }

    /// Returns a node's full content
    ///
    /// Files serve their staging buffer; the zero device yields the single
    /// byte `"0"`; the pointer device yields `"x,y"` text from the injected
    /// pointer source (coordinates default to the origin if the host query
    /// fails, matching a cursorless host).
    pub fn read_all(
        &self,
        id: NodeId,
        pointer: &dyn PointerSource,
    ) -> Result<Vec<u8>, FsError> {
        let node = self.node(id)?;
        match &node.kind {
            NodeKind::RegularFile { staging, .. } => staging
                .clone()
                .ok_or_else(|| FsError::NotOpen(node.absolute_path.clone())),
            NodeKind::ZeroDevice => Ok(b"0".to_vec()),
            NodeKind::PointerDevice => {
                let (x, y) = pointer.position().unwrap_or((0, 0));
                Ok(format!("{},{}", x, y).into_bytes())
            }
            NodeKind::Directory { .. } => Err(FsError::DeviceUnsupportedOperation(
                node.absolute_path.clone(),
            )),
        }
    }

    /// Fills `buffer` starting at `offset` with up to `count` content bytes
    ///
    /// Returns the number of bytes written into the buffer. The zero device
    /// produces as many zeroes as requested; the pointer device produces the
    /// two little-endian `i32` coordinates; files produce their staged bytes
    /// from the beginning.
    pub fn read(
        &self,
        id: NodeId,
        buffer: &mut [u8],
        offset: usize,
        count: usize,
        pointer: &dyn PointerSource,
    ) -> Result<usize, FsError> {
        let node = self.node(id)?;
        let available = buffer.len().saturating_sub(offset);
        match &node.kind {
            NodeKind::RegularFile { staging, .. } => {
                let source = staging
                    .as_ref()
                    .ok_or_else(|| FsError::NotOpen(node.absolute_path.clone()))?;
                let n = count.min(available).min(source.len());
                buffer[offset..offset + n].copy_from_slice(&source[..n]);
                Ok(n)
            }
            NodeKind::ZeroDevice => {
                let n = count.min(available);
                buffer[offset..offset + n].fill(0);
                Ok(n)
            }
            NodeKind::PointerDevice => {
                let (x, y) = pointer.position().unwrap_or((0, 0));
                let mut source = [0u8; 8];
                source[..4].copy_from_slice(&x.to_le_bytes());
                source[4..].copy_from_slice(&y.to_le_bytes());
                let n = count.min(available).min(source.len());
                buffer[offset..offset + n].copy_from_slice(&source[..n]);
                Ok(n)
            }
            NodeKind::Directory { .. } => Err(FsError::DeviceUnsupportedOperation(
                node.absolute_path.clone(),
            )),
        }
    }

    /// Closes an open file, flushing its staging buffer to the store
    ///
    /// The buffer is taken before the flush, so it is released on every
    /// exit path; a flush failure must not leave the file stuck open. A
    /// first flush allocates a fresh chain; later flushes reallocate the
    /// existing one in place. Closing a device is a no-op.
    pub fn close(
        &mut self,
        id: NodeId,
        store: &mut BlockStore,
        timestamp: u64,
    ) -> Result<(), FsError> {
        let path = self.node(id)?.absolute_path.clone();
        let (buffer, chain) = match &mut self.node_mut(id)?.kind {
            NodeKind::RegularFile { staging, chain, .. } => {
                let buffer = staging.take().ok_or(FsError::NotOpen(path))?;
                (buffer, *chain)
            }
            NodeKind::ZeroDevice | NodeKind::PointerDevice => return Ok(()),
            NodeKind::Directory { .. } => {
                return Err(FsError::DeviceUnsupportedOperation(path))
            }
        };

        let start = match chain {
            None => store.allocate(&buffer)?,
            Some(start) => store.reallocate(start, &buffer)?,
        };

        let node = self.node_mut(id)?;
        if let NodeKind::RegularFile { chain, size, .. } = &mut node.kind {
            *chain = Some(start);
            *size = buffer.len() as u64;
        }
        node.modified_at = timestamp;
        Ok(())
    }

    /// Runs `f` against an opened node, closing it on every exit path
    ///
    /// The scoped form of the open/close discipline: a failure inside `f`
    /// still flushes and releases the staging buffer. The operation error
    /// wins over a close error when both occur.
    pub fn with_open<T>(
        &mut self,
        id: NodeId,
        store: &mut BlockStore,
        timestamp: u64,
        f: impl FnOnce(&mut Self) -> Result<T, FsError>,
    ) -> Result<T, FsError> {
        self.open(id, store)?;
        let result = f(self);
        let closed = self.close(id, store, timestamp);
        match (result, closed) {
            (Ok(value), Ok(())) => Ok(value),
            (Err(e), _) => Err(e),
            (Ok(_), Err(e)) => Err(e),
        }
    }
}
