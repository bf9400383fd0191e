//! Chain allocator over the flat block arena

use crate::block::{Geometry, END_OF_CHAIN, HEADER_SIZE};
use thiserror::Error;

/// Block store errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BlockStoreError {
    /// Not enough free blocks for the requested allocation
    #[error("Disk full: {needed} blocks needed, {available} available")]
    DiskFull { needed: usize, available: usize },

    /// A chain walk hit an unoccupied block, an out-of-range index or a cycle
    #[error("Corrupt chain at block {0}")]
    CorruptChain(u16),

    /// Geometry parameters cannot describe a valid arena
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    /// Image bytes do not match the arena geometry
    #[error("Invalid image: expected {expected} bytes, found {found}")]
    InvalidImage { expected: usize, found: usize },

    /// Underlying file I/O failed
    #[error("I/O error: {0}")]
    Io(String),
}

/// Fixed-size block arena
///
/// Stores byte blobs as linked block chains inside one flat byte image.
/// See the crate docs for the header layout and failure semantics.
pub struct BlockStore {
    geometry: Geometry,
    image: Vec<u8>,
    /// Where the last successful free-block search ended; the next circular
    /// scan starts here
    last_available: u16,
}

impl BlockStore {
    /// Creates an empty store with the given geometry
    pub fn new(geometry: Geometry) -> Self {
        Self {
            image: vec![0u8; geometry.image_len()],
            geometry,
            last_available: 0,
        }
    }

    /// Rebuilds a store from a previously saved flat image
    ///
    /// The image must be exactly `block_count * block_size` bytes. The scan
    /// cursor is not part of the image and restarts at block 0.
    pub fn from_image(geometry: Geometry, image: Vec<u8>) -> Result<Self, BlockStoreError> {
        if image.len() != geometry.image_len() {
            return Err(BlockStoreError::InvalidImage {
                expected: geometry.image_len(),
                found: image.len(),
            });
        }
        Ok(Self {
            geometry,
            image,
            last_available: 0,
        })
    }

    /// Returns the arena geometry
    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    /// Returns the flat byte image
    pub fn as_image(&self) -> &[u8] {
        &self.image
    }

    /// Number of blocks needed to hold `size` bytes
    pub fn calculate_block_count(&self, size: usize) -> usize {
        self.geometry.blocks_for(size)
    }

    /// Counts currently unoccupied blocks
    pub fn free_block_count(&self) -> usize {
        (0..self.geometry.block_count as u16)
            .filter(|&idx| !self.occupied(idx))
            .count()
    }

    /// Stores `data` as a fresh chain and returns its start index
    ///
    /// Takes at least one block even for empty data, so every stored blob
    /// has an addressable chain. Fails with `DiskFull`, mutating nothing,
    /// if a full circular scan finds too few free blocks.
    pub fn allocate(&mut self, data: &[u8]) -> Result<u16, BlockStoreError> {
        let needed = self.calculate_block_count(data.len()).max(1);
        let blocks = self.scan_free(needed)?;

        self.link_chain(&blocks);
        self.write_chain(&blocks, data);
        self.last_available = blocks[needed - 1];

        Ok(blocks[0])
    }

    /// Rewrites an existing chain with `new_data`, reusing its blocks in place
    ///
    /// The existing chain's blocks are reused in chain order as far as they
    /// go. A longer blob extends the chain through the same free scan as
    /// [`BlockStore::allocate`]; a shorter one truncates and releases the
    /// surplus blocks. Returns the (unchanged) chain start.
    pub fn reallocate(&mut self, chain_start: u16, new_data: &[u8]) -> Result<u16, BlockStoreError> {
        let existing = self.chain_blocks(chain_start)?;
        let needed = self.calculate_block_count(new_data.len()).max(1);

        if needed > existing.len() {
            let extra = self.scan_free(needed - existing.len())?;
            self.link_chain(&extra);
            self.set_state(existing[existing.len() - 1], true, extra[0] as i16);
            self.last_available = extra[extra.len() - 1];

            let chain: Vec<u16> = existing.iter().chain(extra.iter()).copied().collect();
            self.write_chain(&chain, new_data);
        } else {
            let (kept, surplus) = existing.split_at(needed);
            self.set_state(kept[needed - 1], true, END_OF_CHAIN);
            for &idx in surplus {
                self.clear_block(idx);
            }
            self.write_chain(kept, new_data);
        }

        Ok(chain_start)
    }

    /// Releases a chain: every block becomes available with a zeroed payload
    pub fn free(&mut self, chain_start: u16) -> Result<(), BlockStoreError> {
        let blocks = self.chain_blocks(chain_start)?;
        for idx in blocks {
            self.clear_block(idx);
        }
        Ok(())
    }

    /// Reads a chain's full padded payload span
    ///
    /// Block granularity stores whole payload units; the caller trims the
    /// result to the exact length it originally wrote.
    pub fn read(&self, chain_start: u16) -> Result<Vec<u8>, BlockStoreError> {
        let blocks = self.chain_blocks(chain_start)?;
        let mut data = Vec::with_capacity(blocks.len() * self.geometry.payload_size());
        for idx in blocks {
            data.extend_from_slice(self.payload(idx));
        }
        Ok(data)
    }

    /// Walks a chain from `chain_start`, validating every step
    ///
    /// The walk is bounded by the arena size; an out-of-range index, an
    /// unoccupied block or a cycle reports `CorruptChain` (the image file is
    /// external input and cannot be trusted blindly).
    fn chain_blocks(&self, chain_start: u16) -> Result<Vec<u16>, BlockStoreError> {
        let mut blocks = Vec::new();
        let mut current = chain_start as i16;

        while current != END_OF_CHAIN {
            if current < 0 || current as usize >= self.geometry.block_count {
                return Err(BlockStoreError::CorruptChain(chain_start));
            }
            let idx = current as u16;
            if !self.occupied(idx) || blocks.len() == self.geometry.block_count {
                return Err(BlockStoreError::CorruptChain(chain_start));
            }
            blocks.push(idx);
            current = self.next(idx);
        }

        Ok(blocks)
    }

    /// Circular free-block scan from the hint cursor
    ///
    /// Collects `needed` free block indices in scan order, or fails with
    /// `DiskFull` after one full circle. Never mutates block state.
    fn scan_free(&self, needed: usize) -> Result<Vec<u16>, BlockStoreError> {
        let count = self.geometry.block_count;
        let mut found = Vec::with_capacity(needed);

        for offset in 0..count {
            let idx = ((self.last_available as usize + offset) % count) as u16;
            if !self.occupied(idx) {
                found.push(idx);
                if found.len() == needed {
                    return Ok(found);
                }
            }
        }

        Err(BlockStoreError::DiskFull {
            needed,
            available: found.len(),
        })
    }

    /// Marks `blocks` occupied and links them in discovery order
    ///
    /// The final block gets the end-of-chain sentinel; callers splicing a
    /// continuation re-point the tail afterwards.
    fn link_chain(&mut self, blocks: &[u16]) {
        for window in 0..blocks.len() {
            let next = blocks
                .get(window + 1)
                .map(|&b| b as i16)
                .unwrap_or(END_OF_CHAIN);
            self.set_state(blocks[window], true, next);
        }
    }

    /// Writes `data` across the chain, splitting on payload boundaries
    ///
    /// Each written block's payload tail is zero-filled so padded reads are
    /// deterministic.
    fn write_chain(&mut self, blocks: &[u16], data: &[u8]) {
        let payload_size = self.geometry.payload_size();
        for (i, &idx) in blocks.iter().enumerate() {
            let start = (i * payload_size).min(data.len());
            let end = ((i + 1) * payload_size).min(data.len());
            let chunk = &data[start..end];

            let payload = self.payload_mut(idx);
            payload[..chunk.len()].copy_from_slice(chunk);
            payload[chunk.len()..].fill(0);
        }
    }

    /// Resets one block to the unoccupied state with a zeroed payload
    fn clear_block(&mut self, idx: u16) {
        self.set_state(idx, false, END_OF_CHAIN);
        self.payload_mut(idx).fill(0);
    }

    fn block_offset(&self, idx: u16) -> usize {
        idx as usize * self.geometry.block_size
    }

    /// Returns the occupied flag of a block
    pub fn occupied(&self, idx: u16) -> bool {
        self.image[self.block_offset(idx)] != 0
    }

    /// Returns the `next` index of a block
    pub fn next(&self, idx: u16) -> i16 {
        let offset = self.block_offset(idx) + 1;
        i16::from_le_bytes([self.image[offset], self.image[offset + 1]])
    }

    /// Returns a block's payload bytes
    pub fn payload(&self, idx: u16) -> &[u8] {
        let start = self.block_offset(idx) + HEADER_SIZE;
        &self.image[start..start + self.geometry.payload_size()]
    }

    fn payload_mut(&mut self, idx: u16) -> &mut [u8] {
        let start = self.block_offset(idx) + HEADER_SIZE;
        let end = start + self.geometry.payload_size();
        &mut self.image[start..end]
    }

    fn set_state(&mut self, idx: u16, occupied: bool, next: i16) {
        let offset = self.block_offset(idx);
        self.image[offset] = occupied as u8;
        self.image[offset + 1..offset + 3].copy_from_slice(&next.to_le_bytes());
    }
}

impl Default for BlockStore {
    fn default() -> Self {
        Self::new(Geometry::default())
    }
}
