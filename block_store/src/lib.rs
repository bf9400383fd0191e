//! # Block Store
//!
//! A fixed-size block arena that stores variable-length byte blobs as
//! linked block chains, persisted as a single flat image.
//!
//! ## Design
//!
//! - Every block is `block_size` bytes: a 3-byte header (occupied flag +
//!   little-endian `i16` next index, `-1` meaning end-of-chain) followed by
//!   the payload.
//! - A blob occupies `ceil(len / payload)` blocks linked through their
//!   `next` indices. Chains are acyclic; the terminal block's `next` is the
//!   sentinel.
//! - Allocation scans the arena circularly from a hint cursor remembering
//!   where the last successful search ended, so repeated allocations spread
//!   across the arena instead of hammering index 0.
//! - The whole arena is one flat byte image, loaded and rewritten wholesale.
//!   A crash mid-save can corrupt the image; there is deliberately no
//!   partial-write atomicity here.
//!
//! ## Failure semantics
//!
//! A failed allocation or reallocation returns [`BlockStoreError::DiskFull`]
//! and mutates nothing. Callers retry only after freeing space.

pub mod block;
pub mod image;
pub mod store;

pub use block::{Geometry, DEFAULT_BLOCK_COUNT, DEFAULT_BLOCK_SIZE, END_OF_CHAIN, HEADER_SIZE};
pub use image::{load_image, load_or_create, save_image};
pub use store::{BlockStore, BlockStoreError};
