//! # Filesystem Tree
//!
//! The hierarchical namespace: an id-addressed arena of directory, file and
//! device nodes with path resolution, structural mutation and per-variant
//! content semantics.
//!
//! ## Design
//!
//! - **Nodes are arena entries, not owning pointers**: every node lives in
//!   the namespace's id map; children and the `"."`/`".."` back-references
//!   are plain [`NodeId`]s, so the directory cycles serialize as data and
//!   teardown is an id walk. Ownership flows strictly parent → child.
//! - **Variants over subclassing**: a node's behavior is a [`NodeKind`]
//!   match, keeping block-store coupling confined to the regular-file arm.
//! - **Content is polymorphic**: regular files stage bytes in memory
//!   between open and close and flush to a block chain; devices synthesize
//!   content per read and never touch the store.
//! - **Snapshots are whole-graph**: the entire arena round-trips through a
//!   version- and checksum-guarded envelope.

pub mod content;
pub mod error;
pub mod namespace;
pub mod node;
pub mod path;
pub mod snapshot;

pub use error::FsError;
pub use namespace::Namespace;
pub use node::{DeviceKind, Node, NodeId, NodeKind, Permissions, PARENT_ENTRY, SELF_ENTRY};
pub use snapshot::{
    load_snapshot, load_snapshot_safe, save_snapshot, Snapshot, SnapshotError,
};
