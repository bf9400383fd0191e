//! Node types: identifiers, permissions and variants

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Reserved child entry referring to the directory itself
pub const SELF_ENTRY: &str = ".";

/// Reserved child entry referring to the parent directory
pub const PARENT_ENTRY: &str = "..";

/// Stable handle to a node in the namespace arena
///
/// Ids are never reused within a namespace; the arena map owns the node,
/// and every other occurrence of the id (children, back-references) is a
/// non-owning reference.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct NodeId(pub(crate) u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node({})", self.0)
    }
}

/// 9-bit rwx permission mask (user, group, other)
///
/// Stored, never enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permissions(u16);

impl Permissions {
    /// Default permissions: everything allowed
    pub const DEFAULT: Self = Self(0o777);

    /// Builds a mask from per-class rwx triples; extra bits are masked off
    pub fn new(user: u8, group: u8, other: u8) -> Self {
        let u = (user & 0o7) as u16;
        let g = (group & 0o7) as u16;
        let o = (other & 0o7) as u16;
        Self((u << 6) | (g << 3) | o)
    }

    /// Returns the raw 9-bit mask
    pub fn bits(self) -> u16 {
        self.0
    }
}

impl Default for Permissions {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for Permissions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for shift in [6u16, 3, 0] {
            let triple = (self.0 >> shift) & 0o7;
            write!(
                f,
                "{}{}{}",
                if triple & 0o4 != 0 { 'r' } else { '-' },
                if triple & 0o2 != 0 { 'w' } else { '-' },
                if triple & 0o1 != 0 { 'x' } else { '-' },
            )?;
        }
        Ok(())
    }
}

/// Synthetic device flavors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeviceKind {
    /// Reads zeroes, discards writes
    Zero,
    /// Reads the host cursor position, discards writes
    Pointer,
}

impl DeviceKind {
    /// Parses the device kind names accepted by `mkdev`
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "zero" => Some(Self::Zero),
            "pointer" => Some(Self::Pointer),
            _ => None,
        }
    }
}

/// Variant-specific node state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NodeKind {
    /// Ordered name → id map, always containing `"."` and `".."`
    Directory { children: BTreeMap<String, NodeId> },

    /// Block-backed content; `chain` is the start index of the block chain
    /// (`None` until first flushed) and `size` the exact byte length for
    /// trimming padded payloads
    RegularFile {
        chain: Option<u16>,
        size: u64,
        /// In-memory buffer between open and close; never serialized
        #[serde(skip)]
        staging: Option<Vec<u8>>,
    },

    /// Synthesizes zeroes per read; no persisted content
    ZeroDevice,

    /// Synthesizes the host cursor position per read; no persisted content
    PointerDevice,
}

impl NodeKind {
    /// Fresh directory with its reserved entries pointing at `self_id` and
    /// `parent_id`
    pub fn directory(self_id: NodeId, parent_id: NodeId) -> Self {
        let mut children = BTreeMap::new();
        children.insert(SELF_ENTRY.to_string(), self_id);
        children.insert(PARENT_ENTRY.to_string(), parent_id);
        Self::Directory { children }
    }

    /// Fresh regular file with no chain
    pub fn regular_file() -> Self {
        Self::RegularFile {
            chain: None,
            size: 0,
            staging: None,
        }
    }

    /// Fresh device of the given kind
    pub fn device(kind: DeviceKind) -> Self {
        match kind {
            DeviceKind::Zero => Self::ZeroDevice,
            DeviceKind::Pointer => Self::PointerDevice,
        }
    }
}

/// One entry in the namespace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Local name within the parent directory (`"/"` for the root)
    pub name: String,
    /// Absolute path; directories carry a trailing separator
    pub absolute_path: String,
    /// Stored permission mask
    pub permissions: Permissions,
    /// Creation time, nanoseconds since the Unix epoch
    pub created_at: u64,
    /// Last modification time, nanoseconds since the Unix epoch
    pub modified_at: u64,
    /// Variant-specific state
    pub kind: NodeKind,
}

impl Node {
    /// Creates a node with default permissions and equal timestamps
    pub fn new(
        name: impl Into<String>,
        absolute_path: impl Into<String>,
        kind: NodeKind,
        timestamp: u64,
    ) -> Self {
        Self {
            name: name.into(),
            absolute_path: absolute_path.into(),
            permissions: Permissions::DEFAULT,
            created_at: timestamp,
            modified_at: timestamp,
            kind,
        }
    }

    /// True for directory nodes
    pub fn is_directory(&self) -> bool {
        matches!(self.kind, NodeKind::Directory { .. })
    }

    /// True for regular files
    pub fn is_file(&self) -> bool {
        matches!(self.kind, NodeKind::RegularFile { .. })
    }

    /// True for device nodes
    pub fn is_device(&self) -> bool {
        matches!(self.kind, NodeKind::ZeroDevice | NodeKind::PointerDevice)
    }

    /// Short label for listings
    pub fn kind_label(&self) -> &'static str {
        match self.kind {
            NodeKind::Directory { .. } => "dir",
            NodeKind::RegularFile { .. } => "file",
            NodeKind::ZeroDevice => "zero",
            NodeKind::PointerDevice => "pointer",
        }
    }
}
