//! The namespace: node arena, path resolution and structural mutation

use crate::error::FsError;
use crate::node::{DeviceKind, Node, NodeId, NodeKind, PARENT_ENTRY, SELF_ENTRY};
use crate::path;
use block_store::BlockStore;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// The hierarchical namespace
///
/// Owns every node through an id-addressed arena. The root's `"."` and
/// `".."` entries both reference the root itself. Ids are monotonically
/// assigned and never reused within a namespace, so a stale id can never
/// alias a newer node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Namespace {
    nodes: BTreeMap<NodeId, Node>,
    root: NodeId,
    next_id: u64,
    /// Ties a snapshot to the block image it indexes into
    volume_id: Uuid,
}

impl Namespace {
    /// Creates a namespace holding only the root directory
    pub fn new(timestamp: u64) -> Self {
        let root = NodeId(0);
        let mut nodes = BTreeMap::new();
        nodes.insert(
            root,
            Node::new("/", "/", NodeKind::directory(root, root), timestamp),
        );
        Self {
            nodes,
            root,
            next_id: 1,
            volume_id: Uuid::new_v4(),
        }
    }

    /// Returns the root directory id
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Returns the volume identity shared with the block image
    pub fn volume_id(&self) -> Uuid {
        self.volume_id
    }

    /// Number of nodes in the arena, root included
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Looks up a node by id
    pub fn node(&self, id: NodeId) -> Result<&Node, FsError> {
        self.nodes
            .get(&id)
            .ok_or_else(|| FsError::NotFound(id.to_string()))
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, FsError> {
        self.nodes
            .get_mut(&id)
            .ok_or_else(|| FsError::NotFound(id.to_string()))
    }

    fn allocate_id(&mut self) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        id
    }

    fn children(&self, id: NodeId) -> Result<&BTreeMap<String, NodeId>, FsError> {
        match &self.node(id)?.kind {
            NodeKind::Directory { children } => Ok(children),
            _ => Err(FsError::NotADirectory(
                self.node(id)?.absolute_path.clone(),
            )),
        }
    }

    fn children_mut(&mut self, id: NodeId) -> Result<&mut BTreeMap<String, NodeId>, FsError> {
        let path = self.node(id)?.absolute_path.clone();
        match &mut self.node_mut(id)?.kind {
            NodeKind::Directory { children } => Ok(children),
            _ => Err(FsError::NotADirectory(path)),
        }
    }

    /// Resolves a slash-delimited path against `base`
    ///
    /// A leading separator restarts resolution from the root; an empty path
    /// is `base` itself. `"."` and `".."` are ordinary child lookups, so
    /// walking up relies on the reserved entries every directory carries.
    /// A non-directory met before the last segment is a `NotFound`, never a
    /// silent truncation. Each step strictly shrinks the remaining path, so
    /// resolution always terminates.
    pub fn resolve(&self, path: &str, base: NodeId) -> Result<NodeId, FsError> {
        if let Some(rest) = path.strip_prefix(path::SEPARATOR) {
            return self.resolve(rest, self.root);
        }
        if path.is_empty() {
            return Ok(base);
        }

        let (segment, remainder) = path::split_first(path);
        // A file base has no children: segments can never continue past one
        let children = match &self.node(base)?.kind {
            NodeKind::Directory { children } => children,
            _ => return Err(FsError::NotFound(segment.to_string())),
        };
        let found = children
            .get(segment)
            .copied()
            .ok_or_else(|| FsError::NotFound(segment.to_string()))?;

        if remainder.is_empty() {
            return Ok(found);
        }
        if self.node(found)?.is_directory() {
            self.resolve(remainder, found)
        } else {
            Err(FsError::NotFound(path.to_string()))
        }
    }

    /// Splits a path at its last separator and resolves the parent part
    ///
    /// Returns the parent directory and the local name. Fails with
    /// `InvalidPath` if the parent does not resolve, is not a directory, or
    /// the local name is empty.
    pub fn resolve_parent<'p>(
        &self,
        full_path: &'p str,
        base: NodeId,
    ) -> Result<(NodeId, &'p str), FsError> {
        let (prefix, name) = path::split_parent(full_path);
        let parent = match prefix {
            Some(prefix) => self
                .resolve(prefix, base)
                .map_err(|_| FsError::InvalidPath(full_path.to_string()))?,
            None => base,
        };
        if name.is_empty() || !self.node(parent)?.is_directory() {
            return Err(FsError::InvalidPath(full_path.to_string()));
        }
        Ok((parent, name))
    }

    /// Creates a directory named `name` under `parent`
    pub fn create_directory(
        &mut self,
        name: &str,
        parent: NodeId,
        timestamp: u64,
    ) -> Result<NodeId, FsError> {
        self.check_creatable(name, parent)?;
        let absolute = format!("{}{}/", self.node(parent)?.absolute_path, name);
        let id = self.allocate_id();
        let node = Node::new(name, absolute, NodeKind::directory(id, parent), timestamp);
        self.insert_child(parent, name, id, node, timestamp);
        Ok(id)
    }

    /// Creates an empty regular file named `name` under `parent`
    pub fn create_file(
        &mut self,
        name: &str,
        parent: NodeId,
        timestamp: u64,
    ) -> Result<NodeId, FsError> {
        self.check_creatable(name, parent)?;
        let absolute = format!("{}{}", self.node(parent)?.absolute_path, name);
        let id = self.allocate_id();
        let node = Node::new(name, absolute, NodeKind::regular_file(), timestamp);
        self.insert_child(parent, name, id, node, timestamp);
        Ok(id)
    }

    /// Creates a device node named `name` under `parent`
    pub fn create_device(
        &mut self,
        name: &str,
        parent: NodeId,
        kind: DeviceKind,
        timestamp: u64,
    ) -> Result<NodeId, FsError> {
        self.check_creatable(name, parent)?;
        let absolute = format!("{}{}", self.node(parent)?.absolute_path, name);
        let id = self.allocate_id();
        let node = Node::new(name, absolute, NodeKind::device(kind), timestamp);
        self.insert_child(parent, name, id, node, timestamp);
        Ok(id)
    }

    /// Existence and validity checks shared by all creation operations
    fn check_creatable(&self, name: &str, parent: NodeId) -> Result<(), FsError> {
        if !self.node(parent)?.is_directory() {
            return Err(FsError::InvalidPath(name.to_string()));
        }
        if !path::is_valid_name(name) {
            return Err(FsError::InvalidPath(name.to_string()));
        }
        if self.children(parent)?.contains_key(name) {
            return Err(FsError::AlreadyExists(name.to_string()));
        }
        Ok(())
    }

    fn insert_child(
        &mut self,
        parent: NodeId,
        name: &str,
        id: NodeId,
        node: Node,
        timestamp: u64,
    ) {
        self.nodes.insert(id, node);
        if let Ok(children) = self.children_mut(parent) {
            children.insert(name.to_string(), id);
        }
        if let Ok(parent_node) = self.node_mut(parent) {
            parent_node.modified_at = timestamp;
        }
    }

    /// Lists a directory's entries in name order, reserved entries excluded
    pub fn list(&self, dir: NodeId) -> Result<Vec<(&str, &Node)>, FsError> {
        let mut entries = Vec::new();
        for (name, &child) in self.children(dir)? {
            if name == SELF_ENTRY || name == PARENT_ENTRY {
                continue;
            }
            entries.push((name.as_str(), self.node(child)?));
        }
        Ok(entries)
    }

    /// Updates a node's modification time
    pub fn touch(&mut self, id: NodeId, timestamp: u64) -> Result<(), FsError> {
        self.node_mut(id)?.modified_at = timestamp;
        Ok(())
    }

    /// Removes the entry at `path`, destroying its subtree
    ///
    /// Every regular file in the removed subtree has its block chain
    /// released; chains are freed before any detachment so a storage error
    /// leaves the namespace untouched.
    pub fn remove(
        &mut self,
        target_path: &str,
        base: NodeId,
        store: &mut BlockStore,
        timestamp: u64,
    ) -> Result<(), FsError> {
        let (parent, name) = self.resolve_parent(target_path, base)?;
        if name == SELF_ENTRY || name == PARENT_ENTRY {
            return Err(FsError::InvalidPath(target_path.to_string()));
        }
        let target = self
            .children(parent)?
            .get(name)
            .copied()
            .ok_or_else(|| FsError::NotFound(target_path.to_string()))?;

        let subtree = self.collect_subtree(target)?;
        for &id in &subtree {
            if let NodeKind::RegularFile {
                chain: Some(start), ..
            } = self.node(id)?.kind
            {
                store.free(start)?;
            }
        }

        self.children_mut(parent)?.remove(name);
        self.node_mut(parent)?.modified_at = timestamp;
        for id in subtree {
            self.nodes.remove(&id);
        }
        Ok(())
    }

    /// Moves a regular file: read content, create destination, delete source
    ///
    /// The destination must not already exist.
    pub fn move_node(
        &mut self,
        source: &str,
        destination: &str,
        base: NodeId,
        store: &mut BlockStore,
        timestamp: u64,
    ) -> Result<(), FsError> {
        self.copy_node(source, destination, base, store, timestamp)?;
        self.remove(source, base, store, timestamp)
    }

    /// Copies a regular file's content to a fresh destination
    pub fn copy_node(
        &mut self,
        source: &str,
        destination: &str,
        base: NodeId,
        store: &mut BlockStore,
        timestamp: u64,
    ) -> Result<(), FsError> {
        let source_id = self
            .resolve(source, base)
            .map_err(|_| FsError::NotFound(source.to_string()))?;
        if self.resolve(destination, base).is_ok() {
            return Err(FsError::AlreadyExists(destination.to_string()));
        }
        let content = self.stored_content(source_id, store)?;

        let (parent, name) = self.resolve_parent(destination, base)?;
        let destination_id = self.create_file(name, parent, timestamp)?;
        self.open(destination_id, store)?;
        self.write(destination_id, &content)?;
        self.close(destination_id, store, timestamp)
    }

    /// Reads a regular file's stored bytes, trimmed to its exact size
    pub(crate) fn stored_content(
        &self,
        id: NodeId,
        store: &BlockStore,
    ) -> Result<Vec<u8>, FsError> {
        match &self.node(id)?.kind {
            NodeKind::RegularFile {
                chain: Some(start),
                size,
                ..
            } => {
                let mut padded = store.read(*start)?;
                padded.truncate(*size as usize);
                Ok(padded)
            }
            NodeKind::RegularFile { chain: None, .. } => Ok(Vec::new()),
            _ => Err(FsError::InvalidPath(
                self.node(id)?.absolute_path.clone(),
            )),
        }
    }

    /// Collects a subtree's ids depth-first, reserved entries skipped
    fn collect_subtree(&self, id: NodeId) -> Result<Vec<NodeId>, FsError> {
        let mut ids = vec![id];
        if let NodeKind::Directory { children } = &self.node(id)?.kind {
            for (name, &child) in children {
                if name == SELF_ENTRY || name == PARENT_ENTRY {
                    continue;
                }
                ids.extend(self.collect_subtree(child)?);
            }
        }
        Ok(ids)
    }
}
