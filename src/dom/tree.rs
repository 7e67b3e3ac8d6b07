//! Tree operations: insert, sibling insertion, remove, reparent, walk.

use std::collections::VecDeque;

use slotmap::{SecondaryMap, SlotMap};

use super::node::{NodeData, NodeId};

/// Empty slice constant for returning when a node has no children.
const EMPTY_CHILDREN: &[NodeId] = &[];

/// The document tree, backed by a slotmap arena.
///
/// All nodes live in a single `SlotMap`. Parent/child relationships are stored
/// in secondary maps so that node removal is O(subtree size) and lookup is O(1).
pub struct Dom {
    pub(crate) nodes: SlotMap<NodeId, NodeData>,
    children: SecondaryMap<NodeId, Vec<NodeId>>,
    parent: SecondaryMap<NodeId, NodeId>,
    root: Option<NodeId>,
}

impl Dom {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
            children: SecondaryMap::new(),
            parent: SecondaryMap::new(),
            root: None,
        }
    }

    /// Insert a root-level node (no parent).
    ///
    /// If no root has been set yet, this node becomes the root.
    pub fn insert(&mut self, data: NodeData) -> NodeId {
        let id = self.nodes.insert(data);
        self.children.insert(id, Vec::new());
        if self.root.is_none() {
            self.root = Some(id);
        }
        id
    }

    /// Insert a node as the last child of `parent`.
    ///
    /// # Panics
    ///
    /// Panics (debug) if `parent` does not exist in the tree.
    pub fn insert_child(&mut self, parent: NodeId, data: NodeData) -> NodeId {
        debug_assert!(
            self.nodes.contains_key(parent),
            "parent node does not exist"
        );
        let id = self.nodes.insert(data);
        self.children.insert(id, Vec::new());
        self.parent.insert(id, parent);
        self.children
            .get_mut(parent)
            .expect("parent must have children vec")
            .push(id);
        id
    }

    /// Insert a node as the immediately preceding sibling of `reference`.
    ///
    /// If `reference` has no parent, the node is inserted parentless.
    pub fn insert_before(&mut self, reference: NodeId, data: NodeData) -> NodeId {
        self.insert_sibling(reference, data, 0)
    }

    /// Insert a node as the immediately following sibling of `reference`.
    ///
    /// If `reference` has no parent, the node is inserted parentless.
    pub fn insert_after(&mut self, reference: NodeId, data: NodeData) -> NodeId {
        self.insert_sibling(reference, data, 1)
    }

    fn insert_sibling(&mut self, reference: NodeId, data: NodeData, offset: usize) -> NodeId {
        debug_assert!(
            self.nodes.contains_key(reference),
            "reference node does not exist"
        );
        let id = self.nodes.insert(data);
        self.children.insert(id, Vec::new());
        if let Some(parent_id) = self.parent.get(reference).copied() {
            let siblings = self
                .children
                .get_mut(parent_id)
                .expect("parent must have children vec");
            let pos = siblings
                .iter()
                .position(|&child| child == reference)
                .expect("reference must be listed under its parent");
            siblings.insert(pos + offset, id);
            self.parent.insert(id, parent_id);
        }
        id
    }

    /// Remove a node and all its descendants recursively.
    ///
    /// Returns the `NodeData` for the removed node, or `None` if it didn't
    /// exist. Removing a node that was already detached by other code is a
    /// no-op, not an error.
    pub fn remove(&mut self, id: NodeId) -> Option<NodeData> {
        if !self.nodes.contains_key(id) {
            return None;
        }

        // Detach from parent's children list.
        if let Some(parent_id) = self.parent.remove(id) {
            if let Some(siblings) = self.children.get_mut(parent_id) {
                siblings.retain(|&child| child != id);
            }
        }

        // Clear root if we're removing it.
        if self.root == Some(id) {
            self.root = None;
        }

        // Collect all descendants (BFS) to remove them.
        let mut to_remove = VecDeque::new();
        to_remove.push_back(id);
        let mut removed_root_data = None;

        while let Some(current) = to_remove.pop_front() {
            // Queue children before removing.
            if let Some(kids) = self.children.remove(current) {
                for &child in &kids {
                    to_remove.push_back(child);
                }
            }
            self.parent.remove(current);
            let data = self.nodes.remove(current);
            if current == id {
                removed_root_data = data;
            }
        }

        removed_root_data
    }

    /// Move `node` to become the last child of `new_parent`.
    ///
    /// The node keeps its subtree intact. If `node` was previously a child of
    /// another parent, it is detached first.
    ///
    /// # Panics
    ///
    /// Panics (debug) if either `node` or `new_parent` does not exist.
    pub fn reparent(&mut self, node: NodeId, new_parent: NodeId) {
        debug_assert!(self.nodes.contains_key(node), "node does not exist");
        debug_assert!(
            self.nodes.contains_key(new_parent),
            "new_parent does not exist"
        );

        // Detach from old parent.
        if let Some(old_parent) = self.parent.remove(node) {
            if let Some(siblings) = self.children.get_mut(old_parent) {
                siblings.retain(|&child| child != node);
            }
        }

        // Attach to new parent.
        self.parent.insert(node, new_parent);
        self.children
            .get_mut(new_parent)
            .expect("new_parent must have children vec")
            .push(node);
    }

    /// Get the parent of a node, if it has one.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.parent.get(id).copied()
    }

    /// Get the children of a node. Returns an empty slice if the node has no
    /// children or does not exist.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.children
            .get(id)
            .map(Vec::as_slice)
            .unwrap_or(EMPTY_CHILDREN)
    }

    /// Whether `node` is `ancestor` itself or one of its descendants.
    pub fn is_within(&self, node: NodeId, ancestor: NodeId) -> bool {
        if node == ancestor {
            return self.nodes.contains_key(node);
        }
        let mut current = node;
        while let Some(p) = self.parent.get(current).copied() {
            if p == ancestor {
                return true;
            }
            current = p;
        }
        false
    }

    /// Immutable access to a node's data.
    pub fn get(&self, id: NodeId) -> Option<&NodeData> {
        self.nodes.get(id)
    }

    /// Mutable access to a node's data.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut NodeData> {
        self.nodes.get_mut(id)
    }

    /// The current root node, if set.
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Number of nodes in the tree.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree is empty.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether the tree contains a node with the given id.
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Pre-order depth-first traversal starting from `start`.
    pub fn walk_depth_first(&self, start: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut stack = vec![start];
        while let Some(current) = stack.pop() {
            if !self.nodes.contains_key(current) {
                continue;
            }
            result.push(current);
            // Push children in reverse so the first child is visited first.
            let kids = self.children(current);
            for &child in kids.iter().rev() {
                stack.push(child);
            }
        }
        result
    }
}

impl Default for Dom {
    fn default() -> Self {
        Self::new()
    }
}
