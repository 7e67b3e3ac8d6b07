//! Lookup by id.

use super::node::{NodeData, NodeId};
use super::tree::Dom;

impl Dom {
    /// Find the first node whose `id` field matches the given string.
    ///
    /// Iterates all nodes in the arena (not just the tree rooted at `root`).
    pub fn query_by_id(&self, id: &str) -> Option<NodeId> {
        self.iter_nodes()
            .find(|(_, data)| data.id.as_deref() == Some(id))
            .map(|(node_id, _)| node_id)
    }

    /// Iterate over all `(NodeId, &NodeData)` pairs in the arena.
    ///
    /// Iterates in slotmap insertion order, which is deterministic but not
    /// tree-order.
    fn iter_nodes(&self) -> impl Iterator<Item = (NodeId, &NodeData)> {
        self.nodes.iter()
    }
}
