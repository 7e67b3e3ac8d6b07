//! Document tree: slotmap-backed node arena with id lookup.

pub mod node;
pub mod query;
pub mod tree;

pub use node::{NodeData, NodeId, NodeKind};
pub use tree::Dom;
