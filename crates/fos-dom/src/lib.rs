//! fOS DOM - Document Object Model
//!
//! Arena-backed DOM tree consumed by the style engine: typed element nodes,
//! parent and sibling navigation, attribute lookup, and one cache slot per
//! node for its computed base style.

mod node;
mod tree;
mod document;
mod tag;

pub use node::{Node, NodeData, ElementData, Attribute, StyleSlot, StyleStamp};
pub use tree::{DomTree, Children};
pub use document::Document;
pub use tag::TagId;

/// Node identifier (index into arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Root node ID
    pub const ROOT: NodeId = NodeId(0);
    /// No node
    pub const NONE: NodeId = NodeId(u32::MAX);

    #[inline]
    pub fn is_valid(self) -> bool {
        self != Self::NONE
    }

    /// Arena index
    #[inline]
    pub fn index(self) -> u32 {
        self.0
    }
}

/// DOM manipulation errors
#[derive(Debug, thiserror::Error)]
pub enum DomError {
    #[error("Invalid node: {0:?}")]
    InvalidNode(NodeId),

    #[error("Node is not an element: {0:?}")]
    NotAnElement(NodeId),

    #[error("Hierarchy error: {0}")]
    Hierarchy(&'static str),
}
