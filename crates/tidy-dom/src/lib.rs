//! tidy-dom - W3C DOM Level 2 Core tree
//!
//! Arena-based document tree with the full mutation kernel:
//! insert_before, replace_child, remove_child, append_child,
//! clone_node and normalize, plus the Document factory surface
//! (typed node creation, namespace-aware creation, import_node)
//! and live NodeList views.

mod attr;
mod document;
mod error;
mod mutation;
mod name;
mod node;
mod node_list;
mod tree;

pub use error::{DomError, DomResult};
pub use name::{XMLNS_NS, XML_NS};
pub use node::{
    AttrData, DoctypeData, DocumentData, DocumentFlavor, DocumentMeta, ElementData, EntityData,
    Node, NodeData, NodeKind, NotationData, QName,
};
pub use node_list::NodeList;
pub use tree::DomTree;

/// Node identifier (index into arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}
