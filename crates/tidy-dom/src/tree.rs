//! DOM tree (arena-based allocation)
//!
//! All nodes live in one growable table and reference each other by
//! `NodeId`. One arena may host several Document nodes; cross-document
//! rules are enforced through the per-node owner stamp, which makes the
//! ancestor-cycle and wrong-document checks plain index walks.

use crate::node::{DocumentData, DocumentFlavor, DocumentMeta, Node, NodeData, NodeKind};
use crate::{DomError, DomResult, NodeId, NodeList};

/// Arena-based DOM tree
#[derive(Debug, Default)]
pub struct DomTree {
    nodes: Vec<Node>,
}

impl DomTree {
    /// Create a new empty DOM tree
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    pub(crate) fn alloc(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Get a node by ID
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// Get a mutable node by ID
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index())
    }

    /// Checked access, `NotFound` on a stale id
    pub(crate) fn node(&self, id: NodeId) -> DomResult<&Node> {
        self.nodes.get(id.index()).ok_or(DomError::NotFound)
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> DomResult<&mut Node> {
        self.nodes.get_mut(id.index()).ok_or(DomError::NotFound)
    }

    /// Number of nodes allocated in the arena (including detached ones)
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if tree is empty
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Create a new Document node. Documents own themselves; every node
    /// created through the factory methods is stamped with this id.
    pub fn create_document(&mut self, flavor: DocumentFlavor) -> NodeId {
        self.alloc(Node::new(
            None,
            NodeData::Document(DocumentData {
                flavor,
                meta: DocumentMeta::default(),
            }),
        ))
    }

    // ---- navigation -------------------------------------------------

    /// Parent of a node, None for roots and detached nodes
    pub fn parent_node(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    /// Ordered child sequence (empty slice for unknown ids)
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Live view over a node's children
    pub fn child_nodes(&self, id: NodeId) -> NodeList {
        NodeList::children_of(id)
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.children(id).first().copied()
    }

    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.children(id).last().copied()
    }

    /// Previous sibling, computed from the parent's child sequence
    pub fn previous_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent_node(id)?;
        let siblings = self.children(parent);
        let pos = siblings.iter().position(|&c| c == id)?;
        pos.checked_sub(1).map(|i| siblings[i])
    }

    /// Next sibling, computed from the parent's child sequence
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent_node(id)?;
        let siblings = self.children(parent);
        let pos = siblings.iter().position(|&c| c == id)?;
        siblings.get(pos + 1).copied()
    }

    /// Walk from a node's parent up to the root
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        let mut current = self.parent_node(id);
        std::iter::from_fn(move || {
            let id = current?;
            current = self.parent_node(id);
            Some(id)
        })
    }

    /// True if `ancestor` is `id` itself or a proper ancestor of it
    pub fn is_inclusive_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        id == ancestor || self.ancestors(id).any(|a| a == ancestor)
    }

    /// Preorder traversal of the subtree below `root` (root excluded)
    pub(crate) fn collect_descendants(&self, root: NodeId, out: &mut Vec<NodeId>) {
        for &child in self.children(root) {
            out.push(child);
            self.collect_descendants(child, out);
        }
    }

    // ---- introspection ----------------------------------------------

    /// Node kind
    pub fn kind(&self, id: NodeId) -> DomResult<NodeKind> {
        Ok(self.node(id)?.kind())
    }

    /// nodeName
    pub fn node_name(&self, id: NodeId) -> DomResult<String> {
        Ok(self.node(id)?.node_name().to_string())
    }

    /// nodeValue: character data and PI data directly, Attr values
    /// assembled from the attribute's value children
    pub fn node_value(&self, id: NodeId) -> DomResult<Option<String>> {
        let node = self.node(id)?;
        if node.kind() == NodeKind::Attribute {
            return Ok(Some(self.attr_value(id)));
        }
        Ok(node.intrinsic_value().map(str::to_string))
    }

    /// Set nodeValue. Setting a value where none is defined has no
    /// effect, per the DOM contract.
    pub fn set_node_value(&mut self, id: NodeId, value: &str) -> DomResult<()> {
        if self.node(id)?.readonly {
            return Err(DomError::NoModificationAllowed);
        }
        if self.node(id)?.kind() == NodeKind::Attribute {
            return self.set_attr_value(id, value);
        }
        match &mut self.node_mut(id)?.data {
            NodeData::Text { data }
            | NodeData::CdataSection { data }
            | NodeData::Comment { data }
            | NodeData::ProcessingInstruction { data, .. } => {
                *data = value.to_string();
            }
            _ => {}
        }
        Ok(())
    }

    /// Returns whether this node has any children
    pub fn has_child_nodes(&self, id: NodeId) -> bool {
        !self.children(id).is_empty()
    }

    /// Returns whether this node (if it is an element) has any attributes
    pub fn has_attributes(&self, id: NodeId) -> bool {
        self.get(id)
            .and_then(|n| n.as_element())
            .map(|e| !e.attrs.is_empty())
            .unwrap_or(false)
    }

    /// True if the node is marked immutable
    pub fn is_readonly(&self, id: NodeId) -> bool {
        self.get(id).map(|n| n.readonly).unwrap_or(false)
    }

    /// Owning Document: a Document owns itself, everything else carries
    /// an owner stamp (absent for a detached DocumentType)
    pub fn owner_document(&self, id: NodeId) -> Option<NodeId> {
        let node = self.get(id)?;
        match node.data {
            NodeData::Document(_) => None,
            _ => node.owner,
        }
    }

    /// Document governing a node for ownership checks: the node itself
    /// when it is a Document, its owner stamp otherwise
    pub(crate) fn document_of(&self, id: NodeId) -> Option<NodeId> {
        let node = self.get(id)?;
        match node.data {
            NodeData::Document(_) => Some(id),
            _ => node.owner,
        }
    }

    /// Stamp a subtree (children and element attributes) with an owner
    pub(crate) fn stamp_owner(&mut self, id: NodeId, doc: NodeId) {
        if let Some(node) = self.get_mut(id) {
            node.owner = Some(doc);
            let mut linked = node.children.clone();
            match &node.data {
                NodeData::Element(e) => linked.extend(e.attrs.iter().copied()),
                NodeData::DocumentType(d) => {
                    linked.extend(d.entities.iter().copied());
                    linked.extend(d.notations.iter().copied());
                }
                _ => {}
            }
            for child in linked {
                self.stamp_owner(child, doc);
            }
        }
    }

    /// Mark a subtree immutable (children and element attributes)
    pub fn freeze(&mut self, id: NodeId) {
        if let Some(node) = self.get_mut(id) {
            node.readonly = true;
            let mut linked = node.children.clone();
            if let NodeData::Element(e) = &node.data {
                linked.extend(e.attrs.iter().copied());
            }
            for child in linked {
                self.freeze(child);
            }
        }
    }

    /// Access a document's metadata
    pub fn document_meta(&self, doc: NodeId) -> DomResult<&DocumentMeta> {
        match &self.node(doc)?.data {
            NodeData::Document(d) => Ok(&d.meta),
            _ => Err(DomError::NotSupported {
                what: "node is not a Document",
            }),
        }
    }

    /// Mutate a document's metadata
    pub fn document_meta_mut(&mut self, doc: NodeId) -> DomResult<&mut DocumentMeta> {
        match &mut self.node_mut(doc)?.data {
            NodeData::Document(d) => Ok(&mut d.meta),
            _ => Err(DomError::NotSupported {
                what: "node is not a Document",
            }),
        }
    }

    /// Document flavor
    pub fn document_flavor(&self, doc: NodeId) -> DomResult<DocumentFlavor> {
        match &self.node(doc)?.data {
            NodeData::Document(d) => Ok(d.flavor),
            _ => Err(DomError::NotSupported {
                what: "node is not a Document",
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sibling_accessors_follow_child_order() {
        let mut tree = DomTree::new();
        let doc = tree.create_document(DocumentFlavor::Xml);
        let root = tree.create_element(doc, "root").unwrap();
        tree.append_child(doc, root).unwrap();
        let a = tree.create_element(doc, "a").unwrap();
        let b = tree.create_element(doc, "b").unwrap();
        tree.append_child(root, a).unwrap();
        tree.append_child(root, b).unwrap();

        assert_eq!(tree.first_child(root), Some(a));
        assert_eq!(tree.last_child(root), Some(b));
        assert_eq!(tree.next_sibling(a), Some(b));
        assert_eq!(tree.previous_sibling(b), Some(a));
        assert_eq!(tree.previous_sibling(a), None);
        assert_eq!(tree.next_sibling(b), None);
    }

    #[test]
    fn owner_document_is_none_for_document() {
        let mut tree = DomTree::new();
        let doc = tree.create_document(DocumentFlavor::Xml);
        assert_eq!(tree.owner_document(doc), None);
        let el = tree.create_element(doc, "x").unwrap();
        assert_eq!(tree.owner_document(el), Some(doc));
    }
}
