//! Tree mutation kernel
//!
//! The six structural operations: insert_before, append_child,
//! replace_child, remove_child, clone_node, normalize. Every operation
//! validates all of its preconditions before rewiring a single pointer,
//! so a failure leaves the tree untouched. No other code path mutates
//! parent/child linkage.

use crate::node::{Node, NodeData, NodeKind};
use crate::{DomError, DomResult, DomTree, NodeId};

/// Kind-compatibility table: which child kinds a parent kind admits.
/// Document / DocumentFragment / Entity / Notation / Attr never appear
/// as children because no parent kind admits them.
fn kind_allows(parent: NodeKind, child: NodeKind) -> bool {
    use NodeKind::*;
    match parent {
        Document => matches!(child, Element | ProcessingInstruction | Comment | DocumentType),
        Element | DocumentFragment | EntityReference | Entity => matches!(
            child,
            Element | Text | Comment | ProcessingInstruction | CdataSection | EntityReference
        ),
        Attribute => matches!(child, Text | EntityReference),
        _ => false,
    }
}

impl DomTree {
    /// Insert `new_child` immediately before `ref_child` in the context
    /// node's child sequence; append at the end when `ref_child` is None.
    /// A DocumentFragment is spliced in child by child and left empty.
    /// A node that already has a parent is detached first (move, not copy).
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        new_child: NodeId,
        ref_child: Option<NodeId>,
    ) -> DomResult<NodeId> {
        self.validate_insertion(parent, new_child, None)?;
        if let Some(r) = ref_child {
            if self.parent_node(r) != Some(parent) {
                return Err(DomError::NotFound);
            }
        }

        tracing::trace!(?parent, ?new_child, ?ref_child, "insert_before");

        // Inserting a node before itself: it ends up in front of its
        // current next sibling, i.e. where it already is.
        let ref_child = if ref_child == Some(new_child) {
            self.next_sibling(new_child)
        } else {
            ref_child
        };

        let incoming = self.take_incoming(new_child);
        for &c in &incoming {
            self.detach(c);
        }
        self.splice_in(parent, &incoming, ref_child);
        Ok(new_child)
    }

    /// Add `new_child` to the end of the context node's child sequence
    pub fn append_child(&mut self, parent: NodeId, new_child: NodeId) -> DomResult<NodeId> {
        self.insert_before(parent, new_child, None)
    }

    /// Replace `old_child` with `new_child` in one logical step and
    /// return `old_child`. No intermediate state with both or neither
    /// present is ever observable.
    pub fn replace_child(
        &mut self,
        parent: NodeId,
        new_child: NodeId,
        old_child: NodeId,
    ) -> DomResult<NodeId> {
        if self.parent_node(old_child) != Some(parent) {
            return Err(DomError::NotFound);
        }
        self.validate_insertion(parent, new_child, Some(old_child))?;

        tracing::trace!(?parent, ?new_child, ?old_child, "replace_child");

        if new_child == old_child {
            return Ok(old_child);
        }

        let incoming = self.take_incoming(new_child);
        for &c in &incoming {
            self.detach(c);
        }
        let at = self.position_of(parent, old_child);
        self.detach(old_child);
        self.splice_at(parent, &incoming, at);
        Ok(old_child)
    }

    /// Detach `old_child` from the context node and return it, still
    /// fully populated but parentless
    pub fn remove_child(&mut self, parent: NodeId, old_child: NodeId) -> DomResult<NodeId> {
        if self.node(parent)?.readonly {
            return Err(DomError::NoModificationAllowed);
        }
        if self.node(old_child)?.parent != Some(parent) {
            return Err(DomError::NotFound);
        }
        tracing::trace!(?parent, ?old_child, "remove_child");
        self.detach(old_child);
        Ok(old_child)
    }

    /// Duplicate a node. The copy has no parent and is always mutable
    /// and specified, even when the source was readonly or defaulted.
    /// Element clones carry their full attribute collection; Attr and
    /// EntityReference clones always carry their children regardless of
    /// `deep` (the children of an EntityReference clone stay readonly).
    pub fn clone_node(&mut self, id: NodeId, deep: bool) -> DomResult<NodeId> {
        let owner = match self.node(id)?.data {
            // A cloned Document owns itself; see DESIGN.md for the
            // policy on the implementation-dependent kinds.
            NodeData::Document(_) => None,
            _ => self.document_of(id),
        };
        let copy = self.clone_subtree(id, deep, owner, false)?;
        if self.node(copy)?.kind() == NodeKind::Document {
            self.stamp_owner_of_document_clone(copy);
        }
        Ok(copy)
    }

    pub(crate) fn clone_subtree(
        &mut self,
        id: NodeId,
        deep: bool,
        owner: Option<NodeId>,
        force_readonly: bool,
    ) -> DomResult<NodeId> {
        let source = self.node(id)?;
        let kind = source.kind();
        let child_ids = source.children.clone();
        let (attr_ids, entity_ids, notation_ids) = match &source.data {
            NodeData::Element(e) => (e.attrs.clone(), Vec::new(), Vec::new()),
            NodeData::DocumentType(d) => (Vec::new(), d.entities.clone(), d.notations.clone()),
            _ => (Vec::new(), Vec::new(), Vec::new()),
        };
        let mut data = source.data.clone();

        // Attr collections and doctype tables are re-cloned below;
        // drop the stale ids carried over by the payload clone.
        match &mut data {
            NodeData::Element(e) => e.attrs.clear(),
            NodeData::Attribute(a) => {
                a.specified = true;
                a.owner_element = None;
            }
            NodeData::DocumentType(d) => {
                d.entities.clear();
                d.notations.clear();
            }
            _ => {}
        }

        let mut copy = Node::new(owner, data);
        copy.readonly = force_readonly;
        let new_id = self.alloc(copy);

        for attr in attr_ids {
            let cloned = self.clone_subtree(attr, true, owner, false)?;
            if let NodeData::Attribute(a) = &mut self.node_mut(cloned)?.data {
                a.owner_element = Some(new_id);
            }
            if let NodeData::Element(e) = &mut self.node_mut(new_id)?.data {
                e.attrs.push(cloned);
            }
        }
        for entity in entity_ids {
            let cloned = self.clone_subtree(entity, true, owner, false)?;
            if let NodeData::DocumentType(d) = &mut self.node_mut(new_id)?.data {
                d.entities.push(cloned);
            }
        }
        for notation in notation_ids {
            let cloned = self.clone_subtree(notation, true, owner, false)?;
            if let NodeData::DocumentType(d) = &mut self.node_mut(new_id)?.data {
                d.notations.push(cloned);
            }
        }

        let always_carries_children =
            matches!(kind, NodeKind::Attribute | NodeKind::EntityReference);
        if deep || always_carries_children {
            let force = force_readonly || kind == NodeKind::EntityReference;
            for child in child_ids {
                let cloned = self.clone_subtree(child, true, owner, force)?;
                self.node_mut(cloned)?.parent = Some(new_id);
                self.node_mut(new_id)?.children.push(cloned);
            }
        }

        Ok(new_id)
    }

    /// Put all Text nodes in the full depth of the subtree, including
    /// attribute value trees, into normal form: no adjacent Text
    /// siblings, no empty Text nodes. Elements, comments, PIs, CDATA
    /// sections and entity references are opaque boundaries; readonly
    /// subtrees are left alone.
    pub fn normalize(&mut self, id: NodeId) -> DomResult<()> {
        if self.node(id)?.readonly {
            return Ok(());
        }
        tracing::trace!(?id, "normalize");

        if let Some(element) = self.node(id)?.as_element() {
            let attrs = element.attrs.clone();
            for attr in attrs {
                self.normalize(attr)?;
            }
        }

        let children = self.node(id)?.children.clone();
        let mut kept: Vec<NodeId> = Vec::with_capacity(children.len());
        for child in children {
            let node = self.node(child)?;
            // Readonly children (entity replacement text) and entity
            // references are kept intact, never merged, dropped or
            // descended into
            if node.readonly || node.kind() == NodeKind::EntityReference {
                kept.push(child);
                continue;
            }
            if let NodeData::Text { data } = &node.data {
                let text = data.clone();
                if text.is_empty() {
                    self.node_mut(child)?.parent = None;
                    continue;
                }
                if let Some(&prev) = kept.last() {
                    let prev_node = self.node(prev)?;
                    if prev_node.is_text() && !prev_node.readonly {
                        if let NodeData::Text { data } = &mut self.node_mut(prev)?.data {
                            data.push_str(&text);
                        }
                        self.node_mut(child)?.parent = None;
                        continue;
                    }
                }
                kept.push(child);
            } else {
                self.normalize(child)?;
                kept.push(child);
            }
        }
        self.node_mut(id)?.children = kept;
        Ok(())
    }

    // ---- precondition checks ------------------------------------------

    /// Validate one insertion without mutating anything. `replacing`
    /// names a child about to be removed in the same logical step, so
    /// the Document max-one rules do not count it.
    fn validate_insertion(
        &self,
        parent: NodeId,
        new_child: NodeId,
        replacing: Option<NodeId>,
    ) -> DomResult<()> {
        let parent_kind = self.node(parent)?.kind();
        let child_node = self.node(new_child)?;
        let child_kind = child_node.kind();

        // Hierarchy: kind legality, fragment children checked one by one
        if child_kind == NodeKind::DocumentFragment {
            for &fc in &child_node.children {
                if !kind_allows(parent_kind, self.node(fc)?.kind()) {
                    return Err(DomError::HierarchyRequest(
                        "fragment child kind not allowed here",
                    ));
                }
            }
        } else if !kind_allows(parent_kind, child_kind) {
            return Err(DomError::HierarchyRequest("child kind not allowed here"));
        }

        // Document accepts at most one Element and one DocumentType
        if parent_kind == NodeKind::Document {
            self.check_document_slots(parent, new_child, replacing)?;
        }

        // Cycle: the inserted node must not be the context or one of
        // its ancestors
        if self.is_inclusive_ancestor(new_child, parent) {
            return Err(DomError::HierarchyRequest(
                "node is an ancestor of the insertion point",
            ));
        }

        // Ownership: same owning document, import first otherwise.
        // A detached DocumentType has no owner yet and is adopted.
        let parent_doc = self.document_of(parent);
        let child_doc = self.document_of(new_child);
        match child_doc {
            None if child_kind == NodeKind::DocumentType => {}
            _ if child_doc == parent_doc => {}
            _ => return Err(DomError::WrongDocument),
        }

        // Immutability: the context and the new child's current parent
        if self.node(parent)?.readonly {
            return Err(DomError::NoModificationAllowed);
        }
        if let Some(prior) = child_node.parent {
            if self.node(prior)?.readonly {
                return Err(DomError::NoModificationAllowed);
            }
        }

        Ok(())
    }

    fn check_document_slots(
        &self,
        doc: NodeId,
        new_child: NodeId,
        replacing: Option<NodeId>,
    ) -> DomResult<()> {
        let counted = |kind: NodeKind| -> DomResult<usize> {
            let mut n = 0;
            for &c in self.children(doc) {
                if Some(c) != replacing && c != new_child && self.node(c)?.kind() == kind {
                    n += 1;
                }
            }
            Ok(n)
        };

        let (incoming_elements, incoming_doctypes) = match self.node(new_child)?.kind() {
            NodeKind::DocumentFragment => {
                let mut elements = 0;
                let mut doctypes = 0;
                for &fc in &self.node(new_child)?.children {
                    match self.node(fc)?.kind() {
                        NodeKind::Element => elements += 1,
                        NodeKind::DocumentType => doctypes += 1,
                        _ => {}
                    }
                }
                (elements, doctypes)
            }
            NodeKind::Element => (1, 0),
            NodeKind::DocumentType => (0, 1),
            _ => (0, 0),
        };

        if incoming_elements > 0 && counted(NodeKind::Element)? + incoming_elements > 1 {
            return Err(DomError::HierarchyRequest(
                "document already has a document element",
            ));
        }
        if incoming_doctypes > 0 && counted(NodeKind::DocumentType)? + incoming_doctypes > 1 {
            return Err(DomError::HierarchyRequest("document already has a doctype"));
        }
        Ok(())
    }

    // ---- pointer rewiring (post-validation) ----------------------------

    /// Nodes that will actually be inserted: the fragment's children in
    /// order, or the node itself
    fn take_incoming(&self, new_child: NodeId) -> Vec<NodeId> {
        match self.get(new_child) {
            Some(n) if n.kind() == NodeKind::DocumentFragment => n.children.clone(),
            _ => vec![new_child],
        }
    }

    /// Unlink a node from its parent (fragments lose their children
    /// here when the incoming set was taken from one)
    pub(crate) fn detach(&mut self, id: NodeId) {
        let Some(parent) = self.get(id).and_then(|n| n.parent) else {
            return;
        };
        if let Some(p) = self.get_mut(parent) {
            p.children.retain(|&c| c != id);
        }
        if let Some(n) = self.get_mut(id) {
            n.parent = None;
        }
    }

    fn position_of(&self, parent: NodeId, child: NodeId) -> usize {
        self.children(parent)
            .iter()
            .position(|&c| c == child)
            .unwrap_or_else(|| self.children(parent).len())
    }

    fn splice_in(&mut self, parent: NodeId, incoming: &[NodeId], ref_child: Option<NodeId>) {
        let at = match ref_child {
            Some(r) => self.position_of(parent, r),
            None => self.children(parent).len(),
        };
        self.splice_at(parent, incoming, at);
    }

    fn splice_at(&mut self, parent: NodeId, incoming: &[NodeId], at: usize) {
        let doc = self.document_of(parent);
        for &c in incoming {
            if let Some(n) = self.get_mut(c) {
                n.parent = Some(parent);
            }
            // Adopt a previously unowned doctype
            if let (Some(doc), None) = (doc, self.get(c).and_then(|n| n.owner)) {
                self.stamp_owner(c, doc);
            }
        }
        if let Some(p) = self.get_mut(parent) {
            let at = at.min(p.children.len());
            p.children.splice(at..at, incoming.iter().copied());
        }
    }

    fn stamp_owner_of_document_clone(&mut self, doc: NodeId) {
        let children = self.children(doc).to_vec();
        for child in children {
            self.stamp_owner(child, doc);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{DocumentFlavor, DomError, DomTree, NodeKind};

    #[test]
    fn document_rejects_second_element() {
        let mut tree = DomTree::new();
        let doc = tree.create_document(DocumentFlavor::Xml);
        let a = tree.create_element(doc, "a").unwrap();
        let b = tree.create_element(doc, "b").unwrap();
        tree.append_child(doc, a).unwrap();
        assert!(matches!(
            tree.append_child(doc, b),
            Err(DomError::HierarchyRequest(_))
        ));
    }

    #[test]
    fn replace_document_element_is_allowed() {
        let mut tree = DomTree::new();
        let doc = tree.create_document(DocumentFlavor::Xml);
        let a = tree.create_element(doc, "a").unwrap();
        let b = tree.create_element(doc, "b").unwrap();
        tree.append_child(doc, a).unwrap();
        let replaced = tree.replace_child(doc, b, a).unwrap();
        assert_eq!(replaced, a);
        assert_eq!(tree.children(doc), &[b]);
        assert_eq!(tree.parent_node(a), None);
    }

    #[test]
    fn text_nodes_refuse_children() {
        let mut tree = DomTree::new();
        let doc = tree.create_document(DocumentFlavor::Xml);
        let t = tree.create_text_node(doc, "x").unwrap();
        let c = tree.create_comment(doc, "y").unwrap();
        assert!(matches!(
            tree.append_child(t, c),
            Err(DomError::HierarchyRequest(_))
        ));
    }

    #[test]
    fn insert_before_self_is_position_neutral() {
        let mut tree = DomTree::new();
        let doc = tree.create_document(DocumentFlavor::Xml);
        let root = tree.create_element(doc, "root").unwrap();
        tree.append_child(doc, root).unwrap();
        let a = tree.create_element(doc, "a").unwrap();
        let b = tree.create_element(doc, "b").unwrap();
        tree.append_child(root, a).unwrap();
        tree.append_child(root, b).unwrap();

        tree.insert_before(root, a, Some(a)).unwrap();
        assert_eq!(tree.children(root), &[a, b]);
    }

    #[test]
    fn detached_doctype_is_adopted_on_insert() {
        let mut tree = DomTree::new();
        let doc = tree.create_document(DocumentFlavor::Xml);
        let dt = tree.create_document_type("root", None, None).unwrap();
        assert_eq!(tree.owner_document(dt), None);
        tree.append_child(doc, dt).unwrap();
        assert_eq!(tree.owner_document(dt), Some(doc));
        assert_eq!(tree.kind(dt).unwrap(), NodeKind::DocumentType);
    }
}
