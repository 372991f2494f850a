//! Live NodeList views
//!
//! A NodeList is a query descriptor, not a snapshot: length and item
//! access re-read the backing tree on every call, so mutations made
//! through the kernel are immediately visible through any previously
//! obtained list. Out-of-range indexing yields None, never an error.

use crate::node::NodeData;
use crate::{DomTree, NodeId};

/// Live, order-preserving, index-addressable view over a child
/// sequence or a tag-name query result
#[derive(Debug, Clone)]
pub struct NodeList {
    kind: ListKind,
}

#[derive(Debug, Clone)]
enum ListKind {
    /// Children of one node, in tree order
    Children(NodeId),
    /// Descendant elements matching a tag name ("*" matches all), in
    /// preorder
    TagName { root: NodeId, name: String },
    /// Descendant elements matching namespace URI and local name
    /// ("*" is a wildcard on either axis)
    TagNameNs {
        root: NodeId,
        namespace_uri: Option<String>,
        local: String,
    },
}

impl NodeList {
    pub(crate) fn children_of(parent: NodeId) -> Self {
        Self {
            kind: ListKind::Children(parent),
        }
    }

    pub(crate) fn tag_name(root: NodeId, name: &str) -> Self {
        Self {
            kind: ListKind::TagName {
                root,
                name: name.to_string(),
            },
        }
    }

    pub(crate) fn tag_name_ns(root: NodeId, namespace_uri: Option<&str>, local: &str) -> Self {
        Self {
            kind: ListKind::TagNameNs {
                root,
                namespace_uri: namespace_uri.map(str::to_string),
                local: local.to_string(),
            },
        }
    }

    /// Number of nodes currently in the view
    pub fn length(&self, tree: &DomTree) -> usize {
        match &self.kind {
            ListKind::Children(parent) => tree.children(*parent).len(),
            _ => self.to_vec(tree).len(),
        }
    }

    /// Node at `index`, or None when the index is out of range
    pub fn item(&self, tree: &DomTree, index: usize) -> Option<NodeId> {
        match &self.kind {
            ListKind::Children(parent) => tree.children(*parent).get(index).copied(),
            _ => self.to_vec(tree).get(index).copied(),
        }
    }

    /// Current contents, evaluated now
    pub fn to_vec(&self, tree: &DomTree) -> Vec<NodeId> {
        match &self.kind {
            ListKind::Children(parent) => tree.children(*parent).to_vec(),
            ListKind::TagName { root, name } => {
                let mut all = Vec::new();
                tree.collect_descendants(*root, &mut all);
                all.retain(|&id| match tree.get(id).map(|n| &n.data) {
                    Some(NodeData::Element(e)) => name == "*" || e.name.name == *name,
                    _ => false,
                });
                all
            }
            ListKind::TagNameNs {
                root,
                namespace_uri,
                local,
            } => {
                let mut all = Vec::new();
                tree.collect_descendants(*root, &mut all);
                all.retain(|&id| match tree.get(id).map(|n| &n.data) {
                    Some(NodeData::Element(e)) => {
                        let ns_matches = namespace_uri.as_deref() == Some("*")
                            || e.name.namespace_uri == *namespace_uri;
                        let local_matches = local == "*" || e.name.local == *local;
                        ns_matches && local_matches
                    }
                    _ => false,
                });
                all
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{DocumentFlavor, DomTree};

    #[test]
    fn child_list_is_live() {
        let mut tree = DomTree::new();
        let doc = tree.create_document(DocumentFlavor::Xml);
        let root = tree.create_element(doc, "root").unwrap();
        tree.append_child(doc, root).unwrap();

        let list = tree.child_nodes(root);
        assert_eq!(list.length(&tree), 0);

        let child = tree.create_element(doc, "child").unwrap();
        tree.append_child(root, child).unwrap();
        assert_eq!(list.length(&tree), 1);
        assert_eq!(list.item(&tree, 0), Some(child));

        tree.remove_child(root, child).unwrap();
        assert_eq!(list.length(&tree), 0);
        assert_eq!(list.item(&tree, 0), None);
    }

    #[test]
    fn out_of_range_item_is_none() {
        let mut tree = DomTree::new();
        let doc = tree.create_document(DocumentFlavor::Xml);
        let root = tree.create_element(doc, "root").unwrap();
        let list = tree.child_nodes(root);
        assert_eq!(list.item(&tree, 0), None);
        assert_eq!(list.item(&tree, 1000), None);

        let tags = tree.get_elements_by_tag_name(root, "*");
        assert_eq!(tags.item(&tree, 99), None);
    }

    #[test]
    fn tag_name_query_is_preorder_and_live() {
        let mut tree = DomTree::new();
        let doc = tree.create_document(DocumentFlavor::Xml);
        let root = tree.create_element(doc, "root").unwrap();
        tree.append_child(doc, root).unwrap();
        let outer = tree.create_element(doc, "item").unwrap();
        let inner = tree.create_element(doc, "item").unwrap();
        tree.append_child(root, outer).unwrap();
        tree.append_child(outer, inner).unwrap();

        let items = tree.get_elements_by_tag_name(doc, "item");
        assert_eq!(items.to_vec(&tree), vec![outer, inner]);

        let extra = tree.create_element(doc, "item").unwrap();
        tree.append_child(root, extra).unwrap();
        assert_eq!(items.length(&tree), 3);
        assert_eq!(items.item(&tree, 2), Some(extra));
    }

    #[test]
    fn namespace_query_wildcards() {
        let mut tree = DomTree::new();
        let doc = tree.create_document(DocumentFlavor::Xml);
        let root = tree.create_element(doc, "root").unwrap();
        tree.append_child(doc, root).unwrap();
        let a = tree
            .create_element_ns(doc, Some("urn:a"), "a:item")
            .unwrap();
        let b = tree
            .create_element_ns(doc, Some("urn:b"), "b:item")
            .unwrap();
        tree.append_child(root, a).unwrap();
        tree.append_child(root, b).unwrap();

        let any_ns = tree.get_elements_by_tag_name_ns(doc, Some("*"), "item");
        assert_eq!(any_ns.to_vec(&tree), vec![a, b]);

        let only_a = tree.get_elements_by_tag_name_ns(doc, Some("urn:a"), "*");
        assert_eq!(only_a.to_vec(&tree), vec![a]);

        let no_ns = tree.get_elements_by_tag_name_ns(doc, None, "item");
        assert!(no_ns.to_vec(&tree).is_empty());
    }
}
