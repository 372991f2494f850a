//! Normalize tests
//!
//! Adjacent Text merging, empty Text removal, idempotence, opaque
//! boundaries, and attribute value trees.

use tidy_dom::{DocumentFlavor, DomTree, NodeId, NodeKind};

fn xml_doc(tree: &mut DomTree) -> (NodeId, NodeId) {
    let doc = tree.create_document(DocumentFlavor::Xml);
    let root = tree.create_element(doc, "root").unwrap();
    tree.append_child(doc, root).unwrap();
    (doc, root)
}

fn shape(tree: &DomTree, parent: NodeId) -> Vec<(NodeKind, Option<String>)> {
    tree.children(parent)
        .iter()
        .map(|&c| {
            (
                tree.kind(c).unwrap(),
                tree.node_value(c).unwrap(),
            )
        })
        .collect()
}

#[test]
fn merges_adjacent_text_nodes() {
    let mut tree = DomTree::new();
    let (doc, root) = xml_doc(&mut tree);
    let ab = tree.create_text_node(doc, "ab").unwrap();
    let cd = tree.create_text_node(doc, "cd").unwrap();
    let el = tree.create_element(doc, "el").unwrap();
    tree.append_child(root, ab).unwrap();
    tree.append_child(root, cd).unwrap();
    tree.append_child(root, el).unwrap();

    tree.normalize(root).unwrap();

    assert_eq!(
        shape(&tree, root),
        vec![
            (NodeKind::Text, Some("abcd".to_string())),
            (NodeKind::Element, None),
        ]
    );
}

#[test]
fn removes_empty_text_nodes() {
    let mut tree = DomTree::new();
    let (doc, root) = xml_doc(&mut tree);
    let empty = tree.create_text_node(doc, "").unwrap();
    let el = tree.create_element(doc, "el").unwrap();
    tree.append_child(root, empty).unwrap();
    tree.append_child(root, el).unwrap();

    tree.normalize(root).unwrap();

    assert_eq!(tree.children(root), &[el]);
    assert_eq!(tree.parent_node(empty), None);
}

#[test]
fn is_idempotent() {
    let mut tree = DomTree::new();
    let (doc, root) = xml_doc(&mut tree);
    for chunk in ["a", "", "b", "c"] {
        let t = tree.create_text_node(doc, chunk).unwrap();
        tree.append_child(root, t).unwrap();
    }
    let el = tree.create_element(doc, "el").unwrap();
    tree.append_child(root, el).unwrap();
    let tail = tree.create_text_node(doc, "tail").unwrap();
    tree.append_child(root, tail).unwrap();

    tree.normalize(root).unwrap();
    let once = shape(&tree, root);
    tree.normalize(root).unwrap();
    let twice = shape(&tree, root);

    assert_eq!(once, twice);
    assert_eq!(
        once,
        vec![
            (NodeKind::Text, Some("abc".to_string())),
            (NodeKind::Element, None),
            (NodeKind::Text, Some("tail".to_string())),
        ]
    );
}

#[test]
fn does_not_merge_across_structure() {
    let mut tree = DomTree::new();
    let (doc, root) = xml_doc(&mut tree);
    let left = tree.create_text_node(doc, "left").unwrap();
    let comment = tree.create_comment(doc, "boundary").unwrap();
    let right = tree.create_text_node(doc, "right").unwrap();
    tree.append_child(root, left).unwrap();
    tree.append_child(root, comment).unwrap();
    tree.append_child(root, right).unwrap();

    tree.normalize(root).unwrap();

    assert_eq!(tree.children(root).len(), 3);
    assert_eq!(tree.node_value(left).unwrap().as_deref(), Some("left"));
    assert_eq!(tree.node_value(right).unwrap().as_deref(), Some("right"));
}

#[test]
fn cdata_is_not_text() {
    let mut tree = DomTree::new();
    let (doc, root) = xml_doc(&mut tree);
    let text = tree.create_text_node(doc, "a").unwrap();
    let cdata = tree.create_cdata_section(doc, "b").unwrap();
    tree.append_child(root, text).unwrap();
    tree.append_child(root, cdata).unwrap();

    tree.normalize(root).unwrap();
    assert_eq!(tree.children(root), &[text, cdata]);
}

#[test]
fn recurses_into_the_full_depth() {
    let mut tree = DomTree::new();
    let (doc, root) = xml_doc(&mut tree);
    let nested = tree.create_element(doc, "nested").unwrap();
    tree.append_child(root, nested).unwrap();
    let x = tree.create_text_node(doc, "x").unwrap();
    let y = tree.create_text_node(doc, "y").unwrap();
    tree.append_child(nested, x).unwrap();
    tree.append_child(nested, y).unwrap();

    tree.normalize(root).unwrap();
    assert_eq!(tree.children(nested).len(), 1);
    assert_eq!(tree.node_value(x).unwrap().as_deref(), Some("xy"));
}

#[test]
fn entity_reference_content_survives_untouched() {
    let mut tree = DomTree::new();
    let doc = tree.create_document(DocumentFlavor::Xml);
    let doctype = tree.create_document_type("d", None, None).unwrap();
    tree.append_child(doc, doctype).unwrap();
    let entity = tree.create_entity(doc, "sep", None, None, None).unwrap();
    let a = tree.create_text_node(doc, "a").unwrap();
    let b = tree.create_text_node(doc, "b").unwrap();
    tree.append_child(entity, a).unwrap();
    tree.append_child(entity, b).unwrap();
    tree.add_entity(doctype, entity).unwrap();

    let root = tree.create_element(doc, "root").unwrap();
    tree.append_child(doc, root).unwrap();
    let left = tree.create_text_node(doc, "le").unwrap();
    let right = tree.create_text_node(doc, "ft").unwrap();
    let reference = tree.create_entity_reference(doc, "sep").unwrap();
    tree.append_child(root, left).unwrap();
    tree.append_child(root, right).unwrap();
    tree.append_child(root, reference).unwrap();

    tree.normalize(root).unwrap();

    // Text outside the reference merged; the reference's readonly
    // replacement text kept both nodes
    assert_eq!(tree.node_value(left).unwrap().as_deref(), Some("left"));
    assert_eq!(tree.children(reference).len(), 2);
    let copies = tree.children(reference).to_vec();
    assert_eq!(tree.node_value(copies[0]).unwrap().as_deref(), Some("a"));
    assert_eq!(tree.node_value(copies[1]).unwrap().as_deref(), Some("b"));
    assert!(tree.is_readonly(copies[0]));
}

#[test]
fn normalizes_attribute_value_trees() {
    let mut tree = DomTree::new();
    let (doc, root) = xml_doc(&mut tree);
    let attr = tree.create_attribute(doc, "title").unwrap();
    let p1 = tree.create_text_node(doc, "he").unwrap();
    let p2 = tree.create_text_node(doc, "llo").unwrap();
    tree.append_child(attr, p1).unwrap();
    tree.append_child(attr, p2).unwrap();
    tree.set_attribute_node(root, attr).unwrap();

    tree.normalize(root).unwrap();

    assert_eq!(tree.children(attr).len(), 1);
    assert_eq!(tree.attr_value(attr), "hello");
}
