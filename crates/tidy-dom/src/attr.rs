//! Element attribute collection
//!
//! Attr nodes are real arena nodes (their value is a child tree of Text
//! and EntityReference nodes) but they are held in the element's
//! attribute list, never in the child sequence. Removing an attribute
//! the document declares a default for restores the default as an
//! unspecified Attr.

use crate::node::NodeData;
use crate::{DomError, DomResult, DomTree, NodeId};

impl DomTree {
    /// Attr nodes of an element, in declaration order (empty for
    /// non-elements)
    pub fn attributes(&self, element: NodeId) -> &[NodeId] {
        self.get(element)
            .and_then(|n| n.as_element())
            .map(|e| e.attrs.as_slice())
            .unwrap_or(&[])
    }

    /// Attr node by name
    pub fn get_attribute_node(&self, element: NodeId, name: &str) -> Option<NodeId> {
        self.attributes(element).iter().copied().find(|&a| {
            self.get(a)
                .and_then(|n| n.as_attr())
                .map(|a| a.name.name == name)
                .unwrap_or(false)
        })
    }

    /// Attr node by namespace URI and local name
    pub fn get_attribute_node_ns(
        &self,
        element: NodeId,
        namespace_uri: Option<&str>,
        local_name: &str,
    ) -> Option<NodeId> {
        self.attributes(element).iter().copied().find(|&a| {
            self.get(a)
                .and_then(|n| n.as_attr())
                .map(|a| {
                    a.name.local == local_name
                        && a.name.namespace_uri.as_deref() == namespace_uri
                })
                .unwrap_or(false)
        })
    }

    /// Attribute value by name, if present
    pub fn get_attribute(&self, element: NodeId, name: &str) -> Option<String> {
        self.get_attribute_node(element, name)
            .map(|a| self.attr_value(a))
    }

    /// True if the element carries the named attribute
    pub fn has_attribute(&self, element: NodeId, name: &str) -> bool {
        self.get_attribute_node(element, name).is_some()
    }

    /// Materialize an Attr value: the concatenation of its Text and
    /// EntityReference children
    pub fn attr_value(&self, attr: NodeId) -> String {
        let mut out = String::new();
        self.append_text(attr, &mut out);
        out
    }

    fn append_text(&self, id: NodeId, out: &mut String) {
        for &child in self.children(id) {
            match self.get(child).map(|n| &n.data) {
                Some(NodeData::Text { data }) => out.push_str(data),
                Some(NodeData::EntityReference { .. }) => self.append_text(child, out),
                _ => {}
            }
        }
    }

    /// Set an attribute value by name, creating the Attr when absent.
    /// The value is stored as a single Text child; the attribute
    /// becomes specified.
    pub fn set_attribute(&mut self, element: NodeId, name: &str, value: &str) -> DomResult<()> {
        if self.node(element)?.readonly {
            return Err(DomError::NoModificationAllowed);
        }
        let doc = self.document_of(element).ok_or(DomError::WrongDocument)?;
        let attr = match self.get_attribute_node(element, name) {
            Some(attr) => attr,
            None => {
                let attr = self.create_attribute(doc, name)?;
                self.adopt_attr(element, attr)?;
                attr
            }
        };
        self.set_attr_value(attr, value)
    }

    /// Namespace-aware set_attribute
    pub fn set_attribute_ns(
        &mut self,
        element: NodeId,
        namespace_uri: Option<&str>,
        qualified_name: &str,
        value: &str,
    ) -> DomResult<()> {
        if self.node(element)?.readonly {
            return Err(DomError::NoModificationAllowed);
        }
        let doc = self.document_of(element).ok_or(DomError::WrongDocument)?;
        let local = qualified_name
            .rsplit(':')
            .next()
            .unwrap_or(qualified_name)
            .to_string();
        let attr = match self.get_attribute_node_ns(element, namespace_uri, &local) {
            Some(attr) => attr,
            None => {
                let attr = self.create_attribute_ns(doc, namespace_uri, qualified_name)?;
                self.adopt_attr(element, attr)?;
                attr
            }
        };
        self.set_attr_value(attr, value)
    }

    /// Attach an Attr node to an element. Rejects attrs from another
    /// document and attrs already in use by another element; replaces
    /// and returns an existing attr of the same name.
    pub fn set_attribute_node(
        &mut self,
        element: NodeId,
        attr: NodeId,
    ) -> DomResult<Option<NodeId>> {
        if self.node(element)?.readonly {
            return Err(DomError::NoModificationAllowed);
        }
        let attr_data = match self.node(attr)?.as_attr() {
            Some(a) => a.clone(),
            None => {
                return Err(DomError::HierarchyRequest("node is not an Attr"));
            }
        };
        if self.document_of(attr) != self.document_of(element) {
            return Err(DomError::WrongDocument);
        }
        match attr_data.owner_element {
            Some(owner) if owner != element => return Err(DomError::InuseAttribute),
            _ => {}
        }
        let replaced = match self.get_attribute_node(element, &attr_data.name.name) {
            Some(existing) if existing != attr => {
                self.drop_attr(element, existing)?;
                Some(existing)
            }
            _ => None,
        };
        if attr_data.owner_element != Some(element) {
            self.adopt_attr(element, attr)?;
        }
        Ok(replaced)
    }

    /// Remove an attribute by name. Declared defaults are immediately
    /// reinstated as unspecified attributes; removing an absent
    /// attribute is a no-op.
    pub fn remove_attribute(&mut self, element: NodeId, name: &str) -> DomResult<()> {
        if self.node(element)?.readonly {
            return Err(DomError::NoModificationAllowed);
        }
        let Some(attr) = self.get_attribute_node(element, name) else {
            return Ok(());
        };
        self.drop_attr(element, attr)?;
        self.restore_default(element, name)
    }

    /// Detach a specific Attr node and return it
    pub fn remove_attribute_node(&mut self, element: NodeId, attr: NodeId) -> DomResult<NodeId> {
        if self.node(element)?.readonly {
            return Err(DomError::NoModificationAllowed);
        }
        let name = match self.node(attr)?.as_attr() {
            Some(a) if a.owner_element == Some(element) => a.name.name.clone(),
            _ => return Err(DomError::NotFound),
        };
        self.drop_attr(element, attr)?;
        self.restore_default(element, &name)?;
        Ok(attr)
    }

    // ---- internals ------------------------------------------------------

    /// Replace an Attr's value children with one Text node
    pub(crate) fn set_attr_value(&mut self, attr: NodeId, value: &str) -> DomResult<()> {
        if self.node(attr)?.readonly {
            return Err(DomError::NoModificationAllowed);
        }
        let doc = self.document_of(attr).ok_or(DomError::WrongDocument)?;
        let old_children = std::mem::take(&mut self.node_mut(attr)?.children);
        for child in old_children {
            self.node_mut(child)?.parent = None;
        }
        let text = self.create_text_node(doc, value)?;
        self.node_mut(text)?.parent = Some(attr);
        self.node_mut(attr)?.children.push(text);
        if let NodeData::Attribute(a) = &mut self.node_mut(attr)?.data {
            a.specified = true;
        }
        Ok(())
    }

    fn adopt_attr(&mut self, element: NodeId, attr: NodeId) -> DomResult<()> {
        if let NodeData::Attribute(a) = &mut self.node_mut(attr)?.data {
            a.owner_element = Some(element);
        }
        match self.node_mut(element)?.as_element_mut() {
            Some(e) => {
                e.attrs.push(attr);
                Ok(())
            }
            None => Err(DomError::HierarchyRequest("node is not an Element")),
        }
    }

    fn drop_attr(&mut self, element: NodeId, attr: NodeId) -> DomResult<()> {
        if let Some(e) = self.node_mut(element)?.as_element_mut() {
            e.attrs.retain(|&a| a != attr);
        }
        if let NodeData::Attribute(a) = &mut self.node_mut(attr)?.data {
            a.owner_element = None;
        }
        Ok(())
    }

    fn restore_default(&mut self, element: NodeId, name: &str) -> DomResult<()> {
        let Some(doc) = self.document_of(element) else {
            return Ok(());
        };
        let tag = match self.node(element)?.as_element() {
            Some(e) => e.name.name.clone(),
            None => return Ok(()),
        };
        let default = self
            .document_meta(doc)?
            .default_value(&tag, name)
            .map(str::to_string);
        if let Some(value) = default {
            self.put_default_attribute(doc, element, name, &value)?;
        }
        Ok(())
    }

    /// Create an unspecified Attr carrying a declared default value
    pub(crate) fn put_default_attribute(
        &mut self,
        doc: NodeId,
        element: NodeId,
        name: &str,
        value: &str,
    ) -> DomResult<()> {
        let attr = self.create_attribute(doc, name)?;
        self.set_attr_value(attr, value)?;
        if let NodeData::Attribute(a) = &mut self.node_mut(attr)?.data {
            a.specified = false;
        }
        self.adopt_attr(element, attr)
    }
}

#[cfg(test)]
mod tests {
    use crate::{DocumentFlavor, DomError, DomTree};

    fn setup() -> (DomTree, crate::NodeId, crate::NodeId) {
        let mut tree = DomTree::new();
        let doc = tree.create_document(DocumentFlavor::Xml);
        let el = tree.create_element(doc, "item").unwrap();
        (tree, doc, el)
    }

    #[test]
    fn set_and_get_attribute() {
        let (mut tree, _, el) = setup();
        tree.set_attribute(el, "lang", "en").unwrap();
        assert_eq!(tree.get_attribute(el, "lang").as_deref(), Some("en"));
        assert!(tree.has_attribute(el, "lang"));
        assert!(tree.has_attributes(el));
    }

    #[test]
    fn attrs_are_not_children() {
        let (mut tree, _, el) = setup();
        tree.set_attribute(el, "lang", "en").unwrap();
        assert!(tree.children(el).is_empty());
        assert_eq!(tree.attributes(el).len(), 1);
    }

    #[test]
    fn default_attribute_restored_on_remove() {
        let (mut tree, doc, _) = setup();
        tree.document_meta_mut(doc)
            .unwrap()
            .add_default_attribute("input", "type", "text");
        let el = tree.create_element(doc, "input").unwrap();

        let attr = tree.get_attribute_node(el, "type").unwrap();
        assert!(!tree.get(attr).unwrap().as_attr().unwrap().specified);
        assert_eq!(tree.get_attribute(el, "type").as_deref(), Some("text"));

        tree.set_attribute(el, "type", "checkbox").unwrap();
        let attr = tree.get_attribute_node(el, "type").unwrap();
        assert!(tree.get(attr).unwrap().as_attr().unwrap().specified);

        tree.remove_attribute(el, "type").unwrap();
        let attr = tree.get_attribute_node(el, "type").unwrap();
        assert!(!tree.get(attr).unwrap().as_attr().unwrap().specified);
        assert_eq!(tree.get_attribute(el, "type").as_deref(), Some("text"));
    }

    #[test]
    fn attr_node_in_use_elsewhere_is_rejected() {
        let (mut tree, doc, el) = setup();
        let other = tree.create_element(doc, "other").unwrap();
        let attr = tree.create_attribute(doc, "shared").unwrap();
        tree.set_attribute_node(el, attr).unwrap();
        assert_eq!(
            tree.set_attribute_node(other, attr),
            Err(DomError::InuseAttribute)
        );
    }

    #[test]
    fn attr_from_other_document_is_rejected() {
        let (mut tree, _, el) = setup();
        let foreign_doc = tree.create_document(DocumentFlavor::Xml);
        let attr = tree.create_attribute(foreign_doc, "a").unwrap();
        assert_eq!(
            tree.set_attribute_node(el, attr),
            Err(DomError::WrongDocument)
        );
    }
}
