//! Document factory and queries
//!
//! Node creation, namespace-aware creation, doctype/entity management,
//! cross-document import and the tag-name / ID lookups. Every factory
//! method takes the Document node id and stamps the result with it;
//! created nodes start parentless.

use crate::name::{split_qualified, validate_name};
use crate::node::{
    AttrData, DoctypeData, DocumentFlavor, ElementData, EntityData, Node, NodeData, NodeKind,
    NotationData, QName,
};
use crate::{DomError, DomResult, DomTree, NodeId, NodeList};

impl DomTree {
    fn require_document(&self, doc: NodeId) -> DomResult<()> {
        match self.node(doc)?.data {
            NodeData::Document(_) => Ok(()),
            _ => Err(DomError::NotSupported {
                what: "node is not a Document",
            }),
        }
    }

    fn create(&mut self, doc: NodeId, data: NodeData) -> DomResult<NodeId> {
        self.require_document(doc)?;
        Ok(self.alloc(Node::new(Some(doc), data)))
    }

    // ---- factory ------------------------------------------------------

    /// Create an element of the given tag name (DOM Level 1: no
    /// prefix, no namespace). Declared default attributes are
    /// instantiated as unspecified Attr nodes.
    pub fn create_element(&mut self, doc: NodeId, tag_name: &str) -> DomResult<NodeId> {
        validate_name(tag_name)?;
        let element = self.create(
            doc,
            NodeData::Element(ElementData::new(QName::plain(tag_name))),
        )?;
        self.instantiate_defaults(doc, element)?;
        Ok(element)
    }

    /// Create an element of the given qualified name and namespace URI
    pub fn create_element_ns(
        &mut self,
        doc: NodeId,
        namespace_uri: Option<&str>,
        qualified_name: &str,
    ) -> DomResult<NodeId> {
        let (prefix, local) = split_qualified(namespace_uri, qualified_name)?;
        let name = QName {
            name: qualified_name.to_string(),
            prefix,
            local,
            namespace_uri: namespace_uri.map(str::to_string),
        };
        let element = self.create(doc, NodeData::Element(ElementData::new(name)))?;
        self.instantiate_defaults(doc, element)?;
        Ok(element)
    }

    /// Creates an empty DocumentFragment
    pub fn create_document_fragment(&mut self, doc: NodeId) -> DomResult<NodeId> {
        self.create(doc, NodeData::DocumentFragment)
    }

    /// Creates a Text node with the given data
    pub fn create_text_node(&mut self, doc: NodeId, data: &str) -> DomResult<NodeId> {
        self.create(
            doc,
            NodeData::Text {
                data: data.to_string(),
            },
        )
    }

    /// Creates a Comment node with the given data
    pub fn create_comment(&mut self, doc: NodeId, data: &str) -> DomResult<NodeId> {
        self.create(
            doc,
            NodeData::Comment {
                data: data.to_string(),
            },
        )
    }

    /// Creates a CDATASection node. Not supported on HTML documents.
    pub fn create_cdata_section(&mut self, doc: NodeId, data: &str) -> DomResult<NodeId> {
        self.require_document(doc)?;
        if self.document_flavor(doc)? == DocumentFlavor::Html {
            return Err(DomError::NotSupported {
                what: "CDATA sections in an HTML document",
            });
        }
        self.create(
            doc,
            NodeData::CdataSection {
                data: data.to_string(),
            },
        )
    }

    /// Creates a ProcessingInstruction node
    pub fn create_processing_instruction(
        &mut self,
        doc: NodeId,
        target: &str,
        data: &str,
    ) -> DomResult<NodeId> {
        validate_name(target)?;
        self.create(
            doc,
            NodeData::ProcessingInstruction {
                target: target.to_string(),
                data: data.to_string(),
            },
        )
    }

    /// Creates an Attr of the given name, initially valueless and
    /// specified
    pub fn create_attribute(&mut self, doc: NodeId, name: &str) -> DomResult<NodeId> {
        validate_name(name)?;
        self.create(
            doc,
            NodeData::Attribute(AttrData {
                name: QName::plain(name),
                specified: true,
                owner_element: None,
            }),
        )
    }

    /// Creates an Attr of the given qualified name and namespace URI
    pub fn create_attribute_ns(
        &mut self,
        doc: NodeId,
        namespace_uri: Option<&str>,
        qualified_name: &str,
    ) -> DomResult<NodeId> {
        let (prefix, local) = split_qualified(namespace_uri, qualified_name)?;
        self.create(
            doc,
            NodeData::Attribute(AttrData {
                name: QName {
                    name: qualified_name.to_string(),
                    prefix,
                    local,
                    namespace_uri: namespace_uri.map(str::to_string),
                },
                specified: true,
                owner_element: None,
            }),
        )
    }

    /// Creates an EntityReference. When the document's doctype declares
    /// the entity, its replacement text is copied in as readonly
    /// children.
    pub fn create_entity_reference(&mut self, doc: NodeId, name: &str) -> DomResult<NodeId> {
        validate_name(name)?;
        let reference = self.create(
            doc,
            NodeData::EntityReference {
                name: name.to_string(),
            },
        )?;
        self.resolve_entity_reference(doc, reference, name)?;
        Ok(reference)
    }

    fn resolve_entity_reference(
        &mut self,
        doc: NodeId,
        reference: NodeId,
        name: &str,
    ) -> DomResult<()> {
        let Some(entity) = self.lookup_entity(doc, name) else {
            return Ok(());
        };
        let replacement = self.node(entity)?.children.clone();
        for child in replacement {
            let cloned = self.clone_subtree(child, true, Some(doc), true)?;
            self.node_mut(cloned)?.parent = Some(reference);
            self.node_mut(reference)?.children.push(cloned);
        }
        Ok(())
    }

    fn lookup_entity(&self, doc: NodeId, name: &str) -> Option<NodeId> {
        let doctype = self.doctype(doc)?;
        let NodeData::DocumentType(d) = &self.get(doctype)?.data else {
            return None;
        };
        d.entities.iter().copied().find(|&e| {
            matches!(self.get(e).map(|n| &n.data), Some(NodeData::Entity(ent)) if ent.name == name)
        })
    }

    // ---- doctype, entities, notations -----------------------------------

    /// Create a DocumentType node. It has no owner until inserted into
    /// a document.
    pub fn create_document_type(
        &mut self,
        name: &str,
        public_id: Option<&str>,
        system_id: Option<&str>,
    ) -> DomResult<NodeId> {
        validate_name(name)?;
        Ok(self.alloc(Node::new(
            None,
            NodeData::DocumentType(DoctypeData {
                name: name.to_string(),
                public_id: public_id.map(str::to_string),
                system_id: system_id.map(str::to_string),
                entities: Vec::new(),
                notations: Vec::new(),
            }),
        )))
    }

    /// Create an Entity node. Build its replacement text with the
    /// regular tree operations, then attach it with `add_entity`,
    /// which freezes the subtree.
    pub fn create_entity(
        &mut self,
        doc: NodeId,
        name: &str,
        public_id: Option<&str>,
        system_id: Option<&str>,
        notation_name: Option<&str>,
    ) -> DomResult<NodeId> {
        validate_name(name)?;
        self.create(
            doc,
            NodeData::Entity(EntityData {
                name: name.to_string(),
                public_id: public_id.map(str::to_string),
                system_id: system_id.map(str::to_string),
                notation_name: notation_name.map(str::to_string),
            }),
        )
    }

    /// Create a Notation node
    pub fn create_notation(
        &mut self,
        doc: NodeId,
        name: &str,
        public_id: Option<&str>,
        system_id: Option<&str>,
    ) -> DomResult<NodeId> {
        validate_name(name)?;
        self.create(
            doc,
            NodeData::Notation(NotationData {
                name: name.to_string(),
                public_id: public_id.map(str::to_string),
                system_id: system_id.map(str::to_string),
            }),
        )
    }

    /// File an entity under a doctype and freeze its subtree
    pub fn add_entity(&mut self, doctype: NodeId, entity: NodeId) -> DomResult<()> {
        if self.node(entity)?.kind() != NodeKind::Entity {
            return Err(DomError::HierarchyRequest("node is not an Entity"));
        }
        self.freeze(entity);
        match &mut self.node_mut(doctype)?.data {
            NodeData::DocumentType(d) => {
                d.entities.push(entity);
                Ok(())
            }
            _ => Err(DomError::HierarchyRequest("node is not a DocumentType")),
        }
    }

    /// File a notation under a doctype and freeze it
    pub fn add_notation(&mut self, doctype: NodeId, notation: NodeId) -> DomResult<()> {
        if self.node(notation)?.kind() != NodeKind::Notation {
            return Err(DomError::HierarchyRequest("node is not a Notation"));
        }
        self.freeze(notation);
        match &mut self.node_mut(doctype)?.data {
            NodeData::DocumentType(d) => {
                d.notations.push(notation);
                Ok(())
            }
            _ => Err(DomError::HierarchyRequest("node is not a DocumentType")),
        }
    }

    /// The document's DocumentType child, if any
    pub fn doctype(&self, doc: NodeId) -> Option<NodeId> {
        self.children(doc)
            .iter()
            .copied()
            .find(|&c| self.get(c).map(|n| n.kind()) == Some(NodeKind::DocumentType))
    }

    /// The document's root content element, if any
    pub fn document_element(&self, doc: NodeId) -> Option<NodeId> {
        self.children(doc)
            .iter()
            .copied()
            .find(|&c| self.get(c).map(|n| n.kind()) == Some(NodeKind::Element))
    }

    // ---- import ---------------------------------------------------------

    /// Import a node from another document. The returned copy is owned
    /// by `doc` and parentless; the source is never altered. Per-kind
    /// rules follow DOM Level 2 (Document and DocumentType nodes cannot
    /// be imported; Attr imports are always deep; EntityReference
    /// imports copy the reference only and re-resolve here).
    pub fn import_node(&mut self, doc: NodeId, source: NodeId, deep: bool) -> DomResult<NodeId> {
        self.require_document(doc)?;
        tracing::debug!(?doc, ?source, deep, "import_node");
        self.import_subtree(doc, source, deep)
    }

    fn import_subtree(&mut self, doc: NodeId, source: NodeId, deep: bool) -> DomResult<NodeId> {
        let node = self.node(source)?;
        let kind = node.kind();
        let child_ids = node.children.clone();
        let data = node.data.clone();

        let imported = match data {
            NodeData::Document(_) => {
                return Err(DomError::NotSupported {
                    what: "importing a Document node",
                });
            }
            NodeData::DocumentType(_) => {
                return Err(DomError::NotSupported {
                    what: "importing a DocumentType node",
                });
            }
            NodeData::Element(e) => {
                let specified_attrs: Vec<NodeId> = e
                    .attrs
                    .iter()
                    .copied()
                    .filter(|&a| {
                        self.get(a)
                            .and_then(|n| n.as_attr())
                            .map(|a| a.specified)
                            .unwrap_or(false)
                    })
                    .collect();
                let element = self.alloc(Node::new(
                    Some(doc),
                    NodeData::Element(ElementData::new(e.name)),
                ));
                for attr in specified_attrs {
                    let copy = self.import_subtree(doc, attr, true)?;
                    if let NodeData::Attribute(a) = &mut self.node_mut(copy)?.data {
                        a.owner_element = Some(element);
                    }
                    if let NodeData::Element(e) = &mut self.node_mut(element)?.data {
                        e.attrs.push(copy);
                    }
                }
                // Defaults come from the importing document, not the source
                self.instantiate_defaults(doc, element)?;
                element
            }
            NodeData::Attribute(mut a) => {
                a.specified = true;
                a.owner_element = None;
                self.alloc(Node::new(Some(doc), NodeData::Attribute(a)))
            }
            NodeData::EntityReference { name } => {
                // Copy the reference only; the target document may have
                // defined the entity differently.
                let reference = self.alloc(Node::new(
                    Some(doc),
                    NodeData::EntityReference { name: name.clone() },
                ));
                self.resolve_entity_reference(doc, reference, &name)?;
                return Ok(reference);
            }
            data @ (NodeData::Entity(_)
            | NodeData::Notation(_)
            | NodeData::Text { .. }
            | NodeData::CdataSection { .. }
            | NodeData::Comment { .. }
            | NodeData::ProcessingInstruction { .. }
            | NodeData::DocumentFragment) => self.alloc(Node::new(Some(doc), data)),
        };

        let carries_children = match kind {
            NodeKind::Attribute => true,
            NodeKind::EntityReference | NodeKind::Notation => false,
            _ => deep,
        };
        if carries_children {
            for child in child_ids {
                let copy = self.import_subtree(doc, child, true)?;
                self.node_mut(copy)?.parent = Some(imported);
                self.node_mut(imported)?.children.push(copy);
            }
        }

        Ok(imported)
    }

    /// Instantiate the document's declared default attributes on an
    /// element, skipping names the element already carries
    pub(crate) fn instantiate_defaults(&mut self, doc: NodeId, element: NodeId) -> DomResult<()> {
        let tag = match self.node(element)?.as_element() {
            Some(e) => e.name.name.clone(),
            None => return Ok(()),
        };
        let defaults: Vec<(String, String)> =
            self.document_meta(doc)?.defaults_for(&tag).to_vec();
        for (attr_name, value) in defaults {
            if self.get_attribute_node(element, &attr_name).is_some() {
                continue;
            }
            self.put_default_attribute(doc, element, &attr_name, &value)?;
        }
        Ok(())
    }

    // ---- queries ----------------------------------------------------------

    /// Live NodeList of descendant elements with the given tag name, in
    /// preorder. The special value "*" matches all tags.
    pub fn get_elements_by_tag_name(&self, root: NodeId, tag_name: &str) -> NodeList {
        NodeList::tag_name(root, tag_name)
    }

    /// Live NodeList of descendant elements matching the namespace URI
    /// and local name; "*" is a wildcard on either axis
    pub fn get_elements_by_tag_name_ns(
        &self,
        root: NodeId,
        namespace_uri: Option<&str>,
        local_name: &str,
    ) -> NodeList {
        NodeList::tag_name_ns(root, namespace_uri, local_name)
    }

    /// Element carrying the given ID value, per the document's declared
    /// ID attributes. Only specified attribute values qualify.
    pub fn get_element_by_id(&self, doc: NodeId, id_value: &str) -> Option<NodeId> {
        let flavor = self.document_flavor(doc).ok()?;
        let meta = self.document_meta(doc).ok()?;
        let mut descendants = Vec::new();
        self.collect_descendants(doc, &mut descendants);
        descendants.into_iter().find(|&n| {
            let Some(element) = self.get(n).and_then(|n| n.as_element()) else {
                return false;
            };
            let Some(id_attr) = meta.id_attribute(&element.name.name, flavor) else {
                return false;
            };
            match self.get_attribute_node(n, id_attr) {
                Some(attr) => {
                    self.get(attr)
                        .and_then(|a| a.as_attr())
                        .map(|a| a.specified)
                        .unwrap_or(false)
                        && self.attr_value(attr) == id_value
                }
                None => false,
            }
        })
    }
}
