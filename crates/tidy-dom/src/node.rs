//! DOM node records
//!
//! A node is one arena slot: tree linkage plus a tagged, kind-specific
//! payload. Child order lives in the parent's `children` vector only;
//! sibling accessors are computed from it, never stored separately.

use std::collections::HashMap;

use crate::NodeId;

/// Node kind discriminator (the twelve DOM Level 2 node types)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Element,
    Attribute,
    Text,
    CdataSection,
    EntityReference,
    Entity,
    ProcessingInstruction,
    Comment,
    Document,
    DocumentType,
    DocumentFragment,
    Notation,
}

/// One arena slot
#[derive(Debug, Clone)]
pub struct Node {
    /// Parent node (None for roots and detached nodes)
    pub parent: Option<NodeId>,
    /// Ordered child sequence - the single source of truth for sibling order
    pub children: Vec<NodeId>,
    /// Owning Document node (None only for Document itself and a
    /// DocumentType not yet attached to any document)
    pub owner: Option<NodeId>,
    /// Immutable subtree marker (entities, notations, frozen doctypes,
    /// entity-reference replacement text)
    pub readonly: bool,
    /// Kind-specific payload
    pub data: NodeData,
}

impl Node {
    pub(crate) fn new(owner: Option<NodeId>, data: NodeData) -> Self {
        Self {
            parent: None,
            children: Vec::new(),
            owner,
            readonly: false,
            data,
        }
    }

    /// Node kind
    #[inline]
    pub fn kind(&self) -> NodeKind {
        self.data.kind()
    }

    #[inline]
    pub fn is_element(&self) -> bool {
        matches!(self.data, NodeData::Element(_))
    }

    #[inline]
    pub fn is_text(&self) -> bool {
        matches!(self.data, NodeData::Text { .. })
    }

    /// Get element data if this is an element
    #[inline]
    pub fn as_element(&self) -> Option<&ElementData> {
        match &self.data {
            NodeData::Element(e) => Some(e),
            _ => None,
        }
    }

    /// Get mutable element data
    #[inline]
    pub fn as_element_mut(&mut self) -> Option<&mut ElementData> {
        match &mut self.data {
            NodeData::Element(e) => Some(e),
            _ => None,
        }
    }

    /// Get attribute data if this is an Attr node
    #[inline]
    pub fn as_attr(&self) -> Option<&AttrData> {
        match &self.data {
            NodeData::Attribute(a) => Some(a),
            _ => None,
        }
    }

    /// Get text content if this is a text node
    #[inline]
    pub fn as_text(&self) -> Option<&str> {
        match &self.data {
            NodeData::Text { data } => Some(data),
            _ => None,
        }
    }

    /// nodeName per the DOM table: tag name for elements, `#text` and
    /// friends for character data, the target for PIs
    pub fn node_name(&self) -> &str {
        match &self.data {
            NodeData::Element(e) => &e.name.name,
            NodeData::Attribute(a) => &a.name.name,
            NodeData::Text { .. } => "#text",
            NodeData::CdataSection { .. } => "#cdata-section",
            NodeData::EntityReference { name } => name,
            NodeData::Entity(e) => &e.name,
            NodeData::ProcessingInstruction { target, .. } => target,
            NodeData::Comment { .. } => "#comment",
            NodeData::Document(_) => "#document",
            NodeData::DocumentType(d) => &d.name,
            NodeData::DocumentFragment => "#document-fragment",
            NodeData::Notation(n) => &n.name,
        }
    }

    /// Intrinsic nodeValue: character data and PI data. Attr values are
    /// assembled from children and live on `DomTree::node_value`.
    pub fn intrinsic_value(&self) -> Option<&str> {
        match &self.data {
            NodeData::Text { data }
            | NodeData::CdataSection { data }
            | NodeData::Comment { data } => Some(data),
            NodeData::ProcessingInstruction { data, .. } => Some(data),
            _ => None,
        }
    }
}

/// Kind-specific payload
#[derive(Debug, Clone)]
pub enum NodeData {
    Element(ElementData),
    Attribute(AttrData),
    Text { data: String },
    CdataSection { data: String },
    EntityReference { name: String },
    Entity(EntityData),
    ProcessingInstruction { target: String, data: String },
    Comment { data: String },
    Document(DocumentData),
    DocumentType(DoctypeData),
    DocumentFragment,
    Notation(NotationData),
}

impl NodeData {
    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Element(_) => NodeKind::Element,
            Self::Attribute(_) => NodeKind::Attribute,
            Self::Text { .. } => NodeKind::Text,
            Self::CdataSection { .. } => NodeKind::CdataSection,
            Self::EntityReference { .. } => NodeKind::EntityReference,
            Self::Entity(_) => NodeKind::Entity,
            Self::ProcessingInstruction { .. } => NodeKind::ProcessingInstruction,
            Self::Comment { .. } => NodeKind::Comment,
            Self::Document(_) => NodeKind::Document,
            Self::DocumentType(_) => NodeKind::DocumentType,
            Self::DocumentFragment => NodeKind::DocumentFragment,
            Self::Notation(_) => NodeKind::Notation,
        }
    }
}

/// Qualified name, flat per DOM Level 2: the namespace URI is whatever
/// was given at creation time, never the result of prefix resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QName {
    /// Full qualified name as given (nodeName)
    pub name: String,
    /// Prefix part, if the name had one
    pub prefix: Option<String>,
    /// Local part
    pub local: String,
    /// Namespace URI given at creation (None for DOM Level 1 creation)
    pub namespace_uri: Option<String>,
}

impl QName {
    /// A DOM Level 1 name: no prefix, no namespace
    pub fn plain(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            local: name.clone(),
            name,
            prefix: None,
            namespace_uri: None,
        }
    }
}

/// Element payload
#[derive(Debug, Clone)]
pub struct ElementData {
    /// Tag name
    pub name: QName,
    /// Attr nodes, held out of band of `children`
    pub attrs: Vec<NodeId>,
}

impl ElementData {
    pub fn new(name: QName) -> Self {
        Self {
            name,
            attrs: Vec::new(),
        }
    }
}

/// Attr payload. The value is the concatenation of the node's
/// Text / EntityReference children.
#[derive(Debug, Clone)]
pub struct AttrData {
    pub name: QName,
    /// False for attributes instantiated from document defaults
    pub specified: bool,
    /// Element holding this attribute, if any
    pub owner_element: Option<NodeId>,
}

/// Document flavor - gates XML-only constructs such as CDATA sections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DocumentFlavor {
    #[default]
    Xml,
    Html,
}

/// Document payload
#[derive(Debug, Clone, Default)]
pub struct DocumentData {
    pub flavor: DocumentFlavor,
    pub meta: DocumentMeta,
}

/// Document-wide markup knowledge: which attributes are IDs and which
/// attributes an element name carries by default. Consulted by the
/// creation, clone and import paths; never hard-coded into node logic.
#[derive(Debug, Clone, Default)]
pub struct DocumentMeta {
    /// element name -> attribute name treated as its ID
    id_attributes: HashMap<String, String>,
    /// element name -> default (attribute, value) pairs
    default_attributes: HashMap<String, Vec<(String, String)>>,
}

impl DocumentMeta {
    /// Declare the ID attribute for an element name
    pub fn set_id_attribute(&mut self, element: impl Into<String>, attribute: impl Into<String>) {
        self.id_attributes.insert(element.into(), attribute.into());
    }

    /// Declare a default attribute value for an element name
    pub fn add_default_attribute(
        &mut self,
        element: impl Into<String>,
        attribute: impl Into<String>,
        value: impl Into<String>,
    ) {
        self.default_attributes
            .entry(element.into())
            .or_default()
            .push((attribute.into(), value.into()));
    }

    /// ID attribute name for an element, if declared. HTML documents
    /// fall back to "id" when nothing is declared.
    pub fn id_attribute(&self, element: &str, flavor: DocumentFlavor) -> Option<&str> {
        match self.id_attributes.get(element) {
            Some(name) => Some(name.as_str()),
            None if flavor == DocumentFlavor::Html => Some("id"),
            None => None,
        }
    }

    /// Default attributes declared for an element name
    pub fn defaults_for(&self, element: &str) -> &[(String, String)] {
        self.default_attributes
            .get(element)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Default value for one attribute of an element, if declared
    pub fn default_value(&self, element: &str, attribute: &str) -> Option<&str> {
        self.defaults_for(element)
            .iter()
            .find(|(a, _)| a == attribute)
            .map(|(_, v)| v.as_str())
    }
}

/// DocumentType payload. Entities and notations are held like element
/// attributes: owned by the doctype, never in `children`.
#[derive(Debug, Clone)]
pub struct DoctypeData {
    pub name: String,
    pub public_id: Option<String>,
    pub system_id: Option<String>,
    pub entities: Vec<NodeId>,
    pub notations: Vec<NodeId>,
}

/// Entity payload (the entity itself, not its declaration)
#[derive(Debug, Clone)]
pub struct EntityData {
    pub name: String,
    pub public_id: Option<String>,
    pub system_id: Option<String>,
    /// Notation name for unparsed entities, None for parsed ones
    pub notation_name: Option<String>,
}

/// Notation payload
#[derive(Debug, Clone)]
pub struct NotationData {
    pub name: String,
    pub public_id: Option<String>,
    pub system_id: Option<String>,
}
