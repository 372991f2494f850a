//! DOM operation errors
//!
//! Every kind is an expected, caller-recoverable condition. Operations
//! validate all preconditions before touching the tree, so a returned
//! error always leaves the tree exactly as it was.

use thiserror::Error;

/// Result type for DOM operations
pub type DomResult<T> = Result<T, DomError>;

/// DOM operation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomError {
    /// Node kind not allowed at this position, or the insertion would
    /// make a node an ancestor of itself
    #[error("hierarchy request error: {0}")]
    HierarchyRequest(&'static str),

    /// Node was created by a different document and has not been imported
    #[error("node belongs to a different document")]
    WrongDocument,

    /// Target node or a relevant ancestor is readonly
    #[error("no modification allowed: node is readonly")]
    NoModificationAllowed,

    /// Referenced node is not where it was required to be
    #[error("node not found")]
    NotFound,

    /// Supplied name contains characters illegal for the node kind
    #[error("invalid character in name: {name:?}")]
    InvalidCharacter { name: String },

    /// Malformed qualified name or reserved-prefix violation
    #[error("namespace error: {reason}")]
    Namespace { reason: &'static str },

    /// Operation not supported for this node or document flavor
    #[error("not supported: {what}")]
    NotSupported { what: &'static str },

    /// Attr node is already in use by another element
    #[error("attribute is already in use by another element")]
    InuseAttribute,
}
