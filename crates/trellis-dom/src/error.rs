//! Error types for tree mutations.

use miette::Diagnostic;

use crate::node::NodeId;

/// Errors raised by structural mutations of a [`Document`](crate::Document).
///
/// Queries never fail; they return `None` when nothing applies. Only
/// operations that would corrupt the tree report an error.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
#[non_exhaustive]
pub enum DomError {
    /// Inserting `child` under `parent` would create a cycle or `parent`
    /// cannot hold children.
    #[error("cannot insert {child} under {parent}")]
    #[diagnostic(code(trellis::dom::hierarchy_request))]
    HierarchyRequest { parent: NodeId, child: NodeId },

    /// `node` is not a child of `parent`.
    #[error("{node} is not a child of {parent}")]
    #[diagnostic(code(trellis::dom::not_found))]
    NotFound { parent: NodeId, node: NodeId },

    /// A text operation was requested on a node without character data.
    #[error("{0} is not a text or comment node")]
    #[diagnostic(code(trellis::dom::not_character_data))]
    NotCharacterData(NodeId),

    /// Offset past the end of a text node.
    #[error("offset {offset} is out of range for {node}")]
    #[diagnostic(code(trellis::dom::index_size))]
    IndexSize { node: NodeId, offset: usize },

    /// Markup can only be set on elements and fragments.
    #[error("{0} cannot hold child nodes")]
    #[diagnostic(code(trellis::dom::not_container))]
    NotContainer(NodeId),

    /// The operation needs a parent but the node is detached.
    #[error("{0} has no parent")]
    #[diagnostic(code(trellis::dom::detached))]
    Detached(NodeId),
}
