//! Normalized positions inside the editable content.

use std::cmp::Ordering;

use trellis_dom::{Document, DomError, NodeId, Position, VOID_TAGS};

/// Offset of the start of a non-text leaf.
pub const NODE_BEGIN: usize = 0;
/// Offset of the end of a non-text leaf.
pub const NODE_END: usize = 1;

/// A position whose container is a leaf.
///
/// Text leaves use char offsets; other leaves use [`NODE_BEGIN`] or
/// [`NODE_END`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EditorPoint {
    pub node: NodeId,
    pub offset: usize,
}

/// The largest valid offset in `node`: its length for text, else [`NODE_END`].
pub fn end_offset(dom: &Document, node: NodeId) -> usize {
    if dom.is_text(node) {
        dom.text_len(node)
    } else {
        NODE_END
    }
}

/// An element with no children that could hold some, like an empty `<td>`.
fn is_empty_container(dom: &Document, node: NodeId) -> bool {
    dom.is_element(node)
        && !dom.has_children(node)
        && !dom.tag(node).is_some_and(|t| VOID_TAGS.contains(&t))
}

impl EditorPoint {
    pub fn new(node: NodeId, offset: usize) -> Self {
        Self { node, offset }
    }

    /// Descend a DOM boundary point to a leaf.
    ///
    /// An element offset selects the child slot: inside the tree the point
    /// moves to the start of that child, past the last child it moves to the
    /// end of the last leaf.
    pub fn normalize(dom: &Document, node: NodeId, offset: usize) -> Self {
        if dom.is_text(node) {
            return Self::new(node, offset.min(dom.text_len(node)));
        }
        let count = dom.child_count(node);
        if count == 0 {
            return Self::new(node, offset.min(NODE_END));
        }
        if offset < count {
            dom.child_at(node, offset)
                .map(|child| Self::start_of(dom, child))
                .unwrap_or(Self::new(node, NODE_BEGIN))
        } else {
            dom.last_child(node)
                .map(|child| Self::end_of(dom, child))
                .unwrap_or(Self::new(node, NODE_END))
        }
    }

    pub fn from_position(dom: &Document, position: Position) -> Self {
        Self::normalize(dom, position.node, position.offset)
    }

    /// Start of the first leaf under `node`.
    pub fn start_of(dom: &Document, node: NodeId) -> Self {
        let mut leaf = node;
        while let Some(child) = dom.first_child(leaf) {
            leaf = child;
        }
        Self::new(leaf, NODE_BEGIN)
    }

    /// End of the last leaf under `node`.
    pub fn end_of(dom: &Document, node: NodeId) -> Self {
        let mut leaf = node;
        while let Some(child) = dom.last_child(leaf) {
            leaf = child;
        }
        Self::new(leaf, end_offset(dom, leaf))
    }

    pub fn is_at_begin(&self) -> bool {
        self.offset == NODE_BEGIN
    }

    pub fn is_at_end(&self, dom: &Document) -> bool {
        self.offset >= end_offset(dom, self.node)
    }

    /// Same container compares offsets; otherwise document order.
    pub fn compare(&self, dom: &Document, other: &EditorPoint) -> Ordering {
        if self.node == other.node {
            self.offset.cmp(&other.offset)
        } else {
            dom.compare_document_position(self.node, other.node)
        }
    }

    /// The equivalent DOM boundary point.
    pub fn to_position(&self, dom: &Document) -> Position {
        if dom.is_text(self.node) || dom.has_children(self.node) {
            return Position::new(self.node, self.offset);
        }
        if is_empty_container(dom, self.node) {
            return Position::new(self.node, 0);
        }
        let slot = if self.is_at_begin() {
            Position::before(dom, self.node)
        } else {
            Position::after(dom, self.node)
        };
        slot.unwrap_or(Position::new(self.node, NODE_BEGIN))
    }

    /// Insert `node` at this point.
    ///
    /// Text is split when the point is strictly inside it; the split pair
    /// `(head, tail)` is returned so callers can merge it back. A point on
    /// `root` itself (an empty root) appends.
    pub fn insert_node(
        &self,
        dom: &mut Document,
        root: NodeId,
        node: NodeId,
    ) -> Result<Option<(NodeId, NodeId)>, DomError> {
        if self.node == root || dom.parent(self.node).is_none() {
            dom.append_child(self.node, node)?;
            return Ok(None);
        }
        if dom.is_text(self.node) {
            let len = dom.text_len(self.node);
            if self.offset == 0 {
                self.insert_before_container(dom, node)?;
            } else if self.offset >= len {
                dom.insert_after(self.node, node)?;
            } else {
                let tail = dom.split_text(self.node, self.offset)?;
                dom.insert_after(self.node, node)?;
                return Ok(Some((self.node, tail)));
            }
        } else if is_empty_container(dom, self.node) {
            dom.append_child(self.node, node)?;
        } else if self.is_at_begin() {
            self.insert_before_container(dom, node)?;
        } else {
            dom.insert_after(self.node, node)?;
        }
        Ok(None)
    }

    fn insert_before_container(&self, dom: &mut Document, node: NodeId) -> Result<(), DomError> {
        let parent = dom.parent(self.node).ok_or(DomError::Detached(self.node))?;
        dom.insert_before(parent, node, Some(self.node))?;
        Ok(())
    }
}
