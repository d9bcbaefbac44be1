//! Boundary points and ranges.

use std::cmp::Ordering;

use crate::document::Document;
use crate::node::NodeId;

/// A DOM boundary point: `offset` counts chars inside text nodes and child
/// slots inside other nodes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Position {
    pub node: NodeId,
    pub offset: usize,
}

impl Position {
    pub fn new(node: NodeId, offset: usize) -> Self {
        Self { node, offset }
    }

    /// The point just before `node` in its parent.
    pub fn before(dom: &Document, node: NodeId) -> Option<Self> {
        let parent = dom.parent(node)?;
        Some(Self::new(parent, dom.index_in_parent(node)?))
    }

    /// The point just after `node` in its parent.
    pub fn after(dom: &Document, node: NodeId) -> Option<Self> {
        let parent = dom.parent(node)?;
        Some(Self::new(parent, dom.index_in_parent(node)? + 1))
    }
}

/// A selection range between two boundary points.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DomRange {
    pub start: Position,
    pub end: Position,
}

impl DomRange {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    pub fn collapsed(at: Position) -> Self {
        Self { start: at, end: at }
    }

    pub fn from_nodes(
        start_node: NodeId,
        start_offset: usize,
        end_node: NodeId,
        end_offset: usize,
    ) -> Self {
        Self::new(
            Position::new(start_node, start_offset),
            Position::new(end_node, end_offset),
        )
    }

    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }

    pub fn common_ancestor(&self, dom: &Document) -> Option<NodeId> {
        dom.common_ancestor(self.start.node, self.end.node)
    }

    /// Both boundary containers are inside `container` (inclusive).
    pub fn is_within(&self, dom: &Document, container: NodeId) -> bool {
        dom.contains(container, self.start.node) && dom.contains(container, self.end.node)
    }

    /// Swap the boundaries if `end` sorts before `start`.
    pub fn ordered(self, dom: &Document) -> Self {
        if dom.compare_positions(self.start, self.end) == Ordering::Greater {
            Self::new(self.end, self.start)
        } else {
            self
        }
    }
}

impl Document {
    /// Compare two boundary points, following the DOM range algorithm.
    pub fn compare_positions(&self, a: Position, b: Position) -> Ordering {
        if a.node == b.node {
            return a.offset.cmp(&b.offset);
        }
        if self.contains(a.node, b.node) {
            let mut child = b.node;
            while let Some(parent) = self.parent(child) {
                if parent == a.node {
                    break;
                }
                child = parent;
            }
            let index = self.index_in_parent(child).unwrap_or(0);
            return if a.offset <= index {
                Ordering::Less
            } else {
                Ordering::Greater
            };
        }
        if self.contains(b.node, a.node) {
            return self.compare_positions(b, a).reverse();
        }
        self.compare_document_position(a.node, b.node)
    }

    /// Text of every text node the range covers, clipped at the boundaries.
    pub fn range_text(&self, range: &DomRange) -> String {
        let Some(common) = range.common_ancestor(self) else {
            return String::new();
        };
        let nodes: Vec<NodeId> = if self.is_text(common) {
            vec![common]
        } else {
            self.descendants(common)
                .filter(|&n| self.is_text(n))
                .collect()
        };
        let mut out = String::new();
        for node in nodes {
            let len = self.text_len(node);
            let head = Position::new(node, 0);
            let from = if node == range.start.node {
                range.start.offset
            } else if self.compare_positions(head, range.start) == Ordering::Less {
                continue;
            } else {
                0
            };
            let to = if node == range.end.node {
                range.end.offset.min(len)
            } else if self.compare_positions(head, range.end) != Ordering::Less {
                continue;
            } else {
                len
            };
            if from < to {
                if let Some(text) = self.text(node) {
                    out.extend(text.chars().skip(from).take(to - from));
                }
            }
        }
        out
    }
}
