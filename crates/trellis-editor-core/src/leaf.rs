//! Leaf-node navigation.
//!
//! A "leaf" is a node without children (or a text node). Navigation skips
//! leaves that carry nothing the user can see or edit: comments, empty or
//! line-break-only text, and `display: none` elements.

use trellis_dom::{Document, NodeId, NodeType};

const BLOCK_ELEMENT_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "canvas", "dd", "div", "dl", "dt", "fieldset",
    "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr",
    "li", "main", "nav", "noscript", "ol", "output", "p", "pre", "section", "table", "td", "th",
    "tfoot", "ul", "video",
];

const BLOCK_DISPLAY_STYLES: &[&str] = &["block", "list-item", "table-cell"];

/// Whether `node` starts a block: a block tag, or an inline `display`
/// that makes it one.
pub fn is_block_element(dom: &Document, node: NodeId) -> bool {
    let Some(tag) = dom.tag(node) else {
        return false;
    };
    BLOCK_ELEMENT_TAGS.contains(&tag)
        || dom
            .style(node, "display")
            .is_some_and(|d| BLOCK_DISPLAY_STYLES.contains(&d.to_ascii_lowercase().as_str()))
}

/// Whether leaf navigation passes over `node`.
pub fn should_skip_node(dom: &Document, node: NodeId) -> bool {
    match dom.node_type(node) {
        NodeType::Text => dom
            .text(node)
            .is_none_or(|t| t.chars().all(|c| c == '\r' || c == '\n')),
        NodeType::Element => dom.computed_display(node) == "none",
        NodeType::Comment | NodeType::Fragment => true,
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Direction {
    Forward,
    Backward,
}

impl Direction {
    fn edge_child(self, dom: &Document, node: NodeId) -> Option<NodeId> {
        match self {
            Direction::Forward => dom.first_child(node),
            Direction::Backward => dom.last_child(node),
        }
    }

    fn sibling(self, dom: &Document, node: NodeId) -> Option<NodeId> {
        match self {
            Direction::Forward => dom.next_sibling(node),
            Direction::Backward => dom.prev_sibling(node),
        }
    }
}

fn descend(dom: &Document, mut node: NodeId, dir: Direction) -> NodeId {
    while let Some(child) = dir.edge_child(dom, node) {
        node = child;
    }
    node
}

/// First non-skippable leaf under `root`.
pub fn first_leaf(dom: &Document, root: NodeId) -> Option<NodeId> {
    edge_leaf(dom, root, Direction::Forward)
}

/// Last non-skippable leaf under `root`.
pub fn last_leaf(dom: &Document, root: NodeId) -> Option<NodeId> {
    edge_leaf(dom, root, Direction::Backward)
}

/// Next non-skippable leaf after `from`, staying inside `root`.
pub fn next_leaf(dom: &Document, root: NodeId, from: NodeId) -> Option<NodeId> {
    leaf_sibling(dom, root, from, Direction::Forward)
}

/// Previous non-skippable leaf before `from`, staying inside `root`.
pub fn prev_leaf(dom: &Document, root: NodeId, from: NodeId) -> Option<NodeId> {
    leaf_sibling(dom, root, from, Direction::Backward)
}

fn edge_leaf(dom: &Document, root: NodeId, dir: Direction) -> Option<NodeId> {
    let child = dir.edge_child(dom, root)?;
    let leaf = descend(dom, child, dir);
    if should_skip_node(dom, leaf) {
        leaf_sibling(dom, root, leaf, dir)
    } else {
        Some(leaf)
    }
}

fn leaf_sibling(dom: &Document, root: NodeId, from: NodeId, dir: Direction) -> Option<NodeId> {
    if from == root || !dom.contains(root, from) {
        return None;
    }
    let mut node = from;
    loop {
        let sibling = loop {
            if let Some(sibling) = dir.sibling(dom, node) {
                break sibling;
            }
            let parent = dom.parent(node)?;
            if parent == root {
                return None;
            }
            node = parent;
        };
        let leaf = descend(dom, sibling, dir);
        if !should_skip_node(dom, leaf) {
            return Some(leaf);
        }
        node = leaf;
    }
}
