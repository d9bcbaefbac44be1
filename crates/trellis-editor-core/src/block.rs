//! Block elements: the paragraph-like units of the content.
//!
//! A block is either a single block-level node, or a run of sibling-ish
//! nodes between a head and a tail when no element wraps the run (text
//! broken by `<br>`, text directly under the root, text next to a nested
//! block).

use std::cmp::Ordering;

use trellis_dom::{Document, NodeId};

use crate::inline::{InlineElement, InlineResolvers};
use crate::leaf::{first_leaf, is_block_element, last_leaf, next_leaf, prev_leaf, should_skip_node};
use crate::point::EditorPoint;

/// One logical paragraph.
#[derive(Clone, Copy, Debug)]
pub enum BlockElement {
    /// A block-level element that wraps the whole paragraph.
    Node(NodeId),
    /// The nodes from `start` to `end` inclusive, in document order.
    StartEnd { start: NodeId, end: NodeId },
}

impl PartialEq for BlockElement {
    /// Blocks are equal when they cover the same boundary nodes.
    fn eq(&self, other: &Self) -> bool {
        self.start_node() == other.start_node() && self.end_node() == other.end_node()
    }
}

impl Eq for BlockElement {}

impl BlockElement {
    pub fn start_node(&self) -> NodeId {
        match *self {
            BlockElement::Node(node) => node,
            BlockElement::StartEnd { start, .. } => start,
        }
    }

    pub fn end_node(&self) -> NodeId {
        match *self {
            BlockElement::Node(node) => node,
            BlockElement::StartEnd { end, .. } => end,
        }
    }

    /// The wrapping element of a node block.
    pub fn container(&self) -> Option<NodeId> {
        match *self {
            BlockElement::Node(node) => Some(node),
            BlockElement::StartEnd { .. } => None,
        }
    }

    /// This block starts after `other` ends, in pre-order.
    pub fn is_after(&self, dom: &Document, other: &BlockElement) -> bool {
        dom.compare_document_position(self.start_node(), other.end_node()) == Ordering::Greater
    }

    /// Whether `node` belongs to this block.
    ///
    /// A node block holds its strict descendants. A start/end block holds
    /// its boundary nodes, their descendants and everything between them
    /// except ancestors of the tail.
    pub fn is_in_block(&self, dom: &Document, node: NodeId) -> bool {
        match *self {
            BlockElement::Node(container) => container != node && dom.contains(container, node),
            BlockElement::StartEnd { start, end } => {
                dom.contains(start, node)
                    || dom.contains(end, node)
                    || (dom.compare_document_position(node, start) == Ordering::Greater
                        && dom.compare_document_position(node, end) == Ordering::Less
                        && !dom.contains(node, end))
            }
        }
    }

    /// The top-level nodes covering this block, in document order.
    ///
    /// Read-only: boundary ancestors are not split, so for a start/end block
    /// the list holds the head's right spine, the whole siblings between,
    /// and the tail's left spine.
    pub fn content_nodes(&self, dom: &Document) -> Vec<NodeId> {
        let (start, end) = match *self {
            BlockElement::Node(node) => return vec![node],
            BlockElement::StartEnd { start, end } => (start, end),
        };
        if dom.contains(start, end) {
            return vec![start];
        }
        if dom.contains(end, start) {
            return vec![end];
        }
        let Some(common) = dom.common_ancestor(start, end) else {
            return vec![start, end];
        };

        let mut nodes = vec![start];
        let mut start_top = start;
        while let Some(parent) = dom.parent(start_top) {
            if parent == common {
                break;
            }
            let mut sibling = dom.next_sibling(start_top);
            while let Some(s) = sibling {
                nodes.push(s);
                sibling = dom.next_sibling(s);
            }
            start_top = parent;
        }

        let mut tail = vec![end];
        let mut end_top = end;
        while let Some(parent) = dom.parent(end_top) {
            if parent == common {
                break;
            }
            let mut sibling = dom.prev_sibling(end_top);
            while let Some(s) = sibling {
                tail.push(s);
                sibling = dom.prev_sibling(s);
            }
            end_top = parent;
        }

        let mut sibling = dom.next_sibling(start_top);
        while let Some(s) = sibling {
            if s == end_top {
                break;
            }
            nodes.push(s);
            sibling = dom.next_sibling(s);
        }
        nodes.extend(tail.into_iter().rev());
        nodes
    }

    pub fn text_content(&self, dom: &Document) -> String {
        self.content_nodes(dom)
            .into_iter()
            .map(|n| dom.text_content(n))
            .collect()
    }

    /// First inline inside this block.
    pub fn first_inline(
        &self,
        dom: &Document,
        root: NodeId,
        resolvers: &InlineResolvers,
    ) -> Option<InlineElement> {
        let mut leaf = EditorPoint::start_of(dom, self.start_node()).node;
        if should_skip_node(dom, leaf) {
            leaf = next_leaf(dom, root, leaf)?;
        }
        self.inline_in_block(dom, leaf, resolvers)
    }

    /// Last inline inside this block.
    pub fn last_inline(
        &self,
        dom: &Document,
        root: NodeId,
        resolvers: &InlineResolvers,
    ) -> Option<InlineElement> {
        let mut leaf = EditorPoint::end_of(dom, self.end_node()).node;
        if should_skip_node(dom, leaf) {
            leaf = prev_leaf(dom, root, leaf)?;
        }
        self.inline_in_block(dom, leaf, resolvers)
    }

    fn inline_in_block(
        &self,
        dom: &Document,
        leaf: NodeId,
        resolvers: &InlineResolvers,
    ) -> Option<InlineElement> {
        self.is_in_block(dom, leaf)
            .then(|| resolvers.resolve_in_block(dom, leaf, *self))
    }
}

/// The block containing `node`, bounded by `root`.
pub fn block_at(dom: &Document, root: NodeId, node: NodeId) -> Option<BlockElement> {
    if node == root || !dom.contains(root, node) {
        return None;
    }
    if is_block_element(dom, node) {
        return Some(BlockElement::Node(node));
    }

    let container = dom
        .ancestors(node)
        .take_while(|&a| a != root)
        .find(|&a| is_block_element(dom, a))
        .unwrap_or(root);

    let head = find_head_tail(dom, node, container, false);
    let tail = find_head_tail(dom, node, container, true);
    let (mut head, mut tail) = collapse_nodes(dom, root, head, tail);

    if dom.parent(head) != dom.parent(tail) {
        return Some(BlockElement::StartEnd {
            start: head,
            end: tail,
        });
    }

    while dom.prev_sibling(head).is_none() && dom.next_sibling(tail).is_none() {
        let Some(parent) = dom.parent(head) else {
            break;
        };
        if parent == container {
            if container != root {
                head = parent;
                tail = parent;
            }
            break;
        } else if parent != root {
            head = parent;
            tail = parent;
        } else {
            break;
        }
    }

    if head == tail && is_block_element(dom, head) {
        Some(BlockElement::Node(head))
    } else {
        Some(BlockElement::StartEnd {
            start: head,
            end: tail,
        })
    }
}

/// Walk from `node` toward the edge of `container` until a block or `<br>`.
///
/// The tail search keeps the `<br>` it stops at; the head search does not.
fn find_head_tail(dom: &Document, node: NodeId, container: NodeId, is_tail: bool) -> NodeId {
    if is_tail && dom.has_tag(node, "br") {
        return node;
    }
    let sibling_of = |n: NodeId| {
        if is_tail {
            dom.next_sibling(n)
        } else {
            dom.prev_sibling(n)
        }
    };
    let child_of = |n: NodeId| {
        if is_tail {
            dom.first_child(n)
        } else {
            dom.last_child(n)
        }
    };

    let mut node = node;
    let mut result = node;
    loop {
        let mut sibling = sibling_of(node);
        while sibling.is_none() {
            match dom.parent(node) {
                Some(parent) if parent != container => {
                    node = parent;
                    sibling = sibling_of(node);
                }
                _ => return result,
            }
        }
        while let Some(current) = sibling {
            if is_block_element(dom, current) {
                return result;
            }
            if dom.has_tag(current, "br") {
                return if is_tail { current } else { result };
            }
            node = current;
            sibling = child_of(current);
        }
        result = node;
    }
}

/// Promote `start` and `end` toward `root` while they are the outer child of
/// a parent that does not also hold the other boundary.
fn collapse_nodes(dom: &Document, root: NodeId, start: NodeId, end: NodeId) -> (NodeId, NodeId) {
    let start = collapse_toward_root(dom, root, start, end, true);
    let end = collapse_toward_root(dom, root, end, start, false);
    if dom.contains(start, end) {
        (start, start)
    } else if dom.contains(end, start) {
        (end, end)
    } else {
        (start, end)
    }
}

fn collapse_toward_root(
    dom: &Document,
    root: NodeId,
    node: NodeId,
    track: NodeId,
    is_start: bool,
) -> NodeId {
    let mut node = node;
    while let Some(parent) = dom.parent(node) {
        if parent == root || dom.contains(parent, track) {
            break;
        }
        let outer_sibling = if is_start {
            dom.prev_sibling(node)
        } else {
            dom.next_sibling(node)
        };
        if outer_sibling.is_some() {
            break;
        }
        node = parent;
    }
    node
}

/// Block holding the first leaf under `root`.
pub fn first_block(dom: &Document, root: NodeId) -> Option<BlockElement> {
    block_at(dom, root, first_leaf(dom, root)?)
}

/// Block holding the last leaf under `root`.
pub fn last_block(dom: &Document, root: NodeId) -> Option<BlockElement> {
    block_at(dom, root, last_leaf(dom, root)?)
}

/// The block after `current`, or `None` when re-resolution does not move
/// strictly forward.
pub fn next_block(dom: &Document, root: NodeId, current: &BlockElement) -> Option<BlockElement> {
    let leaf = next_leaf(dom, root, current.end_node())?;
    block_at(dom, root, leaf).filter(|b| b.is_after(dom, current))
}

/// The block before `current`, or `None` when re-resolution does not move
/// strictly backward.
pub fn prev_block(dom: &Document, root: NodeId, current: &BlockElement) -> Option<BlockElement> {
    let leaf = prev_leaf(dom, root, current.start_node())?;
    block_at(dom, root, leaf).filter(|b| current.is_after(dom, b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{find_text, nth_tag};
    use pretty_assertions::assert_eq;

    fn describe(dom: &Document, block: &BlockElement) -> String {
        match *block {
            BlockElement::Node(n) => format!("Node({})", dom.outer_html(n)),
            BlockElement::StartEnd { start, end } => {
                format!("StartEnd({} .. {})", dom.outer_html(start), dom.outer_html(end))
            }
        }
    }

    fn all_blocks(dom: &Document, root: NodeId) -> Vec<String> {
        let mut out = Vec::new();
        let mut block = first_block(dom, root);
        while let Some(b) = block {
            out.push(describe(dom, &b));
            block = next_block(dom, root, &b);
        }
        out
    }

    #[test]
    fn test_paragraphs_are_node_blocks() {
        let (dom, root) = Document::from_html("<p>a<b>b</b></p><div><p>c</p></div>");
        assert_eq!(
            all_blocks(&dom, root),
            vec!["Node(<p>a<b>b</b></p>)", "Node(<p>c</p>)"]
        );
    }

    #[test]
    fn test_br_belongs_to_the_block_it_ends() {
        let (dom, root) = Document::from_html("<div>one<br>two<br>three</div>");
        assert_eq!(
            all_blocks(&dom, root),
            vec![
                "StartEnd(one .. <br>)",
                "StartEnd(two .. <br>)",
                "StartEnd(three .. three)"
            ]
        );
    }

    #[test]
    fn test_text_under_root_collapses_inline_wrappers() {
        let (dom, root) = Document::from_html("<span><b>x</b></span><p>y</p>");
        let x = find_text(&dom, root, "x");
        let block = block_at(&dom, root, x).unwrap();
        assert_eq!(
            describe(&dom, &block),
            "StartEnd(<span><b>x</b></span> .. <span><b>x</b></span>)"
        );
    }

    #[test]
    fn test_text_beside_nested_block() {
        let (dom, root) = Document::from_html("<div>lead<p>mid</p>tail</div>");
        assert_eq!(
            all_blocks(&dom, root),
            vec!["StartEnd(lead .. lead)", "Node(<p>mid</p>)", "StartEnd(tail .. tail)"]
        );
    }

    #[test]
    fn test_block_at_rejects_outside_nodes() {
        let (mut dom, root) = Document::from_html("<p>a</p>");
        let stray = dom.create_text("z");
        assert_eq!(block_at(&dom, root, stray), None);
        assert_eq!(block_at(&dom, root, root), None);
    }

    #[test]
    fn test_content_nodes_of_start_end_block() {
        let (dom, root) = Document::from_html("<i>a<b>b</b></i>c<u>d<br>e</u>");
        let a = find_text(&dom, root, "a");
        let br = nth_tag(&dom, root, "br", 0);
        let block = block_at(&dom, root, a).unwrap();
        assert_eq!(block.end_node(), br);
        let nodes: Vec<String> = block
            .content_nodes(&dom)
            .into_iter()
            .map(|n| dom.outer_html(n))
            .collect();
        assert_eq!(nodes, vec!["<i>a<b>b</b></i>", "c", "d", "<br>"]);
        assert_eq!(block.text_content(&dom), "abcd");
    }

    #[test]
    fn test_prev_block_walks_backward() {
        let (dom, root) = Document::from_html("<p>a</p><p>b</p>");
        let last = last_block(&dom, root).unwrap();
        let prev = prev_block(&dom, root, &last).unwrap();
        assert_eq!(prev, BlockElement::Node(nth_tag(&dom, root, "p", 0)));
        assert_eq!(prev_block(&dom, root, &prev), None);
    }

    #[test]
    fn test_is_in_block() {
        let (dom, root) = Document::from_html("<p>a</p>x<b>y</b><br><p>z</p>");
        let x = find_text(&dom, root, "x");
        let y = find_text(&dom, root, "y");
        let block = block_at(&dom, root, x).unwrap();
        assert!(block.is_in_block(&dom, x));
        assert!(block.is_in_block(&dom, y));
        assert!(!block.is_in_block(&dom, find_text(&dom, root, "z")));
        let p = BlockElement::Node(nth_tag(&dom, root, "p", 0));
        assert!(!p.is_in_block(&dom, nth_tag(&dom, root, "p", 0)));
        assert!(p.is_in_block(&dom, find_text(&dom, root, "a")));
    }
}
