//! Selection model: a DOM range normalized into editor points.

use std::cell::OnceCell;
use std::cmp::Ordering;

use trellis_dom::{Document, DomRange, NodeId};

use crate::block::{BlockElement, block_at};
use crate::inline::{InlineElement, InlineResolvers};
use crate::leaf::{next_leaf, prev_leaf, should_skip_node};
use crate::point::{EditorPoint, end_offset};

/// A selection normalized at construction, with lazily resolved
/// blocks and inlines.
#[derive(Debug)]
pub struct EditorSelection {
    root: NodeId,
    start: EditorPoint,
    end: EditorPoint,
    collapsed: bool,
    resolvers: InlineResolvers,
    start_block: OnceCell<Option<BlockElement>>,
    end_block: OnceCell<Option<BlockElement>>,
    inlines: OnceCell<(Option<InlineElement>, Option<InlineElement>)>,
}

impl EditorSelection {
    pub fn new(dom: &Document, root: NodeId, range: &DomRange) -> Self {
        Self::with_resolvers(dom, root, range, InlineResolvers::default())
    }

    pub fn with_resolvers(
        dom: &Document,
        root: NodeId,
        range: &DomRange,
        resolvers: InlineResolvers,
    ) -> Self {
        let collapsed = range.is_collapsed();
        let start = EditorPoint::from_position(dom, range.start);
        let end = if collapsed {
            start
        } else {
            EditorPoint::from_position(dom, range.end)
        };
        Self {
            root,
            start,
            end,
            collapsed,
            resolvers,
            start_block: OnceCell::new(),
            end_block: OnceCell::new(),
            inlines: OnceCell::new(),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn start_point(&self) -> EditorPoint {
        self.start
    }

    pub fn end_point(&self) -> EditorPoint {
        self.end
    }

    pub fn is_collapsed(&self) -> bool {
        self.collapsed
    }

    pub fn resolvers(&self) -> &InlineResolvers {
        &self.resolvers
    }

    pub fn start_block_element(&self, dom: &Document) -> Option<BlockElement> {
        *self
            .start_block
            .get_or_init(|| block_at(dom, self.root, self.start.node))
    }

    pub fn end_block_element(&self, dom: &Document) -> Option<BlockElement> {
        if self.collapsed {
            return self.start_block_element(dom);
        }
        *self
            .end_block
            .get_or_init(|| block_at(dom, self.root, self.end.node))
    }

    pub fn start_inline_element(&self, dom: &Document) -> Option<InlineElement> {
        self.start_end_inlines(dom).0
    }

    pub fn end_inline_element(&self, dom: &Document) -> Option<InlineElement> {
        self.start_end_inlines(dom).1
    }

    /// The inline just before the selection start.
    pub fn inline_element_before_start(&self, dom: &Document) -> Option<InlineElement> {
        self.inline_before_point(dom, self.start)
    }

    fn start_end_inlines(&self, dom: &Document) -> (Option<InlineElement>, Option<InlineElement>) {
        *self.inlines.get_or_init(|| self.resolve_start_end(dom))
    }

    fn resolve_start_end(&self, dom: &Document) -> (Option<InlineElement>, Option<InlineElement>) {
        let start = self.inline_after_point(dom, self.start);
        if self.collapsed {
            return (start, start);
        }
        let end = self.inline_before_point(dom, self.end);
        match (start, end) {
            (Some(s), Some(e)) if s.container() == e.container() => {
                // one node cut on both sides
                let merged = InlineElement::partial(
                    s.decorated(),
                    s.trim_start().or(e.trim_start()),
                    e.trim_end().or(s.trim_end()),
                );
                (Some(merged), Some(merged))
            }
            (Some(s), Some(e)) if s.is_after(dom, &e) => (None, None),
            other => other,
        }
    }

    /// The inline starting at `point`: the next whole inline when the point
    /// sits on a leaf end, else a partial trimmed to start at the point.
    pub fn inline_after_point(&self, dom: &Document, point: EditorPoint) -> Option<InlineElement> {
        if point.node == self.root {
            return None;
        }
        let mut node = point.node;
        let mut partial = false;
        if point.offset >= end_offset(dom, node) {
            node = next_leaf(dom, self.root, node)?;
        } else if dom.is_text(node) && point.offset > 0 {
            partial = true;
        }
        if should_skip_node(dom, node) {
            node = next_leaf(dom, self.root, node)?;
            partial = false;
        }
        let inline = self.resolvers.inline_at(dom, self.root, node)?;
        if partial || inline.contains_point(dom, &point) {
            Some(InlineElement::partial(inline.decorated(), Some(point), None))
        } else {
            Some(inline)
        }
    }

    /// The inline ending at `point`: the previous whole inline when the point
    /// sits on a leaf start, else a partial trimmed to end at the point.
    pub fn inline_before_point(&self, dom: &Document, point: EditorPoint) -> Option<InlineElement> {
        if point.node == self.root {
            return None;
        }
        let mut node = point.node;
        let mut partial = false;
        if point.offset == 0 {
            node = prev_leaf(dom, self.root, node)?;
        } else if dom.is_text(node) && point.offset < dom.text_len(node) {
            partial = true;
        }
        if should_skip_node(dom, node) {
            node = prev_leaf(dom, self.root, node)?;
            partial = false;
        }
        let inline = self.resolvers.inline_at(dom, self.root, node)?;
        if partial || inline.contains_point(dom, &point) {
            Some(InlineElement::partial(inline.decorated(), None, Some(point)))
        } else {
            Some(inline)
        }
    }

    /// `block` is the start block, the end block, or lies between them.
    pub fn is_block_in_scope(&self, dom: &Document, block: &BlockElement) -> bool {
        let Some(start) = self.start_block_element(dom) else {
            return false;
        };
        if self.collapsed {
            return *block == start;
        }
        let Some(end) = self.end_block_element(dom) else {
            return false;
        };
        *block == start
            || *block == end
            || (block.is_after(dom, &start) && end.is_after(dom, block))
    }

    /// Clip `inline` to the selection.
    ///
    /// `None` when the selection is collapsed or `inline` lies outside it.
    pub fn trim_inline_element(&self, dom: &Document, inline: &InlineElement) -> Option<InlineElement> {
        if self.collapsed {
            return None;
        }
        let (Some(first), Some(last)) = self.start_end_inlines(dom) else {
            return None;
        };
        let selection_start = first.start_point(dom);
        let selection_end = last.end_point(dom);
        let start = inline.start_point(dom);
        let end = inline.end_point(dom);
        if end.compare(dom, &selection_start) != Ordering::Greater
            || start.compare(dom, &selection_end) != Ordering::Less
        {
            return None;
        }
        let trim_start = if start.compare(dom, &selection_start) == Ordering::Less {
            Some(selection_start)
        } else {
            inline.trim_start()
        };
        let trim_end = if end.compare(dom, &selection_end) == Ordering::Greater {
            Some(selection_end)
        } else {
            inline.trim_end()
        };
        Some(InlineElement::partial(inline.decorated(), trim_start, trim_end))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{find_text, nth_tag};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_collapsed_end_equals_start() {
        let (dom, root) = Document::from_html("<p>hello</p>");
        let text = find_text(&dom, root, "hello");
        let range = DomRange::from_nodes(text, 2, text, 2);
        let selection = EditorSelection::new(&dom, root, &range);
        assert!(selection.is_collapsed());
        assert_eq!(selection.start_point(), selection.end_point());
        let start = selection.start_inline_element(&dom).unwrap();
        assert_eq!(start.text_content(&dom), "llo");
        assert_eq!(selection.trim_inline_element(&dom, &start), None);
    }

    #[test]
    fn test_same_node_selection_merges_into_one_partial() {
        let (dom, root) = Document::from_html("<p>hello world</p>");
        let text = find_text(&dom, root, "hello world");
        let selection = EditorSelection::new(&dom, root, &DomRange::from_nodes(text, 2, text, 7));
        let start = selection.start_inline_element(&dom).unwrap();
        let end = selection.end_inline_element(&dom).unwrap();
        assert_eq!(start, end);
        assert_eq!(start.text_content(&dom), "llo w");
    }

    #[test]
    fn test_boundary_points_return_whole_inlines() {
        let (dom, root) = Document::from_html("<p>ab<b>cd</b>ef</p>");
        let ab = find_text(&dom, root, "ab");
        let ef = find_text(&dom, root, "ef");
        let selection = EditorSelection::new(&dom, root, &DomRange::from_nodes(ab, 2, ef, 0));
        let start = selection.start_inline_element(&dom).unwrap();
        let end = selection.end_inline_element(&dom).unwrap();
        assert!(!start.is_partial());
        assert_eq!(start.text_content(&dom), "cd");
        assert_eq!(end, start);
        let before = selection.inline_element_before_start(&dom).unwrap();
        assert_eq!(before.container(), ab);
    }

    #[test]
    fn test_trim_clips_edges() {
        let (dom, root) = Document::from_html("<p>aaa</p><p>bbb</p><p>ccc</p>");
        let a = find_text(&dom, root, "aaa");
        let b = find_text(&dom, root, "bbb");
        let c = find_text(&dom, root, "ccc");
        let selection = EditorSelection::new(&dom, root, &DomRange::from_nodes(a, 1, b, 2));
        let whole_a = crate::inline::inline_at(&dom, root, a).unwrap();
        let whole_b = crate::inline::inline_at(&dom, root, b).unwrap();
        let whole_c = crate::inline::inline_at(&dom, root, c).unwrap();
        assert_eq!(
            selection
                .trim_inline_element(&dom, &whole_a)
                .unwrap()
                .text_content(&dom),
            "aa"
        );
        assert_eq!(
            selection
                .trim_inline_element(&dom, &whole_b)
                .unwrap()
                .text_content(&dom),
            "bb"
        );
        assert_eq!(selection.trim_inline_element(&dom, &whole_c), None);
    }

    #[test]
    fn test_block_scope_across_paragraphs() {
        let (dom, root) = Document::from_html("<div><p>AAA</p><p>BBB</p><p>CCC</p></div>");
        let a = find_text(&dom, root, "AAA");
        let b = find_text(&dom, root, "BBB");
        let selection = EditorSelection::new(&dom, root, &DomRange::from_nodes(a, 1, b, 2));
        let p = |i| BlockElement::Node(nth_tag(&dom, root, "p", i));
        assert!(selection.is_block_in_scope(&dom, &p(0)));
        assert!(selection.is_block_in_scope(&dom, &p(1)));
        assert!(!selection.is_block_in_scope(&dom, &p(2)));
    }

    #[test]
    fn test_empty_root_has_nothing() {
        let (dom, root) = Document::from_html("");
        let selection = EditorSelection::new(&dom, root, &DomRange::from_nodes(root, 0, root, 0));
        assert_eq!(selection.start_block_element(&dom), None);
        assert_eq!(selection.start_inline_element(&dom), None);
        assert!(!selection.is_block_in_scope(&dom, &BlockElement::Node(root)));
    }
}
