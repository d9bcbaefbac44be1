//! Inline elements: the styleable runs inside a block.
//!
//! An inline is either a whole node ([`NodeInlineElement`]) or a trimmed
//! view of one ([`PartialInlineElement`]) when a selection boundary cuts
//! through it.

use std::cmp::Ordering;
use std::fmt;
use std::rc::Rc;

use trellis_dom::{Document, DomError, NodeId};

use crate::block::{BlockElement, block_at};
use crate::leaf::{first_leaf, next_leaf, prev_leaf};
use crate::point::{EditorPoint, end_offset};

/// What an inline element wraps.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InlineKind {
    Text,
    Image,
    Link,
    /// Any other node.
    Node,
    /// Produced by a registered [`InlineResolver`].
    Custom(&'static str),
}

/// A whole node treated as one inline unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NodeInlineElement {
    kind: InlineKind,
    container: NodeId,
    block: BlockElement,
}

impl NodeInlineElement {
    pub fn new(kind: InlineKind, container: NodeId, block: BlockElement) -> Self {
        Self {
            kind,
            container,
            block,
        }
    }

    pub fn kind(&self) -> InlineKind {
        self.kind
    }

    pub fn container(&self) -> NodeId {
        self.container
    }

    pub fn parent_block(&self) -> BlockElement {
        self.block
    }
}

/// A sub-range of a node inline. At least one trim is set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PartialInlineElement {
    decorated: NodeInlineElement,
    start: Option<EditorPoint>,
    end: Option<EditorPoint>,
}

impl PartialInlineElement {
    pub fn decorated(&self) -> NodeInlineElement {
        self.decorated
    }

    pub fn trim_start(&self) -> Option<EditorPoint> {
        self.start
    }

    pub fn trim_end(&self) -> Option<EditorPoint> {
        self.end
    }
}

/// An inline element, whole or partial.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InlineElement {
    Node(NodeInlineElement),
    Partial(PartialInlineElement),
}

impl From<NodeInlineElement> for InlineElement {
    fn from(inline: NodeInlineElement) -> Self {
        InlineElement::Node(inline)
    }
}

impl InlineElement {
    /// Trim `decorated`; without trims this is the whole inline.
    pub fn partial(
        decorated: NodeInlineElement,
        start: Option<EditorPoint>,
        end: Option<EditorPoint>,
    ) -> Self {
        if start.is_none() && end.is_none() {
            InlineElement::Node(decorated)
        } else {
            InlineElement::Partial(PartialInlineElement {
                decorated,
                start,
                end,
            })
        }
    }

    /// The underlying whole inline.
    pub fn decorated(&self) -> NodeInlineElement {
        match self {
            InlineElement::Node(inline) => *inline,
            InlineElement::Partial(partial) => partial.decorated,
        }
    }

    pub fn kind(&self) -> InlineKind {
        self.decorated().kind
    }

    pub fn container(&self) -> NodeId {
        self.decorated().container
    }

    pub fn parent_block(&self) -> BlockElement {
        self.decorated().block
    }

    pub fn is_partial(&self) -> bool {
        matches!(self, InlineElement::Partial(_))
    }

    pub fn trim_start(&self) -> Option<EditorPoint> {
        match self {
            InlineElement::Partial(partial) => partial.start,
            InlineElement::Node(_) => None,
        }
    }

    pub fn trim_end(&self) -> Option<EditorPoint> {
        match self {
            InlineElement::Partial(partial) => partial.end,
            InlineElement::Node(_) => None,
        }
    }

    pub fn start_point(&self, dom: &Document) -> EditorPoint {
        self.trim_start()
            .unwrap_or_else(|| EditorPoint::start_of(dom, self.container()))
    }

    pub fn end_point(&self, dom: &Document) -> EditorPoint {
        self.trim_end()
            .unwrap_or_else(|| EditorPoint::end_of(dom, self.container()))
    }

    pub fn text_content(&self, dom: &Document) -> String {
        match self {
            InlineElement::Node(inline) => dom.text_content(inline.container),
            InlineElement::Partial(_) => text_between(
                dom,
                self.container(),
                self.start_point(dom),
                self.end_point(dom),
            ),
        }
    }

    /// This inline lies after `other`.
    ///
    /// Different containers compare in document order; trims of the same
    /// container compare this start against the other end.
    pub fn is_after(&self, dom: &Document, other: &InlineElement) -> bool {
        if self.container() != other.container() {
            return dom.compare_document_position(self.container(), other.container())
                == Ordering::Greater;
        }
        if !self.is_partial() && !other.is_partial() {
            return false;
        }
        self.start_point(dom).compare(dom, &other.end_point(dom)) != Ordering::Less
    }

    /// `point` lies strictly between start and end.
    pub fn contains_point(&self, dom: &Document, point: &EditorPoint) -> bool {
        self.start_point(dom).compare(dom, point) == Ordering::Less
            && point.compare(dom, &self.end_point(dom)) == Ordering::Less
    }

    /// Apply a style to the text this inline covers.
    ///
    /// `from` and `to` narrow the styled range further; they are intersected
    /// with this inline's own trims, so `None` means the inline's edge.
    /// `styler` receives each element to style and performs the mutation.
    pub fn apply_style<F>(
        &self,
        dom: &mut Document,
        from: Option<EditorPoint>,
        to: Option<EditorPoint>,
        mut styler: F,
    ) -> Result<(), DomError>
    where
        F: FnMut(&mut Document, NodeId),
    {
        let start = bound(dom, self.trim_start(), from, Ordering::Greater);
        let end = bound(dom, self.trim_end(), to, Ordering::Less);
        apply_style_range(dom, self.container(), start, end, &mut styler)
    }
}

/// The tighter of two optional bounds: the one ordered `keep` against the
/// other wins.
fn bound(
    dom: &Document,
    own: Option<EditorPoint>,
    extra: Option<EditorPoint>,
    keep: Ordering,
) -> Option<EditorPoint> {
    match (own, extra) {
        (Some(own), Some(extra)) => Some(if extra.compare(dom, &own) == keep {
            extra
        } else {
            own
        }),
        (own, extra) => own.or(extra),
    }
}

fn text_between(dom: &Document, container: NodeId, start: EditorPoint, end: EditorPoint) -> String {
    let mut out = String::new();
    let mut node = Some(start.node);
    while let Some(current) = node {
        if dom.compare_document_position(current, end.node) == Ordering::Greater {
            break;
        }
        if let Some(text) = dom.text(current).filter(|_| dom.is_text(current)) {
            let len = text.chars().count();
            let from = if current == start.node {
                start.offset.min(len)
            } else {
                0
            };
            let to = if current == end.node {
                end.offset.min(len)
            } else {
                len
            };
            if from < to {
                out.extend(text.chars().skip(from).take(to - from));
            }
        }
        if current == end.node {
            break;
        }
        node = next_leaf(dom, container, current);
    }
    out
}

/// Style every text leaf of `container` between `from` and `to`.
fn apply_style_range<F>(
    dom: &mut Document,
    container: NodeId,
    from: Option<EditorPoint>,
    to: Option<EditorPoint>,
    styler: &mut F,
) -> Result<(), DomError>
where
    F: FnMut(&mut Document, NodeId),
{
    let (mut node, mut start_offset) = match from {
        Some(point) if point.is_at_end(dom) => (next_leaf(dom, container, point.node), 0),
        Some(point) => (Some(point.node), point.offset),
        None => (Some(EditorPoint::start_of(dom, container).node), 0),
    };
    let end = match to {
        Some(point) if point.is_at_begin() => prev_leaf(dom, container, point.node)
            .map(|leaf| EditorPoint::new(leaf, end_offset(dom, leaf))),
        Some(point) => Some(point),
        None => Some(EditorPoint::end_of(dom, container)),
    };
    let Some(end) = end else {
        return Ok(());
    };

    while let Some(current) = node {
        if dom.compare_document_position(current, end.node) == Ordering::Greater {
            break;
        }
        let is_last = current == end.node;
        // siblings move once we split or wrap
        let next = if is_last {
            None
        } else {
            next_leaf(dom, container, current)
        };
        if dom.is_text(current) {
            let end_offset = is_last.then_some(end.offset);
            style_text_leaf(dom, current, start_offset, end_offset, styler)?;
        }
        node = next;
        start_offset = 0;
    }
    Ok(())
}

fn style_text_leaf<F>(
    dom: &mut Document,
    node: NodeId,
    start: usize,
    end: Option<usize>,
    styler: &mut F,
) -> Result<(), DomError>
where
    F: FnMut(&mut Document, NodeId),
{
    let text = dom.text(node).unwrap_or_default();
    let len = text.chars().count();
    let end = end.unwrap_or(len).min(len);
    if start >= end {
        return Ok(());
    }
    let parent = dom.parent(node);
    if parent.is_some_and(|p| dom.has_tag(p, "tr")) && text.trim().is_empty() {
        return Ok(());
    }
    if start == 0 && end == len {
        if let Some(span) = parent.filter(|&p| dom.has_tag(p, "span")) {
            if dom.text_content(span).chars().count() == len {
                styler(dom, span);
                return Ok(());
            }
        }
        let span = dom.wrap(node, "span")?;
        styler(dom, span);
        return Ok(());
    }
    let target = if start > 0 {
        dom.split_text(node, start)?
    } else {
        node
    };
    if end < len {
        dom.split_text(target, end - start)?;
    }
    let span = dom.wrap(target, "span")?;
    styler(dom, span);
    Ok(())
}

/// Recognizes custom inline concepts ahead of the default rules.
pub trait InlineResolver {
    /// Return an inline for `node` when this resolver recognizes it.
    fn resolve(&self, dom: &Document, node: NodeId, block: BlockElement) -> Option<InlineElement>;
}

/// Ranked list of custom resolvers, shared by a session and its traversers.
#[derive(Clone, Default)]
pub struct InlineResolvers {
    custom: Rc<Vec<Rc<dyn InlineResolver>>>,
}

impl fmt::Debug for InlineResolvers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InlineResolvers")
            .field("custom", &self.custom.len())
            .finish()
    }
}

impl InlineResolvers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a resolver after the existing ones.
    pub fn push(&mut self, resolver: Rc<dyn InlineResolver>) {
        Rc::make_mut(&mut self.custom).push(resolver);
    }

    pub fn len(&self) -> usize {
        self.custom.len()
    }

    pub fn is_empty(&self) -> bool {
        self.custom.is_empty()
    }

    /// Resolve the block of `node`, then the inline for `node` inside it.
    pub fn inline_at(&self, dom: &Document, root: NodeId, node: NodeId) -> Option<InlineElement> {
        let block = block_at(dom, root, node)?;
        Some(self.resolve_in_block(dom, node, block))
    }

    /// Classify `node` within a known `block`.
    ///
    /// The chain from the outermost in-block ancestor down to `node` is
    /// offered to each custom resolver, then to the default rules (anchor,
    /// image, text). Falls back to a generic node inline.
    pub fn resolve_in_block(&self, dom: &Document, node: NodeId, block: BlockElement) -> InlineElement {
        let mut chain: Vec<NodeId> = std::iter::once(node)
            .chain(
                dom.ancestors(node)
                    .take_while(|&a| block.is_in_block(dom, a)),
            )
            .collect();
        chain.reverse();

        for &candidate in &chain {
            for resolver in self.custom.iter() {
                if let Some(inline) = resolver.resolve(dom, candidate, block) {
                    return inline;
                }
            }
        }
        for &candidate in &chain {
            if let Some(inline) = default_inline(dom, candidate, block) {
                return inline;
            }
        }
        NodeInlineElement::new(InlineKind::Node, node, block).into()
    }

    /// First inline under `root`.
    pub fn first_inline(&self, dom: &Document, root: NodeId) -> Option<InlineElement> {
        self.inline_at(dom, root, first_leaf(dom, root)?)
    }

    /// The inline after `current`.
    ///
    /// A partial with an end trim continues with the rest of the same node.
    pub fn next_inline(
        &self,
        dom: &Document,
        root: NodeId,
        current: &InlineElement,
    ) -> Option<InlineElement> {
        if let Some(end) = current.trim_end() {
            return Some(InlineElement::partial(current.decorated(), Some(end), None));
        }
        let leaf = next_leaf(dom, root, current.container())?;
        self.inline_at(dom, root, leaf)
    }

    /// The inline before `current`.
    ///
    /// A partial with a start trim continues with the head of the same node.
    pub fn previous_inline(
        &self,
        dom: &Document,
        root: NodeId,
        current: &InlineElement,
    ) -> Option<InlineElement> {
        if let Some(start) = current.trim_start() {
            return Some(InlineElement::partial(current.decorated(), None, Some(start)));
        }
        let leaf = prev_leaf(dom, root, current.container())?;
        self.inline_at(dom, root, leaf)
    }
}

fn default_inline(dom: &Document, node: NodeId, block: BlockElement) -> Option<InlineElement> {
    let kind = if dom.has_tag(node, "a") {
        InlineKind::Link
    } else if dom.has_tag(node, "img") {
        InlineKind::Image
    } else if dom.is_text(node) {
        InlineKind::Text
    } else {
        return None;
    };
    Some(NodeInlineElement::new(kind, node, block).into())
}

/// Inline at `node` using only the default rules.
pub fn inline_at(dom: &Document, root: NodeId, node: NodeId) -> Option<InlineElement> {
    InlineResolvers::default().inline_at(dom, root, node)
}
