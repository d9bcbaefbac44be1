//! Stateful, scoped walk over blocks or inlines.
//!
//! The traverser keeps a current block and a current inline, each pulled
//! from its scoper on first use. Stepping only moves forward when the
//! candidate is in scope and strictly ordered relative to the current one;
//! a refused step leaves the state untouched.

use trellis_dom::{Document, DomRange, NodeId};

use crate::block::{BlockElement, next_block, prev_block};
use crate::inline::{InlineElement, InlineResolvers};
use crate::scoper::{
    BodyScoper, ContentPosition, SelectionBlockScoper, SelectionScoper, TraversingScoper,
};

pub struct ContentTraverser {
    root: NodeId,
    resolvers: InlineResolvers,
    scoper: Box<dyn TraversingScoper>,
    current_block: Option<Option<BlockElement>>,
    current_inline: Option<Option<InlineElement>>,
}

impl std::fmt::Debug for ContentTraverser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentTraverser")
            .field("root", &self.root)
            .field("current_block", &self.current_block)
            .field("current_inline", &self.current_inline)
            .finish_non_exhaustive()
    }
}

impl ContentTraverser {
    pub fn new(root: NodeId, resolvers: InlineResolvers, scoper: Box<dyn TraversingScoper>) -> Self {
        Self {
            root,
            resolvers,
            scoper,
            current_block: None,
            current_inline: None,
        }
    }

    /// Walk everything under `root`.
    pub fn body(root: NodeId, resolvers: InlineResolvers) -> Self {
        let scoper = BodyScoper::new(root, resolvers.clone());
        Self::new(root, resolvers, Box::new(scoper))
    }

    /// Walk the content covered by `range`.
    pub fn selection(
        dom: &Document,
        root: NodeId,
        range: &DomRange,
        resolvers: InlineResolvers,
    ) -> Self {
        let scoper = SelectionScoper::new(dom, root, range, resolvers.clone());
        Self::new(root, resolvers, Box::new(scoper))
    }

    /// Walk the block holding the start of `range`, beginning at `position`.
    pub fn block_at_selection(
        dom: &Document,
        root: NodeId,
        range: &DomRange,
        position: ContentPosition,
        resolvers: InlineResolvers,
    ) -> Self {
        let scoper = SelectionBlockScoper::new(dom, root, range, position, resolvers.clone());
        Self::new(root, resolvers, Box::new(scoper))
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    // === Blocks ===

    pub fn current_block_element(&mut self, dom: &Document) -> Option<BlockElement> {
        *self
            .current_block
            .get_or_insert_with(|| self.scoper.start_block_element(dom))
    }

    pub fn next_block_element(&mut self, dom: &Document) -> Option<BlockElement> {
        self.step_block(dom, true)
    }

    pub fn previous_block_element(&mut self, dom: &Document) -> Option<BlockElement> {
        self.step_block(dom, false)
    }

    fn step_block(&mut self, dom: &Document, forward: bool) -> Option<BlockElement> {
        let current = self.current_block_element(dom)?;
        let candidate = if forward {
            next_block(dom, self.root, &current)
        } else {
            prev_block(dom, self.root, &current)
        }?;
        let ordered = if forward {
            candidate.is_after(dom, &current)
        } else {
            current.is_after(dom, &candidate)
        };
        if !ordered || !self.scoper.is_block_in_scope(dom, &candidate) {
            tracing::trace!(
                target: "trellis::editor",
                forward,
                ordered,
                start = %candidate.start_node(),
                "block step refused"
            );
            return None;
        }
        self.current_block = Some(Some(candidate));
        Some(candidate)
    }

    // === Inlines ===

    pub fn current_inline_element(&mut self, dom: &Document) -> Option<InlineElement> {
        *self
            .current_inline
            .get_or_insert_with(|| self.scoper.start_inline_element(dom))
    }

    pub fn next_inline_element(&mut self, dom: &Document) -> Option<InlineElement> {
        self.step_inline(dom, true)
    }

    pub fn previous_inline_element(&mut self, dom: &Document) -> Option<InlineElement> {
        self.step_inline(dom, false)
    }

    fn step_inline(&mut self, dom: &Document, forward: bool) -> Option<InlineElement> {
        let candidate = match self.current_inline_element(dom) {
            Some(current) => {
                let next = if forward {
                    self.resolvers.next_inline(dom, self.root, &current)
                } else {
                    self.resolvers.previous_inline(dom, self.root, &current)
                }?;
                let ordered = if forward {
                    next.is_after(dom, &current)
                } else {
                    current.is_after(dom, &next)
                };
                if !ordered {
                    tracing::trace!(
                        target: "trellis::editor",
                        forward,
                        container = %next.container(),
                        "inline step out of order"
                    );
                    return None;
                }
                next
            }
            None if forward => return None,
            None => self.scoper.inline_element_before_start(dom)?,
        };
        let trimmed = self.scoper.trim_inline_element(dom, &candidate)?;
        self.current_inline = Some(Some(trimmed));
        Some(trimmed)
    }
}
