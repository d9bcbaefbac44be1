//! Scopers decide where a traversal starts and what it may visit.

use std::cell::OnceCell;

use trellis_dom::{Document, DomRange, NodeId};

use crate::block::{BlockElement, first_block};
use crate::inline::{InlineElement, InlineResolvers};
use crate::selection::EditorSelection;

/// Where inside the scope a traversal begins.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ContentPosition {
    #[default]
    Begin,
    End,
    SelectionStart,
}

/// The scope a [`ContentTraverser`](crate::ContentTraverser) walks within.
pub trait TraversingScoper {
    fn start_block_element(&self, dom: &Document) -> Option<BlockElement>;

    fn start_inline_element(&self, dom: &Document) -> Option<InlineElement>;

    /// Where a backward inline walk begins when there is no current inline.
    fn inline_element_before_start(&self, _dom: &Document) -> Option<InlineElement> {
        None
    }

    fn is_block_in_scope(&self, dom: &Document, block: &BlockElement) -> bool;

    /// Clip `inline` to the scope, or `None` if it lies outside.
    fn trim_inline_element(&self, dom: &Document, inline: &InlineElement) -> Option<InlineElement>;
}

/// Everything under the root.
#[derive(Debug, Clone)]
pub struct BodyScoper {
    root: NodeId,
    resolvers: InlineResolvers,
}

impl BodyScoper {
    pub fn new(root: NodeId, resolvers: InlineResolvers) -> Self {
        Self { root, resolvers }
    }
}

impl TraversingScoper for BodyScoper {
    fn start_block_element(&self, dom: &Document) -> Option<BlockElement> {
        first_block(dom, self.root)
    }

    fn start_inline_element(&self, dom: &Document) -> Option<InlineElement> {
        self.resolvers.first_inline(dom, self.root)
    }

    fn is_block_in_scope(&self, dom: &Document, block: &BlockElement) -> bool {
        let start = block.start_node();
        start != self.root && dom.contains(self.root, start)
    }

    fn trim_inline_element(&self, _dom: &Document, inline: &InlineElement) -> Option<InlineElement> {
        Some(*inline)
    }
}

/// Exactly the selected content.
#[derive(Debug)]
pub struct SelectionScoper {
    selection: EditorSelection,
}

impl SelectionScoper {
    pub fn new(dom: &Document, root: NodeId, range: &DomRange, resolvers: InlineResolvers) -> Self {
        Self {
            selection: EditorSelection::with_resolvers(dom, root, range, resolvers),
        }
    }

    pub fn selection(&self) -> &EditorSelection {
        &self.selection
    }
}

impl TraversingScoper for SelectionScoper {
    fn start_block_element(&self, dom: &Document) -> Option<BlockElement> {
        self.selection.start_block_element(dom)
    }

    fn start_inline_element(&self, dom: &Document) -> Option<InlineElement> {
        self.selection.start_inline_element(dom)
    }

    fn inline_element_before_start(&self, dom: &Document) -> Option<InlineElement> {
        self.selection.inline_element_before_start(dom)
    }

    fn is_block_in_scope(&self, dom: &Document, block: &BlockElement) -> bool {
        self.selection.is_block_in_scope(dom, block)
    }

    fn trim_inline_element(&self, dom: &Document, inline: &InlineElement) -> Option<InlineElement> {
        self.selection.trim_inline_element(dom, inline)
    }
}

/// The block holding the selection start. Cuts whole inlines only.
#[derive(Debug)]
pub struct SelectionBlockScoper {
    selection: EditorSelection,
    position: ContentPosition,
    block: OnceCell<Option<BlockElement>>,
}

impl SelectionBlockScoper {
    pub fn new(
        dom: &Document,
        root: NodeId,
        range: &DomRange,
        position: ContentPosition,
        resolvers: InlineResolvers,
    ) -> Self {
        Self {
            selection: EditorSelection::with_resolvers(dom, root, range, resolvers),
            position,
            block: OnceCell::new(),
        }
    }

    fn block(&self, dom: &Document) -> Option<BlockElement> {
        *self
            .block
            .get_or_init(|| self.selection.start_block_element(dom))
    }

    fn keep_if_in_block(&self, dom: &Document, inline: Option<InlineElement>) -> Option<InlineElement> {
        let block = self.block(dom)?;
        inline.filter(|i| block.is_in_block(dom, i.container()))
    }
}

impl TraversingScoper for SelectionBlockScoper {
    fn start_block_element(&self, dom: &Document) -> Option<BlockElement> {
        self.block(dom)
    }

    fn start_inline_element(&self, dom: &Document) -> Option<InlineElement> {
        let block = self.block(dom)?;
        let root = self.selection.root();
        let resolvers = self.selection.resolvers();
        match self.position {
            ContentPosition::Begin => block.first_inline(dom, root, resolvers),
            ContentPosition::End => block.last_inline(dom, root, resolvers),
            ContentPosition::SelectionStart => {
                self.keep_if_in_block(dom, self.selection.start_inline_element(dom))
            }
        }
    }

    /// Only a selection-start scoper has anything before its start.
    fn inline_element_before_start(&self, dom: &Document) -> Option<InlineElement> {
        match self.position {
            ContentPosition::SelectionStart => {
                self.keep_if_in_block(dom, self.selection.inline_element_before_start(dom))
            }
            ContentPosition::Begin | ContentPosition::End => None,
        }
    }

    fn is_block_in_scope(&self, dom: &Document, block: &BlockElement) -> bool {
        self.block(dom).is_some_and(|b| b == *block)
    }

    fn trim_inline_element(&self, dom: &Document, inline: &InlineElement) -> Option<InlineElement> {
        self.keep_if_in_block(dom, Some(*inline))
    }
}
