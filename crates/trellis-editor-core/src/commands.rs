//! Editing commands built on the traverser.
//!
//! Each command reads the live selection from the [`Editor`], walks the
//! content with a scoped [`ContentTraverser`](crate::ContentTraverser) and
//! wraps its mutations in undo snapshots so it undoes as one step.

use trellis_dom::{Document, DomRange, NodeId, Position};

use crate::block::BlockElement;
use crate::editor::{ContentScope, Editor, InsertOption};
use crate::error::EditorError;
use crate::inline::{InlineElement, InlineKind};
use crate::scoper::ContentPosition;
use crate::table::{self, TableEdit, TableOperation, VirtualTable, create_table};
use crate::undo::UndoManager;

/// Style every inline in the selection.
///
/// Text is split at the selection edges and wrapped in spans as needed;
/// `styler` receives each element to style. The selection is moved to
/// cover the styled spans. Returns `false` for a collapsed or missing
/// selection.
pub fn apply_inline_style<F>(editor: &mut Editor, mut styler: F) -> Result<bool, EditorError>
where
    F: FnMut(&mut Document, NodeId),
{
    if editor.selection_range().is_none_or(|r| r.is_collapsed()) {
        return Ok(false);
    }
    let Some(mut traverser) =
        editor.content_traverser(ContentScope::Selection, ContentPosition::Begin)
    else {
        return Ok(false);
    };
    // styling splits text, so resolve every inline first
    let mut inlines: Vec<InlineElement> = Vec::new();
    let mut inline = traverser.current_inline_element(editor.dom());
    while let Some(current) = inline {
        inlines.push(current);
        inline = traverser.next_inline_element(editor.dom());
    }
    if inlines.is_empty() {
        return Ok(false);
    }

    editor.format_with_undo(|editor| {
        let mut styled: Vec<NodeId> = Vec::new();
        for inline in &inlines {
            inline.apply_style(editor.dom_mut(), None, None, |dom, element| {
                styler(dom, element);
                styled.push(element);
            })?;
        }
        if let (Some(&first), Some(&last)) = (styled.first(), styled.last()) {
            let end = editor.dom().child_count(last);
            editor.select(DomRange::new(
                Position::new(first, 0),
                Position::new(last, end),
            ));
        }
        tracing::debug!(target: "trellis::editor", spans = styled.len(), "inline style applied");
        Ok(!styled.is_empty())
    })
}

/// Every block the selection touches, in document order.
pub fn blocks_in_selection(editor: &Editor) -> Vec<BlockElement> {
    let mut blocks = Vec::new();
    let Some(mut traverser) =
        editor.content_traverser(ContentScope::Selection, ContentPosition::Begin)
    else {
        return blocks;
    };
    let mut block = traverser.current_block_element(editor.dom());
    while let Some(current) = block {
        blocks.push(current);
        block = traverser.next_block_element(editor.dom());
    }
    blocks
}

/// The run of non-whitespace text ending at a collapsed cursor, within the
/// cursor's block. Stops at inlines that are not text or links.
pub fn word_before_cursor(editor: &Editor) -> Option<String> {
    let range = editor.selection_range()?;
    if !range.is_collapsed() {
        return None;
    }
    let mut traverser =
        editor.content_traverser(ContentScope::Block, ContentPosition::SelectionStart)?;
    let dom = editor.dom();
    let mut chunks: Vec<String> = Vec::new();
    while let Some(inline) = traverser.previous_inline_element(dom) {
        if !matches!(inline.kind(), InlineKind::Text | InlineKind::Link) {
            break;
        }
        let text = inline.text_content(dom);
        match text.rfind(char::is_whitespace) {
            Some(index) => {
                let boundary = text[index..].chars().next().map_or(1, char::len_utf8);
                chunks.push(text[index + boundary..].to_owned());
                break;
            }
            None => chunks.push(text),
        }
    }
    chunks.reverse();
    Some(chunks.concat())
}

/// Apply a structural edit to the table around the cursor.
///
/// The cursor moves to the start of the cell the edit leaves it in.
/// Returns `false`, without touching the undo history, when the cursor is
/// not in a table cell or the edit does not apply there.
pub fn edit_table(editor: &mut Editor, operation: TableOperation) -> Result<bool, EditorError> {
    let Some(cell) = editor.node_at_cursor(&["td", "th"]) else {
        return Ok(false);
    };
    let applies = VirtualTable::new(editor.dom(), cell)
        .is_some_and(|vtable| vtable.can_apply(editor.dom(), operation));
    if !applies {
        tracing::debug!(target: "trellis::table", ?operation, cell = %cell, "table edit refused");
        return Ok(false);
    }
    editor.format_with_undo(|editor| {
        match table::edit_table(editor.dom_mut(), cell, operation)? {
            TableEdit::Applied { current } => {
                tracing::debug!(target: "trellis::table", ?operation, current = ?current, "table edited");
                if let Some(current) = current {
                    editor.select_with_fallback(None, current);
                }
                Ok(true)
            }
            TableEdit::Refused => Ok(false),
        }
    })
}

/// Insert a `columns` x `rows` table after the block holding the cursor,
/// or at the end without a cursor, and put the cursor in its first cell.
pub fn insert_table(
    editor: &mut Editor,
    columns: usize,
    rows: usize,
) -> Result<NodeId, EditorError> {
    let anchor = editor
        .selection()
        .and_then(|selection| selection.start_block_element(editor.dom()))
        .map(|block| block.end_node())
        .filter(|&node| editor.contains(node));
    editor.format_with_undo(|editor| {
        let table = create_table(editor.dom_mut(), columns, rows)?;
        match anchor {
            Some(anchor) => {
                editor.dom_mut().insert_after(anchor, table)?;
            }
            None => editor.insert_node(table, InsertOption::at(ContentPosition::End))?,
        }
        if let Some(first) = editor.dom().elements_by_tag(table, "td").first().copied() {
            editor.select_with_fallback(None, first);
        }
        Ok(table)
    })
}

/// Undo one step if possible.
pub fn undo(editor: &mut Editor) -> Result<bool, EditorError> {
    if !editor.can_undo() {
        return Ok(false);
    }
    editor.undo()
}
