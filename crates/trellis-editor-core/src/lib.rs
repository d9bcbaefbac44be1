//! trellis-editor-core: the content model of a rich-text editor.
//!
//! This crate maps a live [`trellis_dom::Document`] subtree (the editable
//! root) to a traversable model of blocks and inlines, and back:
//! - `leaf` - meaningful-leaf navigation
//! - `point` - normalized `EditorPoint` positions
//! - `inline` / `block` - inline and block element resolution
//! - `selection` / `scoper` / `traverser` - scoped, ordered traversal
//! - `table` - the `VirtualTable` span grid and structural edits
//! - `undo` - marker-based snapshots and the keystroke classifier
//! - `editor` - the session that owns selection, undo and custom data
//!
//! Every algorithm takes the document by reference per call; nothing here
//! holds a borrow of the tree between calls.

pub mod block;
pub mod commands;
pub mod config;
pub mod editor;
pub mod error;
pub mod event;
pub mod inline;
pub mod keyboard;
pub mod leaf;
pub mod point;
pub mod scoper;
pub mod selection;
pub mod table;
pub mod traverser;
pub mod undo;

#[cfg(test)]
pub(crate) mod test_util;

pub use block::{BlockElement, block_at, first_block, last_block};
pub use config::EditorConfig;
pub use editor::{ContentScope, Editor, InsertOption};
pub use error::EditorError;
pub use event::{ChangeSource, PluginEvent};
pub use inline::{
    InlineElement, InlineKind, InlineResolver, InlineResolvers, NodeInlineElement,
    PartialInlineElement, inline_at,
};
pub use keyboard::{Key, KeyCombo, Modifiers};
pub use leaf::{first_leaf, is_block_element, last_leaf, next_leaf, prev_leaf, should_skip_node};
pub use point::EditorPoint;
pub use scoper::{BodyScoper, ContentPosition, SelectionBlockScoper, SelectionScoper, TraversingScoper};
pub use selection::EditorSelection;
pub use table::{TableEdit, TableOperation, VirtualTable, VirtualTableCell};
pub use traverser::ContentTraverser;
pub use undo::{UndoManager, UndoService, UndoSnapshots};
