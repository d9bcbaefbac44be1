//! The editor session.
//!
//! `Editor` owns the document, the editable root, the live selection, the
//! undo history and per-session custom data. Plugins and commands reach the
//! content model through it; it never hands out long-lived borrows of the
//! tree.
//!
//! Custom data disposers run exactly once, when the session is disposed
//! explicitly or dropped.

use std::any::Any;
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::fmt;
use std::rc::Rc;

use trellis_dom::{Document, DomRange, NodeId, Position};

use crate::config::EditorConfig;
use crate::error::EditorError;
use crate::event::{ChangeSource, PluginEvent};
use crate::inline::{InlineResolver, InlineResolvers};
use crate::point::EditorPoint;
use crate::scoper::ContentPosition;
use crate::selection::EditorSelection;
use crate::traverser::ContentTraverser;
use crate::undo::{UndoManager, UndoService};

/// What a [`ContentTraverser`] from [`Editor::content_traverser`] walks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ContentScope {
    /// Everything under the root.
    #[default]
    Body,
    /// The selected content, trimmed at the selection edges.
    Selection,
    /// The block holding the selection start.
    Block,
}

/// Where [`Editor::insert_node`] puts the node.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InsertOption {
    pub position: ContentPosition,
    /// Collapse the selection right after the inserted node.
    pub update_cursor: bool,
}

impl InsertOption {
    pub fn at(position: ContentPosition) -> Self {
        Self {
            position,
            update_cursor: false,
        }
    }

    pub fn with_cursor(mut self) -> Self {
        self.update_cursor = true;
        self
    }
}

type Disposer = Box<dyn FnOnce(Box<dyn Any>)>;

struct CustomData {
    value: Box<dyn Any>,
    disposer: Option<Disposer>,
}

impl CustomData {
    fn new<T: 'static>(value: T, disposer: Option<Box<dyn FnOnce(T)>>) -> Self {
        Self {
            value: Box::new(value),
            disposer: disposer.map(|dispose| -> Disposer {
                Box::new(move |value: Box<dyn Any>| {
                    if let Ok(value) = value.downcast::<T>() {
                        dispose(*value);
                    }
                })
            }),
        }
    }

    fn dispose(self) {
        if let Some(disposer) = self.disposer {
            disposer(self.value);
        }
    }
}

/// An editing session over one editable root.
pub struct Editor {
    dom: Document,
    root: NodeId,
    selection: Option<DomRange>,
    undo: UndoService,
    resolvers: InlineResolvers,
    custom_data: BTreeMap<String, CustomData>,
    config: EditorConfig,
    focused: bool,
    disposed: bool,
}

impl fmt::Debug for Editor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Editor")
            .field("root", &self.root)
            .field("selection", &self.selection)
            .field("undo", &self.undo)
            .field("custom_data", &self.custom_data.keys().collect::<Vec<_>>())
            .field("focused", &self.focused)
            .field("disposed", &self.disposed)
            .finish_non_exhaustive()
    }
}

impl Editor {
    pub fn new(dom: Document, root: NodeId, config: EditorConfig) -> Self {
        Self {
            dom,
            root,
            selection: None,
            undo: UndoService::new(config.undo_max_size),
            resolvers: InlineResolvers::new(),
            custom_data: BTreeMap::new(),
            config,
            focused: false,
            disposed: false,
        }
    }

    /// A session over a fresh root holding `html`.
    pub fn from_html(html: &str, config: EditorConfig) -> Self {
        let (dom, root) = Document::from_html(html);
        Self::new(dom, root, config)
    }

    fn ensure_alive(&self) -> Result<(), EditorError> {
        if self.disposed {
            Err(EditorError::Disposed)
        } else {
            Ok(())
        }
    }

    // === Content ===

    pub fn dom(&self) -> &Document {
        &self.dom
    }

    /// Direct tree access. Report edits made here with
    /// [`PluginEvent::ContentChanged`].
    pub fn dom_mut(&mut self) -> &mut Document {
        &mut self.dom
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn undo_service(&self) -> &UndoService {
        &self.undo
    }

    pub fn content(&self) -> String {
        self.dom.inner_html(self.root)
    }

    /// Replace the whole content. The selection is dropped.
    pub fn set_content(&mut self, html: &str) -> Result<(), EditorError> {
        self.ensure_alive()?;
        self.dom.set_inner_html(self.root, html)?;
        self.selection = None;
        self.undo.mark_changed();
        Ok(())
    }

    /// Add a custom inline resolver, ranked after the ones already added.
    pub fn register_inline_resolver(&mut self, resolver: Rc<dyn InlineResolver>) {
        self.resolvers.push(resolver);
    }

    pub fn resolvers(&self) -> &InlineResolvers {
        &self.resolvers
    }

    // === Focus ===

    /// Take focus, placing the cursor at the start of the content when
    /// there is no usable selection.
    pub fn focus(&mut self) -> Result<(), EditorError> {
        self.ensure_alive()?;
        if self.selection_range().is_none() {
            let start = EditorPoint::start_of(&self.dom, self.root).to_position(&self.dom);
            self.selection = Some(DomRange::collapsed(start));
        }
        self.focused = true;
        Ok(())
    }

    pub fn blur(&mut self) {
        self.focused = false;
    }

    pub fn has_focus(&self) -> bool {
        self.focused && !self.disposed
    }

    // === Selection ===

    /// `node` is strictly inside the editable root.
    pub fn contains(&self, node: NodeId) -> bool {
        node != self.root && self.dom.contains(self.root, node)
    }

    /// The live selection, if it is still inside the root.
    pub fn selection_range(&self) -> Option<DomRange> {
        self.selection
            .filter(|range| range.is_within(&self.dom, self.root))
    }

    /// Make `range` the live selection. Ranges reaching outside the root
    /// are refused.
    pub fn select(&mut self, range: DomRange) -> bool {
        if self.disposed || !range.is_within(&self.dom, self.root) {
            tracing::debug!(
                target: "trellis::editor",
                start = %range.start.node,
                end = %range.end.node,
                "selection outside editable root rejected"
            );
            return false;
        }
        self.selection = Some(range.ordered(&self.dom));
        true
    }

    /// Select `range`, or the start of `fallback` when `range` is not
    /// usable.
    pub fn select_with_fallback(&mut self, range: Option<DomRange>, fallback: NodeId) -> bool {
        if let Some(range) = range {
            if self.select(range) {
                return true;
            }
        }
        if !self.dom.contains(self.root, fallback) {
            return false;
        }
        let start = EditorPoint::start_of(&self.dom, fallback).to_position(&self.dom);
        self.select(DomRange::collapsed(start))
    }

    /// The live selection as an [`EditorSelection`].
    pub fn selection(&self) -> Option<EditorSelection> {
        let range = self.selection_range()?;
        Some(EditorSelection::with_resolvers(
            &self.dom,
            self.root,
            &range,
            self.resolvers.clone(),
        ))
    }

    /// Nearest element at the selection start with one of `tags`.
    pub fn node_at_cursor(&self, tags: &[&str]) -> Option<NodeId> {
        let range = self.selection_range()?;
        self.dom.closest(self.root, range.start.node, tags)
    }

    // === Insertion and traversal ===

    /// Insert a detached `node` into the content.
    ///
    /// [`ContentPosition::SelectionStart`] without a usable selection
    /// inserts at the end.
    pub fn insert_node(&mut self, node: NodeId, option: InsertOption) -> Result<(), EditorError> {
        self.ensure_alive()?;
        let at_selection = match option.position {
            ContentPosition::SelectionStart => self.selection_range(),
            _ => None,
        };
        match (option.position, at_selection) {
            (ContentPosition::Begin, _) => {
                let first = self.dom.first_child(self.root);
                self.dom.insert_before(self.root, node, first)?;
            }
            (ContentPosition::SelectionStart, Some(range)) => {
                let point = EditorPoint::from_position(&self.dom, range.start);
                point.insert_node(&mut self.dom, self.root, node)?;
            }
            (ContentPosition::End | ContentPosition::SelectionStart, _) => {
                self.dom.append_child(self.root, node)?;
            }
        }
        if option.update_cursor {
            if let Some(after) = Position::after(&self.dom, node) {
                self.selection = Some(DomRange::collapsed(after));
            }
        }
        Ok(())
    }

    /// A traverser over `scope`.
    ///
    /// Selection and block scopes need a selection; without one this is
    /// `None`. `position` only matters for [`ContentScope::Block`].
    pub fn content_traverser(
        &self,
        scope: ContentScope,
        position: ContentPosition,
    ) -> Option<ContentTraverser> {
        let resolvers = self.resolvers.clone();
        match scope {
            ContentScope::Body => Some(ContentTraverser::body(self.root, resolvers)),
            ContentScope::Selection => {
                let range = self.selection_range()?;
                Some(ContentTraverser::selection(
                    &self.dom, self.root, &range, resolvers,
                ))
            }
            ContentScope::Block => {
                let range = self.selection_range()?;
                Some(ContentTraverser::block_at_selection(
                    &self.dom, self.root, &range, position, resolvers,
                ))
            }
        }
    }

    /// Run `edit` between two undo snapshots so it undoes as one step.
    pub fn format_with_undo<R>(
        &mut self,
        edit: impl FnOnce(&mut Editor) -> Result<R, EditorError>,
    ) -> Result<R, EditorError> {
        self.add_undo_snapshot()?;
        let result = edit(self)?;
        self.add_undo_snapshot()?;
        Ok(result)
    }

    // === Events ===

    /// Feed a host event to the session.
    pub fn handle_event(&mut self, event: &PluginEvent) -> Result<(), EditorError> {
        self.ensure_alive()?;
        let selection = self.selection_range();
        self.undo
            .flush_pending(&mut self.dom, self.root, selection.as_ref())?;
        match event {
            PluginEvent::EditorReady => {
                if !self.config.preserve_snapshots {
                    self.undo.clear();
                }
                self.undo
                    .snapshot(&mut self.dom, self.root, selection.as_ref())?;
            }
            PluginEvent::KeyDown(combo) => {
                self.undo
                    .on_key_down(&mut self.dom, self.root, selection.as_ref(), combo)?;
            }
            PluginEvent::KeyPress(combo) => {
                self.undo
                    .on_key_press(&mut self.dom, self.root, selection.as_ref(), combo)?;
            }
            PluginEvent::CompositionEnd => {
                self.undo.mark_changed();
                self.undo
                    .snapshot(&mut self.dom, self.root, selection.as_ref())?;
            }
            PluginEvent::ContentChanged { source } => match source {
                ChangeSource::Undo => {}
                ChangeSource::Paste => {
                    self.undo.mark_changed();
                    self.undo
                        .snapshot(&mut self.dom, self.root, selection.as_ref())?;
                }
                ChangeSource::Format | ChangeSource::Input => self.undo.mark_changed(),
            },
            PluginEvent::MouseDown | PluginEvent::BeforeDispose => {}
        }
        Ok(())
    }

    // === Custom data ===

    /// Session-scoped value under `key`, created by `factory` on first use.
    ///
    /// `disposer` runs once with the value when the session is disposed.
    /// It is only recorded when the value is created.
    pub fn get_custom_data<T: 'static>(
        &mut self,
        key: &str,
        factory: impl FnOnce() -> T,
        disposer: Option<Box<dyn FnOnce(T)>>,
    ) -> Result<&mut T, EditorError> {
        self.ensure_alive()?;
        let data = match self.custom_data.entry(key.to_owned()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(CustomData::new(factory(), disposer)),
        };
        data.value
            .downcast_mut::<T>()
            .ok_or_else(|| EditorError::CustomDataType {
                key: key.to_owned(),
            })
    }

    // === Lifetime ===

    /// Tear the session down: run custom data disposers in key order and
    /// drop the undo history. Later calls are no-ops.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        if let Err(error) = self.handle_event(&PluginEvent::BeforeDispose) {
            tracing::warn!(target: "trellis::editor", %error, "flush before dispose failed");
        }
        for (_, data) in std::mem::take(&mut self.custom_data) {
            data.dispose();
        }
        self.undo.clear();
        self.selection = None;
        self.focused = false;
        self.disposed = true;
        tracing::debug!(target: "trellis::editor", root = %self.root, "editor disposed");
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }
}

impl Drop for Editor {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl UndoManager for Editor {
    type Error = EditorError;

    fn can_undo(&self) -> bool {
        !self.disposed && self.undo.can_undo()
    }

    fn can_redo(&self) -> bool {
        !self.disposed && self.undo.can_redo()
    }

    fn undo(&mut self) -> Result<bool, EditorError> {
        self.ensure_alive()?;
        let selection = self.selection_range();
        let restored = self
            .undo
            .undo(&mut self.dom, self.root, selection.as_ref())?;
        Ok(match restored {
            Some(restored) => {
                self.selection = restored.selection;
                true
            }
            None => false,
        })
    }

    fn redo(&mut self) -> Result<bool, EditorError> {
        self.ensure_alive()?;
        let restored = self.undo.redo(&mut self.dom, self.root)?;
        Ok(match restored {
            Some(restored) => {
                self.selection = restored.selection;
                true
            }
            None => false,
        })
    }

    fn add_undo_snapshot(&mut self) -> Result<(), EditorError> {
        self.ensure_alive()?;
        let selection = self.selection_range();
        self.undo
            .snapshot(&mut self.dom, self.root, selection.as_ref())?;
        Ok(())
    }

    fn clear_history(&mut self) {
        self.undo.clear();
    }
}
