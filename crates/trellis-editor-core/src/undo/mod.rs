//! Undo/redo for the editable content.
//!
//! Provides:
//! - `UndoManager` trait for abstracting undo implementations
//! - `UndoSnapshots` - the bounded snapshot stack
//! - `UndoService` - snapshot policy driven by editor events and keystrokes
//! - marker helpers that carry the selection through a snapshot

mod marker;
mod snapshots;

pub use marker::{CURSOR_END_ID, CURSOR_START_ID, build_snapshot, restore_snapshot};
pub use snapshots::UndoSnapshots;

use trellis_dom::{Document, DomError, DomRange, NodeId};

use crate::keyboard::{KeyCombo, KeyOutcome, UndoHint, UndoKeyTracker};

/// Trait for managing undo/redo operations.
///
/// Implementations must actually perform the undo/redo, not just track state.
pub trait UndoManager {
    type Error;

    /// Check if undo is available.
    fn can_undo(&self) -> bool;

    /// Check if redo is available.
    fn can_redo(&self) -> bool;

    /// Perform undo. Returns true if content was restored.
    fn undo(&mut self) -> Result<bool, Self::Error>;

    /// Perform redo. Returns true if content was restored.
    fn redo(&mut self) -> Result<bool, Self::Error>;

    /// Record the current content as an undo step.
    fn add_undo_snapshot(&mut self) -> Result<(), Self::Error>;

    /// Clear all undo/redo history.
    fn clear_history(&mut self);
}

/// The content a snapshot move brought back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Restored {
    /// The selection recorded with the snapshot, if any.
    pub selection: Option<DomRange>,
}

/// Snapshot policy for one editable root.
///
/// Tracks whether content changed since the last snapshot so undo can
/// capture the pending edit first, and classifies keystrokes so runs of
/// typing collapse into single steps.
#[derive(Debug, Clone)]
pub struct UndoService {
    snapshots: UndoSnapshots,
    has_new_content: bool,
    snapshot_pending: bool,
    keys: UndoKeyTracker,
}

impl UndoService {
    pub fn new(max_size: usize) -> Self {
        Self {
            snapshots: UndoSnapshots::new(max_size),
            has_new_content: false,
            snapshot_pending: false,
            keys: UndoKeyTracker::new(),
        }
    }

    pub fn snapshots(&self) -> &UndoSnapshots {
        &self.snapshots
    }

    pub fn has_new_content(&self) -> bool {
        self.has_new_content
    }

    pub fn can_undo(&self) -> bool {
        self.has_new_content || self.snapshots.can_move(-1)
    }

    pub fn can_redo(&self) -> bool {
        !self.has_new_content && self.snapshots.can_move(1)
    }

    /// Serialize `root` with `selection` and push it.
    ///
    /// Returns `false` when the content matched the current snapshot.
    pub fn snapshot(
        &mut self,
        dom: &mut Document,
        root: NodeId,
        selection: Option<&DomRange>,
    ) -> Result<bool, DomError> {
        let html = build_snapshot(dom, root, selection)?;
        self.has_new_content = false;
        self.snapshot_pending = false;
        let pushed = self.snapshots.add(html);
        if pushed {
            tracing::debug!(
                target: "trellis::undo",
                index = ?self.snapshots.current_index(),
                total_size = self.snapshots.total_size(),
                "snapshot pushed"
            );
        }
        Ok(pushed)
    }

    /// Step back one snapshot, first capturing any pending edit.
    pub fn undo(
        &mut self,
        dom: &mut Document,
        root: NodeId,
        selection: Option<&DomRange>,
    ) -> Result<Option<Restored>, DomError> {
        if self.has_new_content {
            self.snapshot(dom, root, selection)?;
        }
        self.restore(dom, root, -1)
    }

    pub fn redo(&mut self, dom: &mut Document, root: NodeId) -> Result<Option<Restored>, DomError> {
        self.restore(dom, root, 1)
    }

    fn restore(
        &mut self,
        dom: &mut Document,
        root: NodeId,
        delta: isize,
    ) -> Result<Option<Restored>, DomError> {
        let Some(html) = self.snapshots.move_by(delta).map(str::to_owned) else {
            return Ok(None);
        };
        let selection = restore_snapshot(dom, root, &html)?;
        self.has_new_content = false;
        tracing::debug!(
            target: "trellis::undo",
            delta,
            index = ?self.snapshots.current_index(),
            "snapshot restored"
        );
        Ok(Some(Restored { selection }))
    }

    /// Content changed by something other than undo itself.
    pub fn mark_changed(&mut self) {
        self.snapshots.clear_redo();
        self.has_new_content = true;
    }

    pub fn clear(&mut self) {
        self.snapshots.clear();
        self.has_new_content = false;
        self.snapshot_pending = false;
    }

    /// Take the snapshot a previous Enter asked for once its edit landed.
    pub fn flush_pending(
        &mut self,
        dom: &mut Document,
        root: NodeId,
        selection: Option<&DomRange>,
    ) -> Result<(), DomError> {
        if self.snapshot_pending {
            self.snapshot(dom, root, selection)?;
        }
        Ok(())
    }

    pub fn on_key_down(
        &mut self,
        dom: &mut Document,
        root: NodeId,
        selection: Option<&DomRange>,
        combo: &KeyCombo,
    ) -> Result<(), DomError> {
        let collapsed = selection.is_none_or(DomRange::is_collapsed);
        let outcome = self.keys.on_key_down(combo, collapsed);
        self.apply(dom, root, selection, outcome)
    }

    pub fn on_key_press(
        &mut self,
        dom: &mut Document,
        root: NodeId,
        selection: Option<&DomRange>,
        combo: &KeyCombo,
    ) -> Result<(), DomError> {
        let collapsed = selection.is_none_or(DomRange::is_collapsed);
        let outcome = self.keys.on_key_press(combo, collapsed);
        self.apply(dom, root, selection, outcome)
    }

    fn apply(
        &mut self,
        dom: &mut Document,
        root: NodeId,
        selection: Option<&DomRange>,
        outcome: KeyOutcome,
    ) -> Result<(), DomError> {
        match outcome.hint {
            UndoHint::Snapshot => {
                self.snapshot(dom, root, selection)?;
            }
            UndoHint::SnapshotIfDirty if self.has_new_content => {
                self.snapshot(dom, root, selection)?;
            }
            UndoHint::ClearRedo => self.snapshots.clear_redo(),
            UndoHint::SnapshotIfDirty | UndoHint::None => {}
        }
        if outcome.marks_dirty {
            self.has_new_content = true;
        }
        if outcome.snapshot_after {
            self.snapshot_pending = true;
        }
        Ok(())
    }
}
