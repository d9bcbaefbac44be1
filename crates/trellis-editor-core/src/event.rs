//! Events the host feeds into an editor session.

use crate::keyboard::KeyCombo;

/// Where a content change came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeSource {
    /// Undo or redo restored a snapshot.
    Undo,
    /// A formatting command.
    Format,
    /// Direct user input the host applied itself.
    Input,
    Paste,
}

/// An event from the host's editing surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PluginEvent {
    /// The editable root is attached and populated.
    EditorReady,
    /// A key went down, before its default action.
    KeyDown(KeyCombo),
    /// A character-producing key press, before its default action.
    KeyPress(KeyCombo),
    /// An IME composition committed its text.
    CompositionEnd,
    /// Content changed through some path other than a keystroke.
    ContentChanged { source: ChangeSource },
    MouseDown,
    /// The session is about to be torn down.
    BeforeDispose,
}
