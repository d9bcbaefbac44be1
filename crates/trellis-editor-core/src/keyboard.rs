//! Keyboard input and the keystroke classifier that drives undo snapshots.
//!
//! Hosts convert native key events into [`KeyCombo`]s; the classifier
//! decides, per keystroke, whether the undo history should take a snapshot
//! before the key's default action lands.

use smol_str::SmolStr;

/// Key values for keyboard input.
///
/// Platform-agnostic key representation. Platform-specific code converts
/// from native key events to this enum.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    /// A character key.
    Character(SmolStr),

    /// Unknown/unidentified key.
    Unidentified,

    // === Whitespace / editing ===
    Backspace,
    Delete,
    Enter,
    Tab,
    Escape,
    Space,
    Insert,

    // === Navigation ===
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    Home,
    End,
    PageUp,
    PageDown,

    // === Modifiers ===
    Alt,
    CapsLock,
    Control,
    Meta,
    Shift,

    // === Function keys ===
    F1,
    F2,
    F3,
    F4,
    F5,
    F6,
    F7,
    F8,
    F9,
    F10,
    F11,
    F12,
}

impl Key {
    /// Create a character key.
    pub fn character(s: impl Into<SmolStr>) -> Self {
        Self::Character(s.into())
    }

    /// Map a legacy DOM `keyCode` to a key.
    ///
    /// Letters map to lowercase characters, digits to themselves.
    pub fn from_key_code(code: u32) -> Self {
        match code {
            8 => Self::Backspace,
            9 => Self::Tab,
            13 => Self::Enter,
            16 => Self::Shift,
            17 => Self::Control,
            18 => Self::Alt,
            20 => Self::CapsLock,
            27 => Self::Escape,
            32 => Self::Space,
            33 => Self::PageUp,
            34 => Self::PageDown,
            35 => Self::End,
            36 => Self::Home,
            37 => Self::ArrowLeft,
            38 => Self::ArrowUp,
            39 => Self::ArrowRight,
            40 => Self::ArrowDown,
            45 => Self::Insert,
            46 => Self::Delete,
            91 | 92 | 93 | 224 => Self::Meta,
            48..=57 | 65..=90 => char::from_u32(code)
                .map(|c| Self::character(c.to_ascii_lowercase().to_string()))
                .unwrap_or(Self::Unidentified),
            112 => Self::F1,
            113 => Self::F2,
            114 => Self::F3,
            115 => Self::F4,
            116 => Self::F5,
            117 => Self::F6,
            118 => Self::F7,
            119 => Self::F8,
            120 => Self::F9,
            121 => Self::F10,
            122 => Self::F11,
            123 => Self::F12,
            _ => Self::Unidentified,
        }
    }

    /// Check if this is a navigation key.
    pub fn is_navigation(&self) -> bool {
        matches!(
            self,
            Self::ArrowLeft
                | Self::ArrowRight
                | Self::ArrowUp
                | Self::ArrowDown
                | Self::Home
                | Self::End
                | Self::PageUp
                | Self::PageDown
        )
    }

    /// Check if this is a modifier key.
    pub fn is_modifier(&self) -> bool {
        matches!(
            self,
            Self::Alt | Self::CapsLock | Self::Control | Self::Meta | Self::Shift
        )
    }

    /// Backspace or Delete.
    pub fn is_deletion(&self) -> bool {
        matches!(self, Self::Backspace | Self::Delete)
    }
}

/// Modifier key state for a key combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        ctrl: false,
        alt: false,
        shift: false,
        meta: false,
    };

    pub const CTRL: Self = Self {
        ctrl: true,
        alt: false,
        shift: false,
        meta: false,
    };

    pub const META: Self = Self {
        ctrl: false,
        alt: false,
        shift: false,
        meta: true,
    };

    /// Ctrl, Alt or Meta is held. Shift alone does not count.
    pub fn has_command(&self) -> bool {
        self.ctrl || self.alt || self.meta
    }
}

/// A key plus the modifiers held with it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyCombo {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyCombo {
    pub fn new(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn with_modifiers(key: Key, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }

    pub fn ctrl(key: Key) -> Self {
        Self::with_modifiers(key, Modifiers::CTRL)
    }

    pub fn meta(key: Key) -> Self {
        Self::with_modifiers(key, Modifiers::META)
    }
}

// === Undo classifier ===

/// What the undo history should do before a key's default action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UndoHint {
    /// Take a snapshot now.
    Snapshot,
    /// Take a snapshot only if content changed since the last one.
    SnapshotIfDirty,
    /// Ordinary input: it invalidates the redo branch.
    ClearRedo,
    /// Nothing to do.
    None,
}

/// Classification of one keystroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyOutcome {
    /// Applied before the key's default action.
    pub hint: UndoHint,
    /// Snapshot again once the key's edit has landed.
    pub snapshot_after: bool,
    /// The key edits content.
    pub marks_dirty: bool,
}

impl KeyOutcome {
    const IGNORED: Self = Self {
        hint: UndoHint::None,
        snapshot_after: false,
        marks_dirty: false,
    };
}

/// Remembers the previous editing key so runs of the same key coalesce
/// into one undo step.
#[derive(Debug, Clone, Default)]
pub struct UndoKeyTracker {
    last_key: Option<Key>,
}

impl UndoKeyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_key(&self) -> Option<&Key> {
        self.last_key.as_ref()
    }

    /// Classify a key-down. `collapsed` is the state of the selection.
    ///
    /// Deletions snapshot when they start a new run: a different key than
    /// last time, a range selection, or a command modifier. Navigation ends
    /// a run and snapshots pending edits.
    pub fn on_key_down(&mut self, combo: &KeyCombo, collapsed: bool) -> KeyOutcome {
        let key = &combo.key;
        if key.is_deletion() {
            let new_run = !collapsed
                || self.last_key.as_ref() != Some(key)
                || combo.modifiers.has_command();
            self.last_key = Some(key.clone());
            return KeyOutcome {
                hint: if new_run {
                    UndoHint::Snapshot
                } else {
                    UndoHint::ClearRedo
                },
                snapshot_after: false,
                marks_dirty: true,
            };
        }
        if key.is_navigation() {
            self.last_key = None;
            return KeyOutcome {
                hint: UndoHint::SnapshotIfDirty,
                ..KeyOutcome::IGNORED
            };
        }
        if self.last_key.as_ref().is_some_and(Key::is_deletion) && !key.is_modifier() {
            return KeyOutcome {
                hint: UndoHint::SnapshotIfDirty,
                ..KeyOutcome::IGNORED
            };
        }
        KeyOutcome::IGNORED
    }

    /// Classify a character-producing key press.
    ///
    /// Word boundaries (the first Space of a run, every Enter) and typing
    /// over a range snapshot first; Enter snapshots again afterwards. Other
    /// input just invalidates redo. Presses with Meta held are commands and
    /// are ignored.
    pub fn on_key_press(&mut self, combo: &KeyCombo, collapsed: bool) -> KeyOutcome {
        if combo.modifiers.meta {
            return KeyOutcome::IGNORED;
        }
        let key = &combo.key;
        let is_enter = *key == Key::Enter;
        let boundary = !collapsed
            || is_enter
            || (*key == Key::Space && self.last_key.as_ref() != Some(&Key::Space));
        self.last_key = Some(key.clone());
        KeyOutcome {
            hint: if boundary {
                UndoHint::Snapshot
            } else {
                UndoHint::ClearRedo
            },
            snapshot_after: is_enter,
            marks_dirty: true,
        }
    }
}
