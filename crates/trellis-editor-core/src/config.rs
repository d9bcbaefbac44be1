//! Editor configuration.

use serde::{Deserialize, Serialize};

/// Default ceiling for the undo stack, in characters across all snapshots.
pub const DEFAULT_UNDO_MAX_SIZE: usize = 10_000_000;

/// Tunables for an editor session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Total characters the undo stack may hold before evicting old entries.
    pub undo_max_size: usize,
    /// Keep an existing undo history when the editor reports ready.
    pub preserve_snapshots: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            undo_max_size: DEFAULT_UNDO_MAX_SIZE,
            preserve_snapshots: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: EditorConfig = serde_json::from_str(r#"{"preserve_snapshots": true}"#).unwrap();
        assert!(config.preserve_snapshots);
        assert_eq!(config.undo_max_size, DEFAULT_UNDO_MAX_SIZE);
    }
}
