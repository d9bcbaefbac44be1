//! Error types for the editor core.
//!
//! Resolution failures are not errors: lookups return `None` and edits that
//! do not apply return `false`. `EditorError` only covers tree corruption
//! and use of a torn-down session.

use miette::Diagnostic;
use trellis_dom::DomError;

/// Errors from editor operations.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
#[non_exhaustive]
pub enum EditorError {
    /// A tree mutation was rejected by the document.
    #[error(transparent)]
    #[diagnostic(code(trellis::editor::dom))]
    Dom(#[from] DomError),

    /// The editor session was already disposed.
    #[error("editor has been disposed")]
    #[diagnostic(code(trellis::editor::disposed))]
    Disposed,

    /// Custom data under `key` was stored with a different type.
    #[error("custom data {key:?} holds a different type")]
    #[diagnostic(code(trellis::editor::custom_data_type))]
    CustomDataType { key: String },
}
