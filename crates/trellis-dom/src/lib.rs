//! trellis-dom: the host document tree the editor core operates on.
//!
//! This crate provides:
//! - `Document` - an arena of nodes addressed by copyable `NodeId` handles
//! - HTML fragment parsing and serialization (`inner_html`, `set_inner_html`)
//! - `Position` / `DomRange` boundary points with document-order comparison
//!
//! Nodes are never freed while the document lives. Detaching a node only
//! unlinks it, so handles held by selections or undo bookkeeping stay valid.

pub mod document;
pub mod error;
pub mod html;
pub mod node;
pub mod range;

pub use document::{Ancestors, Descendants, Document, MAX_COL_SPAN, MAX_ROW_SPAN, VOID_TAGS};
pub use error::DomError;
pub use node::{NodeId, NodeType};
pub use range::{DomRange, Position};
pub use smol_str::SmolStr;
