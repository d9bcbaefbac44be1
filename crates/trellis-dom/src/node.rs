//! Node handles and per-node storage.

use std::fmt;

use smol_str::SmolStr;

/// Handle to a node inside a [`Document`](crate::Document).
///
/// Handles are only meaningful for the document that created them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Arena slot of this node.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

/// The kind of a node, without its payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeType {
    Element,
    Text,
    Comment,
    Fragment,
}

#[derive(Clone, Debug)]
pub(crate) enum NodeKind {
    Element(ElementData),
    Text(String),
    Comment(String),
    Fragment,
}

impl NodeKind {
    pub(crate) fn node_type(&self) -> NodeType {
        match self {
            NodeKind::Element(_) => NodeType::Element,
            NodeKind::Text(_) => NodeType::Text,
            NodeKind::Comment(_) => NodeType::Comment,
            NodeKind::Fragment => NodeType::Fragment,
        }
    }
}

/// Tag name (lowercase) and attributes in source order.
///
/// The inline style lives in the `style` attribute and is parsed on demand.
#[derive(Clone, Debug)]
pub(crate) struct ElementData {
    pub tag: SmolStr,
    pub attributes: Vec<(SmolStr, String)>,
}

impl ElementData {
    pub(crate) fn new(tag: &str) -> Self {
        Self {
            tag: SmolStr::new(tag.to_ascii_lowercase()),
            attributes: Vec::new(),
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) struct NodeData {
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

/// Parse a `style` attribute into `(property, value)` pairs.
///
/// Property names are lowercased; empty declarations are dropped.
pub(crate) fn parse_style(style: &str) -> Vec<(SmolStr, String)> {
    style
        .split(';')
        .filter_map(|decl| {
            let (prop, value) = decl.split_once(':')?;
            let prop = prop.trim();
            let value = value.trim();
            if prop.is_empty() || value.is_empty() {
                return None;
            }
            Some((SmolStr::new(prop.to_ascii_lowercase()), value.to_string()))
        })
        .collect()
}

pub(crate) fn serialize_style(decls: &[(SmolStr, String)]) -> String {
    decls
        .iter()
        .map(|(prop, value)| format!("{prop}: {value}"))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Byte index of the `char_offset`-th char, clamped to the string length.
pub(crate) fn char_to_byte(s: &str, char_offset: usize) -> usize {
    s.char_indices()
        .nth(char_offset)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}
