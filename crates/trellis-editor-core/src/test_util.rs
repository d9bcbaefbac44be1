//! Fixture helpers shared by unit tests.

use trellis_dom::{Document, NodeId};

/// First text node under `root` whose data is exactly `text`.
pub(crate) fn find_text(dom: &Document, root: NodeId, text: &str) -> NodeId {
    dom.descendants(root)
        .find(|&n| dom.is_text(n) && dom.text(n) == Some(text))
        .unwrap_or_else(|| panic!("no text node {text:?}"))
}

/// The `index`-th element with `tag` under `root`.
pub(crate) fn nth_tag(dom: &Document, root: NodeId, tag: &str, index: usize) -> NodeId {
    dom.elements_by_tag(root, tag)
        .get(index)
        .copied()
        .unwrap_or_else(|| panic!("no <{tag}> #{index}"))
}
