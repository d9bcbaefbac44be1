//! Selection markers embedded in serialized snapshots.
//!
//! A snapshot is the root's inner HTML with two empty marker spans placed
//! at the selection edges. Restoring parses the HTML back, turns the
//! markers into a range and removes them.

use trellis_dom::{Document, DomError, DomRange, NodeId, Position};

use crate::point::EditorPoint;

pub const CURSOR_START_ID: &str = "cursor-start";
pub const CURSOR_END_ID: &str = "cursor-end";

/// Serialize `root`, recording `selection` as markers.
///
/// The live tree is left as it was: markers are removed and any text split
/// to place them is merged back. A selection outside `root` is ignored.
pub fn build_snapshot(
    dom: &mut Document,
    root: NodeId,
    selection: Option<&DomRange>,
) -> Result<String, DomError> {
    let Some(range) = selection.filter(|r| r.is_within(dom, root)) else {
        return Ok(dom.inner_html(root));
    };
    let range = range.ordered(dom);
    let start = EditorPoint::from_position(dom, range.start);
    let end = EditorPoint::from_position(dom, range.end);

    let start_marker = create_marker(dom, CURSOR_START_ID);
    let end_marker = create_marker(dom, CURSOR_END_ID);
    let mut splits = Vec::new();
    if range.is_collapsed() {
        splits.extend(start.insert_node(dom, root, start_marker)?);
        dom.insert_after(start_marker, end_marker)?;
    } else {
        // end first, so the split cannot move the start offset
        splits.extend(end.insert_node(dom, root, end_marker)?);
        splits.extend(start.insert_node(dom, root, start_marker)?);
    }

    let html = dom.inner_html(root);

    dom.detach(start_marker);
    dom.detach(end_marker);
    for (head, tail) in splits.into_iter().rev() {
        dom.merge_text(head, tail)?;
    }
    Ok(html)
}

/// Replace the content of `root` with `html` and recover the range the
/// markers recorded, removing them.
pub fn restore_snapshot(
    dom: &mut Document,
    root: NodeId,
    html: &str,
) -> Result<Option<DomRange>, DomError> {
    dom.set_inner_html(root, html)?;
    let start = match dom.element_by_id(root, CURSOR_START_ID) {
        Some(marker) => remove_marker(dom, marker)?,
        None => None,
    };
    let end = match dom.element_by_id(root, CURSOR_END_ID) {
        Some(marker) => remove_marker(dom, marker)?,
        None => None,
    };
    Ok(match (start, end) {
        (Some(start), Some(end)) => Some(DomRange::new(start, end)),
        (Some(at), None) | (None, Some(at)) => Some(DomRange::collapsed(at)),
        (None, None) => None,
    })
}

fn create_marker(dom: &mut Document, id: &str) -> NodeId {
    let marker = dom.create_element("span");
    dom.set_attribute(marker, "id", id);
    marker
}

/// Detach `marker` and return the boundary point it occupied, joining the
/// text on either side into one node.
fn remove_marker(dom: &mut Document, marker: NodeId) -> Result<Option<Position>, DomError> {
    let Some(parent) = dom.parent(marker) else {
        return Ok(None);
    };
    let index = dom.index_in_parent(marker).unwrap_or(0);
    let prev = dom.prev_sibling(marker).filter(|&n| dom.is_text(n));
    let next = dom.next_sibling(marker).filter(|&n| dom.is_text(n));
    dom.detach(marker);
    let position = match (prev, next) {
        (Some(prev), Some(next)) => {
            let offset = dom.text_len(prev);
            dom.merge_text(prev, next)?;
            Position::new(prev, offset)
        }
        (Some(prev), None) => Position::new(prev, dom.text_len(prev)),
        (None, Some(next)) => Position::new(next, 0),
        (None, None) => Position::new(parent, index),
    };
    Ok(Some(position))
}
