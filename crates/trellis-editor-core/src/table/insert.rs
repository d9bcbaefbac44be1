//! New table construction.

use trellis_dom::{Document, DomError, NodeId};

/// Default cell width for a table with `columns` columns.
pub fn cell_width(columns: usize) -> &'static str {
    match columns {
        0..=4 => "120px",
        5..=6 => "100px",
        _ => "70px",
    }
}

/// Build a detached `columns` x `rows` table of empty cells in one
/// `tbody`, shaped the way the parser would build it from its markup.
///
/// Each cell holds a `<br>` so it renders with height.
pub fn create_table(dom: &mut Document, columns: usize, rows: usize) -> Result<NodeId, DomError> {
    let table = dom.create_element("table");
    dom.set_attribute(table, "cellspacing", "0");
    dom.set_attribute(table, "cellpadding", "1");
    let tbody = dom.create_element("tbody");
    dom.append_child(table, tbody)?;
    let width = cell_width(columns);
    for _ in 0..rows {
        let tr = dom.create_element("tr");
        dom.append_child(tbody, tr)?;
        for _ in 0..columns {
            let td = dom.create_element("td");
            dom.set_style(td, "width", width);
            let br = dom.create_element("br");
            dom.append_child(td, br)?;
            dom.append_child(tr, td)?;
        }
    }
    Ok(table)
}
