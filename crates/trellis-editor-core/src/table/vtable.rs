//! The virtual grid behind table edits.

use trellis_dom::{Document, DomError, NodeId};

use super::TableOperation;

/// One grid slot: a real cell, or a placeholder covered by the span of a
/// cell to the left and/or above.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VirtualTableCell {
    pub td: Option<NodeId>,
    pub span_left: bool,
    pub span_above: bool,
}

impl VirtualTableCell {
    pub fn real(td: NodeId) -> Self {
        Self {
            td: Some(td),
            span_left: false,
            span_above: false,
        }
    }

    pub fn placeholder(span_left: bool, span_above: bool) -> Self {
        Self {
            td: None,
            span_left,
            span_above,
        }
    }

    pub fn is_real(&self) -> bool {
        self.td.is_some()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VirtualTableRow {
    pub tr: NodeId,
    /// The `thead`/`tbody`/`tfoot` (or the table itself) the row goes back
    /// into on write-back.
    pub section: NodeId,
    pub cells: Vec<VirtualTableCell>,
}

/// A table read into a rectangular grid of [`VirtualTableCell`]s.
///
/// `rows` is `None` once the whole table has been deleted.
#[derive(Clone, Debug)]
pub struct VirtualTable {
    table: NodeId,
    original_rows: Vec<NodeId>,
    rows: Option<Vec<VirtualTableRow>>,
    row: usize,
    col: usize,
}

impl VirtualTable {
    /// Read the table holding `node`.
    ///
    /// `node` may be a cell, anything inside one, or the table itself, in
    /// which case the first cell is current. `None` outside any table.
    pub fn new(dom: &Document, node: NodeId) -> Option<Self> {
        let table = std::iter::once(node)
            .chain(dom.ancestors(node))
            .find(|&n| dom.has_tag(n, "table"))?;
        let current = std::iter::once(node)
            .chain(dom.ancestors(node))
            .take_while(|&n| n != table)
            .find(|&n| dom.has_tag(n, "td") || dom.has_tag(n, "th"));

        let trs = table_rows(dom, table);

        let mut grid: Vec<Vec<Option<VirtualTableCell>>> = vec![Vec::new(); trs.len()];
        let (mut row, mut col) = (0, 0);
        for (r, &tr) in trs.iter().enumerate() {
            let mut target = 0;
            for &td in dom
                .children(tr)
                .iter()
                .filter(|&&c| dom.has_tag(c, "td") || dom.has_tag(c, "th"))
            {
                while grid[r].get(target).is_some_and(Option::is_some) {
                    target += 1;
                }
                if current == Some(td) {
                    row = r;
                    col = target;
                }
                let row_span = dom.row_span(td).min(trs.len() - r);
                for dc in 0..dom.col_span(td) {
                    for dr in 0..row_span {
                        let slot = if dc == 0 && dr == 0 {
                            VirtualTableCell::real(td)
                        } else {
                            VirtualTableCell::placeholder(dc > 0, dr > 0)
                        };
                        let cells = &mut grid[r + dr];
                        if cells.len() <= target {
                            cells.resize(target + 1, None);
                        }
                        cells[target] = Some(slot);
                    }
                    target += 1;
                }
            }
        }

        let width = grid.iter().map(Vec::len).max().unwrap_or(0);
        let rows = trs
            .iter()
            .zip(grid)
            .map(|(&tr, cells)| {
                let mut cells: Vec<VirtualTableCell> =
                    cells.into_iter().map(Option::unwrap_or_default).collect();
                cells.resize(width, VirtualTableCell::default());
                VirtualTableRow {
                    tr,
                    section: dom.parent(tr).unwrap_or(table),
                    cells,
                }
            })
            .collect();

        Some(Self {
            table,
            original_rows: trs,
            rows: Some(rows),
            row,
            col,
        })
    }

    pub fn table(&self) -> NodeId {
        self.table
    }

    pub fn rows(&self) -> Option<&[VirtualTableRow]> {
        self.rows.as_deref()
    }

    /// Grid coordinates of the current cell.
    pub fn position(&self) -> (usize, usize) {
        (self.row, self.col)
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&VirtualTableCell> {
        self.rows.as_ref()?.get(row)?.cells.get(col)
    }

    /// Whether `operation` would change anything, checked without touching
    /// the grid or the document.
    pub fn can_apply(&self, dom: &Document, operation: TableOperation) -> bool {
        let (row, col) = (self.row, self.col);
        let Some(rows) = self.rows.as_deref() else {
            return false;
        };
        let Some(current) = rows.get(row).and_then(|r| r.cells.get(col)) else {
            return false;
        };
        match operation {
            TableOperation::MergeAbove | TableOperation::MergeBelow => {
                let forward = operation == TableOperation::MergeBelow;
                vertical_merge(dom, rows, row, col, forward).is_some()
            }
            TableOperation::MergeLeft | TableOperation::MergeRight => {
                let forward = operation == TableOperation::MergeRight;
                horizontal_merge(dom, rows, row, col, forward).is_some()
            }
            TableOperation::SplitVertically => current.td.is_some_and(|td| {
                dom.row_span(td) == 1 || rows.get(row + 1).is_some_and(|r| col < r.cells.len())
            }),
            TableOperation::SplitHorizontally => current
                .td
                .is_some_and(|td| dom.col_span(td) == 1 || col + 1 < rows[row].cells.len()),
            _ => true,
        }
    }

    /// Apply `operation` to the grid. The document is only touched for
    /// cloned cells, merged content and column widths.
    ///
    /// Returns `false` when the edit does not apply; the grid and the
    /// document are then unchanged.
    pub fn edit(&mut self, dom: &mut Document, operation: TableOperation) -> Result<bool, DomError> {
        let (row, col) = (self.row, self.col);
        let Some(rows) = self.rows.as_mut() else {
            return Ok(false);
        };
        let Some(current) = rows.get(row).and_then(|r| r.cells.get(col)).copied() else {
            return Ok(false);
        };

        let applied = match operation {
            TableOperation::InsertAbove | TableOperation::InsertBelow => {
                let source = &rows[row];
                let tr = dom.clone_node(source.tr, false);
                let cells = source
                    .cells
                    .iter()
                    .map(|cell| clone_cell(dom, cell))
                    .collect::<Result<Vec<_>, _>>()?;
                let at = if operation == TableOperation::InsertAbove {
                    row
                } else {
                    row + 1
                };
                let section = source.section;
                rows.insert(at, VirtualTableRow { tr, section, cells });
                true
            }
            TableOperation::InsertLeft | TableOperation::InsertRight => {
                let at = if operation == TableOperation::InsertLeft {
                    col
                } else {
                    col + 1
                };
                for r in rows.iter_mut() {
                    let cell = clone_cell(dom, &r.cells[col])?;
                    r.cells.insert(at, cell);
                }
                true
            }
            TableOperation::DeleteRow => {
                let removed = rows.remove(row);
                // the row below becomes the top edge of spans crossing the deleted one
                if let Some(below) = rows.get_mut(row) {
                    for (cell, next) in removed.cells.iter().zip(below.cells.iter_mut()) {
                        if !cell.span_above && next.span_above {
                            next.span_above = false;
                            next.td = cell.td;
                        }
                    }
                }
                true
            }
            TableOperation::DeleteColumn => {
                for r in rows.iter_mut() {
                    let cell = r.cells[col];
                    if !cell.span_left {
                        if let Some(next) = r.cells.get_mut(col + 1).filter(|c| c.span_left) {
                            next.span_left = false;
                            next.td = cell.td;
                        }
                    }
                    r.cells.remove(col);
                }
                true
            }
            TableOperation::MergeAbove | TableOperation::MergeBelow => {
                let forward = operation == TableOperation::MergeBelow;
                let Some((above, below, below_row)) = vertical_merge(dom, rows, row, col, forward)
                else {
                    return Ok(false);
                };
                dom.move_children(below, Some(above))?;
                rows[below_row].cells[col] = VirtualTableCell::placeholder(false, true);
                true
            }
            TableOperation::MergeLeft | TableOperation::MergeRight => {
                let forward = operation == TableOperation::MergeRight;
                let Some((left, right, right_col)) = horizontal_merge(dom, rows, row, col, forward)
                else {
                    return Ok(false);
                };
                dom.move_children(right, Some(left))?;
                rows[row].cells[right_col] = VirtualTableCell::placeholder(true, false);
                true
            }
            TableOperation::DeleteTable => {
                self.rows = None;
                true
            }
            TableOperation::SplitVertically => {
                let Some(td) = current.td else {
                    return Ok(false);
                };
                if dom.row_span(td) > 1 {
                    let copy = clone_td(dom, td)?;
                    match rows.get_mut(row + 1).and_then(|r| r.cells.get_mut(col)) {
                        Some(slot) => slot.td = Some(copy),
                        None => return Ok(false),
                    }
                } else {
                    let source = &rows[row];
                    let tr = dom.clone_node(source.tr, false);
                    let mut cells = Vec::with_capacity(source.cells.len());
                    for (i, cell) in source.cells.iter().enumerate() {
                        cells.push(if i == col {
                            VirtualTableCell::real(clone_td(dom, td)?)
                        } else {
                            VirtualTableCell::placeholder(cell.span_left, true)
                        });
                    }
                    let section = source.section;
                    rows.insert(row + 1, VirtualTableRow { tr, section, cells });
                }
                true
            }
            TableOperation::SplitHorizontally => {
                let Some(td) = current.td else {
                    return Ok(false);
                };
                if dom.col_span(td) > 1 {
                    let copy = clone_td(dom, td)?;
                    match rows[row].cells.get_mut(col + 1) {
                        Some(slot) => slot.td = Some(copy),
                        None => return Ok(false),
                    }
                } else {
                    for (r, vrow) in rows.iter_mut().enumerate() {
                        let cell = if r == row {
                            VirtualTableCell::real(clone_td(dom, td)?)
                        } else {
                            VirtualTableCell::placeholder(true, vrow.cells[col].span_above)
                        };
                        vrow.cells.insert(col + 1, cell);
                    }
                }
                true
            }
            TableOperation::SetColumnWidth(px) => {
                let width = format!("{px}px");
                for td in rows.iter().filter_map(|r| r.cells[col].td) {
                    dom.set_style(td, "width", &width);
                }
                true
            }
        };

        tracing::debug!(target: "trellis::table", ?operation, row, col, applied, "table edit");
        Ok(applied)
    }

    /// Rebuild the table from the grid.
    ///
    /// Every row is emptied and refilled with its real cells, with
    /// `colspan`/`rowspan` recomputed from the placeholders, then put back
    /// into its own row group. A deleted or cell-less table is detached
    /// instead.
    pub fn write_back(&mut self, dom: &mut Document) -> Result<(), DomError> {
        let has_cells = self
            .rows
            .as_ref()
            .is_some_and(|rows| rows.iter().any(|r| !r.cells.is_empty()));
        if !has_cells {
            tracing::debug!(target: "trellis::table", table = %self.table, "table removed");
            self.rows = None;
            dom.detach(self.table);
            return Ok(());
        }
        let Some(rows) = &self.rows else {
            return Ok(());
        };

        let mut sections: Vec<NodeId> = Vec::new();
        for &tr in &self.original_rows {
            if let Some(section) = dom.parent(tr) {
                if section != self.table && !sections.contains(&section) {
                    sections.push(section);
                }
            }
            dom.detach(tr);
        }
        for (r, vrow) in rows.iter().enumerate() {
            dom.move_children(vrow.tr, None)?;
            dom.append_child(vrow.section, vrow.tr)?;
            for (c, cell) in vrow.cells.iter().enumerate() {
                if let Some(td) = cell.td {
                    recalc_spans(dom, rows, td, r, c);
                    dom.append_child(vrow.tr, td)?;
                }
            }
        }
        // a row group whose rows were all deleted goes too
        for section in sections {
            if !dom.children(section).iter().any(|&c| dom.has_tag(c, "tr")) {
                dom.detach(section);
            }
        }
        self.original_rows = rows.iter().map(|r| r.tr).collect();

        tracing::debug!(
            target: "trellis::table",
            table = %self.table,
            rows = rows.len(),
            "table written back"
        );
        Ok(())
    }

    /// The real cell at the tracked position after edits.
    ///
    /// The position is clamped into the grid, then walks left over
    /// `span_left` and up over `span_above` placeholders.
    pub fn current_cell(&self) -> Option<NodeId> {
        let rows = self.rows.as_ref()?;
        let mut row = self.row.min(rows.len().checked_sub(1)?);
        let mut col = self.col.min(rows[row].cells.len().checked_sub(1)?);
        loop {
            let cell = rows.get(row)?.cells.get(col)?;
            if let Some(td) = cell.td {
                return Some(td);
            } else if cell.span_left && col > 0 {
                col -= 1;
            } else if cell.span_above && row > 0 {
                row -= 1;
            } else {
                return None;
            }
        }
    }
}

/// `<tr>`s of `table` in order, looking through row groups but not into
/// nested tables.
fn table_rows(dom: &Document, table: NodeId) -> Vec<NodeId> {
    let mut rows = Vec::new();
    for &child in dom.children(table) {
        if dom.has_tag(child, "tr") {
            rows.push(child);
        } else if ["thead", "tbody", "tfoot"]
            .iter()
            .any(|t| dom.has_tag(child, t))
        {
            rows.extend(
                dom.children(child)
                    .iter()
                    .copied()
                    .filter(|&c| dom.has_tag(c, "tr")),
            );
        }
    }
    rows
}

/// The cells a vertical merge from `(row, col)` joins, as
/// `(above, below, below_row)`. `None` when there is no partner or the
/// column spans differ.
fn vertical_merge(
    dom: &Document,
    rows: &[VirtualTableRow],
    row: usize,
    col: usize,
    forward: bool,
) -> Option<(NodeId, NodeId, usize)> {
    let current_td = rows[row].cells[col].td?;
    let other = find_real(row, rows.len(), forward, |r| rows[r].cells[col])?;
    let other_td = rows[other].cells[col].td?;
    let (above, below, below_row) = if other < row {
        (other_td, current_td, row)
    } else {
        (current_td, other_td, other)
    };
    if dom.col_span(above) != dom.col_span(below) {
        tracing::debug!(
            target: "trellis::table",
            above = %above,
            below = %below,
            "merge refused: column spans differ"
        );
        return None;
    }
    Some((above, below, below_row))
}

/// The cells a horizontal merge from `(row, col)` joins, as
/// `(left, right, right_col)`.
fn horizontal_merge(
    dom: &Document,
    rows: &[VirtualTableRow],
    row: usize,
    col: usize,
    forward: bool,
) -> Option<(NodeId, NodeId, usize)> {
    let cells = &rows[row].cells;
    let current_td = cells[col].td?;
    let other = find_real(col, cells.len(), forward, |c| cells[c])?;
    let other_td = cells[other].td?;
    let (left, right, right_col) = if other < col {
        (other_td, current_td, col)
    } else {
        (current_td, other_td, other)
    };
    if dom.row_span(left) != dom.row_span(right) {
        tracing::debug!(
            target: "trellis::table",
            left = %left,
            right = %right,
            "merge refused: row spans differ"
        );
        return None;
    }
    Some((left, right, right_col))
}

/// Walk from `from` one step at a time until a slot holds a real cell.
fn find_real(
    from: usize,
    len: usize,
    forward: bool,
    slot: impl Fn(usize) -> VirtualTableCell,
) -> Option<usize> {
    let mut index = from;
    loop {
        index = if forward {
            index.checked_add(1).filter(|&i| i < len)?
        } else {
            index.checked_sub(1)?
        };
        if slot(index).is_real() {
            return Some(index);
        }
    }
}

/// Shallow copy of a cell element with a `<br>` so it renders with height.
fn clone_td(dom: &mut Document, td: NodeId) -> Result<NodeId, DomError> {
    let copy = dom.clone_node(td, false);
    let br = dom.create_element("br");
    dom.append_child(copy, br)?;
    Ok(copy)
}

fn clone_cell(dom: &mut Document, cell: &VirtualTableCell) -> Result<VirtualTableCell, DomError> {
    let td = cell.td.map(|td| clone_td(dom, td)).transpose()?;
    Ok(VirtualTableCell { td, ..*cell })
}

fn recalc_spans(dom: &mut Document, rows: &[VirtualTableRow], td: NodeId, row: usize, col: usize) {
    dom.remove_attribute(td, "colspan");
    dom.remove_attribute(td, "rowspan");
    let col_span = 1 + rows[row].cells[col + 1..]
        .iter()
        .take_while(|c| !c.is_real() && c.span_left)
        .count();
    let row_span = 1 + rows[row + 1..]
        .iter()
        .map_while(|r| r.cells.get(col))
        .take_while(|c| !c.is_real() && c.span_above)
        .count();
    if col_span > 1 {
        dom.set_attribute(td, "colspan", col_span.to_string());
    }
    if row_span > 1 {
        dom.set_attribute(td, "rowspan", row_span.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{find_text, nth_tag};
    use pretty_assertions::assert_eq;

    fn cell_text(dom: &Document, vtable: &VirtualTable) -> Vec<Vec<String>> {
        vtable
            .rows()
            .unwrap_or_default()
            .iter()
            .map(|r| {
                r.cells
                    .iter()
                    .map(|c| match (c.td, c.span_left, c.span_above) {
                        (Some(td), _, _) => dom.text_content(td),
                        (None, true, true) => "<^".to_string(),
                        (None, true, false) => "<".to_string(),
                        (None, false, true) => "^".to_string(),
                        (None, false, false) => "-".to_string(),
                    })
                    .collect()
            })
            .collect()
    }

    fn table_at(html: &str, text: &str) -> (Document, NodeId, NodeId) {
        let (dom, root) = Document::from_html(html);
        let td = dom
            .parent(find_text(&dom, root, text))
            .expect("text sits in a cell");
        (dom, root, td)
    }

    #[test]
    fn test_build_expands_spans() {
        let (dom, _, td) = table_at(
            "<table><tbody><tr><td colspan=\"2\">a</td><td rowspan=\"2\">b</td></tr><tr><td>c</td><td>d</td></tr></tbody></table>",
            "d",
        );
        let vtable = VirtualTable::new(&dom, td).unwrap();
        assert_eq!(
            cell_text(&dom, &vtable),
            vec![vec!["a", "<", "b"], vec!["c", "d", "^"]]
        );
        assert_eq!(vtable.position(), (1, 1));
    }

    #[test]
    fn test_build_from_table_node_and_sections() {
        let (dom, root) = Document::from_html(
            "<table><thead><tr><th>h</th></tr></thead><tbody><tr><td>x</td></tr></tbody></table>",
        );
        let table = nth_tag(&dom, root, "table", 0);
        let vtable = VirtualTable::new(&dom, table).unwrap();
        assert_eq!(cell_text(&dom, &vtable), vec![vec!["h"], vec!["x"]]);
        assert_eq!(vtable.position(), (0, 0));
        assert_eq!(vtable.current_cell(), Some(nth_tag(&dom, root, "th", 0)));
    }

    #[test]
    fn test_write_back_keeps_row_groups() {
        let html = "<table><thead><tr><th>h</th></tr></thead>\
                    <tbody><tr><td>x</td></tr></tbody>\
                    <tfoot><tr><td>f</td></tr></tfoot></table>";
        let (mut dom, root, td) = table_at(html, "x");
        let mut vtable = VirtualTable::new(&dom, td).unwrap();
        vtable.write_back(&mut dom).unwrap();
        assert_eq!(dom.inner_html(root), html);

        assert!(vtable.edit(&mut dom, TableOperation::InsertAbove).unwrap());
        vtable.write_back(&mut dom).unwrap();
        insta::assert_snapshot!(dom.inner_html(root), @"<table><thead><tr><th>h</th></tr></thead><tbody><tr><td><br></td></tr><tr><td>x</td></tr></tbody><tfoot><tr><td>f</td></tr></tfoot></table>");
    }

    #[test]
    fn test_deleting_only_header_row_drops_thead() {
        let (mut dom, root, th) = table_at(
            "<table><thead><tr><th>h</th></tr></thead><tbody><tr><td>x</td></tr></tbody></table>",
            "h",
        );
        let mut vtable = VirtualTable::new(&dom, th).unwrap();
        assert!(vtable.edit(&mut dom, TableOperation::DeleteRow).unwrap());
        vtable.write_back(&mut dom).unwrap();
        insta::assert_snapshot!(dom.inner_html(root), @"<table><tbody><tr><td>x</td></tr></tbody></table>");
    }

    #[test]
    fn test_outside_table_is_none() {
        let (dom, root) = Document::from_html("<p>x</p>");
        assert!(VirtualTable::new(&dom, find_text(&dom, root, "x")).is_none());
    }

    #[test]
    fn test_insert_below_clones_row() {
        let (mut dom, root, td) = table_at(
            "<table><tbody><tr><td>a</td><td>b</td></tr></tbody></table>",
            "a",
        );
        let mut vtable = VirtualTable::new(&dom, td).unwrap();
        assert!(vtable.edit(&mut dom, TableOperation::InsertBelow).unwrap());
        vtable.write_back(&mut dom).unwrap();
        insta::assert_snapshot!(dom.inner_html(root), @"<table><tbody><tr><td>a</td><td>b</td></tr><tr><td><br></td><td><br></td></tr></tbody></table>");
        assert_eq!(vtable.current_cell(), Some(td));
    }

    #[test]
    fn test_delete_row_promotes_row_span() {
        let (mut dom, root, td) = table_at(
            "<table><tbody><tr><td rowspan=\"2\">a</td><td>b</td></tr><tr><td>c</td></tr></tbody></table>",
            "b",
        );
        let mut vtable = VirtualTable::new(&dom, td).unwrap();
        assert!(vtable.edit(&mut dom, TableOperation::DeleteRow).unwrap());
        assert_eq!(cell_text(&dom, &vtable), vec![vec!["a", "c"]]);
        vtable.write_back(&mut dom).unwrap();
        insta::assert_snapshot!(dom.inner_html(root), @"<table><tbody><tr><td>a</td><td>c</td></tr></tbody></table>");
    }

    #[test]
    fn test_delete_column_moves_span_edge() {
        let (mut dom, root, td) = table_at(
            "<table><tbody><tr><td>a</td><td colspan=\"2\" rowspan=\"2\">x</td></tr><tr><td>y</td></tr></tbody></table>",
            "x",
        );
        let mut vtable = VirtualTable::new(&dom, td).unwrap();
        assert!(vtable.edit(&mut dom, TableOperation::DeleteColumn).unwrap());
        assert_eq!(cell_text(&dom, &vtable), vec![vec!["a", "x"], vec!["y", "^"]]);
        vtable.write_back(&mut dom).unwrap();
        insta::assert_snapshot!(dom.inner_html(root), @r#"<table><tbody><tr><td>a</td><td rowspan="2">x</td></tr><tr><td>y</td></tr></tbody></table>"#);
    }

    #[test]
    fn test_delete_row_moves_span_edge() {
        let (mut dom, root, td) = table_at(
            "<table><tbody><tr><td colspan=\"2\" rowspan=\"2\">x</td><td>a</td></tr><tr><td>b</td></tr><tr><td>c</td><td>d</td><td>e</td></tr></tbody></table>",
            "a",
        );
        let mut vtable = VirtualTable::new(&dom, td).unwrap();
        assert!(vtable.edit(&mut dom, TableOperation::DeleteRow).unwrap());
        assert_eq!(
            cell_text(&dom, &vtable),
            vec![vec!["x", "<", "b"], vec!["c", "d", "e"]]
        );
        vtable.write_back(&mut dom).unwrap();
        insta::assert_snapshot!(dom.inner_html(root), @r#"<table><tbody><tr><td colspan="2">x</td><td>b</td></tr><tr><td>c</td><td>d</td><td>e</td></tr></tbody></table>"#);
    }

    #[test]
    fn test_merge_right_moves_content() {
        let (mut dom, root, td) = table_at(
            "<table><tbody><tr><td>a</td><td>b</td></tr></tbody></table>",
            "a",
        );
        let mut vtable = VirtualTable::new(&dom, td).unwrap();
        assert!(vtable.edit(&mut dom, TableOperation::MergeRight).unwrap());
        vtable.write_back(&mut dom).unwrap();
        insta::assert_snapshot!(dom.inner_html(root), @r#"<table><tbody><tr><td colspan="2">ab</td></tr></tbody></table>"#);
    }

    #[test]
    fn test_merge_at_edge_is_refused() {
        let (mut dom, _, td) = table_at("<table><tbody><tr><td>a</td></tr></tbody></table>", "a");
        let mut vtable = VirtualTable::new(&dom, td).unwrap();
        assert!(!vtable.edit(&mut dom, TableOperation::MergeAbove).unwrap());
        assert!(!vtable.edit(&mut dom, TableOperation::MergeLeft).unwrap());
    }

    #[test]
    fn test_can_apply_matches_edit() {
        let (mut dom, _, td) = table_at(
            "<table><tbody><tr><td colspan=\"2\">a</td></tr><tr><td>b</td><td>c</td></tr></tbody></table>",
            "b",
        );
        let vtable = VirtualTable::new(&dom, td).unwrap();
        assert!(!vtable.can_apply(&dom, TableOperation::MergeAbove));
        assert!(!vtable.can_apply(&dom, TableOperation::MergeLeft));
        assert!(vtable.can_apply(&dom, TableOperation::MergeRight));
        assert!(vtable.can_apply(&dom, TableOperation::DeleteRow));

        let mut edited = vtable.clone();
        assert!(!edited.edit(&mut dom, TableOperation::MergeAbove).unwrap());
        assert_eq!(cell_text(&dom, &edited), cell_text(&dom, &vtable));
    }

    #[test]
    fn test_huge_spans_are_clamped() {
        let (dom, _, td) = table_at(
            "<table><tbody><tr><td colspan=\"100000000\" rowspan=\"100000000\">a</td></tr></tbody></table>",
            "a",
        );
        let vtable = VirtualTable::new(&dom, td).unwrap();
        let rows = vtable.rows().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].cells.len(), trellis_dom::MAX_COL_SPAN);
    }

    #[test]
    fn test_split_vertically_adds_row() {
        let (mut dom, root, td) = table_at(
            "<table><tbody><tr><td>a</td><td>b</td></tr></tbody></table>",
            "a",
        );
        let mut vtable = VirtualTable::new(&dom, td).unwrap();
        assert!(vtable.edit(&mut dom, TableOperation::SplitVertically).unwrap());
        assert_eq!(cell_text(&dom, &vtable), vec![vec!["a", "b"], vec!["", "^"]]);
        vtable.write_back(&mut dom).unwrap();
        insta::assert_snapshot!(dom.inner_html(root), @r#"<table><tbody><tr><td>a</td><td rowspan="2">b</td></tr><tr><td><br></td></tr></tbody></table>"#);
    }

    #[test]
    fn test_split_horizontally_unspans() {
        let (mut dom, root, td) = table_at(
            "<table><tbody><tr><td colspan=\"2\">a</td></tr><tr><td>b</td><td>c</td></tr></tbody></table>",
            "a",
        );
        let mut vtable = VirtualTable::new(&dom, td).unwrap();
        assert!(vtable.edit(&mut dom, TableOperation::SplitHorizontally).unwrap());
        vtable.write_back(&mut dom).unwrap();
        insta::assert_snapshot!(dom.inner_html(root), @"<table><tbody><tr><td>a</td><td><br></td></tr><tr><td>b</td><td>c</td></tr></tbody></table>");
    }

    #[test]
    fn test_set_column_width() {
        let (mut dom, root, td) = table_at(
            "<table><tbody><tr><td>a</td><td>b</td></tr><tr><td>c</td><td>d</td></tr></tbody></table>",
            "b",
        );
        let mut vtable = VirtualTable::new(&dom, td).unwrap();
        assert!(vtable.edit(&mut dom, TableOperation::SetColumnWidth(80)).unwrap());
        vtable.write_back(&mut dom).unwrap();
        insta::assert_snapshot!(dom.inner_html(root), @r#"<table><tbody><tr><td>a</td><td style="width: 80px">b</td></tr><tr><td>c</td><td style="width: 80px">d</td></tr></tbody></table>"#);
    }

    #[test]
    fn test_delete_table_detaches() {
        let (mut dom, root, td) = table_at(
            "<p>x</p><table><tbody><tr><td>a</td></tr></tbody></table>",
            "a",
        );
        let mut vtable = VirtualTable::new(&dom, td).unwrap();
        assert!(vtable.edit(&mut dom, TableOperation::DeleteTable).unwrap());
        vtable.write_back(&mut dom).unwrap();
        assert_eq!(dom.inner_html(root), "<p>x</p>");
        assert_eq!(vtable.current_cell(), None);
    }

    #[test]
    fn test_deleting_last_column_removes_table() {
        let (mut dom, root, td) = table_at(
            "<table><tbody><tr><td>a</td></tr><tr><td>b</td></tr></tbody></table>",
            "a",
        );
        let mut vtable = VirtualTable::new(&dom, td).unwrap();
        assert!(vtable.edit(&mut dom, TableOperation::DeleteColumn).unwrap());
        vtable.write_back(&mut dom).unwrap();
        assert_eq!(dom.inner_html(root), "");
        assert!(vtable.rows().is_none());
    }

    #[test]
    fn test_current_cell_walks_over_placeholders() {
        let (mut dom, _, td) = table_at(
            "<table><tbody><tr><td>a</td><td>b</td></tr><tr><td colspan=\"2\">c</td></tr></tbody></table>",
            "b",
        );
        let c = dom.parent(find_text(&dom, dom.root_of(td), "c")).unwrap();
        let mut vtable = VirtualTable::new(&dom, td).unwrap();
        assert!(vtable.edit(&mut dom, TableOperation::DeleteRow).unwrap());
        // (0, 1) is now the span placeholder of "c"
        assert_eq!(vtable.current_cell(), Some(c));
    }
}
