//! Table editing through a span-aware virtual grid.
//!
//! An HTML table is read into a [`VirtualTable`] where every grid slot is
//! either a real cell or a placeholder covered by a neighbour's span. Edits
//! rewrite the grid; write-back rebuilds the rows and recomputes spans.

mod insert;
mod vtable;

pub use insert::{cell_width, create_table};
pub use vtable::{VirtualTable, VirtualTableCell, VirtualTableRow};

use trellis_dom::{Document, DomError, NodeId};

/// Structural edits on the table around the current cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TableOperation {
    /// Insert a row above the current row.
    InsertAbove,
    /// Insert a row below the current row.
    InsertBelow,
    /// Insert a column left of the current column.
    InsertLeft,
    /// Insert a column right of the current column.
    InsertRight,
    /// Remove the whole table.
    DeleteTable,
    DeleteColumn,
    DeleteRow,
    /// Merge the current cell with the nearest real cell above.
    MergeAbove,
    MergeBelow,
    MergeLeft,
    MergeRight,
    /// Split the current cell into two side by side.
    SplitHorizontally,
    /// Split the current cell into two stacked.
    SplitVertically,
    /// Set every cell of the current column to this width in pixels.
    SetColumnWidth(u32),
}

/// What [`edit_table`] did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TableEdit {
    /// The edit was written back. `current` is the cell the cursor should
    /// land in, `None` when nothing is left there.
    Applied { current: Option<NodeId> },
    /// The edit does not apply; the document is unchanged.
    Refused,
}

/// Apply `operation` to the table holding `cell` and write it back.
pub fn edit_table(
    dom: &mut Document,
    cell: NodeId,
    operation: TableOperation,
) -> Result<TableEdit, DomError> {
    let Some(mut vtable) = VirtualTable::new(dom, cell) else {
        return Ok(TableEdit::Refused);
    };
    if !vtable.edit(dom, operation)? {
        return Ok(TableEdit::Refused);
    }
    vtable.write_back(dom)?;
    Ok(TableEdit::Applied {
        current: vtable.current_cell(),
    })
}
