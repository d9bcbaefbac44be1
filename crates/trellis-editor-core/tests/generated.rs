//! Generated-input checks: random markup trees and random span tables.
//!
//! The generators only emit markup a browser would keep as written (no
//! misnesting, explicit row groups, spans only when greater than one), so
//! parsing then serializing must give the input back.

use proptest::prelude::*;
use trellis_dom::{Document, NodeId};
use trellis_editor_core::block::next_block;
use trellis_editor_core::{
    Editor, EditorConfig, PluginEvent, TableOperation, UndoManager, VirtualTable, block_at,
    first_block, first_leaf, last_leaf, next_leaf, prev_leaf, should_skip_node,
};

// === Markup generators ===

fn inline() -> impl Strategy<Value = String> {
    let leaf = prop_oneof![
        4 => "[a-z]{1,4}",
        1 => Just("<img>".to_string()),
    ];
    leaf.prop_recursive(2, 8, 3, |inner| {
        (
            prop::sample::select(vec!["b", "i", "span"]),
            prop::collection::vec(inner, 1..=3),
        )
            .prop_map(|(tag, children)| format!("<{tag}>{}</{tag}>", children.concat()))
    })
}

fn inlines() -> impl Strategy<Value = String> {
    prop::collection::vec(inline(), 1..=3).prop_map(|parts| parts.concat())
}

/// Inline content, optionally ended by a `<br>`.
fn run() -> impl Strategy<Value = String> {
    (inlines(), any::<bool>()).prop_map(|(run, br)| if br { run + "<br>" } else { run })
}

fn block() -> impl Strategy<Value = String> {
    let leaf_block = prop_oneof![
        inlines().prop_map(|s| format!("<p>{s}</p>")),
        inlines().prop_map(|s| format!("<div>{s}</div>")),
    ];
    leaf_block.prop_recursive(2, 12, 3, |inner| {
        prop::collection::vec(prop_oneof![inner, run().boxed()], 1..=3)
            .prop_map(|parts| format!("<div>{}</div>", parts.concat()))
    })
}

fn content() -> impl Strategy<Value = String> {
    prop::collection::vec(prop_oneof![block().boxed(), run().boxed()], 1..=4)
        .prop_map(|parts| parts.concat())
}

/// Tile a `rows` x `cols` grid with rectangles, row-major, each as large as
/// its wish allows without covering a taken slot. Returns `(colspan,
/// rowspan)` per cell, per row.
fn tile(rows: usize, cols: usize, wishes: &[(usize, usize)]) -> Vec<Vec<(usize, usize)>> {
    let mut taken = vec![vec![false; cols]; rows];
    let mut out = vec![Vec::new(); rows];
    for r in 0..rows {
        for c in 0..cols {
            if taken[r][c] {
                continue;
            }
            let (want_w, want_h) = wishes[(r * cols + c) % wishes.len()];
            let mut w = 1;
            while w < want_w && c + w < cols && !taken[r][c + w] {
                w += 1;
            }
            let mut h = 1;
            while h < want_h && r + h < rows && (c..c + w).all(|cc| !taken[r + h][cc]) {
                h += 1;
            }
            for row in taken.iter_mut().skip(r).take(h) {
                for slot in row.iter_mut().skip(c).take(w) {
                    *slot = true;
                }
            }
            out[r].push((w, h));
        }
    }
    out
}

/// Rows and span wishes for one row group.
type Section = (usize, Vec<(usize, usize)>);

fn section() -> impl Strategy<Value = Section> {
    (1..=3usize, prop::collection::vec((1..=3usize, 1..=3usize), 12))
}

fn write_section(
    out: &mut String,
    tag: &str,
    cell: &str,
    cols: usize,
    section: &Section,
    label: &mut usize,
) {
    out.push_str(&format!("<{tag}>"));
    for row in tile(section.0, cols, &section.1) {
        out.push_str("<tr>");
        for (colspan, rowspan) in row {
            out.push_str(&format!("<{cell}"));
            if colspan > 1 {
                out.push_str(&format!(" colspan=\"{colspan}\""));
            }
            if rowspan > 1 {
                out.push_str(&format!(" rowspan=\"{rowspan}\""));
            }
            out.push_str(&format!(">c{label}</{cell}>"));
            *label += 1;
        }
        out.push_str("</tr>");
    }
    out.push_str(&format!("</{tag}>"));
}

fn span_table() -> impl Strategy<Value = String> {
    (
        1..=4usize,
        prop::option::of(section()),
        section(),
        prop::option::of(section()),
    )
        .prop_map(|(cols, head, body, foot)| {
            let mut label = 0;
            let mut html = String::from("<table>");
            if let Some(head) = &head {
                write_section(&mut html, "thead", "th", cols, head, &mut label);
            }
            write_section(&mut html, "tbody", "td", cols, &body, &mut label);
            if let Some(foot) = &foot {
                write_section(&mut html, "tfoot", "td", cols, foot, &mut label);
            }
            html.push_str("</table>");
            html
        })
}

fn operation() -> impl Strategy<Value = TableOperation> {
    prop_oneof![
        5 => prop::sample::select(vec![
            TableOperation::InsertAbove,
            TableOperation::InsertBelow,
            TableOperation::InsertLeft,
            TableOperation::InsertRight,
            TableOperation::DeleteTable,
            TableOperation::DeleteColumn,
            TableOperation::DeleteRow,
            TableOperation::MergeAbove,
            TableOperation::MergeBelow,
            TableOperation::MergeLeft,
            TableOperation::MergeRight,
            TableOperation::SplitHorizontally,
            TableOperation::SplitVertically,
        ]),
        1 => (1..500u32).prop_map(TableOperation::SetColumnWidth),
    ]
}

// === Helpers ===

fn leaves(dom: &Document, root: NodeId) -> Vec<NodeId> {
    let mut walked = Vec::new();
    let mut leaf = first_leaf(dom, root);
    while let Some(current) = leaf {
        walked.push(current);
        leaf = next_leaf(dom, root, current);
    }
    walked
}

/// Text of the real cell occupying each grid slot.
fn occupancy(dom: &Document, vtable: &VirtualTable) -> Vec<Vec<String>> {
    let rows = vtable.rows().unwrap_or_default();
    (0..rows.len())
        .map(|r| {
            (0..rows[r].cells.len())
                .map(|c| {
                    let (mut row, mut col) = (r, c);
                    loop {
                        let cell = rows[row].cells[col];
                        if let Some(td) = cell.td {
                            break dom.text_content(td);
                        } else if cell.span_left {
                            col -= 1;
                        } else if cell.span_above {
                            row -= 1;
                        } else {
                            break String::new();
                        }
                    }
                })
                .collect()
        })
        .collect()
}

fn table_of(dom: &Document, root: NodeId) -> Option<NodeId> {
    dom.elements_by_tag(root, "table").first().copied()
}

// === Properties ===

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn test_markup_survives_parse_and_serialize(html in content()) {
        let (dom, root) = Document::from_html(&html);
        prop_assert_eq!(dom.inner_html(root), html);
    }

    #[test]
    fn test_leaf_walk_runs_both_ways(html in content()) {
        let (dom, root) = Document::from_html(&html);
        let walked = leaves(&dom, root);
        prop_assert!(!walked.is_empty());
        prop_assert_eq!(last_leaf(&dom, root), walked.last().copied());
        prop_assert_eq!(prev_leaf(&dom, root, walked[0]), None);
        for pair in walked.windows(2) {
            prop_assert_eq!(prev_leaf(&dom, root, pair[1]), Some(pair[0]));
        }
        for &leaf in &walked {
            prop_assert!(!should_skip_node(&dom, leaf));
        }
    }

    #[test]
    fn test_blocks_partition_leaves(html in content()) {
        let (dom, root) = Document::from_html(&html);
        let walked = leaves(&dom, root);

        let mut covered = Vec::new();
        let mut block = first_block(&dom, root);
        while let Some(current) = block {
            let mut own = Vec::new();
            for node in current.content_nodes(&dom) {
                if dom.has_children(node) {
                    own.extend(
                        dom.descendants(node)
                            .filter(|&n| !dom.has_children(n) && !should_skip_node(&dom, n)),
                    );
                } else if !should_skip_node(&dom, node) {
                    own.push(node);
                }
            }
            // every leaf of a block resolves back to that block
            for &leaf in &own {
                prop_assert_eq!(block_at(&dom, root, leaf), Some(current));
            }
            covered.extend(own);
            block = next_block(&dom, root, &current);
        }
        prop_assert_eq!(covered, walked);
    }

    #[test]
    fn test_undo_restores_markup(first in content(), second in content()) {
        let mut editor = Editor::from_html(&first, EditorConfig::default());
        editor.handle_event(&PluginEvent::EditorReady).unwrap();
        editor.set_content(&second).unwrap();
        editor.add_undo_snapshot().unwrap();

        editor.undo().unwrap();
        prop_assert_eq!(editor.content(), first);
        editor.redo().unwrap();
        prop_assert_eq!(editor.content(), second);
    }

    #[test]
    fn test_table_write_back_is_identity(html in span_table()) {
        let (mut dom, root) = Document::from_html(&html);
        prop_assert_eq!(dom.inner_html(root), html.clone());
        let table = table_of(&dom, root).unwrap();

        let mut vtable = VirtualTable::new(&dom, table).unwrap();
        let grid = occupancy(&dom, &vtable);
        prop_assert!(grid.iter().all(|row| row.len() == grid[0].len()));
        vtable.write_back(&mut dom).unwrap();
        prop_assert_eq!(dom.inner_html(root), html.clone());

        let mut reread = VirtualTable::new(&dom, table).unwrap();
        prop_assert_eq!(occupancy(&dom, &reread), grid);
        reread.write_back(&mut dom).unwrap();
        prop_assert_eq!(dom.inner_html(root), html);
    }

    #[test]
    fn test_table_edit_is_checked_and_settles(
        html in span_table(),
        pick in any::<prop::sample::Index>(),
        operation in operation(),
    ) {
        let (mut dom, root) = Document::from_html(&html);
        let cells: Vec<NodeId> = dom
            .descendants(root)
            .filter(|&n| dom.has_tag(n, "td") || dom.has_tag(n, "th"))
            .collect();
        let cell = *pick.get(&cells);

        let mut vtable = VirtualTable::new(&dom, cell).unwrap();
        let applies = vtable.can_apply(&dom, operation);
        let applied = vtable.edit(&mut dom, operation).unwrap();
        prop_assert_eq!(applies, applied);
        if !applied {
            prop_assert_eq!(dom.inner_html(root), html);
            return Ok(());
        }

        vtable.write_back(&mut dom).unwrap();
        let written = dom.inner_html(root);
        if let Some(table) = table_of(&dom, root) {
            // reading the result back and writing it again changes nothing
            let mut reread = VirtualTable::new(&dom, table).unwrap();
            reread.write_back(&mut dom).unwrap();
            prop_assert_eq!(dom.inner_html(root), written);
        }
    }
}
