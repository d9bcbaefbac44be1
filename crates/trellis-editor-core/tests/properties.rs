//! Behavioural properties of the content model, exercised through the
//! public API only.

use pretty_assertions::assert_eq;
use trellis_dom::{Document, DomRange, NodeId};
use trellis_editor_core::block::next_block;
use trellis_editor_core::{
    BlockElement, ChangeSource, Editor, EditorConfig, EditorPoint, EditorSelection, PluginEvent,
    TableOperation, UndoManager, UndoSnapshots, VirtualTable, block_at, first_block, first_leaf,
    next_leaf, should_skip_node,
};

fn text_node(dom: &Document, root: NodeId, text: &str) -> NodeId {
    dom.descendants(root)
        .find(|&n| dom.is_text(n) && dom.text(n) == Some(text))
        .unwrap_or_else(|| panic!("no text node {text:?}"))
}

fn first_td(dom: &Document, root: NodeId) -> NodeId {
    dom.elements_by_tag(root, "td")[0]
}

fn cell_with(dom: &Document, root: NodeId, text: &str) -> NodeId {
    dom.parent(text_node(dom, root, text)).unwrap()
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

// === Leaves and blocks ===

#[test]
fn test_leaf_walk_skips_invisible_nodes() {
    let (dom, root) = Document::from_html(
        "<p>a<!--note--></p>\n<span style=\"display: none\"></span><b>b</b><br><img>",
    );
    let mut leaves = Vec::new();
    let mut leaf = first_leaf(&dom, root);
    while let Some(current) = leaf {
        assert!(!should_skip_node(&dom, current));
        leaves.push(current);
        leaf = next_leaf(&dom, root, current);
    }
    let expected = vec![
        text_node(&dom, root, "a"),
        text_node(&dom, root, "b"),
        dom.elements_by_tag(root, "br")[0],
        dom.elements_by_tag(root, "img")[0],
    ];
    assert_eq!(leaves, expected);
}

#[test]
fn test_blocks_partition_leaves() {
    let (dom, root) =
        Document::from_html("<p>one</p>two<br>three<div><b>four</b> five</div><p><i>six</i></p>");

    let mut walked = Vec::new();
    let mut leaf = first_leaf(&dom, root);
    while let Some(current) = leaf {
        walked.push(current);
        leaf = next_leaf(&dom, root, current);
    }

    let mut covered = Vec::new();
    let mut block = first_block(&dom, root);
    while let Some(current) = block {
        for node in current.content_nodes(&dom) {
            if dom.has_children(node) {
                covered.extend(
                    dom.descendants(node)
                        .filter(|&n| !dom.has_children(n) && !should_skip_node(&dom, n)),
                );
            } else if !should_skip_node(&dom, node) {
                covered.push(node);
            }
        }
        block = next_block(&dom, root, &current);
    }
    assert_eq!(covered, walked);
}

#[test]
fn test_partial_inlines_round_trip() {
    let (dom, root) = Document::from_html("<p>hello world</p>");
    let text = text_node(&dom, root, "hello world");
    let range = DomRange::from_nodes(text, 5, text, 5);
    let selection = EditorSelection::new(&dom, root, &range);
    let point = EditorPoint::new(text, 5);

    let before = selection.inline_before_point(&dom, point).unwrap();
    let after = selection.inline_after_point(&dom, point).unwrap();
    assert!(before.is_partial() && after.is_partial());
    assert_eq!(before.text_content(&dom), "hello");
    assert_eq!(after.text_content(&dom), " world");
    assert_eq!(
        format!("{}{}", before.text_content(&dom), after.text_content(&dom)),
        "hello world"
    );
}

#[test]
fn test_selection_across_paragraphs_scopes_blocks() {
    let (dom, root) = Document::from_html("<div><p>AAA</p><p>BBB</p><p>CCC</p></div>");
    let a = text_node(&dom, root, "AAA");
    let b = text_node(&dom, root, "BBB");
    let c = text_node(&dom, root, "CCC");
    let selection = EditorSelection::new(&dom, root, &DomRange::from_nodes(a, 1, b, 2));

    let block_of = |node| block_at(&dom, root, node).unwrap();
    assert!(selection.is_block_in_scope(&dom, &block_of(a)));
    assert!(selection.is_block_in_scope(&dom, &block_of(b)));
    assert!(!selection.is_block_in_scope(&dom, &block_of(c)));
    assert!(matches!(block_of(c), BlockElement::Node(_)));
}

// === Tables ===

#[test]
fn test_table_write_back_keeps_occupancy() {
    let (mut dom, root) = Document::from_html(
        "<table><tbody>\
         <tr><td rowspan=\"2\" colspan=\"1\">a</td><td colspan=\"2\">b</td></tr>\
         <tr><td>c</td><td rowspan=\"1\">d</td></tr>\
         </tbody></table>",
    );
    let td = first_td(&dom, root);
    let mut before = VirtualTable::new(&dom, td).unwrap();
    let grid = occupancy(&dom, &before);
    assert_eq!(grid, vec![vec!["a", "b", "b"], vec!["a", "c", "d"]]);

    before.write_back(&mut dom).unwrap();
    insta::assert_snapshot!(dom.inner_html(root), @r#"<table><tbody><tr><td rowspan="2">a</td><td colspan="2">b</td></tr><tr><td>c</td><td>d</td></tr></tbody></table>"#);
    let after = VirtualTable::new(&dom, first_td(&dom, root)).unwrap();
    assert_eq!(occupancy(&dom, &after), grid);
}

#[test]
fn test_merge_with_unequal_spans_changes_nothing() {
    let (mut dom, root) = Document::from_html(
        "<table><tbody><tr><td colspan=\"2\">a</td></tr><tr><td>b</td><td>c</td></tr></tbody></table>",
    );
    let html = dom.inner_html(root);
    let b = cell_with(&dom, root, "b");
    let mut vtable = VirtualTable::new(&dom, b).unwrap();
    let rows = vtable.rows().map(<[_]>::to_vec);

    assert!(!vtable.edit(&mut dom, TableOperation::MergeAbove).unwrap());
    assert_eq!(vtable.rows().map(<[_]>::to_vec), rows);
    assert_eq!(dom.inner_html(root), html);

    let a = cell_with(&dom, root, "a");
    let mut vtable = VirtualTable::new(&dom, a).unwrap();
    assert!(!vtable.edit(&mut dom, TableOperation::MergeBelow).unwrap());
    assert_eq!(dom.inner_html(root), html);
}

#[test]
fn test_insert_left_keeps_existing_span() {
    let (mut dom, root) = Document::from_html(
        "<table><tbody><tr><td colspan=\"2\">A</td></tr><tr><td>C</td><td>D</td></tr></tbody></table>",
    );
    let a = cell_with(&dom, root, "A");
    let mut vtable = VirtualTable::new(&dom, a).unwrap();
    assert!(vtable.edit(&mut dom, TableOperation::InsertLeft).unwrap());
    vtable.write_back(&mut dom).unwrap();

    insta::assert_snapshot!(dom.inner_html(root), @r#"<table><tbody><tr><td><br></td><td colspan="2">A</td></tr><tr><td><br></td><td>C</td><td>D</td></tr></tbody></table>"#);
    assert_eq!(vtable.cell(0, 1).and_then(|c| c.td), Some(a));
    assert!(vtable.cell(0, 2).is_some_and(|c| c.span_left));
    assert_eq!(
        occupancy(&dom, &vtable),
        vec![vec!["", "A", "A"], vec!["", "C", "D"]]
    );
}

#[test]
fn test_delete_column_promotes_spanning_cell() {
    let (mut dom, root) = Document::from_html(
        "<table><tbody><tr><td>a</td><td colspan=\"2\">b</td></tr>\
         <tr><td>c</td><td>d</td><td>e</td></tr></tbody></table>",
    );
    let b = cell_with(&dom, root, "b");
    let mut vtable = VirtualTable::new(&dom, b).unwrap();
    assert!(vtable.edit(&mut dom, TableOperation::DeleteColumn).unwrap());
    vtable.write_back(&mut dom).unwrap();

    insta::assert_snapshot!(dom.inner_html(root), @"<table><tbody><tr><td>a</td><td>b</td></tr><tr><td>c</td><td>e</td></tr></tbody></table>");
    assert_eq!(vtable.current_cell(), Some(b));
}

// === Undo ===

#[test]
fn test_undo_moves_round_trip() {
    let mut snapshots = UndoSnapshots::new(1_000);
    for content in ["<p>0</p>", "<p>1</p>", "<p>2</p>", "<p>3</p>"] {
        snapshots.add(content.to_string());
    }
    for k in 0..snapshots.len() {
        let start = snapshots.current().map(str::to_owned);
        for _ in 0..k {
            assert!(snapshots.move_by(-1).is_some());
        }
        for _ in 0..k {
            assert!(snapshots.move_by(1).is_some());
        }
        assert_eq!(snapshots.current().map(str::to_owned), start);
    }
    assert_eq!(snapshots.move_by(1), None);
    assert_eq!(snapshots.current(), Some("<p>3</p>"));
}

#[test]
fn test_editor_undo_round_trip() {
    let mut editor = Editor::from_html("<p>v0</p>", EditorConfig::default());
    editor.handle_event(&PluginEvent::EditorReady).unwrap();
    for version in 1..=3 {
        editor.set_content(&format!("<p>v{version}</p>")).unwrap();
        editor.add_undo_snapshot().unwrap();
    }
    while editor.can_undo() {
        assert!(editor.undo().unwrap());
    }
    assert_eq!(editor.content(), "<p>v0</p>");
    while editor.can_redo() {
        assert!(editor.redo().unwrap());
    }
    assert_eq!(editor.content(), "<p>v3</p>");

    assert!(editor.undo().unwrap());
    editor
        .handle_event(&PluginEvent::ContentChanged {
            source: ChangeSource::Undo,
        })
        .unwrap();
    assert!(editor.can_redo());
    editor
        .handle_event(&PluginEvent::ContentChanged {
            source: ChangeSource::Input,
        })
        .unwrap();
    assert!(!editor.can_redo());
}

#[test]
fn test_undo_restores_nested_lists_and_row_groups() {
    let recorded = "<ul><li>a<ul><li>b</li><li>c</li></ul></li><li>d</li></ul>\
                    <table><thead><tr><th>h</th></tr></thead><tbody><tr><td><p>x</p></td></tr></tbody></table>";
    let mut editor = Editor::from_html(recorded, EditorConfig::default());
    assert_eq!(editor.content(), recorded);
    editor.handle_event(&PluginEvent::EditorReady).unwrap();
    editor.set_content("<p>replaced</p>").unwrap();
    editor.add_undo_snapshot().unwrap();

    assert!(editor.undo().unwrap());
    assert_eq!(editor.content(), recorded);
}
