use super::*;

use crate::doc::{Bound, Document, EMBED_HTML_FLAVOUR, NOTE_FLAVOUR, ParagraphKind};
use crate::host::test_helpers::RecordingTelemetry;
use crate::panel::PanelState;

fn editor() -> Editor {
    Editor::new(Document::new("t"))
}

fn outline() -> MindmapNode {
    MindmapNode::new("Idea", vec![MindmapNode::new("One", Vec::new()), MindmapNode::new("Two", Vec::new())])
}

fn mindmaps(editor: &Editor) -> Vec<Uuid> {
    editor
        .doc
        .elements()
        .filter_map(|e| match e {
            crate::doc::SurfaceElement::Mindmap(m) => Some(m.id),
            crate::doc::SurfaceElement::Shape(_) => None,
        })
        .collect()
}

// =============================================================================
// NOTE
// =============================================================================

#[test]
fn insert_note_goes_below_selection() {
    let mut ed = editor();
    let shape = ed.doc.add_shape(Bound::new(100.0, 100.0, 200.0, 50.0), "source");
    ed.set_selection(vec![shape], false);

    insert_note(&mut ed, Some(&Answer::Text("hello".into())));

    let notes = ed.doc.blocks_by_flavour(NOTE_FLAVOUR);
    assert_eq!(notes.len(), 1);
    assert_eq!(
        notes[0].props,
        BlockProps::Note { xywh: Bound::new(100.0, 170.0, 800.0, 95.0), display_mode: NoteDisplayMode::EdgelessOnly }
    );
    assert_eq!(notes[0].parent, Some(ed.doc.root_id()));
    // note creation and markdown insertion commit separately
    assert_eq!(ed.doc.version(), 2);
}

#[test]
fn failed_markdown_insert_keeps_selection() {
    let mut ed = editor();
    let shape = ed.doc.add_shape(Bound::default(), "source");
    ed.set_selection(vec![shape], false);
    let root = ed.doc.root_id();
    let paragraph = ed
        .doc
        .add_block(BlockProps::Paragraph { kind: ParagraphKind::Text, text: "leaf".into() }, root)
        .unwrap();

    fill_note(&mut ed, paragraph, "- item");

    assert_eq!(ed.selection.elements, vec![shape]);
    assert!(ed.doc.children(paragraph).is_empty());
}

#[test]
fn insert_note_skips_tree_answers() {
    let mut ed = editor();
    insert_note(&mut ed, Some(&Answer::Tree(outline())));
    insert_note(&mut ed, None);
    assert_eq!(ed.doc.version(), 0);
}

// =============================================================================
// EXPAND
// =============================================================================

#[test]
fn expand_defers_panel_hide_even_when_nothing_to_do() {
    let mut ed = editor();
    expand_mindmap(&mut ed, &[], Some(&outline()));
    assert_eq!(ed.pending_tasks(), 1);
    assert_eq!(ed.doc.version(), 0);
}

#[test]
fn expand_ignores_non_mindmap_selection() {
    let mut ed = editor();
    let loose = ed.doc.add_shape(Bound::default(), "loose");
    expand_mindmap(&mut ed, &[loose], Some(&outline()));
    ed.run_pending_tasks();
    assert_eq!(ed.doc.version(), 0);
    assert_eq!(ed.doc.element_count(), 1);
}

#[test]
fn expand_fits_and_lays_out_new_nodes() {
    let mut ed = editor();
    let m = ed.doc.add_mindmap(&MindmapNode::new("root", Vec::new()), MindmapStyle::One);
    let root = ed.doc.mindmap(m).unwrap().tree.element;

    expand_mindmap(&mut ed, &[root], Some(&outline()));
    assert_eq!(ed.doc.version(), 1);
    assert_eq!(ed.pending_tasks(), 2);
    ed.run_pending_tasks();

    let subtree = ed.doc.mindmap_subtree(m, root).unwrap().clone();
    assert_eq!(subtree.children.len(), 2);
    let one = ed.doc.shape(subtree.children[0].element).unwrap();
    assert_eq!(one.text, "One");
    assert_eq!((one.xywh.w, one.xywh.h), crate::doc::mindmap::content_size("One", one.font_size));
    assert_eq!(ed.selection.elements, vec![root]);
}

// =============================================================================
// BRAINSTORM
// =============================================================================

#[test]
fn brainstorm_without_tree_keeps_existing_mindmap() {
    let mut ed = editor();
    let telemetry = RecordingTelemetry::default();
    let m = ed.doc.add_mindmap(&outline(), MindmapStyle::One);
    let root = ed.doc.mindmap(m).unwrap().tree.element;

    brainstorm_mindmap(&mut ed, &telemetry, &[root], None, MindmapStyle::One);

    assert_eq!(mindmaps(&ed), vec![m]);
    assert!(telemetry.events().is_empty());
    assert_eq!(ed.pending_tasks(), 0);
}

#[test]
fn fresh_brainstorm_moves_to_selection_rect_and_focuses() {
    let mut ed = editor();
    let telemetry = RecordingTelemetry::default();
    ed.copilot.show(Bound::new(1000.0, 2000.0, 300.0, 200.0));

    brainstorm_mindmap(&mut ed, &telemetry, &[], Some(outline()), MindmapStyle::Four);
    assert!(!ed.copilot.visible);
    assert_eq!(ed.pending_tasks(), 2);
    ed.run_pending_tasks();

    let ids = mindmaps(&ed);
    assert_eq!(ids.len(), 1);
    let m = ed.doc.mindmap(ids[0]).unwrap();
    let bound = ed.doc.mindmap_bound(m).unwrap();
    assert_eq!((bound.x, bound.y), (1000.0, 2000.0));
    assert_eq!(ed.selection.elements, vec![m.tree.element]);
    let (cx, cy) = bound.center();
    assert_eq!((ed.viewport.center_x, ed.viewport.center_y), (cx, cy));
    assert_eq!(telemetry.events(), vec![TelemetryEvent::ai_element_added("mindmap")]);
}

#[test]
fn brainstorm_on_non_root_node_adds_alongside() {
    let mut ed = editor();
    let telemetry = RecordingTelemetry::default();
    let m = ed.doc.add_mindmap(&outline(), MindmapStyle::One);
    let child = ed.doc.mindmap(m).unwrap().tree.children[0].element;

    brainstorm_mindmap(&mut ed, &telemetry, &[child], Some(outline()), MindmapStyle::One);
    ed.run_pending_tasks();
    assert_eq!(mindmaps(&ed).len(), 2);
}

// =============================================================================
// MAKE IT REAL
// =============================================================================

#[test]
fn make_it_real_falls_back_on_degenerate_sizes() {
    assert_eq!(or_default(None, 800.0), 800.0);
    assert_eq!(or_default(Some(0.0), 800.0), 800.0);
    assert_eq!(or_default(Some(f64::NAN), 800.0), 800.0);
    assert_eq!(or_default(Some(320.0), 800.0), 320.0);
}

#[test]
fn make_it_real_hides_overlays() {
    let mut ed = editor();
    ed.copilot.show(Bound::new(0.0, 0.0, 10.0, 10.0));
    make_it_real(&mut ed, Some(&Answer::Text("<p>x</p>".into())), None, None);
    assert!(!ed.copilot.visible);
    assert_eq!(ed.panel.state(), &PanelState::Hidden);
    let embeds = ed.doc.blocks_by_flavour(EMBED_HTML_FLAVOUR);
    assert_eq!(embeds.len(), 1);
    assert_eq!(embeds[0].props.xywh(), Some(Bound::new(0.0, 30.0, 800.0, 600.0)));
}

#[test]
fn make_it_real_without_answer_does_nothing() {
    let mut ed = editor();
    ed.copilot.show(Bound::default());
    make_it_real(&mut ed, None, Some(100.0), Some(100.0));
    assert!(ed.copilot.visible);
    assert_eq!(ed.doc.version(), 0);
}
