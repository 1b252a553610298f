use super::*;

use crate::doc::{Document, IMAGE_FLAVOUR, NOTE_FLAVOUR};

fn editor() -> Editor {
    Editor::new(Document::new("slides"))
}

fn slide(elements: Vec<TemplateElement>) -> TemplateContent {
    TemplateContent { elements }
}

#[test]
fn inserts_every_element_kind_in_one_batch() {
    let mut ed = editor();
    let content = slide(vec![
        TemplateElement::Shape { xywh: Bound::new(0.0, 0.0, 100.0, 40.0), text: "Title".into() },
        TemplateElement::Note { xywh: Bound::new(0.0, 60.0, 400.0, 200.0), markdown: "- point".into() },
        TemplateElement::Image { xywh: Bound::new(420.0, 60.0, 300.0, 200.0), source_id: "img-1".into() },
    ]);
    let mut job = TemplateJob::new();
    job.assets.insert("img-1".into(), vec![7, 7, 7]);

    job.insert_template(&mut ed, &content).unwrap();

    assert_eq!(ed.doc.version(), 1);
    assert_eq!(ed.doc.element_count(), 1);
    let notes = ed.doc.blocks_by_flavour(NOTE_FLAVOUR);
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].parent, Some(ed.doc.root_id()));
    assert_eq!(notes[0].children.len(), 1);
    let images = ed.doc.blocks_by_flavour(IMAGE_FLAVOUR);
    assert_eq!(images.len(), 1);
    assert_eq!(images[0].parent, Some(ed.doc.surface_id()));
    assert_eq!(ed.assets.get("img-1"), Some(&[7u8, 7, 7][..]));
}

#[test]
fn missing_asset_aborts_group() {
    let mut ed = editor();
    let content = slide(vec![
        TemplateElement::Shape { xywh: Bound::default(), text: "x".into() },
        TemplateElement::Image { xywh: Bound::default(), source_id: "absent".into() },
    ]);
    let err = TemplateJob::new().insert_template(&mut ed, &content).unwrap_err();
    assert!(matches!(err, SlidesError::MissingAsset(id) if id == "absent"));
    assert_eq!(ed.doc.version(), 0);
    assert_eq!(ed.doc.element_count(), 0);
    assert!(ed.assets.is_empty());
}

#[test]
fn empty_group_still_commits() {
    let mut ed = editor();
    TemplateJob::new()
        .insert_template(&mut ed, &TemplateContent::default())
        .unwrap();
    assert_eq!(ed.doc.version(), 1);
}

#[test]
fn template_elements_parse_from_json() {
    let json = serde_json::json!({
        "elements": [
            { "type": "shape", "xywh": { "x": 0.0, "y": 0.0, "w": 10.0, "h": 10.0 }, "text": "t" },
            { "type": "image", "xywh": { "x": 1.0, "y": 2.0, "w": 3.0, "h": 4.0 }, "source_id": "a" }
        ]
    });
    let content: TemplateContent = serde_json::from_value(json).unwrap();
    assert_eq!(content.elements.len(), 2);
    assert_eq!(
        content.elements[1],
        TemplateElement::Image { xywh: Bound::new(1.0, 2.0, 3.0, 4.0), source_id: "a".into() }
    );
}

// =============================================================================
// DECK LAYOUT
// =============================================================================

fn shape_text(content: &TemplateContent) -> &str {
    match &content.elements[0] {
        TemplateElement::Shape { text, .. } => text,
        other => panic!("expected title shape, got {other:?}"),
    }
}

#[test]
fn list_deck_gets_cover_slides_and_closing() {
    let (contents, images) = deck_from_markdown("# Deck\n\n- Slide one\n- Slide two\n- Slide three");

    assert_eq!(contents.len(), 5);
    assert_eq!(images.len(), 5);
    let titles: Vec<&str> = contents.iter().map(shape_text).collect();
    assert_eq!(titles, vec!["Deck", "Slide one", "Slide two", "Slide three", CLOSING_SLIDE_TEXT]);
    assert!(images.iter().all(Vec::is_empty));
    assert_eq!(contents[1].elements.len(), 1);
}

#[test]
fn slides_are_laid_out_left_to_right() {
    let (contents, _) = deck_from_markdown("- one\n- two");

    let x = |c: &TemplateContent| match &c.elements[0] {
        TemplateElement::Shape { xywh, .. } => xywh.x,
        other => panic!("expected title shape, got {other:?}"),
    };
    assert_eq!(x(&contents[0]), 40.0);
    assert_eq!(x(&contents[1]), 1100.0);
    assert_eq!(x(&contents[2]), 2160.0);
}

#[test]
fn nested_items_become_the_slide_body() {
    let (contents, _) = deck_from_markdown("- Intro\n  - why\n  - how\n- Outro\n");

    assert_eq!(contents.len(), 3);
    assert_eq!(shape_text(&contents[0]), "Intro");
    let TemplateElement::Note { markdown, .. } = &contents[0].elements[1] else {
        panic!("expected body note");
    };
    assert_eq!(markdown, "- why\n- how");
    assert_eq!(shape_text(&contents[1]), "Outro");
    assert_eq!(contents[1].elements.len(), 1);
}

#[test]
fn headed_sections_carry_their_images() {
    let text = "# Trip\n\n## Day one\nWe hiked.\n\n![peak](https://img.test/peak.png)\n\n- lake\n\n## Day two\nRest.\n";
    let (contents, images) = deck_from_markdown(text);

    assert_eq!(contents.len(), 4);
    assert_eq!(shape_text(&contents[1]), "Day one");
    assert_eq!(
        images[1],
        vec![SlideImage { id: "slide-1-image-0".into(), url: "https://img.test/peak.png".into() }]
    );
    let TemplateElement::Note { markdown, .. } = &contents[1].elements[1] else {
        panic!("expected body note");
    };
    assert!(markdown.contains("We hiked."));
    assert!(markdown.contains("- lake"));
    assert!(!markdown.contains("!["));
    let TemplateElement::Image { source_id, .. } = &contents[1].elements[2] else {
        panic!("expected image element");
    };
    assert_eq!(source_id, "slide-1-image-0");

    assert_eq!(shape_text(&contents[2]), "Day two");
    assert!(images[2].is_empty());
    let TemplateElement::Note { markdown, .. } = &contents[2].elements[1] else {
        panic!("expected body note");
    };
    assert_eq!(markdown, "Rest.");
}

#[test]
fn prose_answer_has_no_deck() {
    let (contents, images) = deck_from_markdown("Just a sentence.\n\nAnd another.");
    assert!(contents.is_empty());
    assert!(images.is_empty());
    assert_eq!(deck_from_markdown(""), (Vec::new(), Vec::new()));
}

#[test]
fn deck_groups_insert_cleanly() {
    let (contents, _) = deck_from_markdown("# Deck\n\n- Slide one\n  - detail");
    let mut ed = editor();
    for content in &contents {
        TemplateJob::new().insert_template(&mut ed, content).unwrap();
    }
    assert_eq!(ed.doc.element_count(), 3);
    assert_eq!(ed.doc.blocks_by_flavour(NOTE_FLAVOUR).len(), 1);
}
