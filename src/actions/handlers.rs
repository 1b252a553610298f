//! Response handlers: materialize one answer into the document.
//!
//! Synchronous handlers run under the editor lock held by `dispatch`. Work
//! that must observe the finished mutation batch is queued on the editor's
//! task queue; network work is spawned and re-acquires the lock when done.

use futures::future::try_join_all;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};
use uuid::Uuid;

use super::html::preprocess_html;
use super::slides::{SlideImage, SlidesError, TemplateContent, TemplateJob};
use crate::doc::{BlockProps, DocError, MindmapNode, MindmapStyle, MindmapTree, NoteDisplayMode};
use crate::editor::Editor;
use crate::host::HostContext;
use crate::images::fetch_image_to_file;
use crate::panel::Answer;
use crate::telemetry::{Telemetry, TelemetryEvent};

const NOTE_WIDTH: f64 = 800.0;
const NOTE_HEIGHT: f64 = 95.0;
const EMBED_WIDTH: f64 = 800.0;
const EMBED_HEIGHT: f64 = 600.0;
const MINDMAP_VIEW_PADDING: [f64; 4] = [20.0, 20.0, 20.0, 20.0];
const MAKE_IT_REAL_DESIGN: &str = "ai:makeItReal";
const IMAGE_FILENAME: &str = "image";

// =============================================================================
// DEFAULT
// =============================================================================

/// Insert the answer as markdown inside a new edgeless-only note below the
/// selection, then select the note.
pub fn insert_note(editor: &mut Editor, answer: Option<&Answer>) {
    let Some(markdown) = answer.and_then(Answer::as_text) else {
        debug!("insert_note: no answer");
        return;
    };
    let bounds = editor.determine_insertion_bounds(NOTE_WIDTH, NOTE_HEIGHT);
    let root = editor.doc.root_id();
    let note = match editor.doc.transact(|doc| {
        doc.add_block(BlockProps::Note { xywh: bounds, display_mode: NoteDisplayMode::EdgelessOnly }, root)
    }) {
        Ok(id) => id,
        Err(e) => {
            error!(error = %e, "insert_note: note creation failed");
            return;
        }
    };
    fill_note(editor, note, markdown);
}

/// Insert `markdown` under `note` and select the note once it holds it.
fn fill_note(editor: &mut Editor, note: Uuid, markdown: &str) {
    match editor.doc.transact(|doc| doc.insert_markdown(note, markdown)) {
        Ok(blocks) => {
            info!(%note, blocks = blocks.len(), "insert_note: inserted");
            editor.set_selection(vec![note], false);
        }
        Err(e) => error!(error = %e, %note, "insert_note: markdown insertion failed"),
    }
}

// =============================================================================
// MINDMAP
// =============================================================================

/// Append the answer's child subtrees under the selected mindmap node.
pub fn expand_mindmap(editor: &mut Editor, selected: &[Uuid], node: Option<&MindmapNode>) {
    editor.queue_microtask(|e| e.panel.hide());

    let Some(&target) = selected.first() else {
        return;
    };
    let Some(mindmap) = editor.doc.mindmap_of(target) else {
        debug!(%target, "expand_mindmap: selection is not a mindmap node");
        return;
    };
    let Some(node) = node else {
        return;
    };
    if node.children.is_empty() {
        return;
    }

    let result = editor.doc.transact(|doc| {
        for child in &node.children {
            doc.mindmap_add_tree(mindmap, target, child)?;
        }
        let subtree = doc
            .mindmap_subtree(mindmap, target)
            .map(MindmapTree::element_ids)
            .unwrap_or_default();
        for shape in subtree {
            doc.fit_content(shape)?;
        }
        doc.layout_mindmap(mindmap)
    });
    if let Err(e) = result {
        error!(error = %e, %mindmap, "expand_mindmap: failed");
        return;
    }
    info!(%mindmap, %target, added = node.children.len(), "expand_mindmap: expanded");

    editor.queue_macrotask(move |e| e.set_selection(vec![target], false));
}

/// Place a brainstormed mindmap. When the selection is the root of an
/// existing mindmap, that mindmap is replaced in place.
pub fn brainstorm_mindmap(
    editor: &mut Editor,
    telemetry: &dyn Telemetry,
    selected: &[Uuid],
    node: Option<MindmapNode>,
    style: MindmapStyle,
) {
    let Some(mut node) = node else {
        debug!("brainstorm_mindmap: no tree");
        return;
    };
    let selection_rect = editor.copilot.selection_rect;
    let mut fresh = true;

    if let Some(&first) = selected.first() {
        if editor.doc.is_mindmap_root(first) {
            let root_bound = editor.doc.shape(first).map(|s| s.xywh);
            if let Some(old) = editor.doc.mindmap_of(first) {
                if let Err(e) = editor.doc.transact(|doc| doc.remove_element(old)) {
                    error!(error = %e, %old, "brainstorm_mindmap: removing previous mindmap failed");
                }
                if let Some(bound) = root_bound {
                    node.xywh = Some(bound.serialize());
                    fresh = false;
                }
            }
        }
    }

    editor.copilot.hide();
    editor.panel.hide();

    let result = editor.doc.transact(|doc| {
        let id = doc.add_mindmap(&node, style);
        let shapes = doc
            .mindmap(id)
            .map(|m| m.tree.element_ids())
            .unwrap_or_default();
        for shape in shapes {
            doc.fit_content(shape)?;
        }
        doc.layout_mindmap(id)?;
        Ok::<_, DocError>(id)
    });
    let mindmap = match result {
        Ok(id) => id,
        Err(e) => {
            error!(error = %e, "brainstorm_mindmap: failed");
            return;
        }
    };
    info!(%mindmap, fresh, nodes = node.node_count(), "brainstorm_mindmap: added");
    telemetry.track(&TelemetryEvent::ai_element_added("mindmap"));

    editor.queue_microtask(move |e| {
        if let (true, Some(rect)) = (fresh, selection_rect) {
            if let Err(err) = e.doc.mindmap_move_to(mindmap, rect) {
                error!(error = %err, %mindmap, "brainstorm_mindmap: move failed");
            }
        }
    });
    editor.queue_macrotask(move |e| {
        let Some(m) = e.doc.mindmap(mindmap) else {
            return;
        };
        let root = m.tree.element;
        if let Some(bound) = e.doc.mindmap_bound(m) {
            e.viewport.set_viewport_by_bound(bound, MINDMAP_VIEW_PADDING);
        }
        e.set_selection(vec![root], false);
    });
}

// =============================================================================
// MAKE IT REAL
// =============================================================================

/// Embed the answer's HTML below the selection.
pub fn make_it_real(editor: &mut Editor, answer: Option<&Answer>, width: Option<f64>, height: Option<f64>) {
    let Some(raw) = answer.and_then(Answer::as_text) else {
        return;
    };
    let html = preprocess_html(raw);
    let bounds = editor.determine_insertion_bounds(or_default(width, EMBED_WIDTH), or_default(height, EMBED_HEIGHT));

    editor.copilot.hide();
    editor.panel.hide();

    let surface = editor.doc.surface_id();
    let props = BlockProps::EmbedHtml { html, design: MAKE_IT_REAL_DESIGN.into(), xywh: bounds };
    match editor.doc.transact(|doc| doc.add_block(props, surface)) {
        Ok(id) => info!(%id, "make_it_real: embedded"),
        Err(e) => error!(error = %e, "make_it_real: failed"),
    }
}

/// Zero, NaN and missing sizes fall back to `default`.
fn or_default(value: Option<f64>, default: f64) -> f64 {
    match value {
        Some(v) if v.is_normal() => v,
        _ => default,
    }
}

// =============================================================================
// SLIDES
// =============================================================================

/// Insert slide groups in order in the background. Each group's images are
/// fetched concurrently before the group is inserted.
pub fn create_slides(
    host: &HostContext,
    contents: Vec<TemplateContent>,
    images: Vec<Vec<SlideImage>>,
) -> Option<JoinHandle<()>> {
    if contents.is_empty() {
        return None;
    }
    let host = host.clone();
    Some(tokio::spawn(async move {
        if let Err(e) = insert_slides(&host, &contents, &images).await {
            error!(error = %e, "create_slides: failed");
        }
    }))
}

async fn insert_slides(
    host: &HostContext,
    contents: &[TemplateContent],
    images: &[Vec<SlideImage>],
) -> Result<(), SlidesError> {
    // Stops before the last group.
    let groups = contents.len().saturating_sub(1);
    for (i, content) in contents.iter().take(groups).enumerate() {
        let group = images.get(i).map_or(&[][..], Vec::as_slice);
        let fetched = try_join_all(group.iter().map(|image| async move {
            let bytes = host.fetcher.fetch(&image.url).await?;
            Ok::<_, SlidesError>((image.id.clone(), bytes))
        }))
        .await?;

        let mut job = TemplateJob::new();
        job.assets.extend(fetched);

        let mut editor = host.editor.write().await;
        job.insert_template(&mut editor, content)?;
        editor.refresh_surface();
        info!(group = i, images = group.len(), "create_slides: group inserted");
    }
    Ok(())
}

// =============================================================================
// IMAGES
// =============================================================================

/// Resolve the answer into an image in the background and insert it at the
/// computed position.
pub fn insert_image(editor: &mut Editor, host: &HostContext, answer: Option<&Answer>) -> Option<JoinHandle<()>> {
    let data = answer.and_then(Answer::as_text)?.to_owned();
    let bounds = editor.determine_insertion_bounds(NOTE_WIDTH, NOTE_HEIGHT);

    editor.copilot.hide();
    editor.panel.hide();

    let host = host.clone();
    Some(tokio::spawn(async move {
        let proxy = host.image_proxy.as_deref();
        let file = match fetch_image_to_file(host.fetcher.as_ref(), &data, IMAGE_FILENAME, proxy).await {
            Ok(Some(file)) => file,
            Ok(None) => return,
            Err(e) => {
                error!(error = %e, "insert_image: fetch failed");
                return;
            }
        };
        let mut editor = host.editor.write().await;
        let point = editor.viewport.to_view_coord(bounds.min_x(), bounds.min_y());
        match editor.add_images(vec![file], point, true) {
            Ok(ids) => info!(count = ids.len(), "insert_image: inserted"),
            Err(e) => error!(error = %e, "insert_image: insertion failed"),
        }
    }))
}

#[cfg(test)]
#[path = "handlers_test.rs"]
mod tests;
