//! Editor host state: document, selection, viewport, assets, overlays.
//!
//! DESIGN
//! ======
//! `Editor` gathers everything a response handler touches into one value so
//! it can sit behind a single lock in `HostContext`. It also owns the
//! deferred task queue; tasks receive `&mut Editor` when drained.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::doc::{BlockId, BlockProps, Bound, DocError, Document};
use crate::panel::AiPanel;
use crate::tasks::{self, HasTaskQueue, TaskQueue};

const INSERTION_OFFSET_Y: f64 = 20.0;
const DEFAULT_IMAGE_WIDTH: f64 = 400.0;
const DEFAULT_IMAGE_HEIGHT: f64 = 300.0;
const IMAGE_GAP: f64 = 20.0;
const MIN_ZOOM: f64 = 0.1;
const MAX_ZOOM: f64 = 6.0;

// =============================================================================
// MODE + SELECTION
// =============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditorMode {
    #[default]
    Page,
    Edgeless,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Selection {
    pub elements: Vec<Uuid>,
    pub editing: bool,
}

// =============================================================================
// VIEWPORT
// =============================================================================

/// Camera over the canvas. `width`/`height` are in view pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Viewport {
    pub center_x: f64,
    pub center_y: f64,
    pub zoom: f64,
    pub width: f64,
    pub height: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self { center_x: 0.0, center_y: 0.0, zoom: 1.0, width: 1280.0, height: 800.0 }
    }
}

impl Viewport {
    /// Visible region in model coordinates.
    #[must_use]
    pub fn viewport_bounds(&self) -> Bound {
        let w = self.width / self.zoom;
        let h = self.height / self.zoom;
        Bound::new(self.center_x - w / 2.0, self.center_y - h / 2.0, w, h)
    }

    #[must_use]
    pub fn to_view_coord(&self, x: f64, y: f64) -> (f64, f64) {
        let vb = self.viewport_bounds();
        ((x - vb.x) * self.zoom, (y - vb.y) * self.zoom)
    }

    #[must_use]
    pub fn to_model_coord(&self, vx: f64, vy: f64) -> (f64, f64) {
        let vb = self.viewport_bounds();
        (vb.x + vx / self.zoom, vb.y + vy / self.zoom)
    }

    /// Zoom and pan so `bound` fits inside the view minus `padding`
    /// (`[top, right, bottom, left]`).
    pub fn set_viewport_by_bound(&mut self, bound: Bound, padding: [f64; 4]) {
        let [top, right, bottom, left] = padding;
        let avail_w = (self.width - left - right).max(1.0);
        let avail_h = (self.height - top - bottom).max(1.0);
        let zoom_w = if bound.w > 0.0 { avail_w / bound.w } else { MAX_ZOOM };
        let zoom_h = if bound.h > 0.0 { avail_h / bound.h } else { MAX_ZOOM };
        self.zoom = zoom_w.min(zoom_h).clamp(MIN_ZOOM, MAX_ZOOM);
        let (cx, cy) = bound.center();
        self.center_x = cx + (right - left) / 2.0 / self.zoom;
        self.center_y = cy + (bottom - top) / 2.0 / self.zoom;
    }
}

// =============================================================================
// ASSETS
// =============================================================================

/// Blob storage keyed by content hash or caller-provided id.
#[derive(Debug, Clone, Default)]
pub struct AssetStore {
    blobs: HashMap<String, Vec<u8>>,
}

impl AssetStore {
    /// Store under a content-derived id and return it.
    pub fn put(&mut self, bytes: Vec<u8>) -> String {
        let id = content_id(&bytes);
        self.blobs.insert(id.clone(), bytes);
        id
    }

    pub fn set(&mut self, id: &str, bytes: Vec<u8>) {
        self.blobs.insert(id.to_owned(), bytes);
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&[u8]> {
        self.blobs.get(id).map(Vec::as_slice)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }
}

/// Hex SHA-256 of a blob.
#[must_use]
pub fn content_id(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hasher
        .finalize()
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

/// A fetched image ready for insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    pub name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

// =============================================================================
// COPILOT OVERLAY
// =============================================================================

/// Edgeless selection overlay that hosts the AI entry point.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CopilotOverlay {
    pub visible: bool,
    pub selection_rect: Option<Bound>,
}

impl CopilotOverlay {
    pub fn show(&mut self, rect: Bound) {
        self.visible = true;
        self.selection_rect = Some(rect);
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }
}

// =============================================================================
// EDITOR
// =============================================================================

pub struct Editor {
    pub doc: Document,
    pub mode: EditorMode,
    pub selection: Selection,
    pub viewport: Viewport,
    pub assets: AssetStore,
    pub panel: AiPanel,
    pub copilot: CopilotOverlay,
    /// `false` when the AI panel widget is not mounted (menus hide AI items).
    pub ai_panel_mounted: bool,
    tasks: TaskQueue<Editor>,
    surface_refreshes: u64,
}

impl HasTaskQueue for Editor {
    fn task_queue(&mut self) -> &mut TaskQueue<Self> {
        &mut self.tasks
    }
}

impl Editor {
    #[must_use]
    pub fn new(doc: Document) -> Self {
        Self {
            doc,
            mode: EditorMode::default(),
            selection: Selection::default(),
            viewport: Viewport::default(),
            assets: AssetStore::default(),
            panel: AiPanel::new(),
            copilot: CopilotOverlay::default(),
            ai_panel_mounted: true,
            tasks: TaskQueue::new(),
            surface_refreshes: 0,
        }
    }

    pub fn set_selection(&mut self, elements: Vec<Uuid>, editing: bool) {
        self.selection = Selection { elements, editing };
    }

    /// Common bound of every selected block or element with a canvas bound.
    #[must_use]
    pub fn selection_bound(&self) -> Option<Bound> {
        let bounds: Vec<Bound> = self
            .selection
            .elements
            .iter()
            .filter_map(|id| self.doc.bound_of(*id))
            .collect();
        Bound::common(&bounds)
    }

    /// Where a `width`×`height` answer goes: just below the selection, or
    /// below the copilot rect, or centred in the viewport.
    #[must_use]
    pub fn determine_insertion_bounds(&self, width: f64, height: f64) -> Bound {
        let offset_y = INSERTION_OFFSET_Y / self.viewport.zoom;
        let anchor = self.selection_bound().or(self.copilot.selection_rect);
        match anchor {
            Some(b) => Bound::new(b.x, b.y + b.h + offset_y, width, height),
            None => {
                let (cx, cy) = (self.viewport.center_x, self.viewport.center_y);
                Bound::new(cx - width / 2.0, cy - height / 2.0, width, height)
            }
        }
    }

    /// Store `files` as assets and add image blocks on the surface, laid out
    /// left to right from the model point under `view_point`.
    ///
    /// # Errors
    ///
    /// Propagates block insertion failures; the batch is rolled back.
    pub fn add_images(
        &mut self,
        files: Vec<ImageFile>,
        view_point: (f64, f64),
        select: bool,
    ) -> Result<Vec<BlockId>, DocError> {
        let (mut x, y) = self.viewport.to_model_coord(view_point.0, view_point.1);
        let surface = self.doc.surface_id();
        let mut source_ids = Vec::with_capacity(files.len());
        for file in files {
            source_ids.push(self.assets.put(file.bytes));
        }
        let ids = self.doc.transact(|doc| {
            let mut ids = Vec::with_capacity(source_ids.len());
            for source_id in source_ids {
                let xywh = Bound::new(x, y, DEFAULT_IMAGE_WIDTH, DEFAULT_IMAGE_HEIGHT);
                ids.push(doc.add_block(BlockProps::Image { source_id, xywh, caption: None }, surface)?);
                x += DEFAULT_IMAGE_WIDTH + IMAGE_GAP;
            }
            Ok::<_, DocError>(ids)
        })?;
        if select {
            self.set_selection(ids.clone(), false);
        }
        Ok(ids)
    }

    /// Ask renderers to repaint the surface.
    pub fn refresh_surface(&mut self) {
        self.surface_refreshes += 1;
    }

    #[must_use]
    pub fn surface_refreshes(&self) -> u64 {
        self.surface_refreshes
    }

    pub fn queue_microtask(&mut self, task: impl FnOnce(&mut Editor) + Send + Sync + 'static) {
        self.tasks.queue_microtask(task);
    }

    pub fn queue_macrotask(&mut self, task: impl FnOnce(&mut Editor) + Send + Sync + 'static) {
        self.tasks.queue_macrotask(task);
    }

    #[must_use]
    pub fn pending_tasks(&self) -> usize {
        self.tasks.len()
    }

    /// Drain deferred work. Returns the number of tasks run.
    pub fn run_pending_tasks(&mut self) -> usize {
        tasks::drain(self)
    }
}

#[cfg(test)]
#[path = "editor_test.rs"]
mod tests;
