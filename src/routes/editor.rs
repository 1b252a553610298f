//! Editor state routes: selection, mode, copilot overlay, and content seeding.
//!
//! These stand in for the pointer and keyboard input a canvas would
//! deliver, so a client can set up the context an AI action runs on.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::doc::{Bound, MindmapNode, MindmapStyle};
use crate::editor::{CopilotOverlay, EditorMode, Selection};
use crate::error::ErrorCode;
use crate::host::HostContext;
use crate::images::{FetchError, fetch_image_to_file};

const SEEDED_IMAGE_NAME: &str = "image";

#[derive(Debug, Deserialize)]
pub struct SelectionBody {
    #[serde(default)]
    pub elements: Vec<Uuid>,
    #[serde(default)]
    pub editing: bool,
}

#[derive(Debug, Deserialize)]
pub struct ModeBody {
    pub mode: EditorMode,
}

/// `rect: null` hides the overlay.
#[derive(Debug, Deserialize)]
pub struct CopilotBody {
    pub rect: Option<Bound>,
}

#[derive(Debug, Deserialize)]
pub struct ShapeBody {
    pub xywh: Bound,
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct MindmapBody {
    pub node: MindmapNode,
    #[serde(default)]
    pub style: MindmapStyle,
}

/// `data` is a URL or a `data:` URL. `at` is a model point; the viewport
/// center when absent.
#[derive(Debug, Deserialize)]
pub struct ImageBody {
    pub data: String,
    pub at: Option<(f64, f64)>,
    #[serde(default)]
    pub select: bool,
}

#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct MindmapCreatedResponse {
    pub id: Uuid,
    pub root: Uuid,
}

#[derive(Debug, Serialize)]
pub struct ImagesCreatedResponse {
    pub ids: Vec<Uuid>,
}

/// `PUT /api/selection`: replace the selection. Unknown ids are rejected.
pub async fn set_selection(
    State(host): State<HostContext>,
    Json(body): Json<SelectionBody>,
) -> Result<Json<Selection>, StatusCode> {
    let mut editor = host.editor.write().await;
    let unknown = body
        .elements
        .iter()
        .find(|id| editor.doc.element(**id).is_none() && editor.doc.block(**id).is_none());
    if let Some(id) = unknown {
        warn!(%id, "set_selection: unknown id");
        return Err(StatusCode::NOT_FOUND);
    }
    editor.set_selection(body.elements, body.editing);
    Ok(Json(editor.selection.clone()))
}

/// `PUT /api/mode`: switch between page and edgeless. Leaving edgeless
/// hides the copilot overlay.
pub async fn set_mode(State(host): State<HostContext>, Json(body): Json<ModeBody>) -> Json<EditorMode> {
    let mut editor = host.editor.write().await;
    editor.mode = body.mode;
    if body.mode == EditorMode::Page {
        editor.copilot.hide();
    }
    Json(editor.mode)
}

/// `PUT /api/copilot`: show the overlay over `rect`, or hide it.
pub async fn set_copilot(
    State(host): State<HostContext>,
    Json(body): Json<CopilotBody>,
) -> Result<Json<CopilotOverlay>, StatusCode> {
    let mut editor = host.editor.write().await;
    match body.rect {
        Some(_) if editor.mode != EditorMode::Edgeless => return Err(StatusCode::CONFLICT),
        Some(rect) => editor.copilot.show(rect),
        None => editor.copilot.hide(),
    }
    Ok(Json(editor.copilot.clone()))
}

/// `POST /api/shapes`: add a text shape.
pub async fn create_shape(State(host): State<HostContext>, Json(body): Json<ShapeBody>) -> Json<CreatedResponse> {
    let mut editor = host.editor.write().await;
    let id = editor.doc.add_shape(body.xywh, &body.text);
    editor.refresh_surface();
    info!(%id, "create_shape");
    Json(CreatedResponse { id })
}

/// `POST /api/mindmaps`: place a mindmap tree. Returns its root node too.
pub async fn create_mindmap(
    State(host): State<HostContext>,
    Json(body): Json<MindmapBody>,
) -> Result<Json<MindmapCreatedResponse>, StatusCode> {
    let mut editor = host.editor.write().await;
    let id = editor.doc.add_mindmap(&body.node, body.style);
    let root = editor
        .doc
        .mindmap(id)
        .map(|m| m.tree.element)
        .ok_or(StatusCode::INTERNAL_SERVER_ERROR)?;
    editor.refresh_surface();
    info!(%id, "create_mindmap");
    Ok(Json(MindmapCreatedResponse { id, root }))
}

/// `POST /api/images`: resolve `data` and add it as an image block.
pub async fn create_image(
    State(host): State<HostContext>,
    Json(body): Json<ImageBody>,
) -> Result<Json<ImagesCreatedResponse>, StatusCode> {
    let file = fetch_image_to_file(host.fetcher.as_ref(), &body.data, SEEDED_IMAGE_NAME, host.image_proxy.as_deref())
        .await
        .map_err(|e| {
            warn!(error = %e, code = e.error_code(), "create_image: fetch failed");
            fetch_error_to_status(&e)
        })?
        .ok_or(StatusCode::BAD_REQUEST)?;

    let mut editor = host.editor.write().await;
    let point = match body.at {
        Some((x, y)) => editor.viewport.to_view_coord(x, y),
        None => (editor.viewport.width / 2.0, editor.viewport.height / 2.0),
    };
    let ids = editor.add_images(vec![file], point, body.select).map_err(|e| {
        warn!(error = %e, "create_image: insertion failed");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;
    Ok(Json(ImagesCreatedResponse { ids }))
}

fn fetch_error_to_status(e: &FetchError) -> StatusCode {
    match e {
        FetchError::InvalidDataUrl(_) => StatusCode::BAD_REQUEST,
        FetchError::Status { .. } | FetchError::Request(_) => StatusCode::BAD_GATEWAY,
        FetchError::HttpClientBuild(_) | FetchError::InvalidProxyUrl(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[cfg(test)]
#[path = "editor_test.rs"]
mod tests;
