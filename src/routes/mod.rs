//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! Binds the HTTP surface over one shared `HostContext`: document snapshot,
//! menu rendering for the slash menu and element toolbar, and the AI panel
//! lifecycle (generate, respond, error actions). Editor routes set the
//! selection, mode, and copilot overlay, and seed shapes, mindmaps, and
//! images for actions to work on.

pub mod ai;
pub mod editor;
pub mod menu;

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::{get, post, put};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::doc::Document;
use crate::editor::{CopilotOverlay, EditorMode, Selection, Viewport};
use crate::host::HostContext;
use crate::panel::{Answer, PanelState};

pub fn app(host: HostContext) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/healthz", get(healthz))
        .route("/api/doc", get(get_doc))
        .route("/api/selection", put(editor::set_selection))
        .route("/api/mode", put(editor::set_mode))
        .route("/api/copilot", put(editor::set_copilot))
        .route("/api/shapes", post(editor::create_shape))
        .route("/api/mindmaps", post(editor::create_mindmap))
        .route("/api/images", post(editor::create_image))
        .route("/api/menu/slash", get(menu::slash_menu))
        .route("/api/menu/toolbar", get(menu::element_toolbar))
        .route("/api/ai/generate", post(ai::generate))
        .route("/api/ai/respond", post(ai::respond))
        .route("/api/ai/error-action", post(ai::error_action))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(host)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

#[derive(Serialize)]
pub struct DocResponse {
    pub document: Document,
    pub mode: EditorMode,
    pub selection: Selection,
    pub viewport: Viewport,
    pub copilot: CopilotOverlay,
    pub panel: PanelState,
    pub answer: Option<Answer>,
    pub assets: usize,
    pub surface_refreshes: u64,
}

/// `GET /api/doc`: snapshot of the editor.
pub async fn get_doc(State(host): State<HostContext>) -> Json<DocResponse> {
    let editor = host.editor.read().await;
    Json(DocResponse {
        document: editor.doc.clone(),
        mode: editor.mode,
        selection: editor.selection.clone(),
        viewport: editor.viewport,
        copilot: editor.copilot.clone(),
        panel: editor.panel.state().clone(),
        answer: editor.panel.answer().cloned(),
        assets: editor.assets.len(),
        surface_refreshes: editor.surface_refreshes(),
    })
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
