//! AI panel routes.

use axum::extract::State;
use axum::response::Json;
use serde::{Deserialize, Serialize};

use crate::actions::responses::{self, ErrorAction, ResponseGroupView, ResponseItem};
use crate::actions::{ActionVariants, AiAction, ResponseHandler};
use crate::editor::Editor;
use crate::host::HostContext;
use crate::panel::{Answer, PanelState};

#[derive(Debug, Deserialize)]
pub struct GenerateBody {
    pub action: AiAction,
    #[serde(default)]
    pub input: String,
    #[serde(default)]
    pub variants: ActionVariants,
}

#[derive(Debug, Deserialize)]
pub struct RespondBody {
    pub item: ResponseItem,
}

#[derive(Debug, Deserialize)]
pub struct ErrorActionBody {
    pub action: ErrorAction,
}

#[derive(Debug, Serialize)]
pub struct PanelResponse {
    pub state: PanelState,
    pub answer: Option<Answer>,
    pub responses: Vec<ResponseGroupView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dispatched: Option<DispatchSummary>,
}

#[derive(Debug, Serialize)]
pub struct DispatchSummary {
    pub handler: String,
    /// Background work (image or slide fetches) is still running.
    pub background: bool,
}

/// Panel state plus the response items that apply to it.
pub(crate) fn panel_response(editor: &Editor) -> PanelResponse {
    let state = editor.panel.state().clone();
    let answer = editor.panel.answer().cloned();
    let groups = match &state {
        PanelState::Finished => responses::finish_responses(),
        PanelState::Error { .. } => responses::error_responses(),
        PanelState::Hidden | PanelState::Generating => Vec::new(),
    };
    let responses = match editor.panel.session() {
        Some(session) => responses::view(&groups, session.action, &session.variants, answer.is_some()),
        None => Vec::new(),
    };
    PanelResponse { state, answer, responses, dispatched: None }
}

/// `POST /api/ai/generate`: run an action on the current selection.
pub async fn generate(State(host): State<HostContext>, Json(body): Json<GenerateBody>) -> Json<PanelResponse> {
    host.trigger(body.action, body.input, body.variants).await;
    let editor = host.editor.read().await;
    Json(panel_response(&editor))
}

/// `POST /api/ai/respond`: act on the panel's answer.
pub async fn respond(State(host): State<HostContext>, Json(body): Json<RespondBody>) -> Json<PanelResponse> {
    let dispatched = responses::execute(&host, body.item).await.map(|d| DispatchSummary {
        handler: handler_name(d.handler).to_owned(),
        background: d.background.is_some(),
    });
    let editor = host.editor.read().await;
    let mut response = panel_response(&editor);
    response.dispatched = dispatched;
    Json(response)
}

/// `POST /api/ai/error-action`: login, upgrade, or cancel from the error state.
pub async fn error_action(State(host): State<HostContext>, Json(body): Json<ErrorActionBody>) -> Json<PanelResponse> {
    responses::execute_error_action(&host, body.action).await;
    let editor = host.editor.read().await;
    Json(panel_response(&editor))
}

fn handler_name(handler: ResponseHandler) -> &'static str {
    match handler {
        ResponseHandler::Default => "default",
        ResponseHandler::ExpandMindmap => "expand_mindmap",
        ResponseHandler::BrainstormMindmap => "brainstorm_mindmap",
        ResponseHandler::MakeItReal => "make_it_real",
        ResponseHandler::CreateSlides => "create_slides",
        ResponseHandler::Image => "image",
    }
}

#[cfg(test)]
#[path = "ai_test.rs"]
mod tests;
