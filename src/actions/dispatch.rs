//! Response dispatcher: route a completed answer to its handler.
//!
//! DESIGN
//! ======
//! `response_handler` is the registry: an exhaustive match, so adding an
//! action without deciding its handler is a compile error. `dispatch` holds
//! the editor write lock for the whole synchronous part of a handler, drains
//! the tasks it deferred, then hides the panel. Background work (image and
//! slide fetches) is spawned and handed back to the caller.

use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::handlers;
use super::{ActionContext, AiAction};
use crate::editor::Editor;
use crate::host::HostContext;
use crate::panel::RequestToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseHandler {
    Default,
    ExpandMindmap,
    BrainstormMindmap,
    MakeItReal,
    CreateSlides,
    Image,
}

#[must_use]
pub fn response_handler(action: AiAction) -> ResponseHandler {
    match action {
        AiAction::ExpandMindmap => ResponseHandler::ExpandMindmap,
        AiAction::BrainstormMindmap => ResponseHandler::BrainstormMindmap,
        AiAction::MakeItReal => ResponseHandler::MakeItReal,
        AiAction::CreateSlides => ResponseHandler::CreateSlides,
        AiAction::CreateImage | AiAction::ProcessImage | AiAction::FilterImage => ResponseHandler::Image,
        AiAction::Chat
        | AiAction::Summary
        | AiAction::Translate
        | AiAction::ChangeTone
        | AiAction::ImproveWriting
        | AiAction::ImproveGrammar
        | AiAction::FixSpelling
        | AiAction::MakeLonger
        | AiAction::MakeShorter
        | AiAction::ContinueWriting
        | AiAction::WriteOutline
        | AiAction::FindActions
        | AiAction::GenerateCaption => ResponseHandler::Default,
    }
}

/// Outcome of one dispatch.
#[derive(Debug)]
pub struct Dispatched {
    pub handler: ResponseHandler,
    /// Fire-and-forget work still running after dispatch returned.
    pub background: Option<JoinHandle<()>>,
}

/// Materialize the panel's current answer for `ctx`. Never fails; handler
/// errors are logged.
pub async fn dispatch(host: &HostContext, ctx: &ActionContext) -> Dispatched {
    let mut editor = host.editor.write().await;
    run_handler(host, &mut editor, ctx)
}

/// Like `dispatch`, but only while the panel is still on request `token`.
/// Returns `None` without touching the editor once a newer generation
/// started or the panel was hidden.
pub async fn dispatch_if_current(host: &HostContext, ctx: &ActionContext, token: RequestToken) -> Option<Dispatched> {
    let mut editor = host.editor.write().await;
    if !editor.panel.is_current(token) {
        debug!(action = %ctx.action(), "dispatch: panel moved on, dropping insert");
        return None;
    }
    Some(run_handler(host, &mut editor, ctx))
}

fn run_handler(host: &HostContext, editor: &mut Editor, ctx: &ActionContext) -> Dispatched {
    let handler = response_handler(ctx.action());
    let answer = editor.panel.answer().cloned();
    let mut ctx = ctx.clone();
    if let Some(answer) = &answer {
        ctx.absorb_answer(answer);
    }
    info!(action = %ctx.action(), ?handler, has_answer = answer.is_some(), "dispatch: start");

    let background = match ctx {
        ActionContext::Text { .. } | ActionContext::Caption => {
            handlers::insert_note(editor, answer.as_ref());
            None
        }
        ActionContext::ExpandMindmap { selected, node } => {
            handlers::expand_mindmap(editor, &selected, node.as_ref());
            None
        }
        ActionContext::BrainstormMindmap { selected, node, style } => {
            handlers::brainstorm_mindmap(editor, host.telemetry.as_ref(), &selected, node, style);
            None
        }
        ActionContext::MakeItReal { width, height } => {
            handlers::make_it_real(editor, answer.as_ref(), width, height);
            None
        }
        ActionContext::CreateSlides { contents, images } => handlers::create_slides(host, contents, images),
        ActionContext::Image { .. } => handlers::insert_image(editor, host, answer.as_ref()),
    };

    let ran = editor.run_pending_tasks();
    editor.panel.hide();
    info!(?handler, deferred = ran, background = background.is_some(), "dispatch: done");
    Dispatched { handler, background }
}

#[cfg(test)]
#[path = "dispatch_test.rs"]
mod tests;
