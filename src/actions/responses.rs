//! Response items offered by the panel once an answer is finished or failed.
//!
//! DESIGN
//! ======
//! Items are plain values; `view` evaluates visibility against the panel's
//! current session so callers render only what applies, and `execute`
//! re-checks visibility so a stale client cannot insert a missing answer.
//! Every user choice is reported to telemetry as `result:*`.

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use super::{ActionVariants, AiAction, Dispatched, dispatch_if_current};
use crate::doc::BlockProps;
use crate::editor::Editor;
use crate::host::HostContext;
use crate::panel::Answer;
use crate::provider::ProviderEvent;
use crate::telemetry::TelemetryEvent;

const INSERT_LABEL: &str = "Insert below";
const REPLACE_LABEL: &str = "Replace";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResponseItem {
    ContinueInChat,
    Insert,
    UseAsCaption,
    Retry,
    Discard,
}

impl ResponseItem {
    /// Display name. The insert label depends on the action variants.
    #[must_use]
    pub fn name(self, action: AiAction, variants: &ActionVariants) -> &'static str {
        match self {
            Self::ContinueInChat => "Continue in chat",
            Self::Insert => insert_label(action, variants),
            Self::UseAsCaption => "Use as caption",
            Self::Retry => "Retry",
            Self::Discard => "Discard",
        }
    }

    #[must_use]
    pub fn icon(self) -> &'static str {
        match self {
            Self::ContinueInChat => "chat-with-ai",
            Self::Insert => "insert-below",
            Self::UseAsCaption => "ai-pen",
            Self::Retry => "reset",
            Self::Discard => "delete",
        }
    }

    #[must_use]
    pub fn is_visible(self, action: AiAction, has_answer: bool) -> bool {
        match self {
            Self::ContinueInChat | Self::Retry => true,
            Self::Insert => !action.excludes_insert() && has_answer,
            Self::UseAsCaption => action == AiAction::GenerateCaption && has_answer,
            Self::Discard => has_answer,
        }
    }

    /// Telemetry result tag.
    #[must_use]
    pub fn result(self) -> &'static str {
        match self {
            Self::ContinueInChat => "result:continue-in-chat",
            Self::Insert => "result:insert",
            Self::UseAsCaption => "result:use-as-caption",
            Self::Retry => "result:retry",
            Self::Discard => "result:discard",
        }
    }
}

fn insert_label(action: AiAction, variants: &ActionVariants) -> &'static str {
    if action == AiAction::BrainstormMindmap && variants.regenerate { REPLACE_LABEL } else { INSERT_LABEL }
}

// =============================================================================
// GROUPS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseGroup {
    pub name: &'static str,
    pub items: Vec<ResponseItem>,
}

/// Items offered once an answer finished.
#[must_use]
pub fn finish_responses() -> Vec<ResponseGroup> {
    vec![ResponseGroup {
        name: "Response",
        items: vec![
            ResponseItem::ContinueInChat,
            ResponseItem::Insert,
            ResponseItem::UseAsCaption,
            ResponseItem::Retry,
            ResponseItem::Discard,
        ],
    }]
}

/// Items offered after a failed generation.
#[must_use]
pub fn error_responses() -> Vec<ResponseGroup> {
    vec![
        ResponseGroup { name: "Response", items: vec![ResponseItem::Insert] },
        ResponseGroup { name: "", items: vec![ResponseItem::Retry, ResponseItem::Discard] },
    ]
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResponseEntryView {
    pub item: ResponseItem,
    pub name: &'static str,
    pub icon: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResponseGroupView {
    pub name: &'static str,
    pub items: Vec<ResponseEntryView>,
}

/// Visible items of `groups` for the given session.
#[must_use]
pub fn view(
    groups: &[ResponseGroup],
    action: AiAction,
    variants: &ActionVariants,
    has_answer: bool,
) -> Vec<ResponseGroupView> {
    groups
        .iter()
        .map(|g| ResponseGroupView {
            name: g.name,
            items: g
                .items
                .iter()
                .filter(|item| item.is_visible(action, has_answer))
                .map(|&item| ResponseEntryView { item, name: item.name(action, variants), icon: item.icon() })
                .collect(),
        })
        .collect()
}

// =============================================================================
// EXECUTION
// =============================================================================

/// Run `item` against the panel's current session. Returns the dispatch
/// outcome for insert; `None` when a newer generation took the panel over.
pub async fn execute(host: &HostContext, item: ResponseItem) -> Option<Dispatched> {
    let (action, ctx, has_answer, token) = {
        let editor = host.editor.read().await;
        let session = editor.panel.session()?;
        (session.action, session.ctx.clone(), editor.panel.answer().is_some(), editor.panel.request_token())
    };
    if !item.is_visible(action, has_answer) {
        debug!(?item, %action, "responses: item not available");
        return None;
    }
    host.telemetry.track(&TelemetryEvent::ai_response(item.result()));
    info!(?item, %action, "responses: execute");

    match item {
        ResponseItem::ContinueInChat => {
            host.provider.emit(ProviderEvent::RequestOpenWithChat);
            host.provider.emit(ProviderEvent::RequestContinueInChat { show: true });
            host.editor.write().await.panel.hide();
            None
        }
        ResponseItem::Insert => dispatch_if_current(host, &ctx, token).await,
        ResponseItem::UseAsCaption => {
            use_as_caption(&mut *host.editor.write().await);
            None
        }
        ResponseItem::Retry => {
            host.retry().await;
            None
        }
        ResponseItem::Discard => {
            host.editor.write().await.panel.discard();
            None
        }
    }
}

/// Write the answer into the caption of the single selected image block.
fn use_as_caption(editor: &mut Editor) {
    let Some(caption) = editor.panel.answer().and_then(Answer::as_text).map(str::to_owned) else {
        return;
    };
    let &[selected] = editor.selection.elements.as_slice() else {
        debug!(count = editor.selection.elements.len(), "use_as_caption: need exactly one selection");
        return;
    };
    let is_image = editor
        .doc
        .block(selected)
        .is_some_and(|b| matches!(b.props, BlockProps::Image { .. }));
    if !is_image {
        return;
    }
    let result = editor.doc.transact(|doc| {
        doc.update_block(selected, |props| {
            if let BlockProps::Image { caption: slot, .. } = props {
                *slot = Some(caption);
            }
        })
    });
    match result {
        Ok(()) => editor.panel.hide(),
        Err(e) => error!(error = %e, "use_as_caption: failed"),
    }
}

// =============================================================================
// ERROR ACTIONS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorAction {
    Upgrade,
    Login,
    Cancel,
}

/// Handle an error-state button. Always hides the panel.
pub async fn execute_error_action(host: &HostContext, action: ErrorAction) {
    match action {
        ErrorAction::Upgrade => {
            host.provider.emit(ProviderEvent::RequestUpgradePlan);
        }
        ErrorAction::Login => {
            host.provider.emit(ProviderEvent::RequestLogin);
        }
        ErrorAction::Cancel => {}
    }
    host.editor.write().await.panel.hide();
}

#[cfg(test)]
#[path = "responses_test.rs"]
mod tests;
