//! Host context: the editor plus every service a response handler needs.
//!
//! DESIGN
//! ======
//! `HostContext` is cloned into request handlers and background tasks. It
//! replaces any global panel or provider lookup: whoever holds a context can
//! reach exactly one editor, one provider, one fetcher and one telemetry
//! sink. The editor lock is never held across a provider call.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::actions::{ActionContext, ActionVariants, AiAction};
use crate::editor::Editor;
use crate::error::ErrorCode;
use crate::images::AssetFetcher;
use crate::panel::{PanelSession, PanelState, RequestToken};
use crate::provider::{ActionRequest, AiProvider};
use crate::telemetry::Telemetry;

#[derive(Clone)]
pub struct HostContext {
    pub editor: Arc<RwLock<Editor>>,
    pub provider: Arc<AiProvider>,
    pub fetcher: Arc<dyn AssetFetcher>,
    pub telemetry: Arc<dyn Telemetry>,
    pub image_proxy: Option<String>,
}

impl HostContext {
    #[must_use]
    pub fn new(
        editor: Editor,
        provider: AiProvider,
        fetcher: Arc<dyn AssetFetcher>,
        telemetry: Arc<dyn Telemetry>,
    ) -> Self {
        Self {
            editor: Arc::new(RwLock::new(editor)),
            provider: Arc::new(provider),
            fetcher,
            telemetry,
            image_proxy: None,
        }
    }

    #[must_use]
    pub fn with_image_proxy(mut self, proxy: Option<String>) -> Self {
        self.image_proxy = proxy;
        self
    }

    /// Start `action` on the current selection and wait for the answer.
    /// An empty `input` falls back to the text of the selected shapes.
    pub async fn trigger(&self, action: AiAction, input: String, variants: ActionVariants) -> PanelState {
        let session = {
            let editor = self.editor.read().await;
            let selected = &editor.selection.elements;
            let ctx = match ActionContext::for_action(action).with_selection(selected) {
                ActionContext::MakeItReal { .. } => {
                    let bound = editor.selection_bound();
                    ActionContext::MakeItReal { width: bound.map(|b| b.w), height: bound.map(|b| b.h) }
                }
                ctx => ctx,
            };
            let input = if input.trim().is_empty() {
                selected
                    .iter()
                    .filter_map(|id| editor.doc.shape(*id).map(|s| s.text.clone()))
                    .collect::<Vec<_>>()
                    .join("\n")
            } else {
                input
            };
            PanelSession { action, input, ctx, variants }
        };
        self.generate(session).await
    }

    /// Open the panel for `session` and run it.
    pub async fn generate(&self, session: PanelSession) -> PanelState {
        let token = self.editor.write().await.panel.begin(session.clone());
        self.run(token, session).await
    }

    /// Re-run the panel's current session. `None` when there is none.
    pub async fn retry(&self) -> Option<PanelState> {
        let (token, session) = self.editor.write().await.panel.regenerate()?;
        Some(self.run(token, session).await)
    }

    async fn run(&self, token: RequestToken, session: PanelSession) -> PanelState {
        info!(action = %session.action, "host: generating");
        let request = ActionRequest { action: session.action, input: session.input, variants: session.variants };
        let result = self.provider.run(&request).await;

        let mut editor = self.editor.write().await;
        match result {
            Ok(answer) => {
                editor.panel.complete(token, answer);
            }
            Err(e) => {
                warn!(error = %e, code = e.error_code(), action = %request.action, "host: generation failed");
                editor.panel.fail(token, e.error_code(), &e.to_string());
            }
        }
        editor.panel.state().clone()
    }
}

#[cfg(test)]
#[path = "host_helpers_test.rs"]
pub mod test_helpers;

#[cfg(test)]
#[path = "host_test.rs"]
mod tests;
