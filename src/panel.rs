//! AI panel: owns the single live answer for one in-flight request.
//!
//! DESIGN
//! ======
//! Every generation takes a `RequestToken`. A completion is accepted only if
//! its token is current and the panel is still generating, so a late answer
//! for a discarded or retried request is dropped instead of replacing the
//! live one. `hide` consumes the answer and invalidates the token.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::actions::{ActionContext, ActionVariants, AiAction};
use crate::doc::MindmapNode;

// =============================================================================
// TYPES
// =============================================================================

/// AI-generated payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum Answer {
    Text(String),
    Url(String),
    Tree(MindmapNode),
}

impl Answer {
    /// Textual payload for text and URL answers.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) | Self::Url(s) => Some(s),
            Self::Tree(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PanelState {
    Hidden,
    Generating,
    Finished,
    Error { code: String, message: String },
}

/// Identifies one generation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestToken(u64);

/// What the panel was asked to do, kept so retry can re-issue it.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelSession {
    pub action: AiAction,
    pub input: String,
    pub ctx: ActionContext,
    pub variants: ActionVariants,
}

#[derive(Debug)]
pub struct AiPanel {
    state: PanelState,
    answer: Option<Answer>,
    request: u64,
    session: Option<PanelSession>,
}

// =============================================================================
// LIFECYCLE
// =============================================================================

impl AiPanel {
    #[must_use]
    pub fn new() -> Self {
        Self { state: PanelState::Hidden, answer: None, request: 0, session: None }
    }

    #[must_use]
    pub fn state(&self) -> &PanelState {
        &self.state
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.state != PanelState::Hidden
    }

    #[must_use]
    pub fn answer(&self) -> Option<&Answer> {
        self.answer.as_ref()
    }

    #[must_use]
    pub fn session(&self) -> Option<&PanelSession> {
        self.session.as_ref()
    }

    /// Token of the panel's current request. Any begin or hide moves it on.
    #[must_use]
    pub fn request_token(&self) -> RequestToken {
        RequestToken(self.request)
    }

    #[must_use]
    pub fn is_current(&self, token: RequestToken) -> bool {
        token.0 == self.request
    }

    /// Start a new generation, dropping any previous answer.
    pub fn begin(&mut self, session: PanelSession) -> RequestToken {
        self.request += 1;
        self.answer = None;
        self.state = PanelState::Generating;
        self.session = Some(session);
        RequestToken(self.request)
    }

    /// Start a new generation for the current session (retry).
    pub fn regenerate(&mut self) -> Option<(RequestToken, PanelSession)> {
        let session = self.session.clone()?;
        let token = self.begin(session.clone());
        Some((token, session))
    }

    /// Accept an answer. Returns `false` when the token is stale.
    pub fn complete(&mut self, token: RequestToken, answer: Answer) -> bool {
        if !self.accepts(token) {
            debug!(token = token.0, current = self.request, "panel: dropping stale answer");
            return false;
        }
        self.answer = Some(answer);
        self.state = PanelState::Finished;
        true
    }

    /// Record a generation failure. Returns `false` when the token is stale.
    pub fn fail(&mut self, token: RequestToken, code: &str, message: &str) -> bool {
        if !self.accepts(token) {
            return false;
        }
        self.answer = None;
        self.state = PanelState::Error { code: code.to_owned(), message: message.to_owned() };
        true
    }

    /// Close the panel. The live answer is consumed.
    pub fn hide(&mut self) {
        self.request += 1;
        self.answer = None;
        self.state = PanelState::Hidden;
    }

    /// Throw the current answer away and close.
    pub fn discard(&mut self) {
        debug!(had_answer = self.answer.is_some(), "panel: discard");
        self.hide();
    }

    fn accepts(&self, token: RequestToken) -> bool {
        token.0 == self.request && self.state == PanelState::Generating
    }
}

impl Default for AiPanel {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "panel_test.rs"]
mod tests;
