//! AI provider: backend abstraction plus the provider event bus.
//!
//! DESIGN
//! ======
//! `AiBackend` is the seam between the panel and whatever model produces
//! answers. Tests substitute a mock; production uses the Anthropic
//! messages backend. `AiProvider` also carries a typed broadcast bus for the
//! requests the panel raises on behalf of the user (login, upgrade, open
//! chat). Emitting with no subscribers is not an error.

pub mod anthropic;
pub mod config;

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::actions::{ActionVariants, AiAction, AnswerKind};
use crate::panel::Answer;

const EVENT_CHANNEL_CAPACITY: usize = 64;

// =============================================================================
// ERROR
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// No backend is configured; AI features are disabled.
    #[error("AI backend not configured")]
    NotConfigured,

    /// The backend rejected the credentials.
    #[error("login required")]
    Unauthorized,

    /// The account ran out of quota.
    #[error("usage limit reached")]
    PaymentRequired,

    #[error("config parse failed: {0}")]
    ConfigParse(String),

    #[error("missing API key: env var {var} not set")]
    MissingApiKey { var: String },

    #[error("API request failed: {0}")]
    ApiRequest(String),

    #[error("API response error: status {status}")]
    ApiResponse { status: u16, body: String },

    #[error("API response parse failed: {0}")]
    ApiParse(String),

    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),

    #[error("backend returned an empty answer")]
    EmptyAnswer,
}

impl crate::error::ErrorCode for ProviderError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotConfigured => "E_NOT_CONFIGURED",
            Self::Unauthorized => "E_UNAUTHORIZED",
            Self::PaymentRequired => "E_PAYMENT_REQUIRED",
            Self::ConfigParse(_) => "E_CONFIG_PARSE",
            Self::MissingApiKey { .. } => "E_MISSING_API_KEY",
            Self::ApiRequest(_) => "E_API_REQUEST",
            Self::ApiResponse { .. } => "E_API_RESPONSE",
            Self::ApiParse(_) => "E_API_PARSE",
            Self::HttpClientBuild(_) => "E_HTTP_CLIENT_BUILD",
            Self::EmptyAnswer => "E_EMPTY_ANSWER",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::ApiRequest(_) | Self::ApiResponse { status: 429 | 500..=599, .. })
    }
}

// =============================================================================
// EVENTS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ProviderEvent {
    RequestLogin,
    RequestUpgradePlan,
    RequestOpenWithChat,
    RequestContinueInChat { show: bool },
}

// =============================================================================
// BACKEND
// =============================================================================

/// One generation request.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionRequest {
    pub action: AiAction,
    pub input: String,
    pub variants: ActionVariants,
}

#[async_trait::async_trait]
pub trait AiBackend: Send + Sync {
    /// Produce raw answer text for `request`.
    async fn complete(&self, request: &ActionRequest) -> Result<String, ProviderError>;
}

pub struct AiProvider {
    backend: Option<Arc<dyn AiBackend>>,
    events: broadcast::Sender<ProviderEvent>,
}

impl AiProvider {
    #[must_use]
    pub fn new(backend: Option<Arc<dyn AiBackend>>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { backend, events }
    }

    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.backend.is_some()
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ProviderEvent> {
        self.events.subscribe()
    }

    /// Publish `event`. Returns the number of subscribers that received it.
    pub fn emit(&self, event: ProviderEvent) -> usize {
        info!(?event, "provider: emit");
        match self.events.send(event) {
            Ok(n) => n,
            Err(_) => {
                debug!("provider: no subscribers");
                0
            }
        }
    }

    /// Run `request` and shape the raw text into an `Answer`.
    ///
    /// # Errors
    ///
    /// `NotConfigured` without a backend; otherwise backend failures and
    /// `EmptyAnswer` for blank output.
    pub async fn run(&self, request: &ActionRequest) -> Result<Answer, ProviderError> {
        let backend = self.backend.as_ref().ok_or(ProviderError::NotConfigured)?;
        let raw = backend.complete(request).await?;
        let text = raw.trim();
        if text.is_empty() {
            return Err(ProviderError::EmptyAnswer);
        }
        Ok(match request.action.answer_kind() {
            AnswerKind::Url => Answer::Url(text.to_owned()),
            AnswerKind::Text | AnswerKind::Tree => Answer::Text(text.to_owned()),
        })
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
