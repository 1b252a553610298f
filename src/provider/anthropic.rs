//! Anthropic Messages API backend.
//!
//! Thin HTTP wrapper for `/v1/messages`. Each action becomes one system
//! instruction plus the user's input as a single user turn. Parsing lives in
//! `parse_response` so it can be tested without a network.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::config::LlmConfig;
use super::{ActionRequest, AiBackend, ProviderError};
use crate::actions::{ActionVariants, AiAction};

const API_VERSION: &str = "2023-06-01";

// =============================================================================
// CLIENT
// =============================================================================

pub struct AnthropicBackend {
    http: reqwest::Client,
    api_key: String,
    model: String,
    messages_url: String,
    max_tokens: u32,
}

impl AnthropicBackend {
    /// # Errors
    ///
    /// Returns `HttpClientBuild` if the HTTP client cannot be constructed.
    pub fn from_config(config: LlmConfig) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeouts.request_secs))
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .build()
            .map_err(|e| ProviderError::HttpClientBuild(e.to_string()))?;
        Ok(Self {
            http,
            api_key: config.api_key,
            model: config.model,
            messages_url: format!("{}/messages", config.base_url),
            max_tokens: config.max_tokens,
        })
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait::async_trait]
impl AiBackend for AnthropicBackend {
    async fn complete(&self, request: &ActionRequest) -> Result<String, ProviderError> {
        let system = instruction(request.action, &request.variants);
        let messages = [Message { role: "user", content: &request.input }];
        let body = ApiRequest { model: &self.model, max_tokens: self.max_tokens, system: &system, messages: &messages };

        info!(action = %request.action, model = %self.model, "anthropic: request");
        let response = self
            .http
            .post(&self.messages_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::ApiRequest(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| ProviderError::ApiRequest(e.to_string()))?;

        match status {
            200 => parse_response(&text),
            401 | 403 => Err(ProviderError::Unauthorized),
            402 | 429 => Err(ProviderError::PaymentRequired),
            _ => {
                warn!(status, "anthropic: error response");
                Err(ProviderError::ApiResponse { status, body: text })
            }
        }
    }
}

// =============================================================================
// PROMPTS
// =============================================================================

/// System instruction for `action`.
#[must_use]
pub fn instruction(action: AiAction, variants: &ActionVariants) -> String {
    let base = match action {
        AiAction::Chat => "You are a helpful writing assistant. Answer the user's request.",
        AiAction::Summary => "Summarize the key points of the following content.",
        AiAction::Translate => "Translate the following content.",
        AiAction::ChangeTone => "Rewrite the following content in a different tone.",
        AiAction::ImproveWriting => "Improve the writing of the following content.",
        AiAction::ImproveGrammar => "Fix the grammar of the following content.",
        AiAction::FixSpelling => "Fix the spelling of the following content.",
        AiAction::MakeLonger => "Expand the following content.",
        AiAction::MakeShorter => "Shorten the following content.",
        AiAction::ContinueWriting => "Continue writing the following content.",
        AiAction::WriteOutline => "Write an outline for the following content.",
        AiAction::FindActions => "List the action items in the following content as a todo list.",
        AiAction::ExpandMindmap => {
            "Expand the following mind map node. Reply with a markdown list whose first item is the node \
             and whose nested items are its new children."
        }
        AiAction::BrainstormMindmap => {
            "Brainstorm a mind map for the following topic. Reply with a markdown list; the first item is \
             the root and nested items are its branches."
        }
        AiAction::MakeItReal => "Turn the following description into a single self-contained HTML page.",
        AiAction::CreateSlides => "Outline a slide deck for the following content.",
        AiAction::CreateImage | AiAction::ProcessImage | AiAction::FilterImage => {
            "Reply with only the URL of an image matching the following request."
        }
        AiAction::GenerateCaption => "Write a one-sentence caption for the following image description.",
    };
    let mut out = format!("{base} Reply in markdown unless told otherwise.");
    if let Some(lang) = &variants.lang {
        out.push_str(&format!(" Target language: {lang}."));
    }
    if let Some(tone) = &variants.tone {
        out.push_str(&format!(" Tone: {tone}."));
    }
    if let Some(style) = &variants.style {
        out.push_str(&format!(" Style: {style}."));
    }
    out
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ApiRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: &'a [Message<'a>],
}

#[derive(Deserialize)]
struct ApiResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
#[serde(tag = "type")]
enum ContentBlock {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(other)]
    Unknown,
}

// =============================================================================
// PARSING
// =============================================================================

/// Concatenate every text block of a messages response.
fn parse_response(json: &str) -> Result<String, ProviderError> {
    let api: ApiResponse = serde_json::from_str(json).map_err(|e| ProviderError::ApiParse(e.to_string()))?;
    let text: Vec<String> = api
        .content
        .into_iter()
        .filter_map(|block| match block {
            ContentBlock::Text { text } => Some(text),
            ContentBlock::Unknown => None,
        })
        .collect();
    Ok(text.join("\n"))
}

#[cfg(test)]
#[path = "anthropic_test.rs"]
mod tests;
