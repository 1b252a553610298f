//! AI backend configuration parsed from environment variables.

use super::ProviderError;
use crate::config::{env_parse, env_var};

pub const DEFAULT_ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com/v1";
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-5-20250929";
pub const DEFAULT_MAX_TOKENS: u32 = 4096;
pub const DEFAULT_LLM_REQUEST_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_LLM_CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LlmTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub max_tokens: u32,
    pub timeouts: LlmTimeouts,
}

impl LlmConfig {
    /// Build typed config from environment variables.
    ///
    /// Required:
    /// - `LLM_API_KEY_ENV` (names the env var containing the key)
    ///
    /// Optional:
    /// - `LLM_MODEL`: default model when absent
    /// - `LLM_BASE_URL`: default Anthropic API base URL
    /// - `LLM_MAX_TOKENS`: default 4096
    /// - `LLM_REQUEST_TIMEOUT_SECS`: default 120
    /// - `LLM_CONNECT_TIMEOUT_SECS`: default 10
    ///
    /// # Errors
    ///
    /// `MissingApiKey` when either variable is unset, `ConfigParse` for a
    /// zero token limit.
    pub fn from_env() -> Result<Self, ProviderError> {
        let key_var = env_var("LLM_API_KEY_ENV").ok_or_else(|| ProviderError::MissingApiKey {
            var: "LLM_API_KEY_ENV".into(),
        })?;
        let api_key = env_var(&key_var).ok_or_else(|| ProviderError::MissingApiKey { var: key_var.clone() })?;

        let model = env_var("LLM_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let base_url = env_var("LLM_BASE_URL")
            .unwrap_or_else(|| DEFAULT_ANTHROPIC_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        let max_tokens = env_parse("LLM_MAX_TOKENS", DEFAULT_MAX_TOKENS);
        if max_tokens == 0 {
            return Err(ProviderError::ConfigParse("LLM_MAX_TOKENS must be positive".into()));
        }
        let timeouts = LlmTimeouts {
            request_secs: env_parse("LLM_REQUEST_TIMEOUT_SECS", DEFAULT_LLM_REQUEST_TIMEOUT_SECS),
            connect_secs: env_parse("LLM_CONNECT_TIMEOUT_SECS", DEFAULT_LLM_CONNECT_TIMEOUT_SECS),
        };

        Ok(Self { api_key, model, base_url, max_tokens, timeouts })
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
