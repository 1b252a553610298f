//! Translation platform API client.
//!
//! Every request path is prefixed with the projects endpoint. The API key and
//! JSON content type are attached as default headers unless the caller
//! supplies its own header set, which then replaces them entirely.

use std::time::Duration;

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::env_var;

pub const TRANSLATION_API_URL: &str = "https://i18n.compose.pro";
const API_KEY_ENV: &str = "TOLGEE_API_KEY";
const API_KEY_HEADER: &str = "X-API-Key";
const REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, thiserror::Error)]
pub enum I18nError {
    #[error("please set \"TOLGEE_API_KEY\" as environment variable")]
    MissingApiKey,

    #[error("API key is not a valid header value")]
    InvalidApiKey,

    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),

    #[error("translation request failed: {0}")]
    Request(String),

    #[error("translation API returned status {status}")]
    Status { status: u16, body: String },

    #[error("translation response parse failed: {0}")]
    Parse(String),
}

impl crate::error::ErrorCode for I18nError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::MissingApiKey => "E_MISSING_API_KEY",
            Self::InvalidApiKey => "E_INVALID_API_KEY",
            Self::HttpClientBuild(_) => "E_HTTP_CLIENT_BUILD",
            Self::Request(_) => "E_TRANSLATION_REQUEST",
            Self::Status { .. } => "E_TRANSLATION_STATUS",
            Self::Parse(_) => "E_TRANSLATION_PARSE",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Request(_) | Self::Status { status: 429 | 500..=599, .. })
    }
}

pub struct TranslationClient {
    http: reqwest::Client,
    base_url: String,
    headers: HeaderMap,
}

impl TranslationClient {
    /// # Errors
    ///
    /// `MissingApiKey` when `TOLGEE_API_KEY` is unset or empty.
    pub fn from_env() -> Result<Self, I18nError> {
        match env_var(API_KEY_ENV) {
            Some(key) if !key.is_empty() => Self::new(&key, TRANSLATION_API_URL),
            _ => Err(I18nError::MissingApiKey),
        }
    }

    /// # Errors
    ///
    /// `InvalidApiKey` when the key cannot be sent as a header.
    pub fn new(api_key: &str, api_url: &str) -> Result<Self, I18nError> {
        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(api_key).map_err(|_| I18nError::InvalidApiKey)?;
        headers.insert(API_KEY_HEADER, key);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| I18nError::HttpClientBuild(e.to_string()))?;
        let base_url = format!("{}/v2/projects", api_url.trim_end_matches('/'));
        Ok(Self { http, base_url, headers })
    }

    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Request builder for `path` with the default headers.
    #[must_use]
    pub fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.request_with_headers(method, path, None)
    }

    /// Request builder for `path`. Caller headers replace the defaults.
    #[must_use]
    pub fn request_with_headers(
        &self,
        method: reqwest::Method,
        path: &str,
        headers: Option<HeaderMap>,
    ) -> reqwest::RequestBuilder {
        let headers = headers.unwrap_or_else(|| self.headers.clone());
        self.http
            .request(method, self.endpoint(path))
            .headers(headers)
    }

    /// GET `path` and decode the JSON body.
    ///
    /// # Errors
    ///
    /// Transport failures, non-success status, or undecodable bodies.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, I18nError> {
        debug!(path, "i18n: GET");
        let response = self
            .request(reqwest::Method::GET, path)
            .send()
            .await
            .map_err(|e| I18nError::Request(e.to_string()))?;
        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| I18nError::Request(e.to_string()))?;
        if !(200..300).contains(&status) {
            return Err(I18nError::Status { status, body: text });
        }
        serde_json::from_str(&text).map_err(|e| I18nError::Parse(e.to_string()))
    }
}

#[cfg(test)]
#[path = "i18n_test.rs"]
mod tests;
