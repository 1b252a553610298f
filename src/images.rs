//! Image proxy contract: resolve an AI answer (data URL or URL) into a file.
//!
//! DESIGN
//! ======
//! `data:` URLs are decoded inline. Anything else is fetched through
//! `AssetFetcher`, optionally via an image proxy (`{proxy}?url=<url>`) so
//! cross-origin images resolve. The fetcher is a trait so tests can gate or
//! fail fetches without a network.

use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use percent_encoding::percent_decode_str;

use crate::editor::ImageFile;

const REQUEST_TIMEOUT_SECS: u64 = 60;
const CONNECT_TIMEOUT_SECS: u64 = 10;

// =============================================================================
// ERROR
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),

    #[error("fetch request failed: {0}")]
    Request(String),

    #[error("fetch returned status {status} for {url}")]
    Status { status: u16, url: String },

    #[error("invalid data URL: {0}")]
    InvalidDataUrl(String),

    #[error("invalid image proxy URL: {0}")]
    InvalidProxyUrl(String),
}

impl crate::error::ErrorCode for FetchError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::HttpClientBuild(_) => "E_HTTP_CLIENT_BUILD",
            Self::Request(_) => "E_FETCH_REQUEST",
            Self::Status { .. } => "E_FETCH_STATUS",
            Self::InvalidDataUrl(_) => "E_INVALID_DATA_URL",
            Self::InvalidProxyUrl(_) => "E_INVALID_PROXY_URL",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Request(_) | Self::Status { status: 429 | 500..=599, .. })
    }
}

// =============================================================================
// FETCHER
// =============================================================================

#[async_trait::async_trait]
pub trait AssetFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

pub struct HttpFetcher {
    http: reqwest::Client,
}

impl HttpFetcher {
    /// # Errors
    ///
    /// Returns `HttpClientBuild` if the TLS backend cannot initialise.
    pub fn new() -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(|e| FetchError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http })
    }
}

#[async_trait::async_trait]
impl AssetFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Request(e.to_string()))?;
        let status = response.status().as_u16();
        if !response.status().is_success() {
            return Err(FetchError::Status { status, url: url.to_owned() });
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|e| FetchError::Request(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}

// =============================================================================
// RESOLUTION
// =============================================================================

/// Resolve `data` into an image file named `{filename}.{ext}`. Returns
/// `Ok(None)` when the payload is empty.
///
/// # Errors
///
/// Malformed data URLs, bad proxy URLs, and fetch failures.
pub async fn fetch_image_to_file(
    fetcher: &dyn AssetFetcher,
    data: &str,
    filename: &str,
    proxy: Option<&str>,
) -> Result<Option<ImageFile>, FetchError> {
    let (declared, bytes) = match data.strip_prefix("data:") {
        Some(rest) => decode_data_url(rest)?,
        None => {
            let url = proxied_url(data, proxy)?;
            (None, fetcher.fetch(&url).await?)
        }
    };
    if bytes.is_empty() {
        return Ok(None);
    }
    let mime = declared.unwrap_or_else(|| sniff_mime(&bytes).to_owned());
    let name = format!("{filename}.{}", extension_for(&mime));
    Ok(Some(ImageFile { name, mime, bytes }))
}

/// `url` routed through `proxy` when one is configured.
///
/// # Errors
///
/// `InvalidProxyUrl` when the proxy is not an absolute URL.
pub fn proxied_url(url: &str, proxy: Option<&str>) -> Result<String, FetchError> {
    match proxy {
        None => Ok(url.to_owned()),
        Some(proxy) => reqwest::Url::parse_with_params(proxy, &[("url", url)])
            .map(|u| u.to_string())
            .map_err(|e| FetchError::InvalidProxyUrl(e.to_string())),
    }
}

/// Decode the part after `data:`. Returns the declared mime type, if any.
fn decode_data_url(rest: &str) -> Result<(Option<String>, Vec<u8>), FetchError> {
    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| FetchError::InvalidDataUrl("missing ',' separator".into()))?;
    let (mime, is_base64) = match meta.strip_suffix(";base64") {
        Some(mime) => (mime, true),
        None => (meta, false),
    };
    // The payload is URL-encoded in both forms.
    let decoded: Vec<u8> = percent_decode_str(payload.trim()).collect();
    let bytes = if is_base64 {
        STANDARD
            .decode(&decoded)
            .map_err(|e| FetchError::InvalidDataUrl(e.to_string()))?
    } else {
        decoded
    };
    let mime = mime.split(';').next().unwrap_or_default().trim();
    let mime = (!mime.is_empty()).then(|| mime.to_owned());
    Ok((mime, bytes))
}

fn sniff_mime(bytes: &[u8]) -> &'static str {
    if bytes.starts_with(b"\x89PNG") {
        "image/png"
    } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        "image/jpeg"
    } else if bytes.starts_with(b"GIF8") {
        "image/gif"
    } else if bytes.len() >= 12 && bytes.starts_with(b"RIFF") && &bytes[8..12] == b"WEBP" {
        "image/webp"
    } else if bytes.starts_with(b"<svg") || bytes.starts_with(b"<?xml") {
        "image/svg+xml"
    } else {
        "application/octet-stream"
    }
}

fn extension_for(mime: &str) -> &'static str {
    match mime {
        "image/png" => "png",
        "image/jpeg" => "jpg",
        "image/gif" => "gif",
        "image/webp" => "webp",
        "image/svg+xml" => "svg",
        _ => "bin",
    }
}

#[cfg(test)]
#[path = "images_test.rs"]
mod tests;
