use std::sync::Arc;

use edgeless_copilot::config::{ConfigError, DesktopConfig, ServerConfig};
use edgeless_copilot::doc::Document;
use edgeless_copilot::editor::Editor;
use edgeless_copilot::host::HostContext;
use edgeless_copilot::images::{FetchError, HttpFetcher};
use edgeless_copilot::provider::anthropic::AnthropicBackend;
use edgeless_copilot::provider::config::LlmConfig;
use edgeless_copilot::provider::{AiBackend, AiProvider};
use edgeless_copilot::routes;
use edgeless_copilot::telemetry::TracingTelemetry;

#[derive(Debug, thiserror::Error)]
enum StartupError {
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("image fetcher: {0}")]
    Fetcher(#[from] FetchError),
    #[error("server: {0}")]
    Io(#[from] std::io::Error),
}

#[tokio::main]
async fn main() -> Result<(), StartupError> {
    let dotenv = dotenvy::dotenv();
    tracing_subscriber::fmt::init();
    if let Err(e) = dotenv {
        tracing::debug!(error = %e, "no .env loaded");
    }

    // Fatal: an unknown release channel must stop startup before any URL is used.
    let desktop = DesktopConfig::from_env()?;
    tracing::info!(
        channel = desktop.channel.as_str(),
        cloud_base_url = %desktop.cloud_base_url,
        is_dev = desktop.is_dev,
        "release channel resolved"
    );
    let server = ServerConfig::from_env();

    // Non-fatal: AI features are disabled without a backend.
    let backend: Option<Arc<dyn AiBackend>> = match LlmConfig::from_env().and_then(AnthropicBackend::from_config) {
        Ok(backend) => {
            tracing::info!(model = backend.model(), "AI backend initialized");
            Some(Arc::new(backend))
        }
        Err(e) => {
            tracing::warn!(error = %e, "AI backend not configured, AI features disabled");
            None
        }
    };

    let host = HostContext::new(
        Editor::new(Document::new("Untitled")),
        AiProvider::new(backend),
        Arc::new(HttpFetcher::new()?),
        Arc::new(TracingTelemetry),
    )
    .with_image_proxy(server.image_proxy);

    let app = routes::app(host);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", server.port)).await?;

    tracing::info!(port = server.port, "edgeless-copilot listening");
    axum::serve(listener, app).await?;
    Ok(())
}
