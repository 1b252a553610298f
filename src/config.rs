//! Runtime configuration parsed from environment variables.
//!
//! DESIGN
//! ======
//! `DesktopConfig` resolves the release channel and the cloud base URL the
//! shell talks to. The channel is validated before any URL is derived, so an
//! unknown `BUILD_TYPE` is fatal at startup. `ServerConfig` covers the HTTP
//! surface of this crate.

use std::str::FromStr;

pub const DEFAULT_PORT: u16 = 3000;

/// Channel baked in at compile time, used when `BUILD_TYPE` is unset.
const BUILD_TIME_CHANNEL: &str = match option_env!("BUILD_TYPE") {
    Some(channel) => channel,
    None => "stable",
};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid BUILD_TYPE: {0:?} (expected stable, beta, canary or internal)")]
    InvalidReleaseChannel(String),
}

// =============================================================================
// RELEASE CHANNEL
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseChannel {
    Stable,
    Beta,
    Canary,
    Internal,
}

impl ReleaseChannel {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Stable => "stable",
            Self::Beta => "beta",
            Self::Canary => "canary",
            Self::Internal => "internal",
        }
    }

    /// Cloud server for this channel.
    #[must_use]
    pub fn server_url(self) -> &'static str {
        match self {
            Self::Stable => "https://app.compose.pro",
            Self::Beta | Self::Internal => "https://insider.compose.pro",
            Self::Canary => "https://affine.fail",
        }
    }
}

impl FromStr for ReleaseChannel {
    type Err = ConfigError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_lowercase().as_str() {
            "stable" => Ok(Self::Stable),
            "beta" => Ok(Self::Beta),
            "canary" => Ok(Self::Canary),
            "internal" => Ok(Self::Internal),
            _ => Err(ConfigError::InvalidReleaseChannel(raw.to_owned())),
        }
    }
}

// =============================================================================
// DESKTOP CONFIG
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesktopConfig {
    pub channel: ReleaseChannel,
    /// Set only when the runtime `BUILD_TYPE` is exactly `internal`.
    pub override_session: bool,
    pub mode: Option<String>,
    pub is_dev: bool,
    pub cloud_base_url: String,
}

impl DesktopConfig {
    /// Read `BUILD_TYPE`, `NODE_ENV` and `DEV_SERVER_URL`.
    ///
    /// # Errors
    ///
    /// `InvalidReleaseChannel` for an unknown `BUILD_TYPE`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let build_type = env_var("BUILD_TYPE");
        let node_env = env_var("NODE_ENV");
        let dev_server = env_var("DEV_SERVER_URL");
        Self::resolve(build_type.as_deref(), node_env.as_deref(), dev_server.as_deref())
    }

    /// Pure resolution from raw values.
    ///
    /// # Errors
    ///
    /// `InvalidReleaseChannel` for an unknown build type.
    pub fn resolve(
        build_type: Option<&str>,
        node_env: Option<&str>,
        dev_server_url: Option<&str>,
    ) -> Result<Self, ConfigError> {
        let raw = build_type
            .filter(|v| !v.is_empty())
            .unwrap_or(BUILD_TIME_CHANNEL);
        let channel: ReleaseChannel = raw.parse()?;
        let cloud_base_url = match dev_server_url {
            Some(url) if !url.is_empty() => url.to_owned(),
            _ => channel.server_url().to_owned(),
        };
        Ok(Self {
            channel,
            override_session: build_type == Some("internal"),
            mode: node_env.map(str::to_owned),
            is_dev: node_env == Some("development"),
            cloud_base_url,
        })
    }
}

// =============================================================================
// SERVER CONFIG
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    pub image_proxy: Option<String>,
}

impl ServerConfig {
    /// Optional: `PORT` (default 3000), `IMAGE_PROXY_URL`.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            port: env_parse("PORT", DEFAULT_PORT),
            image_proxy: env_var("IMAGE_PROXY_URL").filter(|v| !v.is_empty()),
        }
    }
}

// =============================================================================
// HELPERS
// =============================================================================

/// Value of `key`, `None` when unset or not unicode.
#[must_use]
pub fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Parse `key`, falling back to `default` when unset or malformed.
#[must_use]
pub fn env_parse<T: FromStr>(key: &str, default: T) -> T {
    env_var(key)
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
