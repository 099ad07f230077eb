//! Client configuration: explicit options merged with environment fallback.

use log::{debug, warn};
use reqwest::Url;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::runtime::Runtime;

pub const API_KEY_ENV: &str = "BLACKROAD_API_KEY";
pub const API_URL_ENV: &str = "BLACKROAD_API_URL";
pub const TIMEOUT_ENV: &str = "BLACKROAD_TIMEOUT_SECS";
pub const MAX_ATTEMPTS_ENV: &str = "BLACKROAD_MAX_ATTEMPTS";

pub const DEFAULT_BASE_URL: &str = "https://api.blackroad.io/v1";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Explicit client settings. Anything left as `None` falls back to the
/// environment, then to the built-in default.
#[derive(Debug, Clone, Default)]
pub struct ClientOptions {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub timeout: Option<Duration>,
    pub max_attempts: Option<u32>,
}

impl ClientOptions {
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            ..Default::default()
        }
    }
}

/// Resolved, immutable configuration owned by one client.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientConfig {
    api_key: String,
    base_url: String,
    timeout: Duration,
    max_attempts: u32,
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("max_attempts", &self.max_attempts)
            .finish()
    }
}

impl ClientConfig {
    /// Resolves the configuration. The environment is read here and nowhere else.
    ///
    /// Fails with [`Error::Authentication`] when neither `options` nor
    /// `BLACKROAD_API_KEY` provide a credential.
    #[tracing::instrument(skip(options, runtime))]
    pub fn resolve(options: ClientOptions, runtime: &dyn Runtime) -> Result<Self> {
        let api_key = non_empty(options.api_key)
            .or_else(|| env_value(runtime, API_KEY_ENV))
            .ok_or_else(|| {
                Error::Authentication(format!(
                    "API key required. Set {} environment variable or pass api_key in options.",
                    API_KEY_ENV
                ))
            })?;

        let base_url = non_empty(options.base_url)
            .or_else(|| env_value(runtime, API_URL_ENV))
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let base_url = normalize_base_url(&base_url);
        Url::parse(&base_url)
            .map_err(|e| Error::connection(format!("invalid base URL {}: {}", base_url, e)))?;

        let timeout = options
            .timeout
            .or_else(|| env_number::<u64>(runtime, TIMEOUT_ENV).map(Duration::from_secs))
            .unwrap_or(DEFAULT_TIMEOUT);

        let max_attempts = options
            .max_attempts
            .or_else(|| env_number::<u32>(runtime, MAX_ATTEMPTS_ENV))
            .unwrap_or(DEFAULT_MAX_ATTEMPTS)
            .max(1);

        debug!(
            "Resolved client config: base_url={}, timeout={:?}, max_attempts={}",
            base_url, timeout, max_attempts
        );

        Ok(Self {
            api_key,
            base_url,
            timeout,
            max_attempts,
        })
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Base address without a trailing `/`.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Total number of send attempts per call, always at least 1.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }
}

/// Trims exactly one trailing `/`.
pub fn normalize_base_url(base_url: &str) -> String {
    base_url.strip_suffix('/').unwrap_or(base_url).to_string()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn env_value(runtime: &dyn Runtime, key: &str) -> Option<String> {
    non_empty(runtime.env_var(key).ok())
}

fn env_number<T: std::str::FromStr>(runtime: &dyn Runtime, key: &str) -> Option<T> {
    let raw = env_value(runtime, key)?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Ignoring {}={:?}: not a valid number", key, raw);
            None
        }
    }
}
