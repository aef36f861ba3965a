//! Client settings: backend origin and timeouts, optionally from the environment.

use std::env;
use std::time::Duration;

const DEFAULT_API_URL: &str = "http://localhost:8000";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_SAVE_TIMEOUT_SECS: u64 = 15;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    /// Backend origin without trailing slash, e.g. `https://api.example.com`.
    pub api_base_url: String,
    /// Per-request timeout of the HTTP client.
    pub request_timeout: Duration,
    /// Upper bound for one remote save, including the wait behind earlier saves of the same line.
    pub save_timeout: Duration,
}

impl ClientConfig {
    pub fn new(api_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: api_base_url.into().trim_end_matches('/').to_string(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            save_timeout: Duration::from_secs(DEFAULT_SAVE_TIMEOUT_SECS),
        }
    }

    pub fn from_env() -> anyhow::Result<Self> {
        let base = env::var("STANDBOOK_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        if base.trim().is_empty() {
            anyhow::bail!("STANDBOOK_API_URL is set but empty");
        }
        let mut config = Self::new(base);
        config.request_timeout = Duration::from_secs(
            env::var("STANDBOOK_REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
        );
        config.save_timeout = Duration::from_secs(
            env::var("STANDBOOK_SAVE_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_SAVE_TIMEOUT_SECS),
        );
        Ok(config)
    }
}
