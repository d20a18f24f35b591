//! Client configuration.
//!
//! `ClientConfig` carries the log service endpoint and the sync trigger
//! policy. Front ends load it from their own settings file and may layer
//! environment overrides on top with [`ClientConfig::with_env_overrides`].

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::util::{is_http_url, normalize_text_option};

/// Endpoint used when nothing is configured (local development server)
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:4000/api";
/// Environment variable overriding the API base URL
pub const API_URL_ENV: &str = "EVIDENT_API_URL";

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClientConfig {
    #[serde(default)]
    pub api_base_url: Option<String>,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Periodic sync interval; `None` or zero disables the timer trigger.
    #[serde(default)]
    pub sync_interval_secs: Option<u64>,
    /// Run a sync round whenever the client resumes.
    #[serde(default = "default_sync_on_resume")]
    pub sync_on_resume: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: None,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            sync_interval_secs: None,
            sync_on_resume: true,
        }
    }
}

const fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

const fn default_sync_on_resume() -> bool {
    true
}

impl ClientConfig {
    /// Configured API base URL, falling back to [`DEFAULT_API_BASE_URL`]
    pub fn api_base_url(&self) -> String {
        normalize_text_option(self.api_base_url.clone())
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    pub fn sync_interval(&self) -> Option<Duration> {
        self.sync_interval_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }

    /// Apply `EVIDENT_API_URL` when it is set and non-empty.
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.with_api_url_override(std::env::var(API_URL_ENV).ok())
    }

    fn with_api_url_override(mut self, value: Option<String>) -> Self {
        if let Some(url) = normalize_text_option(value) {
            self.api_base_url = Some(url);
        }
        self
    }

    /// Trim values and validate the endpoint, if one is set.
    pub fn normalized(mut self) -> Result<Self> {
        self.api_base_url = normalize_text_option(self.api_base_url)
            .map(|url| normalize_api_base_url(&url))
            .transpose()?;
        Ok(self)
    }
}

/// Trim an API base URL, require an http(s) scheme, and drop trailing slashes.
pub fn normalize_api_base_url(raw: &str) -> Result<String> {
    let Some(url) = normalize_text_option(Some(raw.to_string())) else {
        return Err(Error::Config("API base URL must not be empty".to_string()));
    };
    if !is_http_url(&url) {
        return Err(Error::Config(
            "API base URL must include http:// or https://".to_string(),
        ));
    }
    Ok(url.trim_end_matches('/').to_string())
}
