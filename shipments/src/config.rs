//! Shipment API client configuration.

use std::time::Duration;

/// Environment variable overriding the API base URL.
pub const API_URL_ENV: &str = "SHIPTRACK_API_URL";

/// Where and how the client reaches the shipment backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiClientConfig {
    /// Base URL every path is appended to.
    ///
    /// Default: `http://localhost:8080/api`
    pub base_url: String,

    /// Per-request timeout.
    ///
    /// Default: 30 seconds
    pub timeout: Duration,
}

impl ApiClientConfig {
    /// Default base URL.
    pub const DEFAULT_BASE_URL: &'static str = "http://localhost:8080/api";

    /// Create configuration for `base_url`.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Read the base URL from `SHIPTRACK_API_URL`, falling back to the default.
    #[must_use]
    pub fn from_env() -> Self {
        std::env::var(API_URL_ENV)
            .ok()
            .filter(|url| !url.trim().is_empty())
            .map_or_else(Self::default, Self::new)
    }

    /// Set the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for ApiClientConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_BASE_URL)
    }
}
