//! Configuration management for the role service.
//!
//! Loads configuration from environment variables with sensible defaults.

use serde::{Deserialize, Serialize};
use shiptrack_auth::IdentityToolkitConfig;
use std::env;
use std::time::Duration;

/// Role service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,
    /// Port to bind to
    pub port: u16,
    /// Identity project the users belong to
    pub project_id: String,
    /// `host:port` of a local auth emulator
    pub emulator_host: Option<String>,
    /// OAuth access token for admin Identity Toolkit calls.
    ///
    /// Fixed for the life of the process; it stops working when it expires
    pub access_token: Option<String>,
    /// File holding the admin access token, re-read on every admin call
    pub access_token_file: Option<String>,
    /// Web API key for id token lookups
    pub api_key: Option<String>,
    /// Shared secret of the user-created trigger
    pub trigger_secret: Option<String>,
    /// Timeout of outgoing Identity Toolkit calls, in seconds
    pub http_timeout_secs: u64,
    /// Origins allowed to call the callables from a browser (empty = any)
    pub cors_allowed_origins: Vec<String>,
}

impl ServerConfig {
    /// Load configuration from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through `lookup`, which returns a variable's value.
    ///
    /// Blank values count as unset.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        Self {
            host: var("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: var("PORT").and_then(|s| s.parse().ok()).unwrap_or(8081),
            project_id: var("FIREBASE_PROJECT_ID").unwrap_or_else(|| "demo-shiptrack".to_string()),
            emulator_host: var("FIREBASE_AUTH_EMULATOR_HOST"),
            access_token: var("IDENTITY_TOOLKIT_ACCESS_TOKEN"),
            access_token_file: var("IDENTITY_TOOLKIT_ACCESS_TOKEN_FILE"),
            api_key: var("IDENTITY_TOOLKIT_API_KEY"),
            trigger_secret: var("ROLE_SERVICE_TRIGGER_SECRET"),
            http_timeout_secs: var("HTTP_TIMEOUT_SECS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),
            cors_allowed_origins: var("CORS_ALLOWED_ORIGINS")
                .map(|origins| {
                    origins
                        .split(',')
                        .map(str::trim)
                        .filter(|origin| !origin.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
        }
    }

    /// Address to bind, `host:port`.
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Identity Toolkit settings derived from this configuration.
    #[must_use]
    pub fn identity_toolkit(&self) -> IdentityToolkitConfig {
        let mut config = IdentityToolkitConfig::new(self.project_id.clone());
        config.timeout = Duration::from_secs(self.http_timeout_secs);
        if let Some(host) = &self.emulator_host {
            config = config.with_emulator_host(host.clone());
        }
        if let Some(token) = &self.access_token {
            config = config.with_access_token(token.clone());
        }
        if let Some(path) = &self.access_token_file {
            config = config.with_access_token_file(path);
        }
        if let Some(key) = &self.api_key {
            config = config.with_api_key(key.clone());
        }
        config
    }
}
