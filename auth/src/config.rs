//! Authentication configuration.
//!
//! Configuration values should be provided by the application; the defaults
//! match the production timings.

use crate::role::Role;
use shiptrack_runtime::retry::RetryPolicy;
use std::path::PathBuf;
use std::time::Duration;

/// How the client waits for a role claim to show up on its token.
#[derive(Debug, Clone, PartialEq)]
pub struct RolePollConfig {
    /// Forced token refreshes before giving up.
    ///
    /// Default: 5
    pub max_attempts: u32,

    /// Wait before each refresh.
    ///
    /// Default: 1 second
    pub interval: Duration,
}

impl RolePollConfig {
    /// Create a polling configuration.
    #[must_use]
    pub const fn new(max_attempts: u32, interval: Duration) -> Self {
        Self {
            max_attempts,
            interval,
        }
    }

    /// Set the number of attempts.
    #[must_use]
    pub const fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Set the interval between attempts.
    #[must_use]
    pub const fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// The same schedule as a [`RetryPolicy`] for [`poll_until`](shiptrack_runtime::retry::poll_until).
    #[must_use]
    pub const fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::fixed(self.max_attempts as usize, self.interval)
    }

    /// Longest time polling can take.
    #[must_use]
    pub fn window(&self) -> Duration {
        self.interval * self.max_attempts
    }
}

impl Default for RolePollConfig {
    fn default() -> Self {
        Self::new(5, Duration::from_secs(1))
    }
}

/// Registration behaviour of the auth context.
#[derive(Debug, Clone, PartialEq)]
pub struct RegistrationConfig {
    /// Wait between requesting the role and force-refreshing the token.
    ///
    /// Default: 1500 ms
    pub settle_delay: Duration,

    /// Role requested when the user does not pick one.
    ///
    /// Default: CUSTOMER
    pub default_role: Role,
}

impl RegistrationConfig {
    /// Set the settle delay.
    #[must_use]
    pub const fn with_settle_delay(mut self, settle_delay: Duration) -> Self {
        self.settle_delay = settle_delay;
        self
    }

    /// Set the role requested when none is chosen.
    #[must_use]
    pub const fn with_default_role(mut self, role: Role) -> Self {
        self.default_role = role;
        self
    }
}

impl Default for RegistrationConfig {
    fn default() -> Self {
        Self {
            settle_delay: Duration::from_millis(1500),
            default_role: Role::Customer,
        }
    }
}

/// Identity Toolkit REST API settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityToolkitConfig {
    /// Project the users belong to.
    pub project_id: String,

    /// Web API key, used to look up users by id token.
    pub api_key: Option<String>,

    /// OAuth access token for admin calls (`accounts:lookup` by uid, `accounts:update`).
    ///
    /// Read once and never refreshed. Google access tokens expire after about
    /// an hour, so a long-running service should use `access_token_file`.
    pub access_token: Option<String>,

    /// File holding the admin access token, re-read on every admin call.
    ///
    /// Takes precedence over `access_token`. Whatever mints tokens rewrites
    /// the file and the next call picks up the new one.
    pub access_token_file: Option<PathBuf>,

    /// `host:port` of a local auth emulator. When set, requests go to the
    /// emulator over plain HTTP and admin calls use the `owner` token.
    pub emulator_host: Option<String>,

    /// Per-request timeout.
    ///
    /// Default: 10 seconds
    pub timeout: Duration,
}

impl IdentityToolkitConfig {
    const PRODUCTION_URL: &'static str = "https://identitytoolkit.googleapis.com";

    /// Create configuration for `project_id`.
    #[must_use]
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            api_key: None,
            access_token: None,
            access_token_file: None,
            emulator_host: None,
            timeout: Duration::from_secs(10),
        }
    }

    /// Set the web API key.
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set the admin access token.
    #[must_use]
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    /// Read the admin access token from `path` on every admin call.
    #[must_use]
    pub fn with_access_token_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.access_token_file = Some(path.into());
        self
    }

    /// Point at an auth emulator.
    #[must_use]
    pub fn with_emulator_host(mut self, host: impl Into<String>) -> Self {
        self.emulator_host = Some(host.into());
        self
    }

    /// Set the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Base URL for API calls.
    #[must_use]
    pub fn base_url(&self) -> String {
        match &self.emulator_host {
            Some(host) => format!("http://{host}/identitytoolkit.googleapis.com"),
            None => Self::PRODUCTION_URL.to_string(),
        }
    }

    /// Bearer token for admin calls, not counting `access_token_file`.
    #[must_use]
    pub fn admin_bearer(&self) -> Option<&str> {
        if self.emulator_host.is_some() {
            Some("owner")
        } else {
            self.access_token.as_deref()
        }
    }
}

/// Where the client reaches the role service callables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleClientConfig {
    /// Base URL of the role service (e.g., "https://roles.example.com").
    pub base_url: String,

    /// Per-request timeout.
    ///
    /// Default: 10 seconds
    pub timeout: Duration,
}

impl RoleClientConfig {
    /// Create configuration for a service at `base_url`.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(10),
        }
    }

    /// Set the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poll_defaults() {
        let config = RolePollConfig::default();
        assert_eq!(config.max_attempts, 5);
        assert_eq!(config.interval, Duration::from_secs(1));
        assert_eq!(config.window(), Duration::from_secs(5));

        let policy = config.retry_policy();
        assert_eq!(policy.max_attempts, 5);
        assert_eq!(policy.delay_for_attempt(4), Duration::from_secs(1));
    }

    #[test]
    fn test_registration_defaults() {
        let config = RegistrationConfig::default();
        assert_eq!(config.settle_delay, Duration::from_millis(1500));
        assert_eq!(config.default_role, Role::Customer);
    }

    #[test]
    fn test_identity_toolkit_urls() {
        let prod = IdentityToolkitConfig::new("shiptrack").with_access_token("ya29.token");
        assert_eq!(prod.base_url(), "https://identitytoolkit.googleapis.com");
        assert_eq!(prod.admin_bearer(), Some("ya29.token"));

        let emulator = prod.with_emulator_host("localhost:9099");
        assert_eq!(
            emulator.base_url(),
            "http://localhost:9099/identitytoolkit.googleapis.com"
        );
        assert_eq!(emulator.admin_bearer(), Some("owner"));
    }
}
