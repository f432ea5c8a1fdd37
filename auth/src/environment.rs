//! Auth context environment.

use crate::config::{RegistrationConfig, RolePollConfig};
use crate::providers::{IdentityProvider, RoleAssignmentClient};

/// Dependencies of the auth context reducer.
///
/// # Type Parameters
///
/// - `P`: Identity provider
/// - `C`: Role assignment client
#[derive(Debug, Clone)]
pub struct AuthEnvironment<P, C>
where
    P: IdentityProvider + Clone,
    C: RoleAssignmentClient + Clone,
{
    /// Identity provider.
    pub provider: P,

    /// Client for the self-assign callable.
    pub roles: C,

    /// Role polling schedule.
    pub poll: RolePollConfig,

    /// Registration timings.
    pub registration: RegistrationConfig,
}

impl<P, C> AuthEnvironment<P, C>
where
    P: IdentityProvider + Clone,
    C: RoleAssignmentClient + Clone,
{
    /// Create an environment with default timings.
    #[must_use]
    pub fn new(provider: P, roles: C) -> Self {
        Self {
            provider,
            roles,
            poll: RolePollConfig::default(),
            registration: RegistrationConfig::default(),
        }
    }

    /// Override the role polling schedule.
    #[must_use]
    pub fn with_poll_config(mut self, poll: RolePollConfig) -> Self {
        self.poll = poll;
        self
    }

    /// Override the registration timings.
    #[must_use]
    pub fn with_registration_config(mut self, registration: RegistrationConfig) -> Self {
        self.registration = registration;
        self
    }
}
