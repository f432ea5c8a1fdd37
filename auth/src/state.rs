//! Client auth context state.

use crate::providers::AuthUser;
use crate::role::Role;

/// Where the client is in the sign-in lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStatus {
    /// Waiting for the provider's first answer.
    Loading,
    /// Signed in and the token carries a role.
    AuthenticatedWithRole,
    /// Signed in but no role on the token yet.
    AuthenticatedRoleless,
    /// Nobody signed in.
    Unauthenticated,
}

/// Bounded wait for a role claim to reach the token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RolePoll {
    /// User being polled for. Results for anyone else are stale.
    pub uid: String,
    /// Refreshes completed so far.
    pub attempts: u32,
}

/// Auth context state.
///
/// [`AuthState::status`] is derived from the fields rather than stored, so
/// it cannot drift from `user` and `role`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthState {
    /// Signed-in user.
    pub user: Option<AuthUser>,
    /// Role from the user's latest token.
    pub role: Option<Role>,
    /// Set until the first provider state has been resolved.
    pub loading: bool,
    /// Running role poll, if any.
    pub poll: Option<RolePoll>,
    /// Message from the last failed login, registration or logout.
    pub last_error: Option<String>,
}

impl AuthState {
    /// Fresh state, waiting for the provider.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            user: None,
            role: None,
            loading: true,
            poll: None,
            last_error: None,
        }
    }

    /// Current lifecycle status.
    #[must_use]
    pub const fn status(&self) -> AuthStatus {
        if self.loading {
            return AuthStatus::Loading;
        }
        match (&self.user, self.role) {
            (None, _) => AuthStatus::Unauthenticated,
            (Some(_), Some(_)) => AuthStatus::AuthenticatedWithRole,
            (Some(_), None) => AuthStatus::AuthenticatedRoleless,
        }
    }

    /// Uid of the signed-in user.
    #[must_use]
    pub fn uid(&self) -> Option<&str> {
        self.user.as_ref().map(|u| u.uid.as_str())
    }

    /// Whether `uid` is the signed-in user.
    #[must_use]
    pub fn is_current(&self, uid: &str) -> bool {
        self.uid() == Some(uid)
    }

    /// Whether a role poll is running for `uid`.
    #[must_use]
    pub fn is_polling_for(&self, uid: &str) -> bool {
        self.poll.as_ref().is_some_and(|p| p.uid == uid)
    }
}

impl Default for AuthState {
    fn default() -> Self {
        Self::new()
    }
}
