//! Auth context actions.

use crate::error::AuthError;
use crate::providers::AuthUser;
use crate::role::Role;

/// Everything that can happen to the auth context.
///
/// Commands come from the application; the rest are produced by effects or
/// forwarded from the identity provider's state listener.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthAction {
    // ═══════════════════════════════════════════════════════════════════════
    // Commands
    // ═══════════════════════════════════════════════════════════════════════
    /// Sign in with email and password.
    Login {
        /// Account email
        email: String,
        /// Account password
        password: String,
    },

    /// Create an account and request a self-assigned role.
    Register {
        /// Account email
        email: String,
        /// Account password
        password: String,
        /// Requested role; the configured default when `None`
        role: Option<Role>,
    },

    /// Sign out.
    Logout,

    /// Force-refresh the token and re-read the role.
    RefreshRole,

    /// Stop background work; the context is going away.
    Teardown,

    // ═══════════════════════════════════════════════════════════════════════
    // Provider events
    // ═══════════════════════════════════════════════════════════════════════
    /// The provider reported a sign-in state change.
    ProviderStateChanged {
        /// New user, `None` on sign-out
        user: Option<AuthUser>,
    },

    // ═══════════════════════════════════════════════════════════════════════
    // Effect results
    // ═══════════════════════════════════════════════════════════════════════
    /// Role read from a freshly refreshed token.
    RoleResolved {
        /// User the token belongs to
        uid: String,
        /// Role claim, if any
        role: Option<Role>,
    },

    /// Time for the next poll attempt.
    PollTick {
        /// User being polled for
        uid: String,
    },

    /// Outcome of one poll attempt.
    PollResult {
        /// User being polled for
        uid: String,
        /// Role claim, if it has arrived
        role: Option<Role>,
    },

    /// Sign-in worked.
    LoginSucceeded {
        /// Signed-in user
        user: AuthUser,
        /// Role on their token
        role: Option<Role>,
    },

    /// Sign-in failed.
    LoginFailed {
        /// Why
        error: AuthError,
    },

    /// Account created; the role request has been made (or failed and was logged).
    Registered {
        /// New user
        user: AuthUser,
    },

    /// Settle delay after registration elapsed.
    RegistrationSettled {
        /// New user
        uid: String,
    },

    /// Registration finished with the role read after the settle delay.
    RegistrationCompleted {
        /// New user
        uid: String,
        /// Role on the refreshed token
        role: Option<Role>,
    },

    /// Account creation failed.
    RegisterFailed {
        /// Why
        error: AuthError,
    },

    /// Sign-out failed.
    LogoutFailed {
        /// Why
        error: AuthError,
    },
}
