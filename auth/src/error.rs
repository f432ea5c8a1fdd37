//! Error types for role assignment and authentication.

use thiserror::Error;

/// Result type alias for auth operations.
pub type Result<T> = std::result::Result<T, AuthError>;

/// Error taxonomy shared by the role service, the identity adapters and the
/// client auth context.
///
/// The first four variants are the ones a caller of the role service ever
/// sees on the wire; [`AuthError::code`] gives their stable string form.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    // ═══════════════════════════════════════════════════════════
    // Caller-facing errors
    // ═══════════════════════════════════════════════════════════

    /// No authenticated caller (missing, malformed or rejected token).
    #[error("Not logged in")]
    Unauthenticated,

    /// Caller is authenticated but not allowed to do this.
    #[error("Permission denied: {reason}")]
    PermissionDenied {
        /// Why the request was refused
        reason: String,
    },

    /// Request arguments are malformed (unknown role, missing target uid).
    #[error("Invalid argument: {reason}")]
    InvalidArgument {
        /// What was wrong with the input
        reason: String,
    },

    /// Unexpected failure inside the service.
    #[error("Internal error: {0}")]
    Internal(String),

    // ═══════════════════════════════════════════════════════════
    // Identity provider errors
    // ═══════════════════════════════════════════════════════════

    /// The identity store has no user with the requested uid.
    #[error("User not found: {uid}")]
    UserNotFound {
        /// Uid that was looked up
        uid: String,
    },

    /// The identity provider rejected or failed a request.
    #[error("Identity provider error: {0}")]
    Provider(String),
}

impl AuthError {
    /// Shorthand for [`AuthError::PermissionDenied`].
    #[must_use]
    pub fn permission_denied(reason: impl Into<String>) -> Self {
        Self::PermissionDenied {
            reason: reason.into(),
        }
    }

    /// Shorthand for [`AuthError::InvalidArgument`].
    #[must_use]
    pub fn invalid_argument(reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            reason: reason.into(),
        }
    }

    /// Wire code of this error.
    ///
    /// Always one of `unauthenticated`, `permission-denied`,
    /// `invalid-argument` or `internal`. A missing user is reported as
    /// `invalid-argument` because it can only come from a bad uid.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "unauthenticated",
            Self::PermissionDenied { .. } => "permission-denied",
            Self::InvalidArgument { .. } | Self::UserNotFound { .. } => "invalid-argument",
            Self::Internal(_) | Self::Provider(_) => "internal",
        }
    }

    /// Whether the caller caused this error (as opposed to the service or
    /// the identity provider).
    #[must_use]
    pub const fn is_user_error(&self) -> bool {
        !matches!(self, Self::Internal(_) | Self::Provider(_))
    }

    /// Message safe to show to an end user.
    ///
    /// Internal details are replaced with a generic sentence.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Unauthenticated => "Please sign in to continue.".to_string(),
            Self::PermissionDenied { reason } | Self::InvalidArgument { reason } => reason.clone(),
            Self::UserNotFound { .. } => "No account exists for that user.".to_string(),
            Self::Internal(_) | Self::Provider(_) => {
                "Something went wrong. Please try again.".to_string()
            },
        }
    }
}
