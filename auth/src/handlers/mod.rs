//! HTTP handlers for the role service.
//!
//! The callables follow the same contract as the service: request bodies are
//! JSON, successful responses are `{ "success": true, "role": "..." }` and
//! failures are `{ "code": "...", "message": "..." }` with the status taken
//! from the code (see [`AuthError::code`]).

use crate::error::AuthError;
use crate::providers::{IdentityStore, TokenVerifier, VerifiedToken};
use crate::service::RoleAssignmentService;
use shiptrack_web::{AppError, BearerToken};
use std::sync::Arc;

pub mod roles;
pub mod triggers;

/// Shared state of the role service routes.
pub struct CallableState<S, V> {
    /// Service performing the claim writes.
    pub service: RoleAssignmentService<S>,
    /// Verifier for caller bearer tokens.
    pub verifier: V,
    /// Secret the account-created trigger must present. Without one the
    /// trigger route refuses every call.
    pub trigger_secret: Option<String>,
}

impl<S, V> CallableState<S, V>
where
    S: IdentityStore,
    V: TokenVerifier,
{
    /// Create shared state.
    #[must_use]
    pub fn new(store: S, verifier: V) -> Arc<Self> {
        Arc::new(Self {
            service: RoleAssignmentService::new(store),
            verifier,
            trigger_secret: None,
        })
    }

    /// Create shared state with a trigger secret.
    #[must_use]
    pub fn with_trigger_secret(store: S, verifier: V, secret: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            service: RoleAssignmentService::new(store),
            verifier,
            trigger_secret: Some(secret.into()),
        })
    }

    /// Resolve the caller from an optional bearer token.
    ///
    /// A rejected token means "no caller"; provider failures are errors.
    pub(crate) async fn caller(
        &self,
        token: Option<BearerToken>,
    ) -> Result<Option<VerifiedToken>, AuthError> {
        let Some(BearerToken(token)) = token else {
            return Ok(None);
        };

        match self.verifier.verify(&token).await {
            Ok(verified) => Ok(Some(verified)),
            Err(AuthError::Unauthenticated) => Ok(None),
            Err(err) => Err(err),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match &err {
            AuthError::Unauthenticated => Self::unauthorized(err.to_string()),
            AuthError::PermissionDenied { reason } => Self::forbidden(reason.clone()),
            AuthError::InvalidArgument { reason } => Self::bad_request(reason.clone()),
            AuthError::UserNotFound { .. } => Self::bad_request(err.to_string()),
            AuthError::Internal(_) | AuthError::Provider(_) => {
                Self::internal(err.user_message()).with_source(anyhow::Error::new(err))
            },
        }
    }
}
