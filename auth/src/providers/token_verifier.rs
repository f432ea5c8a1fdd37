//! Bearer token verification.

use super::VerifiedToken;
use crate::error::Result;
use std::future::Future;

/// Turns a bearer token into a caller identity.
pub trait TokenVerifier: Send + Sync {
    /// Verify `token`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Unauthenticated`](crate::AuthError::Unauthenticated)
    /// for an invalid or expired token, and
    /// [`AuthError::Provider`](crate::AuthError::Provider) if the provider
    /// could not be reached.
    fn verify(&self, token: &str) -> impl Future<Output = Result<VerifiedToken>> + Send;
}
