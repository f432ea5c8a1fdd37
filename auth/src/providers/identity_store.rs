//! Server-side access to user records.

use super::UserRecord;
use crate::error::Result;
use crate::role::Claims;
use std::future::Future;

/// Server-side view of the identity provider's user database.
///
/// The store only supports replacing the whole claim set, so callers that
/// change one claim must read, merge and write back.
pub trait IdentityStore: Send + Sync {
    /// Fetch a user record.
    ///
    /// # Errors
    ///
    /// - [`AuthError::UserNotFound`](crate::AuthError::UserNotFound) if no such user exists
    /// - [`AuthError::Provider`](crate::AuthError::Provider) if the provider call fails
    fn get_user(&self, uid: &str) -> impl Future<Output = Result<UserRecord>> + Send;

    /// Replace the custom claims of a user.
    ///
    /// # Errors
    ///
    /// - [`AuthError::UserNotFound`](crate::AuthError::UserNotFound) if no such user exists
    /// - [`AuthError::Provider`](crate::AuthError::Provider) if the provider call fails
    fn set_claims(&self, uid: &str, claims: Claims) -> impl Future<Output = Result<()>> + Send;
}
