//! Client-side identity provider.

use super::{AuthUser, IdTokenResult};
use crate::error::Result;
use std::future::Future;
use tokio::sync::broadcast;

/// The identity provider as a signed-in client sees it.
///
/// One provider instance tracks one current user. Sign-in, sign-up and
/// sign-out are announced on [`IdentityProvider::subscribe`].
pub trait IdentityProvider: Send + Sync {
    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Unauthenticated`](crate::AuthError::Unauthenticated)
    /// for wrong credentials.
    fn sign_in(&self, email: &str, password: &str)
    -> impl Future<Output = Result<AuthUser>> + Send;

    /// Create an account and sign it in.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidArgument`](crate::AuthError::InvalidArgument)
    /// if the email is already taken.
    fn create_user(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = Result<AuthUser>> + Send;

    /// Sign the current user out.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Provider`](crate::AuthError::Provider) if the
    /// provider call fails.
    fn sign_out(&self) -> impl Future<Output = Result<()>> + Send;

    /// Identity token of the current user.
    ///
    /// Claims written since the token was minted only show up when
    /// `force_refresh` is set.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Unauthenticated`](crate::AuthError::Unauthenticated)
    /// if nobody is signed in.
    fn id_token_result(
        &self,
        force_refresh: bool,
    ) -> impl Future<Output = Result<IdTokenResult>> + Send;

    /// User signed in right now, if any.
    fn current_user(&self) -> Option<AuthUser>;

    /// Stream of sign-in state changes. `None` means signed out.
    fn subscribe(&self) -> broadcast::Receiver<Option<AuthUser>>;
}
