//! Auth context: the client's view of who is signed in and with which role.
//!
//! [`AuthContext`] runs the [`AuthReducer`] in a [`Store`], forwards the
//! identity provider's state changes into it and offers awaitable
//! `login`/`register`/`logout`/`refresh_role` operations on top.
//!
//! ```ignore
//! let context = AuthContext::start(AuthEnvironment::new(provider, role_client));
//! context.register("a@example.com", "secret", Some(Role::Sender)).await?;
//! if context.status().await == AuthStatus::AuthenticatedWithRole {
//!     // show the sender dashboard
//! }
//! context.teardown().await;
//! ```

use crate::actions::AuthAction;
use crate::environment::AuthEnvironment;
use crate::error::{AuthError, Result};
use crate::providers::{AuthUser, IdentityProvider, RoleAssignmentClient};
use crate::reducers::AuthReducer;
use crate::role::Role;
use crate::state::{AuthState, AuthStatus};
use shiptrack_runtime::{Store, StoreError};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

/// Upper bound on a single login, logout or role refresh round trip.
const OPERATION_TIMEOUT: Duration = Duration::from_secs(30);

type AuthStore<P, C> = Store<AuthState, AuthAction, AuthEnvironment<P, C>, AuthReducer<P, C>>;

/// Running auth context.
///
/// Dropping it stops the provider listener and cancels any role poll.
pub struct AuthContext<P, C>
where
    P: IdentityProvider + Clone + 'static,
    C: RoleAssignmentClient + Clone + 'static,
{
    store: AuthStore<P, C>,
    listener: JoinHandle<()>,
    settle_delay: Duration,
}

impl<P, C> AuthContext<P, C>
where
    P: IdentityProvider + Clone + 'static,
    C: RoleAssignmentClient + Clone + 'static,
{
    /// Start the context and subscribe to the provider.
    ///
    /// The provider's current user is reported first, like a fresh
    /// state listener would.
    #[must_use]
    pub fn start(environment: AuthEnvironment<P, C>) -> Self {
        let events = environment.provider.subscribe();
        let current = environment.provider.current_user();
        let settle_delay = environment.registration.settle_delay;
        let store = Store::new(AuthState::new(), AuthReducer::new(), environment);

        let listener = tokio::spawn(forward_provider_events(store.clone(), current, events));

        Self {
            store,
            listener,
            settle_delay,
        }
    }

    /// Sign in.
    ///
    /// # Errors
    ///
    /// The provider's error if sign-in failed (also stored in `last_error`),
    /// or [`AuthError::Internal`] if the context stopped or timed out.
    pub async fn login(&self, email: &str, password: &str) -> Result<()> {
        let outcome = self
            .store
            .send_and_wait_for(
                AuthAction::Login {
                    email: email.to_string(),
                    password: password.to_string(),
                },
                |a| {
                    matches!(
                        a,
                        AuthAction::LoginSucceeded { .. } | AuthAction::LoginFailed { .. }
                    )
                },
                OPERATION_TIMEOUT,
            )
            .await
            .map_err(store_error)?;

        match outcome {
            AuthAction::LoginFailed { error } => Err(error),
            _ => Ok(()),
        }
    }

    /// Create an account and request `role` (the configured default when `None`).
    ///
    /// Returns once the token has been refreshed after the settle delay.
    /// A failed role request does not fail registration.
    ///
    /// # Errors
    ///
    /// The provider's error if the account could not be created, or
    /// [`AuthError::Internal`] if the context stopped or timed out.
    pub async fn register(&self, email: &str, password: &str, role: Option<Role>) -> Result<()> {
        let outcome = self
            .store
            .send_and_wait_for(
                AuthAction::Register {
                    email: email.to_string(),
                    password: password.to_string(),
                    role,
                },
                |a| {
                    matches!(
                        a,
                        AuthAction::RegistrationCompleted { .. } | AuthAction::RegisterFailed { .. }
                    )
                },
                OPERATION_TIMEOUT + self.settle_delay,
            )
            .await
            .map_err(store_error)?;

        match outcome {
            AuthAction::RegisterFailed { error } => Err(error),
            _ => Ok(()),
        }
    }

    /// Sign out. Clears the role and cancels polling.
    ///
    /// # Errors
    ///
    /// The provider's error if sign-out failed, or [`AuthError::Internal`]
    /// if the context stopped or timed out.
    pub async fn logout(&self) -> Result<()> {
        let outcome = self
            .store
            .send_and_wait_for(
                AuthAction::Logout,
                |a| {
                    matches!(
                        a,
                        AuthAction::ProviderStateChanged { user: None }
                            | AuthAction::LogoutFailed { .. }
                    )
                },
                OPERATION_TIMEOUT,
            )
            .await
            .map_err(store_error)?;

        match outcome {
            AuthAction::LogoutFailed { error } => Err(error),
            _ => Ok(()),
        }
    }

    /// Force-refresh the token and return the role it now carries.
    ///
    /// Returns `Ok(None)` without a round trip when nobody is signed in, and
    /// `Ok(None)` if the user signs out or changes before the refresh lands.
    ///
    /// # Errors
    ///
    /// [`AuthError::Internal`] if the context stopped or timed out.
    pub async fn refresh_role(&self) -> Result<Option<Role>> {
        let Some(uid) = self.store.state(|s| s.uid().map(str::to_string)).await else {
            return Ok(None);
        };

        let outcome = self
            .store
            .send_and_wait_for(
                AuthAction::RefreshRole,
                refresh_finished(&uid),
                OPERATION_TIMEOUT,
            )
            .await
            .map_err(store_error)?;

        match outcome {
            AuthAction::RoleResolved { role, .. } => Ok(role),
            _ => Ok(None),
        }
    }

    /// Current lifecycle status.
    pub async fn status(&self) -> AuthStatus {
        self.store.state(AuthState::status).await
    }

    /// Role of the signed-in user, if known.
    pub async fn role(&self) -> Option<Role> {
        self.store.state(|s| s.role).await
    }

    /// Signed-in user.
    pub async fn user(&self) -> Option<AuthUser> {
        self.store.state(|s| s.user.clone()).await
    }

    /// Message from the last failed operation.
    pub async fn last_error(&self) -> Option<String> {
        self.store.state(|s| s.last_error.clone()).await
    }

    /// Copy of the whole state.
    pub async fn snapshot(&self) -> AuthState {
        self.store.state(AuthState::clone).await
    }

    /// Stop listening to the provider and cancel polling.
    pub async fn teardown(self) {
        self.listener.abort();
        if let Err(err) = self.store.send(AuthAction::Teardown).await {
            tracing::debug!(error = %err, "Auth context already stopped");
        }
        self.store.shutdown();
    }
}

impl<P, C> Drop for AuthContext<P, C>
where
    P: IdentityProvider + Clone + 'static,
    C: RoleAssignmentClient + Clone + 'static,
{
    fn drop(&mut self) {
        self.listener.abort();
        self.store.shutdown();
    }
}

async fn forward_provider_events<P, C>(
    store: AuthStore<P, C>,
    current: Option<AuthUser>,
    mut events: broadcast::Receiver<Option<AuthUser>>,
) where
    P: IdentityProvider + Clone + 'static,
    C: RoleAssignmentClient + Clone + 'static,
{
    if store
        .send(AuthAction::ProviderStateChanged { user: current })
        .await
        .is_err()
    {
        return;
    }

    loop {
        match events.recv().await {
            Ok(user) => {
                if store
                    .send(AuthAction::ProviderStateChanged { user })
                    .await
                    .is_err()
                {
                    break;
                }
            },
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "Auth state listener lagged");
            },
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }

    tracing::debug!("Auth state listener stopped");
}

/// Whether `action` ends a role refresh started for `uid`.
///
/// Only a role read for that same user counts. A sign-out or a switch to
/// another user ends the wait too, since that refresh will be ignored.
fn refresh_finished(uid: &str) -> impl Fn(&AuthAction) -> bool + '_ {
    move |action| match action {
        AuthAction::RoleResolved { uid: resolved, .. } => resolved == uid,
        AuthAction::ProviderStateChanged { user } => {
            user.as_ref().is_none_or(|user| user.uid != uid)
        },
        _ => false,
    }
}

fn store_error(err: StoreError) -> AuthError {
    AuthError::Internal(format!("auth context unavailable: {err}"))
}
