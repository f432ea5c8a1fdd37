//! Client auth context reducer.
//!
//! Tracks who is signed in and which role their token carries.
//!
//! # Flow
//!
//! 1. The provider reports a user → force-refresh the token and read `role`
//! 2. Role present → `AuthenticatedWithRole`
//! 3. Role missing → `AuthenticatedRoleless`, and poll: refresh every
//!    `interval`, at most `max_attempts` times, until the role shows up
//! 4. Sign-out or teardown → polling cancelled
//!
//! Registration creates the account, asks the role service for the chosen
//! role, waits the settle delay and refreshes the token. A failed role
//! request is logged and does not fail registration; the default-role
//! trigger and the poll cover that case.

use crate::actions::AuthAction;
use crate::environment::AuthEnvironment;
use crate::propagation::fetch_role;
use crate::providers::{IdentityProvider, RoleAssignmentClient};
use crate::role::Role;
use crate::state::{AuthState, RolePoll};
use shiptrack_core::effect::{Effect, EffectId};
use shiptrack_core::reducer::Reducer;
use shiptrack_core::{smallvec, SmallVec};

/// Cancellation group of the role poll.
pub const ROLE_POLL: EffectId = EffectId::new("auth.role_poll");

/// Auth context reducer.
#[derive(Debug, Clone)]
pub struct AuthReducer<P, C> {
    /// Phantom data to hold type parameters.
    _phantom: std::marker::PhantomData<(P, C)>,
}

impl<P, C> AuthReducer<P, C> {
    /// Create a new auth context reducer.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
        }
    }
}

impl<P, C> Default for AuthReducer<P, C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P, C> AuthReducer<P, C>
where
    P: IdentityProvider + Clone + 'static,
    C: RoleAssignmentClient + Clone + 'static,
{
    /// Record a role read for `uid` and start or stop polling accordingly.
    fn apply_role(
        state: &mut AuthState,
        uid: &str,
        role: Option<Role>,
        env: &AuthEnvironment<P, C>,
    ) -> SmallVec<[Effect<AuthAction>; 4]> {
        if !state.is_current(uid) {
            tracing::debug!(uid = %uid, "Ignoring role for a user who is no longer signed in");
            return smallvec![Effect::None];
        }

        state.loading = false;
        state.role = role;

        match role {
            Some(role) => {
                tracing::info!(uid = %uid, role = %role, "Role resolved");
                if state.poll.take().is_some() {
                    smallvec![Effect::Cancel(ROLE_POLL)]
                } else {
                    smallvec![Effect::None]
                }
            },
            None if state.is_polling_for(uid) => smallvec![Effect::None],
            None => Self::start_poll(state, uid, env),
        }
    }

    fn start_poll(
        state: &mut AuthState,
        uid: &str,
        env: &AuthEnvironment<P, C>,
    ) -> SmallVec<[Effect<AuthAction>; 4]> {
        if env.poll.max_attempts == 0 {
            return smallvec![Effect::None];
        }

        tracing::debug!(
            uid = %uid,
            max_attempts = env.poll.max_attempts,
            "Token has no role yet, polling"
        );
        state.poll = Some(RolePoll {
            uid: uid.to_string(),
            attempts: 0,
        });
        smallvec![Self::schedule_tick(uid, env)]
    }

    fn schedule_tick(uid: &str, env: &AuthEnvironment<P, C>) -> Effect<AuthAction> {
        Effect::Delay {
            duration: env.poll.interval,
            action: Box::new(AuthAction::PollTick {
                uid: uid.to_string(),
            }),
        }
        .cancellable(ROLE_POLL)
    }

    /// Force-refresh the token and report the role as `make(role)`.
    fn refresh<F>(env: &AuthEnvironment<P, C>, make: F) -> Effect<AuthAction>
    where
        F: FnOnce(Option<Role>) -> AuthAction + Send + 'static,
    {
        let provider = env.provider.clone();
        Effect::future(async move { Some(make(fetch_role(&provider, true).await)) })
    }
}

impl<P, C> Reducer for AuthReducer<P, C>
where
    P: IdentityProvider + Clone + 'static,
    C: RoleAssignmentClient + Clone + 'static,
{
    type State = AuthState;
    type Action = AuthAction;
    type Environment = AuthEnvironment<P, C>;

    #[allow(clippy::too_many_lines)]
    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            // ═══════════════════════════════════════════════════════════════
            // Provider state changes
            // ═══════════════════════════════════════════════════════════════
            AuthAction::ProviderStateChanged { user: Some(user) } => {
                let mut effects: SmallVec<[Effect<AuthAction>; 4]> = SmallVec::new();

                if !state.is_current(&user.uid) {
                    state.role = None;
                    if state.poll.take().is_some() {
                        effects.push(Effect::Cancel(ROLE_POLL));
                    }
                }

                let uid = user.uid.clone();
                state.user = Some(user);
                effects.push(Self::refresh(env, move |role| AuthAction::RoleResolved {
                    uid,
                    role,
                }));
                effects
            },

            AuthAction::ProviderStateChanged { user: None } => {
                state.user = None;
                state.role = None;
                state.loading = false;
                state.poll = None;
                smallvec![Effect::Cancel(ROLE_POLL)]
            },

            AuthAction::RoleResolved { uid, role } => Self::apply_role(state, &uid, role, env),

            // ═══════════════════════════════════════════════════════════════
            // Role polling
            // ═══════════════════════════════════════════════════════════════
            AuthAction::PollTick { uid } => {
                if !state.is_polling_for(&uid) {
                    return smallvec![Effect::None];
                }
                smallvec![
                    Self::refresh(env, move |role| AuthAction::PollResult { uid, role })
                        .cancellable(ROLE_POLL)
                ]
            },

            AuthAction::PollResult { uid, role } => {
                let Some(poll) = state.poll.as_mut().filter(|p| p.uid == uid) else {
                    return smallvec![Effect::None];
                };
                poll.attempts += 1;
                let attempts = poll.attempts;

                if role.is_some() {
                    return Self::apply_role(state, &uid, role, env);
                }

                if attempts >= env.poll.max_attempts {
                    tracing::warn!(uid = %uid, attempts, "Role did not appear on the token, giving up");
                    metrics::counter!("auth.role_poll.exhausted").increment(1);
                    state.poll = None;
                    return smallvec![Effect::None];
                }

                smallvec![Self::schedule_tick(&uid, env)]
            },

            // ═══════════════════════════════════════════════════════════════
            // Login
            // ═══════════════════════════════════════════════════════════════
            AuthAction::Login { email, password } => {
                state.last_error = None;
                let provider = env.provider.clone();

                smallvec![Effect::future(async move {
                    match provider.sign_in(&email, &password).await {
                        Ok(user) => {
                            let role = fetch_role(&provider, true).await;
                            Some(AuthAction::LoginSucceeded { user, role })
                        },
                        Err(error) => Some(AuthAction::LoginFailed { error }),
                    }
                })]
            },

            AuthAction::LoginSucceeded { user, role } => {
                let uid = user.uid.clone();
                if !state.is_current(&uid) {
                    state.poll = None;
                }
                state.user = Some(user);
                Self::apply_role(state, &uid, role, env)
            },

            AuthAction::LoginFailed { error } => {
                tracing::info!(error = %error, "Login failed");
                state.last_error = Some(error.user_message());
                smallvec![Effect::None]
            },

            // ═══════════════════════════════════════════════════════════════
            // Registration
            // ═══════════════════════════════════════════════════════════════
            AuthAction::Register {
                email,
                password,
                role,
            } => {
                state.last_error = None;
                let role = role.unwrap_or(env.registration.default_role);
                let provider = env.provider.clone();
                let roles = env.roles.clone();

                smallvec![Effect::future(async move {
                    let user = match provider.create_user(&email, &password).await {
                        Ok(user) => user,
                        Err(error) => return Some(AuthAction::RegisterFailed { error }),
                    };

                    let assigned = match provider.id_token_result(false).await {
                        Ok(token) => roles.set_user_role(&token.token, role).await,
                        Err(error) => Err(error),
                    };
                    if let Err(error) = assigned {
                        tracing::warn!(
                            uid = %user.uid,
                            role = %role,
                            error = %error,
                            "Failed to set user role, continuing registration"
                        );
                    }

                    Some(AuthAction::Registered { user })
                })]
            },

            AuthAction::Registered { user } => {
                let uid = user.uid.clone();
                if !state.is_current(&uid) {
                    state.role = None;
                    state.poll = None;
                }
                state.user = Some(user);
                state.loading = false;

                smallvec![Effect::Delay {
                    duration: env.registration.settle_delay,
                    action: Box::new(AuthAction::RegistrationSettled { uid }),
                }]
            },

            AuthAction::RegistrationSettled { uid } => {
                if !state.is_current(&uid) {
                    // Signed out during the delay; still finish the registration
                    tracing::debug!(uid = %uid, "Registered user left before the settle delay elapsed");
                    return smallvec![Effect::future(async move {
                        Some(AuthAction::RegistrationCompleted { uid, role: None })
                    })];
                }
                smallvec![Self::refresh(env, move |role| {
                    AuthAction::RegistrationCompleted { uid, role }
                })]
            },

            AuthAction::RegistrationCompleted { uid, role } => {
                Self::apply_role(state, &uid, role, env)
            },

            AuthAction::RegisterFailed { error } => {
                tracing::info!(error = %error, "Registration failed");
                state.last_error = Some(error.user_message());
                smallvec![Effect::None]
            },

            // ═══════════════════════════════════════════════════════════════
            // Logout, refresh, teardown
            // ═══════════════════════════════════════════════════════════════
            AuthAction::Logout => {
                state.poll = None;
                let provider = env.provider.clone();

                smallvec![
                    Effect::Cancel(ROLE_POLL),
                    Effect::future(async move {
                        match provider.sign_out().await {
                            Ok(()) => Some(AuthAction::ProviderStateChanged { user: None }),
                            Err(error) => Some(AuthAction::LogoutFailed { error }),
                        }
                    }),
                ]
            },

            AuthAction::LogoutFailed { error } => {
                tracing::warn!(error = %error, "Logout failed");
                state.last_error = Some(error.user_message());
                smallvec![Effect::None]
            },

            AuthAction::RefreshRole => match state.uid() {
                Some(uid) => {
                    let uid = uid.to_string();
                    smallvec![Self::refresh(env, move |role| AuthAction::RoleResolved {
                        uid,
                        role
                    })]
                },
                None => smallvec![Effect::None],
            },

            AuthAction::Teardown => {
                state.poll = None;
                smallvec![Effect::Cancel(ROLE_POLL)]
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::config::RolePollConfig;
    use crate::error::AuthError;
    use crate::mocks::{InMemoryIdentityStore, InProcessRoleClient, MockIdentityProvider};
    use crate::providers::AuthUser;
    use crate::state::AuthStatus;
    use shiptrack_testing::{ReducerTest, assertions};
    use std::time::Duration;

    type TestReducer = AuthReducer<MockIdentityProvider, InProcessRoleClient>;
    type TestEnv = AuthEnvironment<MockIdentityProvider, InProcessRoleClient>;

    fn env() -> TestEnv {
        let store = InMemoryIdentityStore::new();
        AuthEnvironment::new(
            MockIdentityProvider::new(store.clone()),
            InProcessRoleClient::new(store),
        )
    }

    fn user(uid: &str) -> AuthUser {
        AuthUser {
            uid: uid.to_string(),
            email: format!("{uid}@example.com"),
        }
    }

    fn signed_in(uid: &str) -> AuthState {
        AuthState {
            user: Some(user(uid)),
            loading: false,
            ..AuthState::new()
        }
    }

    fn polling(uid: &str, attempts: u32) -> AuthState {
        AuthState {
            poll: Some(RolePoll {
                uid: uid.to_string(),
                attempts,
            }),
            ..signed_in(uid)
        }
    }

    #[test]
    fn test_sign_in_event_fetches_role() {
        ReducerTest::new(TestReducer::new())
            .with_env(env())
            .given_state(AuthState::new())
            .when_action(AuthAction::ProviderStateChanged {
                user: Some(user("u1")),
            })
            .then_state(|state| {
                assert_eq!(state.uid(), Some("u1"));
                assert_eq!(state.status(), AuthStatus::Loading);
            })
            .then_effects(|effects| {
                assertions::assert_effects_count(effects, 1);
                assertions::assert_has_future_effect(effects);
            })
            .run();
    }

    #[test]
    fn test_role_present_authenticates_with_role() {
        ReducerTest::new(TestReducer::new())
            .with_env(env())
            .given_state(AuthState {
                user: Some(user("u1")),
                ..AuthState::new()
            })
            .when_action(AuthAction::RoleResolved {
                uid: "u1".into(),
                role: Some(Role::Sender),
            })
            .then_state(|state| {
                assert_eq!(state.status(), AuthStatus::AuthenticatedWithRole);
                assert_eq!(state.role, Some(Role::Sender));
                assert!(state.poll.is_none());
            })
            .then_effects(|effects| assertions::assert_no_effects(effects))
            .run();
    }

    #[test]
    fn test_missing_role_starts_cancellable_poll() {
        ReducerTest::new(TestReducer::new())
            .with_env(env())
            .given_state(AuthState {
                user: Some(user("u1")),
                ..AuthState::new()
            })
            .when_action(AuthAction::RoleResolved {
                uid: "u1".into(),
                role: None,
            })
            .then_state(|state| {
                assert_eq!(state.status(), AuthStatus::AuthenticatedRoleless);
                assert_eq!(
                    state.poll,
                    Some(RolePoll {
                        uid: "u1".into(),
                        attempts: 0
                    })
                );
            })
            .then_effects(|effects| {
                assertions::assert_effects_count(effects, 1);
                assertions::assert_has_cancellable(effects, ROLE_POLL);
            })
            .run();
    }

    #[test]
    fn test_stale_role_is_ignored() {
        ReducerTest::new(TestReducer::new())
            .with_env(env())
            .given_state(signed_in("u2"))
            .when_action(AuthAction::RoleResolved {
                uid: "u1".into(),
                role: Some(Role::Admin),
            })
            .then_state(|state| assert_eq!(state.role, None))
            .then_effects(|effects| assertions::assert_no_effects(effects))
            .run();
    }

    #[test]
    fn test_poll_result_without_role_schedules_next_tick() {
        ReducerTest::new(TestReducer::new())
            .with_env(env())
            .given_state(polling("u1", 1))
            .when_action(AuthAction::PollResult {
                uid: "u1".into(),
                role: None,
            })
            .then_state(|state| assert_eq!(state.poll.as_ref().unwrap().attempts, 2))
            .then_effects(|effects| assertions::assert_has_cancellable(effects, ROLE_POLL))
            .run();
    }

    #[test]
    fn test_poll_gives_up_after_max_attempts() {
        ReducerTest::new(TestReducer::new())
            .with_env(env())
            .given_state(polling("u1", 4))
            .when_action(AuthAction::PollResult {
                uid: "u1".into(),
                role: None,
            })
            .then_state(|state| {
                assert!(state.poll.is_none());
                assert_eq!(state.status(), AuthStatus::AuthenticatedRoleless);
            })
            .then_effects(|effects| assertions::assert_no_effects(effects))
            .run();
    }

    #[test]
    fn test_custom_attempt_limit() {
        ReducerTest::new(TestReducer::new())
            .with_env(env().with_poll_config(RolePollConfig::new(2, Duration::from_millis(250))))
            .given_state(polling("u1", 1))
            .when_action(AuthAction::PollResult {
                uid: "u1".into(),
                role: None,
            })
            .then_state(|state| assert!(state.poll.is_none()))
            .run();
    }

    #[test]
    fn test_poll_result_with_role_stops_polling() {
        ReducerTest::new(TestReducer::new())
            .with_env(env())
            .given_state(polling("u1", 2))
            .when_action(AuthAction::PollResult {
                uid: "u1".into(),
                role: Some(Role::Customer),
            })
            .then_state(|state| {
                assert!(state.poll.is_none());
                assert_eq!(state.role, Some(Role::Customer));
            })
            .then_effects(|effects| assertions::assert_has_cancel(effects, ROLE_POLL))
            .run();
    }

    #[test]
    fn test_tick_after_poll_ended_does_nothing() {
        ReducerTest::new(TestReducer::new())
            .with_env(env())
            .given_state(signed_in("u1"))
            .when_action(AuthAction::PollTick { uid: "u1".into() })
            .then_effects(|effects| assertions::assert_no_effects(effects))
            .run();
    }

    #[test]
    fn test_sign_out_event_clears_role_and_cancels_poll() {
        ReducerTest::new(TestReducer::new())
            .with_env(env())
            .given_state(AuthState {
                role: Some(Role::Station),
                ..polling("u1", 2)
            })
            .when_action(AuthAction::ProviderStateChanged { user: None })
            .then_state(|state| {
                assert_eq!(state.status(), AuthStatus::Unauthenticated);
                assert_eq!(state.role, None);
                assert!(state.poll.is_none());
            })
            .then_effects(|effects| assertions::assert_has_cancel(effects, ROLE_POLL))
            .run();
    }

    #[test]
    fn test_switching_user_cancels_old_poll() {
        ReducerTest::new(TestReducer::new())
            .with_env(env())
            .given_state(polling("u1", 1))
            .when_action(AuthAction::ProviderStateChanged {
                user: Some(user("u2")),
            })
            .then_state(|state| {
                assert_eq!(state.uid(), Some("u2"));
                assert!(state.poll.is_none());
            })
            .then_effects(|effects| {
                assertions::assert_effects_count(effects, 2);
                assertions::assert_has_cancel(effects, ROLE_POLL);
            })
            .run();
    }

    #[test]
    fn test_login_failure_sets_message() {
        ReducerTest::new(TestReducer::new())
            .with_env(env())
            .given_state(AuthState {
                loading: false,
                ..AuthState::new()
            })
            .when_action(AuthAction::LoginFailed {
                error: AuthError::Unauthenticated,
            })
            .then_state(|state| {
                assert_eq!(state.status(), AuthStatus::Unauthenticated);
                assert_eq!(
                    state.last_error.as_deref(),
                    Some("Please sign in to continue.")
                );
            })
            .run();
    }

    #[test]
    fn test_registered_waits_settle_delay() {
        ReducerTest::new(TestReducer::new())
            .with_env(env())
            .given_state(AuthState::new())
            .when_action(AuthAction::Registered { user: user("u1") })
            .then_state(|state| assert_eq!(state.uid(), Some("u1")))
            .then_effects(|effects| {
                assertions::assert_effects_count(effects, 1);
                assert!(matches!(
                    &effects[0],
                    Effect::Delay { duration, action }
                        if *duration == Duration::from_millis(1500)
                            && **action == AuthAction::RegistrationSettled { uid: "u1".into() }
                ));
            })
            .run();
    }

    #[test]
    fn test_settle_after_sign_out_still_completes_registration() {
        ReducerTest::new(TestReducer::new())
            .with_env(env())
            .given_state(AuthState {
                loading: false,
                ..AuthState::new()
            })
            .when_action(AuthAction::RegistrationSettled { uid: "u1".into() })
            .then_state(|state| assert_eq!(state.status(), AuthStatus::Unauthenticated))
            .then_effects(|effects| {
                assertions::assert_effects_count(effects, 1);
                assertions::assert_has_future_effect(effects);
            })
            .run();
    }

    #[test]
    fn test_registration_completed_for_departed_user_is_ignored() {
        ReducerTest::new(TestReducer::new())
            .with_env(env())
            .given_state(signed_in("u2"))
            .when_action(AuthAction::RegistrationCompleted {
                uid: "u1".into(),
                role: None,
            })
            .then_state(|state| {
                assert_eq!(state.uid(), Some("u2"));
                assert!(state.poll.is_none());
            })
            .then_effects(|effects| assertions::assert_no_effects(effects))
            .run();
    }

    #[test]
    fn test_logout_cancels_poll_and_signs_out() {
        ReducerTest::new(TestReducer::new())
            .with_env(env())
            .given_state(polling("u1", 0))
            .when_action(AuthAction::Logout)
            .then_state(|state| assert!(state.poll.is_none()))
            .then_effects(|effects| {
                assertions::assert_has_cancel(effects, ROLE_POLL);
                assertions::assert_has_future_effect(effects);
            })
            .run();
    }

    #[test]
    fn test_refresh_role_without_user_is_noop() {
        ReducerTest::new(TestReducer::new())
            .with_env(env())
            .given_state(AuthState {
                loading: false,
                ..AuthState::new()
            })
            .when_action(AuthAction::RefreshRole)
            .then_effects(|effects| assertions::assert_no_effects(effects))
            .run();
    }

    #[test]
    fn test_teardown_cancels_poll() {
        ReducerTest::new(TestReducer::new())
            .with_env(env())
            .given_state(polling("u1", 3))
            .when_action(AuthAction::Teardown)
            .then_state(|state| assert!(state.poll.is_none()))
            .then_effects(|effects| assertions::assert_has_cancel(effects, ROLE_POLL))
            .run();
    }
}
