//! Role service router composition.

use crate::handlers::{roles, triggers, CallableState};
use crate::providers::{IdentityStore, TokenVerifier};
use axum::{routing::post, Router};
use std::sync::Arc;

/// Create the role service router.
///
/// # Routes
///
/// - `POST /setUserRole` - self-assign CUSTOMER or SENDER
/// - `POST /adminSetUserRole` - assign any role (ADMIN callers only)
/// - `POST /triggers/user-created` - default role for a new account
///
/// # Example
///
/// ```rust,ignore
/// let state = CallableState::new(store.clone(), store);
///
/// let app = Router::new()
///     .merge(role_router(state))
///     .layer(TraceLayer::new_for_http());
/// ```
pub fn role_router<S, V>(state: Arc<CallableState<S, V>>) -> Router
where
    S: IdentityStore + 'static,
    V: TokenVerifier + 'static,
{
    Router::new()
        .route("/setUserRole", post(roles::set_user_role::<S, V>))
        .route("/adminSetUserRole", post(roles::admin_set_user_role::<S, V>))
        .route("/triggers/user-created", post(triggers::user_created::<S, V>))
        .with_state(state)
}
