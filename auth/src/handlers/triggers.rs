//! Account lifecycle triggers.

use super::CallableState;
use crate::providers::{IdentityStore, TokenVerifier};
use crate::role::Role;
use crate::service::DefaultRoleOutcome;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::HeaderMap,
    Json,
};
use serde::{Deserialize, Serialize};
use shiptrack_web::AppError;
use std::sync::Arc;

/// Header carrying the shared trigger secret.
pub const TRIGGER_SECRET_HEADER: &str = "x-trigger-secret";

/// Body of the user-created trigger.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UserCreatedEvent {
    /// Uid of the new account.
    pub uid: String,
}

/// Outcome of the user-created trigger.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct UserCreatedResponse {
    /// Whether this call wrote the default role.
    pub assigned: bool,
    /// Role the user holds afterwards.
    pub role: Option<Role>,
}

/// Give a new account the default role.
///
/// # Endpoint
///
/// ```text
/// POST /triggers/user-created
/// X-Trigger-Secret: <secret>
///
/// { "uid": "u1" }
/// ```
///
/// # Errors
///
/// `permission-denied` if the secret is missing, wrong, or not configured;
/// `invalid-argument` if the body carries no uid.
pub async fn user_created<S, V>(
    State(state): State<Arc<CallableState<S, V>>>,
    headers: HeaderMap,
    body: Result<Json<UserCreatedEvent>, JsonRejection>,
) -> Result<Json<UserCreatedResponse>, AppError>
where
    S: IdentityStore + 'static,
    V: TokenVerifier + 'static,
{
    let presented = headers
        .get(TRIGGER_SECRET_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    let authorized = state
        .trigger_secret
        .as_deref()
        .is_some_and(|secret| constant_time_eq::constant_time_eq(secret.as_bytes(), presented.as_bytes()));
    if !authorized {
        tracing::warn!("User-created trigger with bad secret");
        return Err(AppError::forbidden("Invalid trigger secret"));
    }

    let event = match body {
        Ok(Json(event)) if !event.uid.trim().is_empty() => event,
        Ok(_) => return Err(AppError::bad_request("uid is required")),
        Err(rejection) => return Err(AppError::bad_request(rejection.body_text())),
    };

    let response = match state.service.on_user_created(&event.uid).await? {
        DefaultRoleOutcome::Assigned(role) => UserCreatedResponse {
            assigned: true,
            role: Some(role),
        },
        DefaultRoleOutcome::AlreadyAssigned(role) => UserCreatedResponse {
            assigned: false,
            role,
        },
    };

    Ok(Json(response))
}
