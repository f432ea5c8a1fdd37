//! `setUserRole` and `adminSetUserRole` callables.

use super::CallableState;
use crate::providers::{IdentityStore, TokenVerifier};
use crate::role::Role;
use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};
use shiptrack_web::{AppError, BearerToken, CorrelationId};
use std::sync::Arc;

/// Body of `setUserRole`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SetUserRoleRequest {
    /// Requested role, as sent by the client.
    #[serde(default)]
    pub role: Option<String>,

    /// Uid some clients send along. Must be the caller's own.
    #[serde(default)]
    pub uid: Option<String>,
}

/// Body of `adminSetUserRole`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminSetUserRoleRequest {
    /// User whose role changes.
    #[serde(default)]
    pub target_uid: Option<String>,

    /// Role to assign.
    #[serde(default)]
    pub new_role: Option<String>,
}

/// Successful callable response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RoleResponse {
    /// Always `true`; failures use the error body.
    pub success: bool,
    /// Role now stored on the target user.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

/// Body of a callable request, or the empty request if it did not decode.
///
/// Callers are resolved before the body is looked at, so a missing token
/// still yields `unauthenticated`; an empty request then fails the same way
/// a request with missing fields does.
fn body_or_empty<T: Default>(body: Result<Json<T>, JsonRejection>, callable: &str) -> T {
    match body {
        Ok(Json(request)) => request,
        Err(rejection) => {
            tracing::debug!(callable, error = %rejection.body_text(), "Undecodable callable body");
            T::default()
        },
    }
}

impl RoleResponse {
    fn assigned(role: Role) -> Self {
        Self {
            success: true,
            role: Some(role),
        }
    }
}

/// Self-assign a role.
///
/// # Endpoint
///
/// ```text
/// POST /setUserRole
/// Authorization: Bearer <id token>
///
/// { "role": "SENDER" }
/// ```
///
/// # Errors
///
/// `unauthenticated` without a valid token, `permission-denied` for roles
/// other than CUSTOMER and SENDER (a body that is not a JSON object with a
/// string `role` included).
pub async fn set_user_role<S, V>(
    State(state): State<Arc<CallableState<S, V>>>,
    correlation_id: CorrelationId,
    token: Option<BearerToken>,
    body: Result<Json<SetUserRoleRequest>, JsonRejection>,
) -> Result<Json<RoleResponse>, AppError>
where
    S: IdentityStore + 'static,
    V: TokenVerifier + 'static,
{
    tracing::debug!(correlation_id = %correlation_id.0, "setUserRole");

    let caller = state.caller(token).await?;
    let request = body_or_empty(body, "setUserRole");
    let role = state
        .service
        .self_assign(
            caller.as_ref(),
            request.uid.as_deref(),
            request.role.as_deref(),
        )
        .await?;

    Ok(Json(RoleResponse::assigned(role)))
}

/// Assign any role to any user. ADMIN only.
///
/// # Endpoint
///
/// ```text
/// POST /adminSetUserRole
/// Authorization: Bearer <id token>
///
/// { "targetUid": "u1", "newRole": "STATION" }
/// ```
///
/// # Errors
///
/// `unauthenticated` without a valid token, `permission-denied` if the caller
/// is not ADMIN, `invalid-argument` for a missing target or unknown role
/// (a body that does not decode included).
pub async fn admin_set_user_role<S, V>(
    State(state): State<Arc<CallableState<S, V>>>,
    correlation_id: CorrelationId,
    token: Option<BearerToken>,
    body: Result<Json<AdminSetUserRoleRequest>, JsonRejection>,
) -> Result<Json<RoleResponse>, AppError>
where
    S: IdentityStore + 'static,
    V: TokenVerifier + 'static,
{
    tracing::debug!(correlation_id = %correlation_id.0, "adminSetUserRole");

    let caller = state.caller(token).await?;
    let request = body_or_empty(body, "adminSetUserRole");
    let role = state
        .service
        .admin_assign(
            caller.as_ref(),
            request.target_uid.as_deref(),
            request.new_role.as_deref(),
        )
        .await?;

    Ok(Json(RoleResponse::assigned(role)))
}
