//! Waiting for a role claim to reach the client's token.
//!
//! Claims written by the role service are only visible in an identity token
//! minted after the write. [`wait_for_role`] force-refreshes the token on a
//! bounded schedule until the role shows up.

use crate::config::RolePollConfig;
use crate::providers::IdentityProvider;
use crate::role::Role;
use shiptrack_runtime::retry::poll_until;

/// Force-refresh the current user's token until it carries a role.
///
/// Reads once straight away, then up to `config.max_attempts` more times,
/// `config.interval` apart. A failed refresh counts as an empty attempt.
/// Returns `None` once attempts are exhausted. Dropping the future cancels
/// the wait.
#[tracing::instrument(skip_all, fields(max_attempts = config.max_attempts))]
pub async fn wait_for_role<P: IdentityProvider>(provider: &P, config: &RolePollConfig) -> Option<Role> {
    if let Some(role) = fetch_role(provider, true).await {
        return Some(role);
    }

    let role = poll_until(&config.retry_policy(), |attempt| async move {
        tracing::debug!(attempt, "Refreshing token for role claim");
        fetch_role(provider, true).await
    })
    .await;

    if role.is_none() {
        tracing::warn!(
            attempts = config.max_attempts,
            "Role claim did not appear on the token"
        );
    }
    role
}

/// Role on the current token, or `None` if there is none or the read failed.
pub(crate) async fn fetch_role<P: IdentityProvider>(provider: &P, force_refresh: bool) -> Option<Role> {
    match provider.id_token_result(force_refresh).await {
        Ok(token) => token.claims.role(),
        Err(err) => {
            tracing::warn!(error = %err, "Failed to read token claims");
            None
        },
    }
}
