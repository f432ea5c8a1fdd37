//! Role assignment service.
//!
//! The only code that writes the `role` claim. It serves three entry points
//! with different trust levels:
//!
//! | operation          | who may call       | roles accepted        |
//! |--------------------|--------------------|-----------------------|
//! | `self_assign`      | any signed-in user | CUSTOMER, SENDER      |
//! | `admin_assign`     | users with ADMIN   | any                   |
//! | `on_user_created`  | account trigger    | CUSTOMER (if roleless)|
//!
//! Every write is read-modify-write on the user's claim set. Concurrent writes
//! to the same user are last-write-wins.

use crate::error::{AuthError, Result};
use crate::providers::{IdentityStore, VerifiedToken};
use crate::role::Role;

/// Result of the account-creation trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultRoleOutcome {
    /// The user had no role and now has CUSTOMER.
    Assigned(Role),
    /// The user already had a role claim; nothing was written.
    AlreadyAssigned(Option<Role>),
}

/// Writes role claims through an [`IdentityStore`].
#[derive(Debug, Clone)]
pub struct RoleAssignmentService<S> {
    store: S,
}

impl<S: IdentityStore> RoleAssignmentService<S> {
    /// Create a service writing through `store`.
    #[must_use]
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// The underlying identity store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Assign `role` to the caller.
    ///
    /// The target is always the caller. `requested_uid` exists only because
    /// older clients send their own uid in the request body; any value other
    /// than the caller's uid is refused.
    ///
    /// # Errors
    ///
    /// - [`AuthError::Unauthenticated`] if there is no caller
    /// - [`AuthError::PermissionDenied`] if `role` is not CUSTOMER or SENDER
    ///   (unknown strings included), or `requested_uid` names someone else
    /// - store errors from the claim write
    #[tracing::instrument(skip(self, caller), fields(uid = caller.map(|c| c.uid.as_str())))]
    pub async fn self_assign(
        &self,
        caller: Option<&VerifiedToken>,
        requested_uid: Option<&str>,
        role: Option<&str>,
    ) -> Result<Role> {
        let caller = caller.ok_or(AuthError::Unauthenticated)?;

        if let Some(requested) = requested_uid {
            if requested != caller.uid {
                tracing::warn!(requested_uid = %requested, "Self-assign for another user refused");
                metrics::counter!("roles.assign.refused", "operation" => "self").increment(1);
                return Err(AuthError::permission_denied(
                    "You can only set your own role",
                ));
            }
        }

        let role = role
            .and_then(|r| r.parse::<Role>().ok())
            .filter(|r| r.is_self_assignable())
            .ok_or_else(|| {
                metrics::counter!("roles.assign.refused", "operation" => "self").increment(1);
                AuthError::permission_denied("You can only register as CUSTOMER or SENDER")
            })?;

        self.merge_role(&caller.uid, role).await?;

        tracing::info!(uid = %caller.uid, role = %role, "Role self-assigned");
        metrics::counter!("roles.assigned", "operation" => "self").increment(1);
        Ok(role)
    }

    /// Assign `role` to `target_uid` on behalf of an admin.
    ///
    /// The caller's ADMIN status is read from the identity store, not from
    /// their token, so a demoted admin loses access immediately.
    ///
    /// # Errors
    ///
    /// - [`AuthError::Unauthenticated`] if there is no caller
    /// - [`AuthError::PermissionDenied`] if the caller is not ADMIN, whatever the role
    /// - [`AuthError::InvalidArgument`] if `target_uid` is missing or empty, or
    ///   `role` is not one of the four roles
    /// - store errors from reading the caller or writing the target
    #[tracing::instrument(skip(self, caller), fields(caller = caller.map(|c| c.uid.as_str())))]
    pub async fn admin_assign(
        &self,
        caller: Option<&VerifiedToken>,
        target_uid: Option<&str>,
        role: Option<&str>,
    ) -> Result<Role> {
        let caller = caller.ok_or(AuthError::Unauthenticated)?;

        let caller_record = self.store.get_user(&caller.uid).await?;
        if caller_record.claims.role() != Some(Role::Admin) {
            tracing::warn!(caller = %caller.uid, "Non-admin attempted role reassignment");
            metrics::counter!("roles.assign.refused", "operation" => "admin").increment(1);
            return Err(AuthError::permission_denied("Admin only"));
        }

        let target_uid = target_uid
            .filter(|uid| !uid.trim().is_empty())
            .ok_or_else(|| AuthError::invalid_argument("targetUid is required"))?;
        let role: Role = role
            .ok_or_else(|| AuthError::invalid_argument("newRole is required"))?
            .parse()?;

        self.merge_role(target_uid, role).await?;

        tracing::info!(caller = %caller.uid, target = %target_uid, role = %role, "Role assigned by admin");
        metrics::counter!("roles.assigned", "operation" => "admin").increment(1);
        Ok(role)
    }

    /// Give a freshly created account the CUSTOMER role.
    ///
    /// Safe to run more than once and safe to race with `self_assign`: a user
    /// that already carries any role claim is left alone.
    ///
    /// # Errors
    ///
    /// Store errors from reading or writing the user.
    #[tracing::instrument(skip(self))]
    pub async fn on_user_created(&self, uid: &str) -> Result<DefaultRoleOutcome> {
        let record = self.store.get_user(uid).await?;

        if record.claims.has_role_claim() {
            tracing::debug!(uid = %uid, existing = ?record.claims.role(), "User already has a role");
            return Ok(DefaultRoleOutcome::AlreadyAssigned(record.claims.role()));
        }

        let claims = record.claims.with_role(Role::Customer);
        self.store.set_claims(uid, claims).await?;

        tracing::info!(uid = %uid, role = %Role::Customer, "Default role assigned");
        metrics::counter!("roles.assigned", "operation" => "default").increment(1);
        Ok(DefaultRoleOutcome::Assigned(Role::Customer))
    }

    async fn merge_role(&self, uid: &str, role: Role) -> Result<()> {
        let record = self.store.get_user(uid).await?;
        let claims = record.claims.with_role(role);
        self.store.set_claims(uid, claims).await
    }
}
