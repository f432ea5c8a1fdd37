//! Client side of the self-assign callable.

use crate::error::Result;
use crate::role::Role;
use std::future::Future;

/// Asks the role service to assign a role to the signed-in user.
pub trait RoleAssignmentClient: Send + Sync {
    /// Self-assign `role` as the holder of `id_token`.
    ///
    /// # Errors
    ///
    /// Returns the service's error (`Unauthenticated`, `PermissionDenied`,
    /// `InvalidArgument`, `Internal`) or [`AuthError::Provider`](crate::AuthError::Provider)
    /// when the service could not be reached.
    fn set_user_role(&self, id_token: &str, role: Role)
    -> impl Future<Output = Result<Role>> + Send;
}
