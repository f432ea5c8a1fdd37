//! What each role may do in the application.

use crate::error::{AuthError, Result};
use crate::role::Role;

/// An action gated by role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Open the dashboard. Any signed-in user with a role.
    ViewDashboard,
    /// Create a shipment.
    CreateShipment,
    /// List the shipments the caller created.
    ListOwnShipments,
    /// Post a tracking checkpoint from a station.
    UpdateStationStatus,
    /// Look a shipment up by tracking id. Needs no account.
    TrackPublic,
}

impl Capability {
    /// Whether the capability is available without signing in.
    #[must_use]
    pub const fn is_public(self) -> bool {
        matches!(self, Self::TrackPublic)
    }
}

impl Role {
    /// Whether this role grants `capability`.
    #[must_use]
    pub const fn permits(self, capability: Capability) -> bool {
        match capability {
            Capability::ViewDashboard | Capability::TrackPublic => true,
            Capability::CreateShipment | Capability::ListOwnShipments => {
                matches!(self, Self::Sender | Self::Admin)
            },
            Capability::UpdateStationStatus => matches!(self, Self::Station),
        }
    }
}

/// Check `capability` for a caller whose role may still be unknown.
///
/// # Errors
///
/// - [`AuthError::Unauthenticated`] if the capability is not public and there is no role
/// - [`AuthError::PermissionDenied`] if the role does not grant it
pub fn authorize(role: Option<Role>, capability: Capability) -> Result<()> {
    if capability.is_public() {
        return Ok(());
    }

    match role {
        None => Err(AuthError::Unauthenticated),
        Some(role) if role.permits(capability) => Ok(()),
        Some(role) => Err(AuthError::permission_denied(format!(
            "{role} may not {capability:?}"
        ))),
    }
}
