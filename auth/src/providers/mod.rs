//! Identity provider interfaces.
//!
//! Everything the role service and the auth context need from the outside
//! world is behind one of these traits, so tests can swap in the in-memory
//! versions from [`crate::mocks`].
//!
//! ```text
//!  server side                         client side
//! ┌────────────────────┐             ┌──────────────────────┐
//! │ RoleAssignment-    │             │ AuthReducer          │
//! │ Service            │             │                      │
//! │  uses IdentityStore│◀── HTTP ────│  uses IdentityProvider
//! │  + TokenVerifier   │  callables  │  + RoleAssignmentClient
//! └────────────────────┘             └──────────────────────┘
//! ```

use crate::role::Claims;
use serde::{Deserialize, Serialize};

pub mod callable;
pub mod identity_provider;
pub mod identity_store;
pub mod identity_toolkit;
pub mod role_client;
pub mod token_verifier;

pub use callable::CallableRoleClient;
pub use identity_provider::IdentityProvider;
pub use identity_store::IdentityStore;
pub use identity_toolkit::IdentityToolkitStore;
pub use role_client::RoleAssignmentClient;
pub use token_verifier::TokenVerifier;

/// A user record as held by the identity store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    /// Identity-provider user id.
    pub uid: String,
    /// Email address, if the account has one.
    pub email: Option<String>,
    /// Custom claims.
    pub claims: Claims,
}

/// A caller identity established from a verified bearer token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerifiedToken {
    /// Uid the token was issued to.
    pub uid: String,
    /// Email address from the token, if any.
    pub email: Option<String>,
    /// Claims carried by the token.
    pub claims: Claims,
}

/// The signed-in user as seen by the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    /// Identity-provider user id.
    pub uid: String,
    /// Email address.
    pub email: String,
}

/// An identity token together with the claims it carries.
#[derive(Debug, Clone, PartialEq)]
pub struct IdTokenResult {
    /// Raw token, sent as `Authorization: Bearer <token>`.
    pub token: String,
    /// Claims baked into this token.
    pub claims: Claims,
}
