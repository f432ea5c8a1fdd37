//! # Shiptrack roles and authentication
//!
//! Role claims for shiptrack users, the service that writes them, and the
//! client-side auth context that reads them back.
//!
//! ## Features
//!
//! - **Role assignment**: self-service (CUSTOMER, SENDER), admin-driven (any
//!   role) and a default-role trigger for new accounts
//! - **Claim merge**: role writes never drop unrelated custom claims
//! - **Claim propagation**: bounded, cancellable token refresh until a new
//!   role is visible to the client
//! - **Testable**: every provider sits behind a trait with an in-memory mock
//!
//! ## Architecture
//!
//! The auth context is a reducer driven by a [`Store`](shiptrack_runtime::Store):
//!
//! ```text
//! Provider event / command → AuthReducer → (AuthState, Effects) → Effect Execution → More Actions
//! ```
//!
//! ## Example: register and wait for the role
//!
//! ```rust,ignore
//! use shiptrack_auth::*;
//!
//! let context = AuthContext::start(AuthEnvironment::new(provider, role_client));
//! context.register("a@example.com", "secret", Some(Role::Sender)).await?;
//!
//! match context.status().await {
//!     AuthStatus::AuthenticatedWithRole => { /* dashboard */ },
//!     AuthStatus::AuthenticatedRoleless => { /* still polling */ },
//!     _ => {},
//! }
//! ```
//!
//! ## Example: serve the role callables
//!
//! ```rust,ignore
//! let store = IdentityToolkitStore::new(IdentityToolkitConfig::new("shiptrack"))?;
//! let app = role_router(CallableState::new(store.clone(), store));
//! ```

#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]

// Public modules
pub mod actions;
pub mod capability;
pub mod config;
pub mod context;
pub mod environment;
pub mod error;
pub mod propagation;
pub mod providers;
pub mod reducers;
pub mod role;
pub mod service;
pub mod state;

#[cfg(feature = "axum")]
pub mod handlers;
#[cfg(feature = "axum")]
pub mod router;

#[cfg(any(test, feature = "test-utils"))]
pub mod mocks;

// Re-export main types for convenience
pub use actions::AuthAction;
pub use capability::{authorize, Capability};
pub use config::{IdentityToolkitConfig, RegistrationConfig, RoleClientConfig, RolePollConfig};
pub use context::AuthContext;
pub use environment::AuthEnvironment;
pub use error::{AuthError, Result};
pub use propagation::wait_for_role;
pub use providers::{
    AuthUser, CallableRoleClient, IdTokenResult, IdentityProvider, IdentityStore,
    IdentityToolkitStore, RoleAssignmentClient, TokenVerifier, UserRecord, VerifiedToken,
};
pub use reducers::{AuthReducer, ROLE_POLL};
pub use role::{Claims, Role, ROLE_CLAIM};
pub use service::{DefaultRoleOutcome, RoleAssignmentService};
pub use state::{AuthState, AuthStatus};

#[cfg(feature = "axum")]
pub use handlers::CallableState;
#[cfg(feature = "axum")]
pub use router::role_router;
