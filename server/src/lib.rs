//! # Shiptrack Server
//!
//! HTTP host for the role service: the role callables, the user-created
//! trigger and a health endpoint, backed by the Identity Toolkit.
//!
//! The binary in `main.rs` wires [`ServerConfig`] to [`build_router`]; the
//! library half exists so the router can be exercised in tests with
//! in-memory providers.

#![deny(missing_docs)]
#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

pub mod config;
pub mod routes;

pub use config::ServerConfig;
pub use routes::build_router;

use shiptrack_auth::{CallableState, IdentityToolkitStore};
use std::sync::Arc;

/// Shared state backed by the Identity Toolkit.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be built.
pub fn identity_toolkit_state(
    config: &ServerConfig,
) -> anyhow::Result<Arc<CallableState<IdentityToolkitStore, IdentityToolkitStore>>> {
    let store = IdentityToolkitStore::new(config.identity_toolkit())?;

    if config.emulator_host.is_none() {
        match (&config.access_token_file, &config.access_token) {
            (Some(path), _) => tracing::info!(path = %path, "Admin access token read from file on each call"),
            (None, Some(_)) => tracing::warn!(
                "IDENTITY_TOOLKIT_ACCESS_TOKEN is static; role writes fail once it expires, \
                 set IDENTITY_TOOLKIT_ACCESS_TOKEN_FILE to rotate it"
            ),
            (None, None) => tracing::warn!("No admin access token configured; role writes will fail"),
        }
    }

    Ok(match &config.trigger_secret {
        Some(secret) => CallableState::with_trigger_secret(store.clone(), store, secret.clone()),
        None => {
            tracing::warn!("ROLE_SERVICE_TRIGGER_SECRET is not set; the user-created trigger is disabled");
            CallableState::new(store.clone(), store)
        },
    })
}
