//! Auth reducers.

pub mod auth_context;

pub use auth_context::{AuthReducer, ROLE_POLL};
