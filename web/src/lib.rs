//! Axum integration for shiptrack services.
//!
//! This crate holds the HTTP shell shared by every shiptrack service: the
//! error type handlers return, request extractors, and the correlation id
//! middleware. Domain crates build their routers on top of it.
//!
//! # Request Flow
//!
//! 1. **HTTP Request** arrives at an Axum handler
//! 2. **Extract data** from the request (JSON body, bearer token, correlation id)
//! 3. **Call the domain service** with the extracted data
//! 4. **Map the result** to a JSON response or an [`AppError`]
//!
//! # Example
//!
//! ```ignore
//! use shiptrack_web::{AppError, BearerToken};
//! use axum::{Router, routing::post, Json};
//!
//! async fn set_role(
//!     State(state): State<Arc<RoleState>>,
//!     BearerToken(token): BearerToken,
//!     Json(request): Json<SetRoleRequest>,
//! ) -> Result<Json<SetRoleResponse>, AppError> {
//!     let caller = state.verifier.verify(&token).await?;
//!     let role = state.service.self_assign(Some(&caller), None, Some(&request.role)).await?;
//!     Ok(Json(SetRoleResponse::ok(role)))
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;

// Re-export key types for convenience
pub use error::AppError;
pub use extractors::{BearerToken, CorrelationId};
pub use middleware::{correlation_id_layer, CORRELATION_ID_HEADER};

/// Result type alias for web handlers.
pub type WebResult<T> = Result<T, AppError>;
