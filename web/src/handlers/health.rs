//! Liveness endpoint used by load balancers and deploy tooling.

use axum::Json;
use serde::{Deserialize, Serialize};

/// Body returned by [`health_check`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `"ok"` while the process is serving requests.
    pub status: String,
    /// Crate version of the running binary.
    pub version: String,
}

/// Liveness check.
///
/// Does NOT reach the identity provider; a 200 only means the process is up.
///
/// ```text
/// GET /health
/// {"status": "ok", "version": "0.1.0"}
/// ```
#[allow(clippy::unused_async)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
