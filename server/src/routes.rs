//! Router configuration for the role service.

use axum::http::{HeaderValue, Method};
use axum::{routing::get, Router};
use shiptrack_auth::{role_router, CallableState, IdentityStore, TokenVerifier};
use shiptrack_web::correlation_id_layer;
use shiptrack_web::handlers::health_check;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Build the complete Axum router.
///
/// - `GET /health`
/// - the role callables and the user-created trigger (see [`role_router`])
///
/// Requests get a correlation id and a trace span. Browser origins are
/// limited to `allowed_origins` unless it is empty.
pub fn build_router<S, V>(state: Arc<CallableState<S, V>>, allowed_origins: &[String]) -> Router
where
    S: IdentityStore + 'static,
    V: TokenVerifier + 'static,
{
    Router::new()
        .route("/health", get(health_check))
        .merge(role_router(state))
        .layer(cors_layer(allowed_origins))
        .layer(correlation_id_layer())
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            },
        })
        .collect();

    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    if origins.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(AllowOrigin::list(origins))
    }
}
