//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET  /health`    - Health check (public)
//! - `{base}/*`        - Post resource, see [`crate::api::routes`]
//!
//! `{base}` comes from `POSTS_BASE_PATH` (default `/api/posts`).
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Authentication** - Bearer token gate on the write routes only
//! - **Path normalization** - Trailing slash handling

use crate::api::handlers::health_handler;
use crate::api::middleware::tracing;
use crate::api::routes::post_routes;
use crate::state::AppState;
use axum::Router;
use axum::routing::get;
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

/// Constructs the application router with all routes and middleware.
///
/// # Arguments
///
/// - `state` - shared application state injected into all handlers
/// - `base_path` - mount point of the post routes; `/` mounts them at the root
pub fn app_router(state: AppState, base_path: &str) -> NormalizePath<Router> {
    NormalizePathLayer::trim_trailing_slash().layer(build_router(state, base_path))
}

/// Same routes as [`app_router`] without trailing-slash normalization.
///
/// Used directly by tests, which talk to the router without the outer layer.
pub fn build_router(state: AppState, base_path: &str) -> Router {
    let posts = post_routes(&state);

    let router = Router::new().route("/health", get(health_handler));

    let router = if base_path == "/" {
        router.merge(posts)
    } else {
        router.nest(base_path, posts)
    };

    router.with_state(state).layer(tracing::layer())
}
