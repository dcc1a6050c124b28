//! Application route configuration.

use axum::Router;
use tower_http::trace::TraceLayer;

use super::handlers::{health_routes, user_routes};
use super::middleware::{compression_layer, cors_layer, timeout_layer};
use super::AppState;
use crate::config::Config;
use crate::errors::AppResult;

/// Built-in route families, relative to `/api`.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health_routes())
        .nest("/users", user_routes())
}

/// Create the application router.
///
/// `extra_routes` are merged under `/api` next to the built-in families.
///
/// # Errors
/// Fails when the configured CORS origin is not a valid header value.
pub fn create_router(
    state: AppState,
    extra_routes: Router<AppState>,
    config: &Config,
) -> AppResult<Router> {
    let router = Router::new()
        .nest("/api", api_routes().merge(extra_routes))
        .layer(timeout_layer(config.idle_timeout))
        .layer(compression_layer())
        // Outside the timeout so 408 responses stay readable cross-origin
        .layer(cors_layer(&config.cors_allowed_origin)?)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    Ok(router)
}
