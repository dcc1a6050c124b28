//! Health check handler.

use axum::{routing::get, Router};

use crate::api::AppState;
use crate::config::HEALTHCHECK_BODY;

/// Create health routes
pub fn health_routes() -> Router<AppState> {
    Router::new().route("/healthcheck", get(healthcheck))
}

/// Liveness probe. Answers while the process accepts connections.
pub async fn healthcheck() -> &'static str {
    HEALTHCHECK_BODY
}
