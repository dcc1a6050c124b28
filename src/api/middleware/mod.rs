//! HTTP middleware layers.
//!
//! Applied by [`create_router`](crate::api::create_router) in this order,
//! innermost first: cross-origin policy, gzip compression, request timeout,
//! request tracing.

use std::time::Duration;

use axum::http::{header, HeaderValue, Method};
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, CorsLayer},
    timeout::TimeoutLayer,
};

use crate::config::CORS_ALLOWED_HEADERS;
use crate::errors::{AppError, AppResult};

/// Cross-origin policy: one origin, with credentials, fixed header set.
///
/// Requests from any other origin get no allow-origin header.
///
/// # Errors
/// Returns an internal error if the origin is not a valid header value.
pub fn cors_layer(allowed_origin: &str) -> AppResult<CorsLayer> {
    let origin = HeaderValue::from_str(allowed_origin).map_err(|e| {
        AppError::internal(format!("invalid CORS origin {:?}: {}", allowed_origin, e))
    })?;

    let headers = CORS_ALLOWED_HEADERS
        .iter()
        .copied()
        .map(header::HeaderName::from_static)
        .collect::<Vec<_>>();

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list([origin]))
        .allow_credentials(true)
        .allow_headers(headers)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ]))
}

pub fn compression_layer() -> CompressionLayer {
    CompressionLayer::new()
}

/// Requests still running after `idle` are answered with 408.
pub fn timeout_layer(idle: Duration) -> TimeoutLayer {
    TimeoutLayer::new(idle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cors_rejects_unparsable_origin() {
        assert!(cors_layer("http://localhost:3000").is_ok());
        assert!(matches!(
            cors_layer("http://bad\norigin"),
            Err(AppError::Internal(_))
        ));
    }
}
