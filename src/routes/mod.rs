//! HTTP route handlers.
//!
//! A single read-only health endpoint, versioned under `/api`. Health
//! responses must never be served stale by intermediaries, so the route
//! carries `Cache-Control: no-store`.

pub mod health;

use axum::{middleware, routing::get, Router};
use http::header::{HeaderValue, CACHE_CONTROL};
use tower_http::set_header::SetResponseHeaderLayer;

use crate::config::CACHE_CONTROL_HEALTH;
use crate::middleware::request_id_layer;
use crate::state::AppState;

/// Creates the Axum router with all routes and response headers.
pub fn create_router(state: AppState) -> Router {
    let health_routes = Router::new()
        .route("/api/health", get(health::get_health))
        .layer(SetResponseHeaderLayer::if_not_present(
            CACHE_CONTROL,
            HeaderValue::from_static(CACHE_CONTROL_HEALTH),
        ));

    Router::new()
        .merge(health_routes)
        .with_state(state)
        // Request ID middleware - creates root span with request_id for correlation
        .layer(middleware::from_fn(request_id_layer))
}
