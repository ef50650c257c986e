//! Top-level router configuration combining API, redirect and static routes.
//!
//! # Route Structure
//!
//! - `GET  /health`      - Health check: storage (public)
//! - `GET  /{code}`      - Short link redirect or preview page (public)
//! - `/api/*`            - JSON API (rate limited)
//! - everything else     - Static front end from `STATIC_DIR`
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Compression** - gzip for responses not already precompressed
//! - **Rate limiting** - Per-IP token bucket on `/api` (configurable for proxy deployments)

use crate::api;
use crate::api::handlers::{health_handler, redirect_handler};
use crate::api::middleware::{RateLimitSettings, rate_limit, tracing};
use crate::state::AppState;
use crate::web::handlers::static_handler;
use axum::Router;
use axum::routing::get;
use tower_http::compression::CompressionLayer;

/// Constructs the application router with all routes and middleware.
///
/// # Arguments
///
/// - `state` - shared application state injected into all handlers
/// - `rate_limit` - limiter for `/api`; with `behind_proxy` set the client IP
///   is read from `X-Forwarded-For` / `X-Real-IP` instead of the peer socket
///   address, so enable it only behind a trusted reverse proxy
///
/// Served without `behind_proxy`, the limiter needs the peer address, i.e.
/// `into_make_service_with_connect_info::<SocketAddr>()`.
pub fn app_router(state: AppState, rate_limit: &RateLimitSettings) -> Router {
    let api_router = rate_limit::apply(api::routes::api_routes(), rate_limit);

    Router::new()
        .route("/health", get(health_handler))
        .route("/{code}", get(redirect_handler))
        .nest("/api", api_router)
        .fallback(static_handler)
        .with_state(state)
        .layer(CompressionLayer::new())
        .layer(tracing::layer())
}
