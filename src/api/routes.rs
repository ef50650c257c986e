//! API route configuration.
//!
//! The API is public. Abuse is bounded by the per-IP limiter applied in
//! [`crate::routes::app_router`].

use crate::api::handlers::{api_not_found_handler, get_link_handler, shorten_handler};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

/// All API routes, mounted under `/api`.
///
/// # Endpoints
///
/// - `POST /shorten`   - Create a short link (optionally with alias and preview metadata)
/// - `GET  /get/{id}`  - Fetch a link without counting a hit
/// - anything else     - JSON `404 {"error": "not found"}`
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/shorten", post(shorten_handler))
        .route("/get/{id}", get(get_link_handler))
        .fallback(api_not_found_handler)
}
