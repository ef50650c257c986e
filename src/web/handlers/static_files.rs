//! Fallback handler for everything that is not an API or short link route.

use axum::extract::{Request, State};
use axum::response::Response;

use crate::state::AppState;

/// Serves static assets, falling back to the 404 page.
///
/// # Endpoint
///
/// Any `GET` not matched by another route.
pub async fn static_handler(State(state): State<AppState>, request: Request) -> Response {
    state.static_files.serve(request).await
}
