//! Handler for health check endpoint.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::api::dto::health::{HealthChecks, HealthResponse, StorageCheck};
use crate::state::AppState;

/// Reports whether the store is answering.
///
/// # Endpoint
///
/// `GET /health`
///
/// # Response Codes
///
/// - **200 OK**: store reachable
/// - **503 Service Unavailable**: store failed
///
/// # Response
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "checks": {
///     "storage": { "status": "ok", "message": "42 links stored", "links": 42 }
///   }
/// }
/// ```
pub async fn health_handler(State(state): State<AppState>) -> Response {
    let storage = match state.store.count().await {
        Ok(links) => StorageCheck::ok(links),
        Err(e) => {
            tracing::error!(error = %e, "Storage health check failed");
            StorageCheck::failed(format!("Storage error: {e}"))
        }
    };

    let response = HealthResponse::from_checks(HealthChecks { storage });
    let status = if response.is_healthy() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(response)).into_response()
}
