//! Handlers for link lookup and unknown API paths.

use axum::{
    Json,
    extract::{Path, State},
};
use serde_json::json;

use crate::api::dto::link::LinkResponse;
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::url_validator::is_code_shaped;

/// Returns a short link without counting a hit.
///
/// # Endpoint
///
/// `GET /api/get/{id}`
///
/// # Errors
///
/// Returns 404 Not Found if the code does not exist.
pub async fn get_link_handler(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<LinkResponse>, AppError> {
    if !is_code_shaped(&id) {
        return Err(AppError::not_found(json!({ "short": id })));
    }

    let record = state.lookup_service.get(&id).await?;
    let short_url = state.short_url(&record.code);

    Ok(Json(LinkResponse::from_record(record, short_url)))
}

/// JSON 404 for any `/api` path without a route.
pub async fn api_not_found_handler() -> AppError {
    AppError::not_found(json!({}))
}
