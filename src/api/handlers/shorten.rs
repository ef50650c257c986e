//! Handler for link shortening endpoint.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use validator::Validate;

use crate::api::dto::link::LinkResponse;
use crate::api::dto::shorten::ShortenBody;
use crate::error::AppError;
use crate::state::AppState;

/// Creates a short link, or returns the existing one for a repeated request.
///
/// # Endpoint
///
/// `POST /api/shorten`
///
/// # Request Body
///
/// ```json
/// {
///   "url": "https://example.com",
///   "customUrl": "my-link",        // optional
///   "title": "Example",            // optional preview metadata
///   "description": "...",
///   "image": "https://example.com/og.png",
///   "color": "#ff0000"
/// }
/// ```
///
/// # Response Codes
///
/// - **201 Created**: a new record was stored
/// - **200 OK**: an equivalent record already existed
/// - **400 Bad Request**: malformed JSON, invalid URL or alias
/// - **409 Conflict**: the custom alias points at another URL
pub async fn shorten_handler(
    State(state): State<AppState>,
    payload: Result<Json<ShortenBody>, JsonRejection>,
) -> Result<(StatusCode, Json<LinkResponse>), AppError> {
    let Json(body) = payload?;
    body.validate()?;

    let shortened = state.shorten_service.shorten(body.into()).await?;

    let status = if shortened.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    let short_url = state.short_url(&shortened.record.code);

    Ok((
        status,
        Json(LinkResponse::from_record(shortened.record, short_url)),
    ))
}
