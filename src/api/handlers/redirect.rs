//! Handler for short URL redirect.

use axum::{
    extract::{Path, Request, State},
    http::Method,
    response::{IntoResponse, Redirect, Response},
};
use tracing::debug;

use crate::domain::ShortenError;
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::url_validator::is_code_shaped;
use crate::web::handlers::PreviewTemplate;

/// Resolves a short code.
///
/// # Endpoint
///
/// `GET /{code}` (also answers `HEAD`)
///
/// # Request Flow
///
/// 1. Paths that cannot be a short code go straight to static files
/// 2. Resolve the code; only `GET` counts a hit, so link checkers sending
///    `HEAD` leave the counter alone
/// 3. Record with metadata: render the preview page
/// 4. Otherwise: 307 Temporary Redirect, so browsers keep asking (and
///    counting) instead of caching a permanent redirect
/// 5. Unknown codes fall through to static files and the 404 page
///
/// # Errors
///
/// Returns 500 if the store fails.
pub async fn redirect_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
    request: Request,
) -> Response {
    if !is_code_shaped(&code) {
        return state.static_files.serve(request).await;
    }

    let lookup = if request.method() == Method::GET {
        state.lookup_service.resolve(&code).await
    } else {
        state.lookup_service.get(&code).await
    };

    match lookup {
        Ok(record) if record.has_preview() => {
            debug!(code = %code, "Rendering preview page");
            PreviewTemplate::from_record(&record, state.short_url(&record.code)).into_response()
        }
        Ok(record) => Redirect::temporary(&record.target_url).into_response(),
        Err(ShortenError::NotFound(_)) => state.static_files.serve(request).await,
        Err(e) => AppError::from(e).into_response(),
    }
}
