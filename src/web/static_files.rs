//! Static asset serving with precompressed gzip and a 404 page.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::body::Body;
use axum::extract::Request;
use axum::http::{StatusCode, Uri, header};
use axum::response::{Html, IntoResponse, Response};
use tower::ServiceExt;
use tower_http::services::ServeDir;
use tracing::{debug, info};

use super::dynamic_routes::DynamicRoutes;
use super::handlers::NotFoundTemplate;

/// Custom 404 page looked up at the static root.
pub const NOT_FOUND_PAGE: &str = "404.html";

/// Serves files from a directory.
///
/// - `foo.gz` is sent for `foo` when the client accepts gzip
/// - Next.js `[param]` directories match any segment
/// - misses render `404.html` from the directory, or a built-in page
#[derive(Clone)]
pub struct StaticFiles {
    root: PathBuf,
    serve_dir: ServeDir,
    routes: Arc<DynamicRoutes>,
    not_found_page: Option<Arc<str>>,
}

impl StaticFiles {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let routes = DynamicRoutes::load(&root);
        let not_found_page = std::fs::read_to_string(root.join(NOT_FOUND_PAGE))
            .ok()
            .map(Arc::from);

        if root.is_dir() {
            info!(
                path = %root.display(),
                custom_404 = not_found_page.is_some(),
                dynamic_routes = !routes.is_empty(),
                "Serving static files"
            );
        } else {
            debug!(path = %root.display(), "Static directory missing, only the 404 page is served");
        }

        Self {
            serve_dir: ServeDir::new(&root)
                .precompressed_gzip()
                .append_index_html_on_directories(true),
            root,
            routes: Arc::new(routes),
            not_found_page,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Serves `request` from the static directory.
    pub async fn serve(&self, mut request: Request) -> Response {
        let path = request.uri().path().to_string();

        if let Some(directory) = self.routes.resolve(&path)
            && let Some(uri) = rewrite_path(request.uri(), &format!("{directory}/"))
        {
            debug!(from = %path, to = %uri, "Matched dynamic route");
            *request.uri_mut() = uri;
        }

        let response = match self.serve_dir.clone().oneshot(request).await {
            Ok(response) => response,
            Err(never) => match never {},
        };

        if response.status() == StatusCode::NOT_FOUND {
            return self.not_found(&path);
        }

        response.map(Body::new)
    }

    /// Renders the 404 page for `path`.
    pub fn not_found(&self, path: &str) -> Response {
        match &self.not_found_page {
            Some(page) => (
                StatusCode::NOT_FOUND,
                [(header::CACHE_CONTROL, "no-cache")],
                Html(page.to_string()),
            )
                .into_response(),
            None => (
                StatusCode::NOT_FOUND,
                NotFoundTemplate {
                    path: path.to_string(),
                },
            )
                .into_response(),
        }
    }
}

/// Replaces the path of `uri`, keeping its query string.
fn rewrite_path(uri: &Uri, path: &str) -> Option<Uri> {
    let path_and_query = match uri.query() {
        Some(query) => format!("{path}?{query}"),
        None => path.to_string(),
    };

    let mut parts = uri.clone().into_parts();
    parts.path_and_query = Some(path_and_query.parse().ok()?);
    Uri::from_parts(parts).ok()
}
