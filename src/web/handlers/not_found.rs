//! Built-in 404 page.

use askama::Template;
use askama_web::WebTemplate;

/// Template for the 404 page.
///
/// Renders `templates/not_found.html`. Used when the static directory ships
/// no `404.html` of its own.
#[derive(Template, WebTemplate)]
#[template(path = "not_found.html")]
pub struct NotFoundTemplate {
    pub path: String,
}
