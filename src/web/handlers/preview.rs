//! Link preview page.

use askama::Template;
use askama_web::WebTemplate;

use crate::domain::entities::UrlRecord;

/// Template for a short link that carries preview metadata.
///
/// Renders `templates/preview.html`: Open Graph and Twitter card tags for
/// crawlers, plus an immediate meta refresh to the target for browsers.
#[derive(Template, WebTemplate)]
#[template(path = "preview.html")]
pub struct PreviewTemplate {
    pub target_url: String,
    pub short_url: String,
    pub title: String,
    pub description: String,
    pub image: String,
    pub color: String,
}

impl PreviewTemplate {
    pub fn from_record(record: &UrlRecord, short_url: String) -> Self {
        let meta = record.meta.clone().unwrap_or_default();

        Self {
            target_url: record.target_url.clone(),
            short_url,
            title: meta.title,
            description: meta.description,
            image: meta.image,
            color: meta.color,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::UrlMetadata;

    #[test]
    fn test_renders_open_graph_tags() {
        let meta = UrlMetadata::new(
            "A <b>title</b>",
            "Desc",
            "https://img.example.com/a.png",
            "#ff0000",
        );
        let record = UrlRecord::new(
            "abc".to_string(),
            "https://example.com/page".to_string(),
            Some(meta.clone()),
            UrlMetadata::signature(Some(&meta)),
        );

        let html = PreviewTemplate::from_record(&record, "https://s.example.com/abc".to_string())
            .render()
            .unwrap();

        assert!(html.contains(r#"<meta property="og:title" content="A "#));
        assert!(!html.contains("<b>title</b>"));
        assert!(html.contains(r#"<meta property="og:image" content="https://img.example.com/a.png">"#));
        assert!(html.contains(r##"<meta name="theme-color" content="#ff0000">"##));
        assert!(html.contains("url=https://example.com/page"));
    }

    #[test]
    fn test_blank_fields_are_left_out() {
        let meta = UrlMetadata::new("Only title", "", "", "");
        let record = UrlRecord::new(
            "abc".to_string(),
            "https://example.com".to_string(),
            Some(meta),
            String::new(),
        );

        let html = PreviewTemplate::from_record(&record, "https://s.example.com/abc".to_string())
            .render()
            .unwrap();

        assert!(!html.contains("og:image"));
        assert!(!html.contains("theme-color"));
    }
}
