//! Preview metadata extraction from an HTML document head.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::domain::entities::UrlMetadata;

static BODY_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<body[\s>/]").expect("body regex should compile"));

static TITLE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<title[^>]*>(.*?)</title\s*>").expect("title regex should compile")
});

static META_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<meta\b([^>]*)>").expect("meta regex should compile"));

static ATTR_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)([A-Za-z_:][-A-Za-z0-9_:.]*)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+))"#)
        .expect("attribute regex should compile")
});

static ENTITY_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6}|[a-zA-Z]{2,6});")
        .expect("entity regex should compile")
});

/// Preview fields found in a page's `<head>`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HtmlMeta {
    pub title: String,
    pub description: String,
    pub image: String,
    pub theme_color: String,
}

impl From<HtmlMeta> for UrlMetadata {
    fn from(meta: HtmlMeta) -> Self {
        UrlMetadata::new(meta.title, meta.description, meta.image, meta.theme_color)
    }
}

/// Extracts preview metadata from an HTML document.
///
/// Only the part before `<body` is scanned. Open Graph values take
/// precedence over `<title>` and plain `description`, whatever their order
/// in the document.
///
/// # Recognised tags
///
/// - `<title>`
/// - `<meta property|name="description" content=...>`
/// - `og:title`, `og:description`, `og:image`
/// - `theme-color`
pub fn extract_html_meta(html: &str) -> HtmlMeta {
    let head = match BODY_REGEX.find(html) {
        Some(m) => &html[..m.start()],
        None => html,
    };

    let mut plain_title = TITLE_REGEX
        .captures(head)
        .map(|c| clean(&c[1]))
        .unwrap_or_default();
    let mut plain_description = String::new();
    let mut og = HtmlMeta::default();

    for tag in META_REGEX.captures_iter(head) {
        let mut key = None;
        let mut content = None;

        for attr in ATTR_REGEX.captures_iter(&tag[1]) {
            let value = attr
                .get(2)
                .or_else(|| attr.get(3))
                .or_else(|| attr.get(4))
                .map_or("", |m| m.as_str());

            match attr[1].to_ascii_lowercase().as_str() {
                "property" | "name" if key.is_none() => key = Some(value.to_ascii_lowercase()),
                "content" => content = Some(clean(value)),
                _ => {}
            }
        }

        let (Some(key), Some(content)) = (key, content) else {
            continue;
        };

        match key.as_str() {
            "description" => plain_description = content,
            "og:title" => og.title = content,
            "og:description" => og.description = content,
            "og:image" => og.image = content,
            "theme-color" => og.theme_color = content,
            _ => {}
        }
    }

    if og.title.is_empty() {
        og.title = std::mem::take(&mut plain_title);
    }
    if og.description.is_empty() {
        og.description = std::mem::take(&mut plain_description);
    }

    og
}

fn clean(raw: &str) -> String {
    let decoded = decode_entities(raw);
    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn decode_entities(input: &str) -> String {
    ENTITY_REGEX
        .replace_all(input, |caps: &Captures| {
            let entity = &caps[1];
            let decoded = match entity {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "nbsp" => Some('\u{a0}'),
                _ => entity.strip_prefix('#').and_then(|num| {
                    let code = match num.strip_prefix(['x', 'X']) {
                        Some(hex) => u32::from_str_radix(hex, 16).ok(),
                        None => num.parse().ok(),
                    };
                    code.and_then(char::from_u32)
                }),
            };

            decoded.map_or_else(|| caps[0].to_string(), String::from)
        })
        .into_owned()
}
