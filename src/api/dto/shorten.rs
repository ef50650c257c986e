//! DTOs for link shortening endpoint.

use serde::Deserialize;
use validator::Validate;

use crate::application::services::ShortenRequest;
use crate::domain::entities::UrlMetadata;

/// Request to shorten a URL.
///
/// Metadata fields are flat; supplying any of them turns the short link into
/// a preview page.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ShortenBody {
    /// The target URL (checked by the shortening service).
    #[validate(length(min = 1, max = 8192, message = "url must not be empty"))]
    pub url: String,

    /// Optional custom short code.
    #[serde(default)]
    pub custom_url: Option<String>,

    #[serde(default)]
    #[validate(length(max = 256))]
    pub title: Option<String>,

    #[serde(default)]
    #[validate(length(max = 1024))]
    pub description: Option<String>,

    #[serde(default)]
    #[validate(length(max = 2048))]
    pub image: Option<String>,

    #[serde(default)]
    #[validate(length(max = 32))]
    pub color: Option<String>,
}

impl ShortenBody {
    fn metadata(&self) -> Option<UrlMetadata> {
        if self.title.is_none()
            && self.description.is_none()
            && self.image.is_none()
            && self.color.is_none()
        {
            return None;
        }

        Some(UrlMetadata::new(
            self.title.as_deref().unwrap_or_default().trim(),
            self.description.as_deref().unwrap_or_default().trim(),
            self.image.as_deref().unwrap_or_default().trim(),
            self.color.as_deref().unwrap_or_default().trim(),
        ))
    }
}

impl From<ShortenBody> for ShortenRequest {
    fn from(body: ShortenBody) -> Self {
        Self {
            metadata: body.metadata(),
            target_url: body.url,
            custom_alias: body.custom_url,
        }
    }
}
