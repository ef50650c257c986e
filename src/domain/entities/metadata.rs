//! Link preview metadata attached to a short link.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Separator placed between fields before hashing, so `("ab", "c")` and
/// `("a", "bc")` never produce the same signature.
const FIELD_SEPARATOR: u8 = 0x1f;

/// Preview data shown instead of a plain redirect.
///
/// Every field is optional in practice: an empty string means "not set".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlMetadata {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub color: String,
}

impl UrlMetadata {
    /// Creates metadata from the four preview fields.
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        image: impl Into<String>,
        color: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            image: image.into(),
            color: color.into(),
        }
    }

    /// Returns true if no field carries a value.
    pub fn is_blank(&self) -> bool {
        self.fields().iter().all(|f| f.trim().is_empty())
    }

    /// Returns true if at least one field is still empty and could be
    /// filled from the target page.
    pub fn has_blank_fields(&self) -> bool {
        self.fields().iter().any(|f| f.trim().is_empty())
    }

    /// Fills every blank field from `other`, leaving caller-supplied values alone.
    pub fn fill_blanks(&mut self, other: &UrlMetadata) {
        fill(&mut self.title, &other.title);
        fill(&mut self.description, &other.description);
        fill(&mut self.image, &other.image);
        fill(&mut self.color, &other.color);
    }

    /// Drops metadata that carries no values at all.
    ///
    /// `Some` with four blank fields and `None` describe the same request.
    pub fn normalize(meta: Option<UrlMetadata>) -> Option<UrlMetadata> {
        meta.filter(|m| !m.is_blank())
    }

    /// Content hash used to decide whether two shortening requests are duplicates.
    ///
    /// Absent metadata hashes like four empty fields, so it still has a
    /// signature of its own.
    pub fn signature(meta: Option<&UrlMetadata>) -> String {
        let empty = UrlMetadata::default();
        let meta = meta.unwrap_or(&empty);

        let mut hasher = Sha256::new();
        for (i, field) in meta.fields().iter().enumerate() {
            if i > 0 {
                hasher.update([FIELD_SEPARATOR]);
            }
            hasher.update(field.as_bytes());
        }

        hex::encode(hasher.finalize())
    }

    fn fields(&self) -> [&str; 4] {
        [&self.title, &self.description, &self.image, &self.color]
    }
}

fn fill(slot: &mut String, value: &str) {
    if slot.trim().is_empty() && !value.trim().is_empty() {
        *slot = value.trim().to_string();
    }
}
