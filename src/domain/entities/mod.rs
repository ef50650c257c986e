//! Core domain entities representing the business data model.
//!
//! # Entity Types
//!
//! - [`UrlRecord`] - A short code mapped to its target URL and hit counter
//! - [`UrlMetadata`] - Optional link preview data (title, description, image, theme color)

pub mod metadata;
pub mod url_record;

pub use metadata::UrlMetadata;
pub use url_record::UrlRecord;
