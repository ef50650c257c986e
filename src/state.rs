//! Shared application state injected into every handler.

use std::sync::Arc;

use crate::application::services::{LookupService, ShortenService};
use crate::domain::repositories::UrlStore;
use crate::web::StaticFiles;

#[derive(Clone)]
pub struct AppState {
    pub shorten_service: Arc<ShortenService>,
    pub lookup_service: Arc<LookupService>,
    pub store: Arc<dyn UrlStore>,
    pub static_files: StaticFiles,
    /// Public `host[:port]` used to build short URLs.
    pub hostname: String,
}

impl AppState {
    pub fn new(
        store: Arc<dyn UrlStore>,
        shorten_service: ShortenService,
        static_files: StaticFiles,
        hostname: impl Into<String>,
    ) -> Self {
        Self {
            lookup_service: Arc::new(LookupService::new(store.clone())),
            shorten_service: Arc::new(shorten_service),
            store,
            static_files,
            hostname: hostname.into(),
        }
    }

    /// Full short URL for `code`. Always HTTPS.
    pub fn short_url(&self, code: &str) -> String {
        format!("https://{}/{}", self.hostname.trim_end_matches('/'), code)
    }
}
