//! # linkpeek
//!
//! A small URL shortener with custom aliases, hit counters and link preview
//! pages, built with Axum and SQLite.
//!
//! ## Architecture
//!
//! This crate follows Clean Architecture principles with clear layer separation:
//!
//! - **Domain Layer** ([`domain`]) - Records, metadata, the store trait and the error taxonomy
//! - **Application Layer** ([`application`]) - Shortening and lookup services
//! - **Infrastructure Layer** ([`infrastructure`]) - Store backends and the metadata fetcher
//! - **API Layer** ([`api`]) - JSON handlers, DTOs, and middleware
//! - **Web Layer** ([`web`]) - Preview pages and the static front end
//!
//! ## Features
//!
//! - Random base62 codes or caller-chosen aliases
//! - Dedupe by target URL and preview metadata
//! - Open Graph preview pages, enriched from the target's `<head>`
//! - Memory, JSON snapshot or SQLite storage
//! - Rate limiting and observability
//!
//! ## Quick Start
//!
//! ```bash
//! export SERVICE_HOSTNAME="s.example.com"
//! export STORAGE_BACKEND="sqlite"
//! export DB_PATH="data/urls.db"
//!
//! cargo run
//! ```
//!
//! ## Configuration
//!
//! Service configuration is loaded from environment variables via [`config::Config`].
//! See [`config`] module for available options.

pub mod api;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod state;
pub mod utils;

pub mod config;
pub mod server;

pub mod routes;
pub mod web;

pub use error::AppError;
pub use state::AppState;

/// Commonly used types for external consumers.
///
/// Re-exports frequently used types to simplify imports for library users
/// and integration tests.
pub mod prelude {
    pub use crate::application::services::{
        LookupService, ShortenRequest, ShortenService, Shortened,
    };
    pub use crate::domain::ShortenError;
    pub use crate::domain::entities::{UrlMetadata, UrlRecord};
    pub use crate::domain::repositories::UrlStore;
    pub use crate::error::AppError;
    pub use crate::state::AppState;
}
