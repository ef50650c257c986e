//! Application layer services implementing the shortening engine.
//!
//! Services orchestrate validation, code generation and store calls. They
//! consume the [`crate::domain::repositories::UrlStore`] trait and provide a
//! clean API for HTTP handlers and the admin CLI.
//!
//! # Available Services
//!
//! - [`services::shorten_service::ShortenService`] - Validation, dedupe, creation
//! - [`services::lookup_service::LookupService`] - Resolution and hit counting

pub mod services;
