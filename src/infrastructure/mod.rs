//! Infrastructure layer for external integrations.
//!
//! This layer implements interfaces defined by the domain layer, providing
//! concrete storage backends and the HTTP metadata fetcher.
//!
//! # Modules
//!
//! - [`metadata`] - Link preview metadata fetching (HTTP and no-op implementations)
//! - [`persistence`] - Memory, JSON snapshot and SQLite stores

pub mod metadata;
pub mod persistence;
