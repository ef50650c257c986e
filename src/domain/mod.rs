//! Domain layer containing business entities and contracts.
//!
//! This module holds the data model of the shortening engine and the
//! interfaces the rest of the crate is written against. It has no
//! dependencies on HTTP, SQL or the filesystem.
//!
//! # Architecture
//!
//! - [`entities`] - Core business data structures
//! - [`repositories`] - Storage trait definitions
//! - [`error`] - Error taxonomy of the shortening engine
//!
//! # Design Principles
//!
//! - Repository traits define contracts implemented by the infrastructure layer
//! - Business logic is encapsulated in services (see [`crate::application::services`])
//! - Every store backend (memory, JSON snapshot, SQLite) is swappable behind
//!   [`repositories::UrlStore`]

pub mod entities;
pub mod error;
pub mod repositories;

pub use error::ShortenError;
