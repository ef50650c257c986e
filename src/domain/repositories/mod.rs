//! Repository trait definitions for the domain layer.
//!
//! The shortening engine never touches a concrete backend: services hold an
//! `Arc` of something implementing [`UrlStore`], so the memory, snapshot and
//! SQLite backends in `crate::infrastructure::persistence` are interchangeable.
//!
//! Mock implementations are auto-generated via `mockall` for unit tests.

pub mod url_store;

pub use url_store::UrlStore;

#[cfg(test)]
pub use url_store::MockUrlStore;
