//! Public web layer.
//!
//! Renders link preview pages and serves the static front end. Uses Askama
//! templates for server-side rendering.
//!
//! # Modules
//!
//! - [`handlers`] - Preview and 404 templates, static fallback handler
//! - [`static_files`] - `ServeDir` wrapper with gzip and the 404 page
//! - [`dynamic_routes`] - Next.js `[param]` directory matching

pub mod dynamic_routes;
pub mod handlers;
pub mod static_files;

pub use static_files::StaticFiles;
