//! HTML rendering handlers for the public pages.

mod not_found;
mod preview;
mod static_files;

pub use not_found::NotFoundTemplate;
pub use preview::PreviewTemplate;
pub use static_files::static_handler;
