//! Utility components used by the shortening services.
//!
//! - [`code_generator`] - Random short code generation with collision retry
//! - [`url_validator`] - Target URL, image URL and custom alias validation

pub mod code_generator;
pub mod url_validator;

pub use code_generator::CodeGenerator;
pub use url_validator::Validator;
