//! Error taxonomy of the shortening engine.
//!
//! Validation and conflict variants are expected outcomes that the HTTP layer
//! turns into 4xx responses. [`ShortenError::GeneratorExhausted`] and
//! [`ShortenError::Persistence`] are operational failures surfaced as 5xx.

use thiserror::Error;

/// Errors raised by a [`crate::domain::repositories::UrlStore`] backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("short code not found: {0}")]
    NotFound(String),

    #[error("short code already exists: {0}")]
    AlreadyExists(String),

    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Errors returned by the shortening and lookup services.
#[derive(Debug, Error)]
pub enum ShortenError {
    #[error("invalid url format")]
    InvalidFormat(String),

    #[error("illegal url, you cannot redirect to {0}")]
    SelfReferential(String),

    #[error("invalid image url")]
    InvalidImageUrl(String),

    #[error("custom url is too long (max {max} characters, got {len})")]
    AliasTooLong { len: usize, max: usize },

    #[error("illegal custom url, only [a-zA-Z0-9_-] is supported")]
    AliasIllegalChars(String),

    #[error("illegal custom url, you cannot use {0} as custom url")]
    AliasReserved(String),

    #[error("custom url {0} is already in use")]
    AliasConflict(String),

    #[error("not found")]
    NotFound(String),

    #[error("failed to generate a unique short code after {attempts} attempts")]
    GeneratorExhausted { attempts: usize },

    #[error("persistence error: {0}")]
    Persistence(StoreError),
}

impl ShortenError {
    /// Returns true for errors caused by the caller's input.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidFormat(_)
                | Self::SelfReferential(_)
                | Self::InvalidImageUrl(_)
                | Self::AliasTooLong { .. }
                | Self::AliasIllegalChars(_)
                | Self::AliasReserved(_)
        )
    }

    /// Machine-readable identifier used in API error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidFormat(_) => "invalid_format",
            Self::SelfReferential(_) => "self_referential",
            Self::InvalidImageUrl(_) => "invalid_image_url",
            Self::AliasTooLong { .. } => "alias_too_long",
            Self::AliasIllegalChars(_) => "alias_illegal_chars",
            Self::AliasReserved(_) => "alias_reserved",
            Self::AliasConflict(_) => "alias_conflict",
            Self::NotFound(_) => "not_found",
            Self::GeneratorExhausted { .. } => "generator_exhausted",
            Self::Persistence(_) => "persistence_error",
        }
    }
}

impl From<StoreError> for ShortenError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(code) => Self::NotFound(code),
            StoreError::AlreadyExists(code) => Self::AliasConflict(code),
            other => Self::Persistence(other),
        }
    }
}
