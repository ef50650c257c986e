//! Short code generation.
//!
//! Codes are uniformly random strings over a configurable alphabet. Randomness
//! does not need to be cryptographic; uniqueness comes from checking the store
//! and retrying on collision, with a hard cap on attempts.

use rand::Rng;
use thiserror::Error;
use tracing::debug;

use crate::domain::ShortenError;
use crate::domain::repositories::UrlStore;
use crate::utils::url_validator::reserved_word;

/// Default alphabet: base62.
pub const DEFAULT_ALPHABET: &str =
    "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Default length of generated codes.
pub const DEFAULT_CODE_LENGTH: usize = 6;

/// Longest code the service accepts, generated or custom.
pub const MAX_CODE_LENGTH: usize = 32;

/// Collision retries before giving up with [`ShortenError::GeneratorExhausted`].
pub const MAX_GENERATION_ATTEMPTS: usize = 100;

/// Rejected generator settings.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GeneratorConfigError {
    #[error("code alphabet must not be empty")]
    EmptyAlphabet,

    #[error("code alphabet contains illegal character {0:?}, only [a-zA-Z0-9_-] is supported")]
    IllegalChar(char),

    #[error("code alphabet contains duplicate character {0:?}")]
    DuplicateChar(char),

    #[error("code length must be between 1 and {MAX_CODE_LENGTH}, got {0}")]
    InvalidLength(usize),
}

/// Returns true for characters allowed in short codes.
pub fn is_code_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

/// Random fixed-length code generator.
#[derive(Debug, Clone)]
pub struct CodeGenerator {
    alphabet: Vec<char>,
    length: usize,
    max_attempts: usize,
}

impl CodeGenerator {
    /// Creates a generator over `alphabet` producing codes of `length` characters.
    ///
    /// # Errors
    ///
    /// Returns [`GeneratorConfigError`] if the alphabet is empty, contains a
    /// character outside `[A-Za-z0-9_-]` or a duplicate, or if `length` is
    /// outside `1..=32`.
    pub fn new(alphabet: &str, length: usize) -> Result<Self, GeneratorConfigError> {
        if alphabet.is_empty() {
            return Err(GeneratorConfigError::EmptyAlphabet);
        }

        let mut chars: Vec<char> = Vec::with_capacity(alphabet.len());
        for c in alphabet.chars() {
            if !is_code_char(c) {
                return Err(GeneratorConfigError::IllegalChar(c));
            }
            if chars.contains(&c) {
                return Err(GeneratorConfigError::DuplicateChar(c));
            }
            chars.push(c);
        }

        if length == 0 || length > MAX_CODE_LENGTH {
            return Err(GeneratorConfigError::InvalidLength(length));
        }

        Ok(Self {
            alphabet: chars,
            length,
            max_attempts: MAX_GENERATION_ATTEMPTS,
        })
    }

    /// Overrides the collision retry cap.
    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn alphabet(&self) -> &[char] {
        &self.alphabet
    }

    /// Draws one random code without consulting any store.
    pub fn generate(&self) -> String {
        let mut rng = rand::rng();
        (0..self.length)
            .map(|_| self.alphabet[rng.random_range(0..self.alphabet.len())])
            .collect()
    }

    /// Draws codes until one is free in `store`.
    ///
    /// Draws that spell a reserved route name count as an attempt and are
    /// never looked up.
    ///
    /// # Errors
    ///
    /// Returns [`ShortenError::GeneratorExhausted`] once the retry cap is hit,
    /// or [`ShortenError::Persistence`] if the store lookup fails.
    pub async fn generate_unique<S>(&self, store: &S) -> Result<String, ShortenError>
    where
        S: UrlStore + ?Sized,
    {
        for attempt in 1..=self.max_attempts {
            let code = self.generate();

            if let Some(reserved) = reserved_word(&code) {
                debug!(attempt, code = %code, reserved, "drew a reserved word, retrying");
                continue;
            }

            if !store.exists(&code).await? {
                return Ok(code);
            }

            debug!(attempt, code = %code, "short code collision, retrying");
        }

        Err(ShortenError::GeneratorExhausted {
            attempts: self.max_attempts,
        })
    }
}

impl Default for CodeGenerator {
    fn default() -> Self {
        Self {
            alphabet: DEFAULT_ALPHABET.chars().collect(),
            length: DEFAULT_CODE_LENGTH,
            max_attempts: MAX_GENERATION_ATTEMPTS,
        }
    }
}
