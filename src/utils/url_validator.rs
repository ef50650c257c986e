//! Target URL and custom alias validation.
//!
//! All shortening requests pass through a single [`Validator`], configured
//! with the service's own hostname so links back to the service (which would
//! redirect forever) are rejected.

use url::{Host, Url};

use crate::domain::ShortenError;
use crate::domain::entities::UrlRecord;
use crate::utils::code_generator::{MAX_CODE_LENGTH, is_code_char};

/// Aliases that would shadow application routes.
pub const RESERVED_ALIASES: &[&str] = &["api", "dashboard", "health", "static"];

/// Returns the reserved word `code` matches, ignoring ASCII case.
pub fn reserved_word(code: &str) -> Option<&'static str> {
    RESERVED_ALIASES
        .iter()
        .find(|r| r.eq_ignore_ascii_case(code))
        .copied()
}

/// Validates long URLs and custom aliases.
#[derive(Debug, Clone, Default)]
pub struct Validator {
    hostname: String,
}

impl Validator {
    /// Creates a validator for a service reachable at `hostname`
    /// (`host` or `host:port`). An empty hostname disables the
    /// self-reference check.
    pub fn new(hostname: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into().trim().to_ascii_lowercase(),
        }
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    /// Checks that `input` is an absolute http(s) URL pointing somewhere
    /// other than this service.
    ///
    /// # Errors
    ///
    /// - [`ShortenError::InvalidFormat`] for anything that is not
    ///   `scheme://host[/path]` with scheme `http` or `https`
    /// - [`ShortenError::SelfReferential`] when the host matches the
    ///   configured hostname
    pub fn validate_long_url(&self, input: &str) -> Result<(), ShortenError> {
        let url = parse_web_url(input).map_err(ShortenError::InvalidFormat)?;

        if self.is_self_referential(&url) {
            return Err(ShortenError::SelfReferential(self.hostname.clone()));
        }

        Ok(())
    }

    /// Checks a preview image URL. Images hosted by the service itself are fine.
    pub fn validate_image_url(&self, input: &str) -> Result<(), ShortenError> {
        parse_web_url(input)
            .map(|_| ())
            .map_err(ShortenError::InvalidImageUrl)
    }

    /// Checks a caller-chosen alias.
    ///
    /// # Errors
    ///
    /// Checked in order:
    /// - [`ShortenError::AliasTooLong`] above 32 characters
    /// - [`ShortenError::AliasIllegalChars`] outside `[A-Za-z0-9_-]`
    /// - [`ShortenError::AliasReserved`] for route names such as `api`
    pub fn validate_alias(&self, alias: &str) -> Result<(), ShortenError> {
        let len = alias.chars().count();
        if len > MAX_CODE_LENGTH {
            return Err(ShortenError::AliasTooLong {
                len,
                max: MAX_CODE_LENGTH,
            });
        }

        if alias.is_empty() || !alias.chars().all(is_code_char) {
            return Err(ShortenError::AliasIllegalChars(alias.to_string()));
        }

        if let Some(reserved) = reserved_word(alias) {
            return Err(ShortenError::AliasReserved(reserved.to_string()));
        }

        Ok(())
    }

    /// Checks a record that did not come through [`Self::validate_alias`]
    /// and [`Self::validate_long_url`], such as one read from a snapshot.
    ///
    /// The code must satisfy the alias rules and the target the long URL rules.
    pub fn validate_record(&self, record: &UrlRecord) -> Result<(), ShortenError> {
        self.validate_alias(&record.code)?;
        self.validate_long_url(&record.target_url)
    }

    fn is_self_referential(&self, url: &Url) -> bool {
        if self.hostname.is_empty() {
            return false;
        }

        let Some(host) = url.host_str() else {
            return false;
        };
        let host = host.to_ascii_lowercase();

        let authority = match url.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.clone(),
        };

        authority == self.hostname || host == self.hostname
    }
}

/// Returns true if `code` could be a short code at all.
///
/// Used by the redirect route to hand paths like `favicon.ico` straight to
/// static file serving.
pub fn is_code_shaped(code: &str) -> bool {
    !code.is_empty() && code.chars().count() <= MAX_CODE_LENGTH && code.chars().all(is_code_char)
}

fn parse_web_url(input: &str) -> Result<Url, String> {
    if input.is_empty() || input.chars().any(char::is_whitespace) {
        return Err("url must be non-empty and contain no whitespace".to_string());
    }

    let lower = input.get(..8).unwrap_or(input).to_ascii_lowercase();
    if !lower.starts_with("http://") && !lower.starts_with("https://") {
        return Err("only http and https urls are supported".to_string());
    }

    let url = Url::parse(input).map_err(|e| e.to_string())?;

    match url.host() {
        Some(Host::Ipv4(_)) | Some(Host::Ipv6(_)) => Ok(url),
        Some(Host::Domain(domain)) => {
            let domain = domain.trim_end_matches('.');
            match domain.rsplit_once('.') {
                Some((name, tld)) if !name.is_empty() && tld.chars().count() >= 2 => Ok(url),
                _ => Err(format!("host {domain} is not a public domain name")),
            }
        }
        None => Err("url has no host".to_string()),
    }
}
