//! Short link creation service.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::domain::ShortenError;
use crate::domain::entities::{UrlMetadata, UrlRecord};
use crate::domain::error::StoreError;
use crate::domain::repositories::UrlStore;
use crate::infrastructure::metadata::{FetchError, MetadataFetcher};
use crate::utils::{CodeGenerator, Validator};

/// Default bound on the metadata fetch.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Generated codes that lose an insert race are redrawn this many times.
const INSERT_ATTEMPTS: usize = 3;

/// Input to [`ShortenService::shorten`].
#[derive(Debug, Clone, Default)]
pub struct ShortenRequest {
    pub target_url: String,
    /// Blank means "generate a code".
    pub custom_alias: Option<String>,
    pub metadata: Option<UrlMetadata>,
}

impl ShortenRequest {
    pub fn new(target_url: impl Into<String>) -> Self {
        Self {
            target_url: target_url.into(),
            ..Self::default()
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.custom_alias = Some(alias.into());
        self
    }

    pub fn with_metadata(mut self, metadata: UrlMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// Outcome of a shortening request.
#[derive(Debug, Clone)]
pub struct Shortened {
    pub record: UrlRecord,
    /// False when an existing record was returned instead.
    pub created: bool,
}

/// Service for creating short links.
///
/// Handles validation, dedupe by (target, metadata signature), custom alias
/// checks, code generation and best-effort metadata enrichment.
pub struct ShortenService<S: ?Sized = dyn UrlStore, F: ?Sized = dyn MetadataFetcher> {
    store: Arc<S>,
    fetcher: Arc<F>,
    generator: CodeGenerator,
    validator: Validator,
    fetch_timeout: Duration,
}

impl<S, F> ShortenService<S, F>
where
    S: UrlStore + ?Sized,
    F: MetadataFetcher + ?Sized,
{
    pub fn new(
        store: Arc<S>,
        fetcher: Arc<F>,
        generator: CodeGenerator,
        validator: Validator,
    ) -> Self {
        Self {
            store,
            fetcher,
            generator,
            validator,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    pub fn with_fetch_timeout(mut self, fetch_timeout: Duration) -> Self {
        self.fetch_timeout = fetch_timeout;
        self
    }

    pub fn validator(&self) -> &Validator {
        &self.validator
    }

    /// Shortens a URL.
    ///
    /// # Sequence
    ///
    /// 1. Validate the target URL (and the metadata image, if any)
    /// 2. Without an alias: return the record already holding the same
    ///    (target, metadata) pair, if there is one
    /// 3. With an alias: validate it; an alias already pointing at the same
    ///    target is returned as is, one pointing elsewhere is a conflict
    /// 4. Enrich blank metadata fields from the target page
    /// 5. Generate a code (no alias) and insert
    ///
    /// The metadata signature is taken from the caller's input before
    /// enrichment, so identical requests dedupe regardless of what the
    /// target page currently serves.
    ///
    /// # Errors
    ///
    /// - Validation variants of [`ShortenError`] for bad input
    /// - [`ShortenError::AliasConflict`] when the alias maps to another target
    /// - [`ShortenError::GeneratorExhausted`] / [`ShortenError::Persistence`]
    ///   on operational failures
    pub async fn shorten(&self, request: ShortenRequest) -> Result<Shortened, ShortenError> {
        let target_url = request.target_url;
        self.validator.validate_long_url(&target_url)?;

        let metadata = UrlMetadata::normalize(request.metadata);
        if let Some(image) = metadata
            .as_ref()
            .map(|m| m.image.trim())
            .filter(|image| !image.is_empty())
        {
            self.validator.validate_image_url(image)?;
        }
        let signature = UrlMetadata::signature(metadata.as_ref());

        let alias = request
            .custom_alias
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty());

        match alias {
            None => {
                if let Some(existing) = self.store.find_by_target(&target_url, &signature).await? {
                    debug!(code = %existing.code, url = %target_url, "Returning existing short link");
                    return Ok(Shortened {
                        record: existing,
                        created: false,
                    });
                }

                let metadata = self.enrich(&target_url, metadata).await;
                self.create_generated(target_url, metadata, signature).await
            }
            Some(alias) => {
                self.validator.validate_alias(&alias)?;

                if let Some(existing) = self.store.get(&alias).await? {
                    return claim_alias(existing, &target_url);
                }

                let metadata = self.enrich(&target_url, metadata).await;
                self.create_aliased(alias, target_url, metadata, signature)
                    .await
            }
        }
    }

    async fn create_generated(
        &self,
        target_url: String,
        metadata: Option<UrlMetadata>,
        signature: String,
    ) -> Result<Shortened, ShortenError> {
        for _ in 0..INSERT_ATTEMPTS {
            let code = self.generator.generate_unique(self.store.as_ref()).await?;
            let record = UrlRecord::new(
                code.clone(),
                target_url.clone(),
                metadata.clone(),
                signature.clone(),
            );

            match self.store.insert(record, true).await {
                Ok(stored) if stored.code == code => {
                    info!(code = %stored.code, url = %stored.target_url, "Short link created");
                    return Ok(Shortened {
                        record: stored,
                        created: true,
                    });
                }
                Ok(stored) => {
                    debug!(code = %stored.code, url = %stored.target_url, "Concurrent request created the same link");
                    return Ok(Shortened {
                        record: stored,
                        created: false,
                    });
                }
                Err(StoreError::AlreadyExists(code)) => {
                    debug!(code = %code, "Generated code taken before insert, redrawing");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(ShortenError::GeneratorExhausted {
            attempts: INSERT_ATTEMPTS,
        })
    }

    async fn create_aliased(
        &self,
        alias: String,
        target_url: String,
        metadata: Option<UrlMetadata>,
        signature: String,
    ) -> Result<Shortened, ShortenError> {
        let record = UrlRecord::new(alias.clone(), target_url.clone(), metadata, signature);

        match self.store.insert(record, false).await {
            Ok(stored) => {
                info!(code = %stored.code, url = %stored.target_url, "Short link created with custom alias");
                Ok(Shortened {
                    record: stored,
                    created: true,
                })
            }
            Err(StoreError::AlreadyExists(_)) => match self.store.get(&alias).await? {
                Some(existing) => claim_alias(existing, &target_url),
                None => Err(ShortenError::AliasConflict(alias)),
            },
            Err(e) => Err(e.into()),
        }
    }

    /// Fills blank fields of caller-supplied metadata from the target page.
    ///
    /// Requests without metadata stay without metadata, so they keep
    /// redirecting instead of rendering a preview.
    async fn enrich(
        &self,
        target_url: &str,
        metadata: Option<UrlMetadata>,
    ) -> Option<UrlMetadata> {
        let mut metadata = metadata?;
        if !metadata.has_blank_fields() {
            return Some(metadata);
        }

        match timeout(self.fetch_timeout, self.fetcher.fetch(target_url)).await {
            Ok(Ok(page)) => metadata.fill_blanks(&page.into()),
            Ok(Err(FetchError::Disabled)) => {}
            Ok(Err(e)) => warn!(url = %target_url, error = %e, "Metadata enrichment failed"),
            Err(_) => warn!(
                url = %target_url,
                timeout_secs = self.fetch_timeout.as_secs(),
                "Metadata enrichment timed out"
            ),
        }

        Some(metadata)
    }
}

fn claim_alias(existing: UrlRecord, target_url: &str) -> Result<Shortened, ShortenError> {
    if existing.target_url == target_url {
        debug!(code = %existing.code, "Custom alias already points at this url");
        Ok(Shortened {
            record: existing,
            created: false,
        })
    } else {
        Err(ShortenError::AliasConflict(existing.code))
    }
}
