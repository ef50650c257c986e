//! Rate limiting middleware using token bucket algorithm.

use std::sync::Arc;

use axum::Router;
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use tower_governor::{
    GovernorLayer,
    governor::GovernorConfigBuilder,
    key_extractor::{KeyExtractor, PeerIpKeyExtractor, SmartIpKeyExtractor},
};

use crate::config::Config;

/// Limiter settings for the `/api` routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitSettings {
    pub enabled: bool,
    /// One request is replenished every `period_secs` seconds.
    pub period_secs: u64,
    pub burst: u32,
    /// Key on `X-Forwarded-For` / `X-Real-IP` instead of the peer address.
    pub behind_proxy: bool,
}

impl RateLimitSettings {
    /// No limiting. Used by tests, which have no peer address to key on.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            period_secs: 12,
            burst: 50,
            behind_proxy: false,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            enabled: config.rate_limit_enabled,
            period_secs: config.rate_limit_period_secs,
            burst: config.rate_limit_burst,
            behind_proxy: config.behind_proxy,
        }
    }
}

/// Creates a per-client rate limiter keyed by `key_extractor`.
///
/// # Limits
///
/// - **Rate**: one request replenished every `period_secs` seconds
/// - **Burst**: `burst` requests
///
/// Requests exceeding the limit receive `429 Too Many Requests`.
///
/// Returns `None` if the period or burst is zero.
pub fn layer<K>(
    key_extractor: K,
    period_secs: u64,
    burst: u32,
) -> Option<GovernorLayer<K, NoOpMiddleware<QuantaInstant>, axum::body::Body>>
where
    K: KeyExtractor,
{
    let governor_conf = GovernorConfigBuilder::default()
        .key_extractor(key_extractor)
        .per_second(period_secs)
        .burst_size(burst)
        .finish()?;

    Some(GovernorLayer::new(Arc::new(governor_conf)))
}

/// Wraps `router` in the limiter described by `settings`.
///
/// # Key Extraction
///
/// - direct deployments: the socket peer address (needs
///   `into_make_service_with_connect_info`)
/// - `behind_proxy`: forwarding headers, falling back to the peer address
pub fn apply<S>(router: Router<S>, settings: &RateLimitSettings) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    if !settings.enabled {
        return router;
    }

    let limited = if settings.behind_proxy {
        layer(SmartIpKeyExtractor, settings.period_secs, settings.burst)
            .map(|l| router.clone().layer(l))
    } else {
        layer(PeerIpKeyExtractor, settings.period_secs, settings.burst)
            .map(|l| router.clone().layer(l))
    };

    match limited {
        Some(router) => router,
        None => {
            tracing::warn!(?settings, "Invalid rate limit settings, limiter disabled");
            router
        }
    }
}
