//! HTTP server initialization and runtime setup.
//!
//! Handles storage setup, service wiring, and the Axum server lifecycle.

use crate::api::middleware::RateLimitSettings;
use crate::application::services::ShortenService;
use crate::config::Config;
use crate::infrastructure::metadata::{HttpMetadataFetcher, MetadataFetcher, NullMetadataFetcher};
use crate::infrastructure::persistence;
use crate::routes::app_router;
use crate::state::AppState;
use crate::utils::Validator;
use crate::web::StaticFiles;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - URL store for the configured backend (migrations for SQLite)
/// - Metadata fetcher (or the no-op fetcher when disabled)
/// - Shortening and lookup services
/// - Axum HTTP server with graceful shutdown
///
/// The store is closed after the server has drained.
///
/// # Errors
///
/// Returns an error if:
/// - The store cannot be opened
/// - The HTTP client cannot be built
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let opened = persistence::open(&config.storage_options())
        .await
        .context("Failed to open storage")?;

    let fetcher: Arc<dyn MetadataFetcher> = if config.metadata_fetch {
        tracing::info!("Metadata enrichment enabled");
        Arc::new(
            HttpMetadataFetcher::new(config.metadata_timeout())
                .context("Failed to build HTTP client")?,
        )
    } else {
        tracing::info!("Metadata enrichment disabled");
        Arc::new(NullMetadataFetcher::new())
    };

    let shorten_service = ShortenService::new(
        opened.store.clone(),
        fetcher,
        config.code_generator()?,
        Validator::new(config.service_hostname.clone()),
    )
    .with_fetch_timeout(config.metadata_timeout());

    let static_files = StaticFiles::new(config.static_dir.clone());
    if !static_files.root().is_dir() {
        tracing::warn!(
            "Static dir {} not found, only the API and short links will be served",
            static_files.root().display()
        );
    }

    let state = AppState::new(
        opened.store.clone(),
        shorten_service,
        static_files,
        config.service_hostname.clone(),
    );

    let app = app_router(state, &RateLimitSettings::from_config(&config));

    let addr: SocketAddr = config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    let served = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await;

    opened.close().await;
    tracing::info!("Server stopped");

    served?;
    Ok(())
}

/// Resolves on Ctrl+C or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining connections");
}
