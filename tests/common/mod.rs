#![allow(dead_code)]

use async_trait::async_trait;
use axum::extract::ConnectInfo;
use axum_test::TestServer;
use linkpeek::api::middleware::RateLimitSettings;
use linkpeek::application::services::ShortenService;
use linkpeek::domain::entities::{UrlMetadata, UrlRecord};
use linkpeek::domain::repositories::UrlStore;
use linkpeek::infrastructure::metadata::{
    FetchError, HtmlMeta, MetadataFetcher, NullMetadataFetcher,
};
use linkpeek::infrastructure::persistence::MemoryStore;
use linkpeek::routes::app_router;
use linkpeek::state::AppState;
use linkpeek::utils::{CodeGenerator, Validator};
use linkpeek::web::StaticFiles;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use tower::Layer;

pub mod store_contract;

pub const HOSTNAME: &str = "s.example.com";

/// Fetcher that always returns the same page metadata.
pub struct FixedFetcher(pub HtmlMeta);

#[async_trait]
impl MetadataFetcher for FixedFetcher {
    async fn fetch(&self, _url: &str) -> Result<HtmlMeta, FetchError> {
        Ok(self.0.clone())
    }
}

pub fn record(code: &str, target: &str) -> UrlRecord {
    UrlRecord::new(
        code.to_string(),
        target.to_string(),
        None,
        UrlMetadata::signature(None),
    )
}

pub fn record_with_meta(code: &str, target: &str, meta: UrlMetadata) -> UrlRecord {
    let signature = UrlMetadata::signature(Some(&meta));
    UrlRecord::new(code.to_string(), target.to_string(), Some(meta), signature)
}

pub fn create_shorten_service(
    store: Arc<dyn UrlStore>,
    fetcher: Arc<dyn MetadataFetcher>,
) -> ShortenService {
    ShortenService::new(
        store,
        fetcher,
        CodeGenerator::default(),
        Validator::new(HOSTNAME),
    )
}

/// State over `store` with enrichment disabled and static files from `static_dir`.
pub fn create_test_state_with(
    store: Arc<dyn UrlStore>,
    fetcher: Arc<dyn MetadataFetcher>,
    static_dir: &Path,
) -> AppState {
    let shorten_service = create_shorten_service(store.clone(), fetcher);
    AppState::new(
        store,
        shorten_service,
        StaticFiles::new(static_dir),
        HOSTNAME,
    )
}

/// In-memory state plus a handle on its store. Static files come from a
/// directory that does not exist, so every miss renders the built-in 404.
pub fn create_test_state() -> (AppState, Arc<MemoryStore>) {
    let memory = Arc::new(MemoryStore::new());
    let store: Arc<dyn UrlStore> = memory.clone();
    let state = create_test_state_with(
        store,
        Arc::new(NullMetadataFetcher::new()),
        Path::new("tests/fixtures/no-such-dir"),
    );
    (state, memory)
}

/// Full application router without rate limiting.
pub fn create_test_server(state: AppState) -> TestServer {
    let app = app_router(state, &RateLimitSettings::disabled());
    TestServer::new(app).unwrap()
}

/// Static root with an index page, a precompressed script, a custom 404 and a
/// Next.js style `posts/[id]` directory.
pub fn create_static_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path();

    std::fs::write(root.join("index.html"), "<h1>home</h1>").unwrap();
    std::fs::write(root.join("404.html"), "<h1>custom missing</h1>").unwrap();
    std::fs::write(root.join("app.js"), "console.log('plain');").unwrap();
    std::fs::write(root.join("app.js.gz"), gzip_placeholder()).unwrap();
    std::fs::create_dir_all(root.join("posts").join("[id]")).unwrap();
    std::fs::write(
        root.join("posts").join("[id]").join("index.html"),
        "<h1>post</h1>",
    )
    .unwrap();

    dir
}

/// A minimal valid gzip stream of an empty payload.
fn gzip_placeholder() -> Vec<u8> {
    vec![
        0x1f, 0x8b, 0x08, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x03, 0x03, 0x00, 0x00, 0x00, 0x00,
        0x00, 0x00, 0x00, 0x00, 0x00,
    ]
}

#[derive(Clone)]
pub struct MockConnectInfoLayer;

impl<S> Layer<S> for MockConnectInfoLayer {
    type Service = MockConnectInfoService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MockConnectInfoService { inner }
    }
}

#[derive(Clone)]
pub struct MockConnectInfoService<S> {
    inner: S,
}

impl<S, B> tower::Service<axum::http::Request<B>> for MockConnectInfoService<S>
where
    S: tower::Service<axum::http::Request<B>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    B: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: axum::http::Request<B>) -> Self::Future {
        let addr: SocketAddr = "127.0.0.1:12345".parse().unwrap();
        req.extensions_mut().insert(ConnectInfo(addr));
        self.inner.call(req)
    }
}
