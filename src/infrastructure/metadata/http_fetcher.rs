//! HTTP-backed metadata fetcher.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, redirect};
use tracing::debug;
use url::Url;

use super::service::{FetchError, MetadataFetcher};
use super::{HtmlMeta, extract_html_meta};

/// Sent on every fetch; some sites serve bots a page without Open Graph tags.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/115.0.0.0 Safari/537.36";

/// Only the document head is needed; reading stops here or at `<body`.
const MAX_BODY_BYTES: usize = 512 * 1024;

const BODY_TAG: &[u8] = b"<body";

const MAX_REDIRECTS: usize = 5;

/// Fetches target pages over HTTP and parses their `<head>`.
///
/// Relative `og:image` values are resolved against the final page URL so
/// the stored image link works from the preview page.
pub struct HttpMetadataFetcher {
    client: Client,
}

impl HttpMetadataFetcher {
    /// Builds a client with a browser User-Agent and an overall request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Request`] if the TLS backend cannot be initialised.
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(BROWSER_USER_AGENT)
            .timeout(timeout)
            .redirect(redirect::Policy::limited(MAX_REDIRECTS))
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl MetadataFetcher for HttpMetadataFetcher {
    async fn fetch(&self, url: &str) -> Result<HtmlMeta, FetchError> {
        let url = Url::parse(url).map_err(|e| FetchError::InvalidUrl(e.to_string()))?;

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let final_url = response.url().clone();
        let bytes = read_head(response).await?;
        let html = String::from_utf8_lossy(&bytes);

        let mut meta = extract_html_meta(&html);
        if !meta.image.is_empty()
            && let Ok(absolute) = final_url.join(&meta.image)
        {
            meta.image = absolute.to_string();
        }

        debug!(url = %final_url, title = %meta.title, "Fetched page metadata");
        Ok(meta)
    }
}

/// Reads the response until `<body` shows up or [`MAX_BODY_BYTES`] is reached.
async fn read_head(mut response: Response) -> Result<Vec<u8>, FetchError> {
    let mut buf = Vec::new();

    while let Some(chunk) = response.chunk().await? {
        let search_from = buf.len().saturating_sub(BODY_TAG.len() - 1);
        buf.extend_from_slice(&chunk);

        if buf.len() >= MAX_BODY_BYTES {
            buf.truncate(MAX_BODY_BYTES);
            break;
        }
        if contains_body_tag(&buf[search_from..]) {
            break;
        }
    }

    Ok(buf)
}

fn contains_body_tag(bytes: &[u8]) -> bool {
    bytes
        .windows(BODY_TAG.len())
        .any(|window| window.eq_ignore_ascii_case(BODY_TAG))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serves a complete `<head>` and then keeps the body streaming until the
    /// client hangs up.
    async fn endless_page() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = [0u8; 1024];
            let _ = socket.read(&mut request).await;

            let head = "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nConnection: close\r\n\r\n\
                        <html><head><title>Hello</title>\
                        <meta property=\"og:image\" content=\"/cover.png\"></head><BODY>";
            if socket.write_all(head.as_bytes()).await.is_err() {
                return;
            }

            let filler = vec![b'x'; 64 * 1024];
            loop {
                if socket.write_all(&filler).await.is_err() {
                    break;
                }
                tokio::time::sleep(Duration::from_millis(50)).await;
            }
        });

        format!("http://{addr}/page")
    }

    #[test]
    fn test_contains_body_tag_ignores_case() {
        assert!(contains_body_tag(b"</head><Body class=\"x\">"));
        assert!(!contains_body_tag(b"<head><title>body</title>"));
    }

    #[tokio::test]
    async fn test_fetch_stops_reading_at_body() {
        let url = endless_page().await;
        let fetcher = HttpMetadataFetcher::new(Duration::from_secs(3)).unwrap();

        let meta = tokio::time::timeout(Duration::from_secs(2), fetcher.fetch(&url))
            .await
            .expect("fetch should finish before the body ends")
            .unwrap();

        assert_eq!(meta.title, "Hello");
        assert_eq!(meta.image, url.replace("/page", "/cover.png"));
    }

    #[tokio::test]
    async fn test_fetch_reports_error_status() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = [0u8; 1024];
            let _ = socket.read(&mut request).await;
            let _ = socket
                .write_all(b"HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n")
                .await;
        });

        let fetcher = HttpMetadataFetcher::new(Duration::from_secs(3)).unwrap();
        let err = fetcher.fetch(&format!("http://{addr}/")).await.unwrap_err();

        assert!(matches!(err, FetchError::Status(404)));
    }
}
