//! Test server lifecycle management
//!
//! This module manages spawning and shutting down test HTTP servers.
//! Each test gets an isolated server with its own media root.

use super::constants::*;
use super::fixtures::create_test_media_root;
use podcast_feed_server::server::{make_app, RequestsLoggingLevel, ServerConfig};
use podcast_feed_server::{FeedConfig, FeedSynthesizer};
use reqwest::Response;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::TcpListener;

/// Test server instance with an isolated media root
///
/// When dropped, the server gracefully shuts down and the media root is removed.
pub struct TestServer {
    /// Base URL for making requests (e.g., "http://127.0.0.1:12345")
    pub base_url: String,

    /// The port the server is listening on
    pub port: u16,

    /// The underlying reqwest client (public for custom requests in tests)
    pub client: reqwest::Client,

    // Private fields - keep resources alive until drop
    _media_root: TempDir,
    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestServer {
    /// Spawns a new test server on a random port
    ///
    /// The feed base URL is the server's own address, so media URLs found in
    /// feeds can be fetched as they are.
    ///
    /// # Panics
    ///
    /// Panics if the media root cannot be created, the port cannot be bound
    /// or the server does not become ready within timeout.
    pub async fn spawn() -> Self {
        let media_root = create_test_media_root().expect("Failed to create test media root");

        // Bind to random port
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");

        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();

        let base_url = format!("http://127.0.0.1:{}", port);

        // Create shutdown channel
        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        let config = ServerConfig {
            requests_logging_level: RequestsLoggingLevel::None,
            host: "127.0.0.1".to_string(),
            port,
            content_cache_age_sec: 0, // Disable caching in tests
        };
        let synthesizer =
            FeedSynthesizer::new(FeedConfig::new(base_url.clone(), media_root.path()));
        let app = make_app(config, synthesizer);

        // Spawn server in background task with graceful shutdown
        tokio::spawn(async move {
            axum::serve(
                listener,
                app.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .with_graceful_shutdown(async {
                shutdown_rx.await.ok();
            })
            .await
            .expect("Server failed");
        });

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        let server = Self {
            base_url,
            port,
            client,
            _media_root: media_root,
            _shutdown_tx: Some(shutdown_tx),
        };

        server.wait_for_ready().await;

        server
    }

    pub fn media_root(&self) -> &Path {
        self._media_root.path()
    }

    /// GET `path`, which must start with `/`.
    pub async fn get(&self, path: &str) -> Response {
        self.client
            .get(format!("{}{}", self.base_url, path))
            .send()
            .await
            .expect("Request failed")
    }

    /// GET an absolute URL, as found in a feed.
    pub async fn get_url(&self, url: &str) -> Response {
        self.client.get(url).send().await.expect("Request failed")
    }

    pub async fn get_range(&self, path: &str, range: &str) -> Response {
        self.client
            .get(format!("{}{}", self.base_url, path))
            .header("Range", range)
            .send()
            .await
            .expect("Request failed")
    }

    /// Fetches the feed of `collection`, asserting success.
    pub async fn feed(&self, collection: &str) -> String {
        let encoded = collection.replace(' ', "+");
        let response = self.get(&format!("/feeds/{}/rss", encoded)).await;
        assert_eq!(response.status(), reqwest::StatusCode::OK);
        response.text().await.expect("Failed to read feed")
    }

    /// Waits for the server to become ready by polling the /health endpoint
    async fn wait_for_ready(&self) {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(100))
            .build()
            .expect("Failed to build reqwest client");

        let start = std::time::Instant::now();
        let timeout = Duration::from_millis(SERVER_READY_TIMEOUT_MS);

        loop {
            if start.elapsed() > timeout {
                panic!(
                    "Server did not become ready within {}ms",
                    SERVER_READY_TIMEOUT_MS
                );
            }

            match client.get(format!("{}/health", self.base_url)).send().await {
                Ok(response) if response.status().is_success() => {
                    // Server is ready
                    return;
                }
                _ => {
                    // Server not ready yet, wait and retry
                    tokio::time::sleep(Duration::from_millis(SERVER_READY_POLL_INTERVAL_MS)).await;
                }
            }
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        // Send shutdown signal
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
        // TempDir will be cleaned up automatically
    }
}
