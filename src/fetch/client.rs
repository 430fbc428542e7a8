//! HTTP client abstraction for the tile endpoint.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::FetchError;

/// Default per-tile request timeout.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Trait for issuing tile GET requests.
///
/// Implementations return the raw response body on a success status and
/// classify every failure into a [`FetchError`]. Tests substitute a mock to
/// script responses and count network calls.
#[async_trait]
pub trait TileClient: Send + Sync {
    /// Perform a GET request and return the body.
    ///
    /// # Errors
    ///
    /// - [`FetchError::RemoteRejected`] for a non-success status
    /// - [`FetchError::Timeout`] when the request timed out
    /// - [`FetchError::Transport`] for any other network failure
    async fn get(&self, url: &str) -> Result<Bytes, FetchError>;
}

/// Tile client backed by reqwest.
#[derive(Debug, Clone)]
pub struct ReqwestTileClient {
    client: reqwest::Client,
}

impl ReqwestTileClient {
    /// Create a client with the default 30 second timeout.
    pub fn new() -> Result<Self, FetchError> {
        Self::with_timeout(DEFAULT_FETCH_TIMEOUT)
    }

    /// Create a client with a custom per-request timeout.
    pub fn with_timeout(timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("wmts-overlay/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FetchError::Transport(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

fn classify(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout
    } else {
        FetchError::Transport(err.to_string())
    }
}

#[async_trait]
impl TileClient for ReqwestTileClient {
    async fn get(&self, url: &str) -> Result<Bytes, FetchError> {
        let response = self.client.get(url).send().await.map_err(classify)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::RemoteRejected(status.as_u16()));
        }

        response.bytes().await.map_err(classify)
    }
}
