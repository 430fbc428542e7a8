use std::num::NonZeroUsize;

use tracing::debug;

use crate::error::FetchError;
use crate::resolve::ResolvedTileRequest;

use super::cache::TileCache;
use super::client::TileClient;
use super::decoder::RasterImage;
use super::endpoint::WmtsEndpoint;
use super::retry::RetryPolicy;

/// Fetches and decodes WMTS tiles.
///
/// The fetcher:
/// 1. Checks the tile cache (when enabled)
/// 2. Builds the GetTile URL from the endpoint and the resolved request
/// 3. Issues the request through the [`TileClient`], retrying transient
///    failures according to the [`RetryPolicy`]
/// 4. Decodes the body into a [`RasterImage`]
/// 5. Caches and returns the raster
///
/// # Type Parameters
///
/// * `C` - The HTTP client (reqwest in production, a mock in tests)
///
/// # Example
///
/// ```ignore
/// use wmts_overlay::fetch::{ReqwestTileClient, TileFetcher, WmtsEndpoint};
///
/// let client = ReqwestTileClient::new()?;
/// let fetcher = TileFetcher::new(client, WmtsEndpoint::default());
///
/// let raster = fetcher.fetch(&request).await?;
/// println!("{}x{} tile", raster.width, raster.height);
/// ```
pub struct TileFetcher<C: TileClient> {
    client: C,
    endpoint: WmtsEndpoint,
    retry: RetryPolicy,
    cache: Option<TileCache>,
}

impl<C: TileClient> TileFetcher<C> {
    /// Create a fetcher with no retries and no cache.
    pub fn new(client: C, endpoint: WmtsEndpoint) -> Self {
        Self {
            client,
            endpoint,
            retry: RetryPolicy::None,
            cache: None,
        }
    }

    /// Set the retry policy.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Enable a tile cache holding up to `capacity` tiles.
    ///
    /// A capacity of zero disables caching.
    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache = NonZeroUsize::new(capacity).map(TileCache::new);
        self
    }

    /// The WMTS endpoint tiles are requested from.
    pub fn endpoint(&self) -> &WmtsEndpoint {
        &self.endpoint
    }

    /// The active retry policy.
    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// The tile cache, if enabled.
    pub fn cache(&self) -> Option<&TileCache> {
        self.cache.as_ref()
    }

    /// The underlying client.
    pub fn client(&self) -> &C {
        &self.client
    }

    /// Fetch and decode the tile for a resolved request.
    ///
    /// # Errors
    ///
    /// - [`FetchError::RemoteRejected`] if the endpoint answered with a non-success status
    /// - [`FetchError::DecodeFailed`] if the body is not a valid image
    /// - [`FetchError::Transport`] / [`FetchError::Timeout`] for network failures,
    ///   including a malformed endpoint URL
    pub async fn fetch(&self, request: &ResolvedTileRequest) -> Result<RasterImage, FetchError> {
        if let Some(cache) = &self.cache {
            if let Some(raster) = cache.get(request).await {
                debug!(layer = %request.layer_id, "Tile cache hit");
                return Ok(raster);
            }
        }

        let url = self.endpoint.tile_url(request)?;
        let body = self.get_with_retry(&request.layer_id, &url).await?;
        let raster = RasterImage::decode(body)?;

        debug!(
            layer = %request.layer_id,
            width = raster.width,
            height = raster.height,
            "Fetched tile"
        );

        if let Some(cache) = &self.cache {
            cache.put(request.clone(), raster.clone()).await;
        }

        Ok(raster)
    }

    async fn get_with_retry(&self, layer_id: &str, url: &str) -> Result<bytes::Bytes, FetchError> {
        let mut attempts = 0;
        loop {
            attempts += 1;
            match self.client.get(url).await {
                Ok(body) => return Ok(body),
                Err(err) => {
                    let delay = if err.is_transient() {
                        self.retry.delay_after(attempts)
                    } else {
                        None
                    };

                    match delay {
                        Some(delay) => {
                            debug!(
                                layer = %layer_id,
                                attempt = attempts,
                                "Retrying tile request after error: {}",
                                err
                            );
                            tokio::time::sleep(delay).await;
                        }
                        None => return Err(err),
                    }
                }
            }
        }
    }
}
