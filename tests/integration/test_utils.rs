//! Test utilities for integration tests.
//!
//! This module provides a scripted tile client that records every request and
//! helpers for building compatibility stores and tile images.

use async_trait::async_trait;
use bytes::Bytes;
use image::{ImageFormat, Rgba, RgbaImage};
use std::collections::HashMap;
use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use wmts_overlay::compat::{CompatibilityStore, LayerCompatibility};
use wmts_overlay::error::FetchError;
use wmts_overlay::fetch::{TileClient, TileFetcher, WmtsEndpoint};
use wmts_overlay::render::{MapRenderer, RenderConfig};

/// Tile matrix set used by test stores.
pub const TEST_TMS: &str = "EPSG:4326_15m";

// =============================================================================
// Images
// =============================================================================

/// Encode a solid-color PNG of the given size.
pub fn png_tile(width: u32, height: u32) -> Bytes {
    let img = RgbaImage::from_pixel(width, height, Rgba([200, 40, 40, 255]));
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png).unwrap();
    Bytes::from(buf.into_inner())
}

/// Encode a solid-color JPEG of the given size.
pub fn jpeg_tile(width: u32, height: u32) -> Bytes {
    let img = image::RgbImage::from_pixel(width, height, image::Rgb([20, 120, 220]));
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Jpeg).unwrap();
    Bytes::from(buf.into_inner())
}

/// Check if data starts with the PNG signature.
pub fn is_valid_png(data: &[u8]) -> bool {
    data.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A])
}

// =============================================================================
// Stores
// =============================================================================

/// A PNG-capable store entry with a single tile matrix set.
pub fn png_layer(layer_id: &str) -> LayerCompatibility {
    LayerCompatibility::new(layer_id, [TEST_TMS], ["image/png"])
}

/// Build a store in which every given layer is PNG-capable.
pub fn png_store(layers: &[&str]) -> CompatibilityStore {
    CompatibilityStore::from_entries(layers.iter().map(|l| png_layer(l)))
}

// =============================================================================
// Mock Tile Client
// =============================================================================

/// Scripted response for one layer.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Respond with this body
    Body(Bytes),

    /// Respond with this non-success status
    Status(u16),

    /// Fail at the transport level
    Transport,

    /// Wait, then answer with the inner response
    Delayed(Duration, Box<MockResponse>),
}

/// A tile client that answers from a per-layer script and records every URL.
///
/// Layers without a script answer with 404. Clones share the script and the
/// request log.
#[derive(Clone, Default)]
pub struct MockTileClient {
    responses: Arc<HashMap<String, MockResponse>>,
    requests: Arc<RwLock<Vec<String>>>,
}

impl MockTileClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the response for a layer.
    pub fn with_response(mut self, layer_id: impl Into<String>, response: MockResponse) -> Self {
        Arc::make_mut(&mut self.responses).insert(layer_id.into(), response);
        self
    }

    /// Answer every given layer with a valid PNG.
    pub fn with_png_layers(self, layers: &[&str]) -> Self {
        layers.iter().fold(self, |client, layer| {
            client.with_response(*layer, MockResponse::Body(png_tile(4, 4)))
        })
    }

    /// Every URL requested so far, in request order.
    pub async fn requests(&self) -> Vec<String> {
        self.requests.read().await.clone()
    }

    /// Number of requests issued for a layer.
    pub async fn request_count(&self, layer_id: &str) -> usize {
        self.requests
            .read()
            .await
            .iter()
            .filter(|url| layer_param(url).as_deref() == Some(layer_id))
            .count()
    }
}

/// Extract the LAYER query parameter from a GetTile URL.
pub fn layer_param(url: &str) -> Option<String> {
    url::Url::parse(url)
        .ok()?
        .query_pairs()
        .find(|(k, _)| k == "LAYER")
        .map(|(_, v)| v.into_owned())
}

#[async_trait]
impl TileClient for MockTileClient {
    async fn get(&self, url: &str) -> Result<Bytes, FetchError> {
        self.requests.write().await.push(url.to_string());

        let mut response = layer_param(url)
            .and_then(|layer| self.responses.get(&layer).cloned())
            .unwrap_or(MockResponse::Status(404));

        loop {
            match response {
                MockResponse::Body(body) => return Ok(body),
                MockResponse::Status(status) => return Err(FetchError::RemoteRejected(status)),
                MockResponse::Transport => {
                    return Err(FetchError::Transport("connection reset".to_string()))
                }
                MockResponse::Delayed(delay, inner) => {
                    tokio::time::sleep(delay).await;
                    response = *inner;
                }
            }
        }
    }
}

// =============================================================================
// Renderer
// =============================================================================

/// Build a renderer over the mock client with the default endpoint.
pub fn mock_renderer(
    store: CompatibilityStore,
    client: MockTileClient,
    config: RenderConfig,
) -> MapRenderer<MockTileClient> {
    let fetcher = TileFetcher::new(client, WmtsEndpoint::default());
    MapRenderer::new(store, fetcher, config)
}

// =============================================================================
// Logs
// =============================================================================

/// In-memory sink for formatted log lines.
#[derive(Clone, Default)]
pub struct LogBuffer(Arc<std::sync::Mutex<Vec<u8>>>);

impl LogBuffer {
    /// Everything logged so far.
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl std::io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Route this thread's tracing output into a buffer until the guard drops.
///
/// Only events emitted on the calling thread are captured, so use it from a
/// current-thread runtime.
pub fn capture_logs() -> (LogBuffer, tracing::subscriber::DefaultGuard) {
    let logs = LogBuffer::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .finish();

    (logs, tracing::subscriber::set_default(subscriber))
}
