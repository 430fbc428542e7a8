//! # WMTS Overlay
//!
//! Composites tiles from a WMTS service (NASA GIBS by default) into an
//! interactive Leaflet map centered on a coordinate.
//!
//! For each configured layer the renderer checks a capability snapshot to
//! decide whether the layer can be requested, fetches one tile, decodes it and
//! stacks it as a semi-transparent overlay. A layer that cannot be resolved or
//! fetched is skipped and reported; the map is always produced.
//!
//! ## Architecture
//!
//! - [`compat`] - Capability snapshot of layers, tile matrix sets and formats
//! - [`resolve`] - Per-layer tile request resolution
//! - [`fetch`] - WMTS GetTile client, decoding, retries and caching
//! - [`composite`] - Overlays, the map artifact and its HTML rendering
//! - [`render`] - Orchestration over the layer list
//! - [`server`] - Axum-based HTTP API
//! - [`config`] - CLI and configuration types
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::path::Path;
//! use wmts_overlay::{
//!     CompatibilityStore, MapRenderer, RenderConfig, ReqwestTileClient, TileFetcher,
//!     WmtsEndpoint,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = CompatibilityStore::load("layer_compatibility_data.json");
//!     let fetcher = TileFetcher::new(ReqwestTileClient::new()?, WmtsEndpoint::default());
//!     let renderer = MapRenderer::new(store, fetcher, RenderConfig::default());
//!
//!     let outcome = renderer.render_map(10.0, -70.0).await?;
//!     outcome.map.persist(Path::new(".")).await?;
//!     Ok(())
//! }
//! ```

pub mod compat;
pub mod composite;
pub mod config;
pub mod error;
pub mod fetch;
pub mod render;
pub mod resolve;
pub mod server;

// Re-export commonly used types
pub use compat::{CompatibilityStore, LayerCompatibility};
pub use composite::{build_overlay, Bounds, FinalizedMap, MapArtifact, OverlaySpec};
pub use config::{Cli, Command, RenderArgs, RenderCommand, ServeConfig};
pub use error::{FetchError, RenderError, SkipReason, StoreError, UnsupportedLayer};
pub use fetch::{
    RasterImage, ReqwestTileClient, RetryPolicy, TileCache, TileClient, TileFetcher, WmtsEndpoint,
};
pub use render::{LayerOutcome, LayerReport, MapRenderer, RenderConfig, RenderOutcome};
pub use resolve::{resolve, ResolvedTileRequest, TileCoordinates, TileResolver};
pub use server::{create_router, RouterConfig};
