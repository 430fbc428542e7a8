//! Tile fetching layer.
//!
//! Turns a [`ResolvedTileRequest`](crate::resolve::ResolvedTileRequest) into a
//! decoded raster by talking to the WMTS tile endpoint.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │              TileFetcher                │
//! │  ┌──────────────┐  ┌─────────────────┐  │
//! │  │  TileCache   │  │  RetryPolicy    │  │
//! │  │ (optional)   │  │ (default: none) │  │
//! │  └──────────────┘  └─────────────────┘  │
//! └────────────────────┬────────────────────┘
//!                      │
//!          ┌───────────┴───────────┐
//!          ▼                       ▼
//! ┌─────────────────┐    ┌─────────────────────┐
//! │  WmtsEndpoint   │    │  TileClient trait   │
//! │  (KVP GetTile)  │    │  (reqwest / mock)   │
//! └─────────────────┘    └──────────┬──────────┘
//!                                   ▼
//!                        ┌─────────────────────┐
//!                        │    RasterImage      │
//!                        │  (decode → PNG)     │
//!                        └─────────────────────┘
//! ```
//!
//! Every failure is terminal for the layer it belongs to: the fetcher reports
//! a [`FetchError`](crate::error::FetchError) and the render continues with
//! the next layer.

mod cache;
mod client;
mod decoder;
mod endpoint;
mod fetcher;
mod retry;

pub use cache::TileCache;
pub use client::{ReqwestTileClient, TileClient, DEFAULT_FETCH_TIMEOUT};
pub use decoder::RasterImage;
pub use endpoint::{WmtsEndpoint, DEFAULT_WMTS_URL};
pub use fetcher::TileFetcher;
pub use retry::RetryPolicy;
