//! Cache for decoded tiles.
//!
//! Tiles are keyed by the full [`ResolvedTileRequest`], so two layers never
//! share an entry and a changed tile address misses. Only successful fetches
//! are cached; a failed layer is requested again on the next render.

use std::num::NonZeroUsize;

use lru::LruCache;
use tokio::sync::RwLock;

use crate::resolve::ResolvedTileRequest;

use super::decoder::RasterImage;

/// LRU cache of decoded tiles, bounded by entry count.
///
/// # Example
///
/// ```
/// use std::num::NonZeroUsize;
/// use bytes::Bytes;
/// use wmts_overlay::fetch::{RasterImage, TileCache};
/// use wmts_overlay::resolve::ResolvedTileRequest;
///
/// #[tokio::main]
/// async fn main() {
///     let cache = TileCache::new(NonZeroUsize::new(16).unwrap());
///     let key = ResolvedTileRequest {
///         layer_id: "Coastlines_15m".into(),
///         tile_matrix_set: "EPSG:4326_15m".into(),
///         tile_matrix: "3".into(),
///         row: "1".into(),
///         col: "1".into(),
///         format: "image/png".into(),
///     };
///     let raster = RasterImage { data: Bytes::from_static(b"png"), width: 1, height: 1 };
///
///     cache.put(key.clone(), raster.clone()).await;
///     assert_eq!(cache.get(&key).await, Some(raster));
/// }
/// ```
pub struct TileCache {
    cache: RwLock<LruCache<ResolvedTileRequest, RasterImage>>,
    capacity: NonZeroUsize,
}

impl TileCache {
    /// Create a cache holding at most `capacity` tiles.
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            cache: RwLock::new(LruCache::new(capacity)),
            capacity,
        }
    }

    /// Get a tile, marking it as recently used.
    pub async fn get(&self, key: &ResolvedTileRequest) -> Option<RasterImage> {
        let mut cache = self.cache.write().await;
        cache.get(key).cloned()
    }

    /// Check for a tile without updating LRU order.
    pub async fn contains(&self, key: &ResolvedTileRequest) -> bool {
        let cache = self.cache.read().await;
        cache.contains(key)
    }

    /// Store a tile, evicting the least recently used entry when full.
    pub async fn put(&self, key: ResolvedTileRequest, raster: RasterImage) {
        let mut cache = self.cache.write().await;
        cache.put(key, raster);
    }

    /// Number of cached tiles.
    pub async fn len(&self) -> usize {
        self.cache.read().await.len()
    }

    /// Whether the cache is empty.
    pub async fn is_empty(&self) -> bool {
        self.cache.read().await.is_empty()
    }

    /// Maximum number of cached tiles.
    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }

    /// Remove all entries.
    pub async fn clear(&self) {
        self.cache.write().await.clear();
    }
}
