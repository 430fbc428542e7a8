//! Tile resolver.
//!
//! Decides, per layer, which tile matrix set and format to request from the
//! WMTS service, or reports the layer as unsupported.
//!
//! # Selection Policy
//!
//! - The layer must be present in the [`CompatibilityStore`](crate::compat::CompatibilityStore)
//! - It must advertise `image/png`
//! - It must advertise at least one tile matrix set; the first one listed is
//!   always chosen, so the choice is reproducible across renders
//!
//! Tile matrix, row and column come from [`TileCoordinates`], a fixed tuple
//! supplied by configuration rather than derived from the user coordinate.

mod resolver;

pub use resolver::{
    resolve, ResolvedTileRequest, TileCoordinates, TileResolver, DEFAULT_TILE_COL,
    DEFAULT_TILE_MATRIX, DEFAULT_TILE_ROW, REQUIRED_FORMAT,
};
