use serde::Serialize;

use crate::compat::CompatibilityStore;
use crate::error::UnsupportedLayer;

/// The only format overlays are requested in.
pub const REQUIRED_FORMAT: &str = "image/png";

/// Default tile matrix (zoom level identifier).
pub const DEFAULT_TILE_MATRIX: &str = "3";

/// Default tile row.
pub const DEFAULT_TILE_ROW: &str = "1";

/// Default tile column.
pub const DEFAULT_TILE_COL: &str = "1";

// =============================================================================
// Tile Coordinates
// =============================================================================

/// Fixed tile address requested for every layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TileCoordinates {
    /// Tile matrix identifier
    pub tile_matrix: String,

    /// Tile row
    pub row: String,

    /// Tile column
    pub col: String,
}

impl TileCoordinates {
    /// Create a tile address.
    pub fn new(
        tile_matrix: impl Into<String>,
        row: impl Into<String>,
        col: impl Into<String>,
    ) -> Self {
        Self {
            tile_matrix: tile_matrix.into(),
            row: row.into(),
            col: col.into(),
        }
    }
}

impl Default for TileCoordinates {
    fn default() -> Self {
        Self::new(DEFAULT_TILE_MATRIX, DEFAULT_TILE_ROW, DEFAULT_TILE_COL)
    }
}

// =============================================================================
// Resolved Tile Request
// =============================================================================

/// Everything needed to address one tile on the WMTS service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ResolvedTileRequest {
    /// Layer identifier
    pub layer_id: String,

    /// Chosen tile matrix set
    pub tile_matrix_set: String,

    /// Tile matrix identifier
    pub tile_matrix: String,

    /// Tile row
    pub row: String,

    /// Tile column
    pub col: String,

    /// Requested image format
    pub format: String,
}

// =============================================================================
// Tile Resolver
// =============================================================================

/// Resolves layers against a compatibility store using a fixed tile address.
#[derive(Debug, Clone, Default)]
pub struct TileResolver {
    coordinates: TileCoordinates,
}

impl TileResolver {
    /// Create a resolver that requests the given tile for every layer.
    pub fn new(coordinates: TileCoordinates) -> Self {
        Self { coordinates }
    }

    /// The tile address used for every layer.
    pub fn coordinates(&self) -> &TileCoordinates {
        &self.coordinates
    }

    /// Resolve a layer into a tile request.
    ///
    /// # Errors
    ///
    /// - [`UnsupportedLayer::NotInStore`] if the store has no entry for the layer
    /// - [`UnsupportedLayer::MissingFormat`] if `image/png` is not advertised
    /// - [`UnsupportedLayer::NoTileMatrixSet`] if no tile matrix set is advertised
    pub fn resolve(
        &self,
        layer_id: &str,
        store: &CompatibilityStore,
    ) -> Result<ResolvedTileRequest, UnsupportedLayer> {
        let compat = store.lookup(layer_id).ok_or(UnsupportedLayer::NotInStore)?;

        if !compat.supports_format(REQUIRED_FORMAT) {
            return Err(UnsupportedLayer::MissingFormat {
                required: REQUIRED_FORMAT,
            });
        }

        let tile_matrix_set = compat
            .tile_matrix_sets
            .first()
            .ok_or(UnsupportedLayer::NoTileMatrixSet)?;

        Ok(ResolvedTileRequest {
            layer_id: layer_id.to_string(),
            tile_matrix_set: tile_matrix_set.clone(),
            tile_matrix: self.coordinates.tile_matrix.clone(),
            row: self.coordinates.row.clone(),
            col: self.coordinates.col.clone(),
            format: REQUIRED_FORMAT.to_string(),
        })
    }
}

/// Resolve a layer using the default tile address (matrix 3, row 1, col 1).
pub fn resolve(
    layer_id: &str,
    store: &CompatibilityStore,
) -> Result<ResolvedTileRequest, UnsupportedLayer> {
    TileResolver::default().resolve(layer_id, store)
}

// =============================================================================
// Tests
// =============================================================================
