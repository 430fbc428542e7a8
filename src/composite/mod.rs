//! Overlay composition.
//!
//! Turns decoded tiles into geographically bounded overlays and accumulates
//! them into a [`MapArtifact`].
//!
//! # Lifecycle
//!
//! ```text
//! MapArtifact::new(lat, lon, zoom)
//!        │  with_overlay(build_overlay(..))   (once per composited layer,
//!        │                                     in layer-list order)
//!        ▼
//! MapArtifact::finalize()  ──►  FinalizedMap { artifact, layer control }
//!        │
//!        ▼
//! FinalizedMap::persist(dir)  ──►  interactive_map.html
//!                                  interactive_map.json
//!                                  temp_tiles/<NN>_<layer>.png
//! ```
//!
//! Overlay bounds are a fixed box of ±1 degree around the user coordinate,
//! identical for every layer. This does not reflect the tile's real
//! footprint; georeferencing from the tile matrix set would need grid
//! geometry the compatibility snapshot does not carry.

mod artifact;
mod html;
mod overlay;

pub use artifact::{
    FinalizedMap, LayerControl, MapArtifact, DEFAULT_ZOOM, MAP_HTML_FILE, MAP_JSON_FILE,
};
pub use html::render_html;
pub use overlay::{
    build_overlay, is_tile_file_name, tile_file_name, Bounds, OverlaySpec, BOUNDS_HALF_EXTENT_DEG,
    OVERLAY_OPACITY, TILE_DIR,
};
