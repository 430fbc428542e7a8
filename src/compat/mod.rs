//! Layer compatibility store.
//!
//! Holds, per layer identifier, the tile matrix sets and image formats the
//! remote WMTS service advertises for it. The store is populated from a JSON
//! snapshot written out-of-band by a capabilities collaborator and is
//! read-only afterwards.
//!
//! # Snapshot Format
//!
//! ```json
//! {
//!   "Coastlines_15m": {
//!     "tile_matrix_sets": ["EPSG:4326_15m"],
//!     "formats": ["image/png"]
//!   }
//! }
//! ```
//!
//! A missing or malformed snapshot never fails the caller: [`CompatibilityStore::load`]
//! logs the problem and returns an empty store, so every layer resolves as
//! unsupported downstream.

mod store;

pub use store::{CompatibilityStore, LayerCompatibility, DEFAULT_SNAPSHOT_PATH};
