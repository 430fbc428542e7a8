use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::StoreError;

/// Default location of the compatibility snapshot.
pub const DEFAULT_SNAPSHOT_PATH: &str = "layer_compatibility_data.json";

// =============================================================================
// Layer Compatibility
// =============================================================================

/// What the remote service supports for one layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LayerCompatibility {
    /// Layer identifier as advertised by the service
    pub layer_id: String,

    /// Supported tile matrix sets, in the order the service lists them
    pub tile_matrix_sets: Vec<String>,

    /// Supported MIME formats (e.g. "image/png")
    pub formats: BTreeSet<String>,
}

impl LayerCompatibility {
    /// Create a compatibility entry.
    pub fn new<T, F>(layer_id: impl Into<String>, tile_matrix_sets: T, formats: F) -> Self
    where
        T: IntoIterator,
        T::Item: Into<String>,
        F: IntoIterator,
        F::Item: Into<String>,
    {
        Self {
            layer_id: layer_id.into(),
            tile_matrix_sets: tile_matrix_sets.into_iter().map(Into::into).collect(),
            formats: formats.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether the layer advertises the given format.
    pub fn supports_format(&self, format: &str) -> bool {
        self.formats.contains(format)
    }

    /// Whether the layer advertises the given tile matrix set.
    pub fn supports_tile_matrix_set(&self, tile_matrix_set: &str) -> bool {
        self.tile_matrix_sets.iter().any(|t| t == tile_matrix_set)
    }
}

/// On-disk shape of a single snapshot entry.
#[derive(Debug, Deserialize)]
struct SnapshotEntry {
    #[serde(default)]
    tile_matrix_sets: Vec<String>,

    #[serde(default)]
    formats: Vec<String>,
}

// =============================================================================
// Compatibility Store
// =============================================================================

/// Read-only map from layer identifier to [`LayerCompatibility`].
///
/// # Example
///
/// ```
/// use wmts_overlay::compat::{CompatibilityStore, LayerCompatibility};
///
/// let store = CompatibilityStore::from_entries([LayerCompatibility::new(
///     "Coastlines_15m",
///     ["EPSG:4326_15m"],
///     ["image/png"],
/// )]);
///
/// assert!(store.lookup("Coastlines_15m").is_some());
/// assert!(store.lookup("Unknown").is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CompatibilityStore {
    layers: HashMap<String, LayerCompatibility>,
}

impl CompatibilityStore {
    /// Create an empty store. Every lookup returns `None`.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a store from explicit entries.
    ///
    /// A later entry with the same layer id replaces an earlier one.
    pub fn from_entries(entries: impl IntoIterator<Item = LayerCompatibility>) -> Self {
        let layers = entries
            .into_iter()
            .map(|entry| (entry.layer_id.clone(), entry))
            .collect();
        Self { layers }
    }

    /// Parse a snapshot document.
    pub fn from_json(json: &str) -> Result<Self, StoreError> {
        let raw: HashMap<String, SnapshotEntry> =
            serde_json::from_str(json).map_err(|e| StoreError::Malformed(e.to_string()))?;

        let layers = raw
            .into_iter()
            .map(|(layer_id, entry)| {
                let compat = LayerCompatibility::new(
                    layer_id.clone(),
                    entry.tile_matrix_sets,
                    entry.formats,
                );
                (layer_id, compat)
            })
            .collect();

        Ok(Self { layers })
    }

    /// Read and parse a snapshot file, reporting failures.
    pub fn try_load(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| StoreError::Io(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&contents)
    }

    /// Load a snapshot file, falling back to an empty store on any failure.
    ///
    /// The failure is logged; with an empty store every layer is treated as
    /// unsupported, which is the expected degraded behaviour.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::try_load(path) {
            Ok(store) => {
                debug!(path = %path.display(), layers = store.len(), "Loaded compatibility snapshot");
                store
            }
            Err(e) => {
                warn!(
                    path = %path.display(),
                    "Layer compatibility data unavailable, all layers will be skipped: {}",
                    e
                );
                Self::empty()
            }
        }
    }

    /// Look up the compatibility entry for a layer.
    pub fn lookup(&self, layer_id: &str) -> Option<&LayerCompatibility> {
        self.layers.get(layer_id)
    }

    /// Number of layers in the store.
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Whether the store has no layers.
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

// =============================================================================
// Tests
// =============================================================================
