use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use crate::error::RenderError;

use super::html::render_html;
use super::overlay::{tile_file_name, OverlaySpec, TILE_DIR};

/// Default base map zoom level.
pub const DEFAULT_ZOOM: u8 = 5;

/// File name of the persisted HTML map.
pub const MAP_HTML_FILE: &str = "interactive_map.html";

/// File name of the persisted JSON snapshot.
pub const MAP_JSON_FILE: &str = "interactive_map.json";

// =============================================================================
// Map Artifact
// =============================================================================

/// Base map plus the overlays accumulated during a render.
///
/// Overlays are kept in insertion order, which is both their stacking order
/// (last on top) and their order in the layer control.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapArtifact {
    /// Map center as `[latitude, longitude]`
    pub center: [f64; 2],

    /// Initial zoom level
    pub zoom: u8,

    /// Overlays in insertion order
    pub overlays: Vec<OverlaySpec>,
}

impl MapArtifact {
    /// Create an empty base map centered on a coordinate.
    pub fn new(latitude: f64, longitude: f64, zoom: u8) -> Self {
        Self {
            center: [latitude, longitude],
            zoom,
            overlays: Vec::new(),
        }
    }

    /// Append an overlay, returning the updated artifact.
    ///
    /// The overlay's image path is assigned from its position, so every
    /// overlay in the artifact writes to its own file.
    pub fn with_overlay(mut self, mut overlay: OverlaySpec) -> Self {
        overlay.image_path = format!(
            "{}/{}",
            TILE_DIR,
            tile_file_name(self.overlays.len(), &overlay.layer_id)
        );
        self.overlays.push(overlay);
        self
    }

    /// Overlays in insertion order.
    pub fn overlays(&self) -> &[OverlaySpec] {
        &self.overlays
    }

    /// Overlay names in insertion order.
    pub fn overlay_names(&self) -> Vec<&str> {
        self.overlays.iter().map(|o| o.name.as_str()).collect()
    }

    /// Attach the layer control and close the artifact for further changes.
    pub fn finalize(self) -> FinalizedMap {
        let layer_control = LayerControl {
            entries: self.overlays.iter().map(|o| o.name.clone()).collect(),
        };

        FinalizedMap {
            artifact: self,
            layer_control,
        }
    }
}

// =============================================================================
// Layer Control
// =============================================================================

/// User-facing toggle listing every overlay by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LayerControl {
    /// Overlay names in insertion order
    pub entries: Vec<String>,
}

// =============================================================================
// Finalized Map
// =============================================================================

/// A completed map, ready to be serialized.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinalizedMap {
    #[serde(flatten)]
    pub artifact: MapArtifact,

    pub layer_control: LayerControl,
}

impl FinalizedMap {
    /// Render the Leaflet HTML document.
    pub fn to_html(&self) -> String {
        render_html(self)
    }

    /// Serialize the map description as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, RenderError> {
        serde_json::to_string_pretty(self).map_err(|e| RenderError::Persist(e.to_string()))
    }

    /// Write the map into `dir` and return the path of the HTML document.
    ///
    /// Overlay images land in `dir/temp_tiles/`. The HTML document is written
    /// last, through a temporary file and a rename, so readers never observe
    /// a partially written map.
    pub async fn persist(&self, dir: &Path) -> Result<PathBuf, RenderError> {
        let tile_dir = dir.join(TILE_DIR);
        tokio::fs::create_dir_all(&tile_dir).await?;

        for overlay in &self.artifact.overlays {
            let path = dir.join(&overlay.image_path);
            tokio::fs::write(&path, &overlay.image).await?;
            debug!(layer = %overlay.layer_id, path = %path.display(), "Wrote overlay image");
        }

        tokio::fs::write(dir.join(MAP_JSON_FILE), self.to_json()?).await?;

        let html_path = dir.join(MAP_HTML_FILE);
        let tmp_path = dir.join(format!(".{}.tmp", MAP_HTML_FILE));
        tokio::fs::write(&tmp_path, self.to_html()).await?;
        tokio::fs::rename(&tmp_path, &html_path).await?;

        Ok(html_path)
    }
}

// =============================================================================
// Tests
// =============================================================================
