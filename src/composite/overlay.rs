use bytes::Bytes;
use serde::{Serialize, Serializer};

use crate::fetch::RasterImage;

/// Opacity applied to every overlay.
pub const OVERLAY_OPACITY: f64 = 0.5;

/// Half-width, in degrees, of the box placed around the user coordinate.
pub const BOUNDS_HALF_EXTENT_DEG: f64 = 1.0;

/// Directory (relative to the artifact) overlay images are written to.
pub const TILE_DIR: &str = "temp_tiles";

// =============================================================================
// Bounds
// =============================================================================

/// Geographic bounding box, serialized as `[[south, west], [north, east]]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl Bounds {
    /// The fixed ±1 degree box around a coordinate.
    pub fn around(latitude: f64, longitude: f64) -> Self {
        Self {
            south: latitude - BOUNDS_HALF_EXTENT_DEG,
            west: longitude - BOUNDS_HALF_EXTENT_DEG,
            north: latitude + BOUNDS_HALF_EXTENT_DEG,
            east: longitude + BOUNDS_HALF_EXTENT_DEG,
        }
    }

    /// Corner pairs in Leaflet order.
    pub fn corners(&self) -> [[f64; 2]; 2] {
        [[self.south, self.west], [self.north, self.east]]
    }
}

impl Serialize for Bounds {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.corners().serialize(serializer)
    }
}

// =============================================================================
// Overlay Spec
// =============================================================================

/// A semi-transparent image overlay on the base map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlaySpec {
    /// Layer this overlay was built from
    pub layer_id: String,

    /// Display name in the layer control
    pub name: String,

    /// Image location relative to the artifact directory, assigned when the
    /// overlay is added to a [`MapArtifact`](super::MapArtifact)
    pub image_path: String,

    /// Geographic extent
    pub bounds: Bounds,

    /// Overlay opacity (0.0 - 1.0)
    pub opacity: f64,

    /// Whether the overlay reacts to pointer events
    pub interactive: bool,

    /// Image width in pixels
    pub width: u32,

    /// Image height in pixels
    pub height: u32,

    /// PNG image data, written next to the artifact on persist
    #[serde(skip)]
    pub image: Bytes,
}

/// Whether a character may appear in an overlay image file name.
fn is_file_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')
}

/// File name of the overlay image at `position` in the artifact.
///
/// The position prefix keeps names unique even when two layer ids sanitize
/// to the same stem. Characters outside `[A-Za-z0-9._-]` are replaced with
/// `_` so a layer id can never escape the tile directory.
pub fn tile_file_name(position: usize, layer_id: &str) -> String {
    let stem: String = layer_id
        .chars()
        .map(|c| if is_file_name_char(c) { c } else { '_' })
        .collect();

    format!("{:02}_{}.png", position, stem)
}

/// Whether `file` is a name [`tile_file_name`] can produce.
pub fn is_tile_file_name(file: &str) -> bool {
    file.ends_with(".png") && !file.starts_with('.') && file.chars().all(is_file_name_char)
}

/// Build the overlay for a decoded tile around the user coordinate.
pub fn build_overlay(
    layer_id: &str,
    raster: RasterImage,
    center_lat: f64,
    center_lon: f64,
) -> OverlaySpec {
    OverlaySpec {
        layer_id: layer_id.to_string(),
        name: layer_id.to_string(),
        image_path: String::new(),
        bounds: Bounds::around(center_lat, center_lon),
        opacity: OVERLAY_OPACITY,
        interactive: true,
        width: raster.width,
        height: raster.height,
        image: raster.data,
    }
}
