use std::collections::HashSet;
use std::time::Duration;

use crate::composite::DEFAULT_ZOOM;
use crate::resolve::TileCoordinates;

/// Layers rendered by default, in stacking order.
pub const DEFAULT_LAYERS: [&str; 8] = [
    "Reference_Labels_15m",
    "Reference_Features_15m",
    "Coastlines_15m",
    "GRUMP_Settlements",
    "Probabilities_of_Urban_Expansion_2000-2030",
    "Landsat_Human_Built-up_And_Settlement_Extent",
    "Last_of_the_Wild_1995-2004",
    "GPW_Population_Density_2020",
];

/// Default number of tiles fetched at once.
pub const DEFAULT_CONCURRENCY: usize = DEFAULT_LAYERS.len();

/// What a render draws and how it fetches.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    /// Layer identifiers, in overlay stacking order
    pub layers: Vec<String>,

    /// Tile address requested for every layer
    pub tile: TileCoordinates,

    /// Base map zoom level
    pub zoom: u8,

    /// Maximum number of concurrent tile fetches
    pub concurrency: usize,

    /// Overall deadline after which unfinished layers are skipped
    pub deadline: Option<Duration>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            layers: DEFAULT_LAYERS.iter().map(|s| s.to_string()).collect(),
            tile: TileCoordinates::default(),
            zoom: DEFAULT_ZOOM,
            concurrency: DEFAULT_CONCURRENCY,
            deadline: None,
        }
    }
}

impl RenderConfig {
    /// Replace the layer list. Repeated identifiers keep their first position.
    pub fn with_layers<I>(mut self, layers: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let mut seen = HashSet::new();
        self.layers = layers
            .into_iter()
            .map(Into::into)
            .filter(|layer: &String| seen.insert(layer.clone()))
            .collect();
        self
    }

    /// Replace the tile address.
    pub fn with_tile(mut self, tile: TileCoordinates) -> Self {
        self.tile = tile;
        self
    }

    /// Set the base map zoom.
    pub fn with_zoom(mut self, zoom: u8) -> Self {
        self.zoom = zoom;
        self
    }

    /// Set the fetch concurrency.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Set an overall render deadline.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Concurrency actually used: at least 1, at most one fetch per layer.
    pub fn effective_concurrency(&self) -> usize {
        self.concurrency.clamp(1, self.layers.len().max(1))
    }
}
