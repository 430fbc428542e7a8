use futures::stream::{self, StreamExt};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::compat::CompatibilityStore;
use crate::composite::{build_overlay, MapArtifact};
use crate::error::{RenderError, SkipReason, UnsupportedLayer};
use crate::fetch::{RasterImage, TileClient, TileFetcher};
use crate::resolve::{ResolvedTileRequest, TileResolver};

use super::config::RenderConfig;
use super::report::{LayerOutcome, LayerReport, RenderOutcome};

/// Check that a coordinate is finite and within WGS84 range.
pub fn validate_coordinate(latitude: f64, longitude: f64) -> Result<(), RenderError> {
    if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
        return Err(RenderError::InvalidCoordinate {
            field: "latitude",
            value: latitude.to_string(),
        });
    }
    if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
        return Err(RenderError::InvalidCoordinate {
            field: "longitude",
            value: longitude.to_string(),
        });
    }
    Ok(())
}

/// Renders composite maps from the configured layer list.
///
/// # Example
///
/// ```ignore
/// use wmts_overlay::compat::CompatibilityStore;
/// use wmts_overlay::fetch::{ReqwestTileClient, TileFetcher, WmtsEndpoint};
/// use wmts_overlay::render::{MapRenderer, RenderConfig};
///
/// let store = CompatibilityStore::load("layer_compatibility_data.json");
/// let fetcher = TileFetcher::new(ReqwestTileClient::new()?, WmtsEndpoint::default());
/// let renderer = MapRenderer::new(store, fetcher, RenderConfig::default());
///
/// let outcome = renderer.render_map(10.0, -70.0).await?;
/// println!("{} overlays", outcome.composited());
/// ```
pub struct MapRenderer<C: TileClient> {
    store: CompatibilityStore,
    fetcher: TileFetcher<C>,
    resolver: TileResolver,
    config: RenderConfig,
}

impl<C: TileClient> MapRenderer<C> {
    /// Create a renderer.
    pub fn new(store: CompatibilityStore, fetcher: TileFetcher<C>, config: RenderConfig) -> Self {
        let resolver = TileResolver::new(config.tile.clone());
        Self {
            store,
            fetcher,
            resolver,
            config,
        }
    }

    /// The compatibility store layers are resolved against.
    pub fn store(&self) -> &CompatibilityStore {
        &self.store
    }

    /// The tile fetcher.
    pub fn fetcher(&self) -> &TileFetcher<C> {
        &self.fetcher
    }

    /// The render configuration.
    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Render a map centered on the given coordinate.
    ///
    /// Every configured layer is resolved, fetched and composited; a layer
    /// that fails at any step is skipped and reported, never aborting the
    /// render. Overlays appear in layer-list order regardless of which fetch
    /// finished first.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::InvalidCoordinate`] if the coordinate is not
    /// finite or outside WGS84 range. No other error is possible.
    pub async fn render_map(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<RenderOutcome, RenderError> {
        validate_coordinate(latitude, longitude)?;

        let deadline = self.config.deadline.map(|d| Instant::now() + d);
        let tile = self.resolver.coordinates();
        debug!(
            latitude,
            longitude,
            tile_matrix = %tile.tile_matrix,
            row = %tile.row,
            col = %tile.col,
            "Rendering map"
        );

        // Resolution is synchronous and happens for every layer before any
        // fetch starts; unsupported layers never reach the network.
        let resolved: Vec<Result<ResolvedTileRequest, UnsupportedLayer>> = self
            .config
            .layers
            .iter()
            .map(|layer_id| self.resolver.resolve(layer_id, &self.store))
            .collect();

        let fetched: Vec<Result<RasterImage, SkipReason>> = stream::iter(resolved)
            .map(|resolution| async move {
                match resolution {
                    Ok(request) => self.fetch_layer(&request, deadline).await,
                    Err(reason) => Err(SkipReason::from(reason)),
                }
            })
            .buffered(self.config.effective_concurrency())
            .collect()
            .await;

        let mut reports = Vec::with_capacity(self.config.layers.len());
        let artifact = self.config.layers.iter().zip(fetched).fold(
            MapArtifact::new(latitude, longitude, self.config.zoom),
            |artifact, (layer_id, result)| {
                let outcome = match result {
                    Ok(raster) => {
                        LayerOutcome::Composited(build_overlay(layer_id, raster, latitude, longitude))
                    }
                    Err(reason) => LayerOutcome::Skipped(reason),
                };

                log_outcome(layer_id, &outcome);
                reports.push(LayerReport::new(layer_id.as_str(), &outcome));

                match outcome {
                    LayerOutcome::Composited(overlay) => artifact.with_overlay(overlay),
                    LayerOutcome::Skipped(_) => artifact,
                }
            },
        );

        let map = artifact.finalize();
        let outcome = RenderOutcome {
            map,
            layers: reports,
        };

        info!(
            latitude,
            longitude,
            composited = outcome.composited(),
            skipped = outcome.skipped(),
            "Rendered map"
        );

        Ok(outcome)
    }

    async fn fetch_layer(
        &self,
        request: &ResolvedTileRequest,
        deadline: Option<Instant>,
    ) -> Result<RasterImage, SkipReason> {
        let Some(deadline) = deadline else {
            return Ok(self.fetcher.fetch(request).await?);
        };

        if Instant::now() >= deadline {
            return Err(UnsupportedLayer::DeadlineExceeded.into());
        }

        match tokio::time::timeout_at(deadline, self.fetcher.fetch(request)).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(UnsupportedLayer::DeadlineExceeded.into()),
        }
    }
}

fn log_outcome(layer_id: &str, outcome: &LayerOutcome) {
    match outcome {
        LayerOutcome::Composited(overlay) => {
            debug!(layer = %layer_id, width = overlay.width, height = overlay.height, "Added overlay");
        }
        LayerOutcome::Skipped(SkipReason::Unsupported(reason)) => {
            info!(layer = %layer_id, "Skipping layer: {}", reason);
        }
        LayerOutcome::Skipped(SkipReason::Fetch(err)) => {
            warn!(layer = %layer_id, "Error fetching layer: {}", err);
        }
    }
}
