use serde::Serialize;

use crate::composite::{FinalizedMap, OverlaySpec};
use crate::error::SkipReason;

/// Result of processing one layer.
#[derive(Debug, Clone, PartialEq)]
pub enum LayerOutcome {
    /// The layer produced an overlay
    Composited(OverlaySpec),

    /// The layer was left out of the map
    Skipped(SkipReason),
}

/// Final state of a layer in the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerStatus {
    Composited,
    Skipped,
}

/// Per-layer line of the render report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LayerReport {
    pub layer_id: String,

    pub status: LayerStatus,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    /// Why the layer was skipped, for callers that branch on it
    #[serde(skip)]
    pub cause: Option<SkipReason>,
}

impl LayerReport {
    /// Summarise a layer outcome.
    pub fn new(layer_id: impl Into<String>, outcome: &LayerOutcome) -> Self {
        let (status, cause) = match outcome {
            LayerOutcome::Composited(_) => (LayerStatus::Composited, None),
            LayerOutcome::Skipped(reason) => (LayerStatus::Skipped, Some(reason.clone())),
        };

        Self {
            layer_id: layer_id.into(),
            status,
            reason: cause.as_ref().map(ToString::to_string),
            cause,
        }
    }
}

/// A finalized map together with what happened to each layer.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOutcome {
    /// The finalized map artifact
    pub map: FinalizedMap,

    /// One entry per configured layer, in layer-list order
    pub layers: Vec<LayerReport>,
}

impl RenderOutcome {
    /// Number of overlays in the map.
    pub fn composited(&self) -> usize {
        self.map.artifact.overlays.len()
    }

    /// Number of layers left out of the map.
    pub fn skipped(&self) -> usize {
        self.layers
            .iter()
            .filter(|r| r.status == LayerStatus::Skipped)
            .count()
    }
}
