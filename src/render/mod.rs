//! Render orchestration.
//!
//! Drives the configured layer list through resolve → fetch → compose and
//! finalizes the map.
//!
//! # Pipeline
//!
//! ```text
//!   layers ──► TileResolver ──► TileFetcher ──► build_overlay ──► MapArtifact
//!              (all layers,     (concurrent,    (serial fold in layer-list
//!               up front)        ordered)        order, single owner)
//! ```
//!
//! Failure is always scoped to one layer: each layer ends as
//! [`LayerOutcome::Composited`] or [`LayerOutcome::Skipped`], and a render
//! always produces a finalized map. The only error a render returns is an
//! invalid input coordinate.

mod config;
mod orchestrator;
mod report;

pub use config::{RenderConfig, DEFAULT_CONCURRENCY, DEFAULT_LAYERS};
pub use orchestrator::{validate_coordinate, MapRenderer};
pub use report::{LayerOutcome, LayerReport, LayerStatus, RenderOutcome};
