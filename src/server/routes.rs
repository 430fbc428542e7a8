//! Router configuration for the map service.
//!
//! # Route Structure
//!
//! ```text
//! /health                  - Health check
//! /generate-map            - Render a map (POST)
//! /interactive_map.html    - Last rendered map
//! /temp_tiles/{file}       - Overlay images used by the map
//! ```
//!
//! # Example
//!
//! ```ignore
//! use wmts_overlay::server::{create_router, RouterConfig};
//!
//! let router = create_router(renderer, "./out", RouterConfig::new());
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:5001").await?;
//! axum::serve(listener, router).await?;
//! ```

use std::path::PathBuf;
use std::time::Duration;

use axum::{
    routing::{get, post},
    Router,
};
use http::header::CONTENT_TYPE;
use http::Method;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers::{
    generate_map_handler, health_handler, map_handler, tile_image_handler, AppState, MAP_URL,
};
use crate::composite::TILE_DIR;
use crate::fetch::TileClient;
use crate::render::MapRenderer;

// =============================================================================
// Router Configuration
// =============================================================================

/// Configuration for the HTTP router.
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Allowed CORS origins (None = allow any origin)
    pub cors_origins: Option<Vec<String>>,

    /// Whether to enable request tracing
    pub enable_tracing: bool,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl RouterConfig {
    /// Create a router configuration that allows any origin and traces requests.
    pub fn new() -> Self {
        Self {
            cors_origins: None,
            enable_tracing: true,
        }
    }

    /// Set specific allowed CORS origins.
    ///
    /// Pass an empty vec to disallow all cross-origin requests.
    pub fn with_cors_origins(mut self, origins: Vec<String>) -> Self {
        self.cors_origins = Some(origins);
        self
    }

    /// Enable or disable request tracing.
    pub fn with_tracing(mut self, enabled: bool) -> Self {
        self.enable_tracing = enabled;
        self
    }
}

// =============================================================================
// Router Builder
// =============================================================================

/// Create the application router.
///
/// The finalized map and its overlay images are written to and served from
/// `output_dir`.
pub fn create_router<C>(
    renderer: MapRenderer<C>,
    output_dir: impl Into<PathBuf>,
    config: RouterConfig,
) -> Router
where
    C: TileClient + 'static,
{
    let app_state = AppState::new(renderer, output_dir);
    let cors = build_cors_layer(&config);

    let router = Router::new()
        .route("/health", get(health_handler))
        .route("/generate-map", post(generate_map_handler::<C>))
        .route(MAP_URL, get(map_handler::<C>))
        .route(
            &format!("/{}/{{file}}", TILE_DIR),
            get(tile_image_handler::<C>),
        )
        .with_state(app_state)
        .layer(cors);

    if config.enable_tracing {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

/// Build the CORS layer based on configuration.
fn build_cors_layer(config: &RouterConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(86400));

    match &config.cors_origins {
        None => cors.allow_origin(Any),
        Some(origins) if origins.is_empty() => cors,
        Some(origins) => {
            let parsed_origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
            cors.allow_origin(parsed_origins)
        }
    }
}
