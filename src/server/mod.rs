//! HTTP server layer.
//!
//! Thin shell over [`MapRenderer`](crate::render::MapRenderer): a request
//! carries a coordinate, the handler renders and persists the map, and the
//! result is served back as a static page.

pub mod handlers;
pub mod routes;

pub use handlers::{
    generate_map_handler, health_handler, map_handler, tile_image_handler, ApiError, AppState,
    ErrorResponse, GenerateMapRequest, GenerateMapResponse, HealthResponse, MAP_URL,
};
pub use routes::{create_router, RouterConfig};
