//! HTTP request handlers for the map API.
//!
//! # Endpoints
//!
//! - `POST /generate-map` - Render a map around a coordinate
//! - `GET /interactive_map.html` - The last rendered map
//! - `GET /temp_tiles/{file}` - Overlay images referenced by the map
//! - `GET /health` - Health check endpoint

use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, error, warn};

use crate::composite::{is_tile_file_name, MAP_HTML_FILE, TILE_DIR};
use crate::error::RenderError;
use crate::fetch::TileClient;
use crate::render::{LayerReport, MapRenderer};

/// URL the rendered map is served from.
pub const MAP_URL: &str = "/interactive_map.html";

// =============================================================================
// Application State
// =============================================================================

/// Shared application state.
///
/// This is passed to all handlers via Axum's State extractor.
pub struct AppState<C: TileClient> {
    /// Renderer shared by all requests
    pub renderer: Arc<MapRenderer<C>>,

    /// Directory the finalized map is written to and served from
    pub output_dir: Arc<PathBuf>,

    /// Serialises writes of the single map artifact
    persist_lock: Arc<Mutex<()>>,
}

impl<C: TileClient> AppState<C> {
    /// Create application state for a renderer writing into `output_dir`.
    pub fn new(renderer: MapRenderer<C>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            renderer: Arc::new(renderer),
            output_dir: Arc::new(output_dir.into()),
            persist_lock: Arc::new(Mutex::new(())),
        }
    }
}

impl<C: TileClient> Clone for AppState<C> {
    fn clone(&self) -> Self {
        Self {
            renderer: Arc::clone(&self.renderer),
            output_dir: Arc::clone(&self.output_dir),
            persist_lock: Arc::clone(&self.persist_lock),
        }
    }
}

// =============================================================================
// Request / Response Types
// =============================================================================

/// Body of a map generation request.
#[derive(Debug, Deserialize)]
pub struct GenerateMapRequest {
    #[serde(default)]
    pub latitude: Option<f64>,

    #[serde(default)]
    pub longitude: Option<f64>,
}

/// Successful map generation response.
#[derive(Debug, Serialize)]
pub struct GenerateMapResponse {
    /// Human-readable status
    pub message: String,

    /// Where the rendered map can be fetched
    pub map_url: String,

    /// Number of overlays in the map
    pub overlays: usize,

    /// What happened to each configured layer, in layer-list order
    pub layers: Vec<LayerReport>,
}

/// JSON error response returned for all error conditions.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error type identifier (e.g., "invalid_request", "not_found")
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// HTTP status code (included for convenience)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

impl ErrorResponse {
    /// Create a new error response with status code.
    pub fn with_status(
        error: impl Into<String>,
        message: impl Into<String>,
        status: StatusCode,
    ) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            status: Some(status.as_u16()),
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Service version
    pub version: String,
}

// =============================================================================
// Error Mapping
// =============================================================================

/// Errors returned by the HTTP handlers.
#[derive(Debug)]
pub enum ApiError {
    /// Latitude or longitude absent from the request body
    MissingCoordinates,

    /// Request body is not a JSON object of the expected shape
    InvalidBody(JsonRejection),

    /// Requested file does not exist (yet)
    NotFound(String),

    /// Render or persistence failure
    Render(RenderError),

    /// Unexpected I/O failure while serving a file
    Io(String),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidBody(rejection)
    }
}

impl From<RenderError> for ApiError {
    fn from(err: RenderError) -> Self {
        ApiError::Render(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match &self {
            ApiError::MissingCoordinates => (
                StatusCode::BAD_REQUEST,
                "invalid_request",
                "Latitude and longitude are required.".to_string(),
            ),
            ApiError::InvalidBody(rejection) => {
                (rejection.status(), "invalid_body", rejection.body_text())
            }
            ApiError::NotFound(what) => (
                StatusCode::NOT_FOUND,
                "not_found",
                format!("Not found: {}", what),
            ),
            ApiError::Render(err @ RenderError::InvalidCoordinate { .. }) => {
                (StatusCode::BAD_REQUEST, "invalid_coordinate", err.to_string())
            }
            ApiError::Render(err @ RenderError::Persist(_)) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "persist_error",
                err.to_string(),
            ),
            ApiError::Io(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "io_error",
                format!("I/O error: {}", msg),
            ),
        };

        if status.is_server_error() {
            error!(
                error_type = error_type,
                status = status.as_u16(),
                "Server error: {}",
                message
            );
        } else if status == StatusCode::NOT_FOUND {
            debug!(
                error_type = error_type,
                status = status.as_u16(),
                "Resource not found: {}",
                message
            );
        } else {
            warn!(
                error_type = error_type,
                status = status.as_u16(),
                "Client error: {}",
                message
            );
        }

        let error_response = ErrorResponse::with_status(error_type, message, status);
        (status, Json(error_response)).into_response()
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Handle map generation requests.
///
/// # Endpoint
///
/// `POST /generate-map`
///
/// # Request Body
///
/// ```json
/// { "latitude": 10.0, "longitude": -70.0 }
/// ```
///
/// # Response
///
/// - `200 OK`: map rendered and persisted; body lists the per-layer outcome
/// - `400 Bad Request`: coordinate missing or out of range, or malformed JSON
/// - `415 Unsupported Media Type`: body is not `application/json`
/// - `422 Unprocessable Entity`: a field has the wrong type
/// - `500 Internal Server Error`: the map could not be written
///
/// Individual layer failures never fail the request.
pub async fn generate_map_handler<C: TileClient + 'static>(
    State(state): State<AppState<C>>,
    body: Result<Json<GenerateMapRequest>, JsonRejection>,
) -> Result<Json<GenerateMapResponse>, ApiError> {
    let Json(body) = body?;
    let (Some(latitude), Some(longitude)) = (body.latitude, body.longitude) else {
        return Err(ApiError::MissingCoordinates);
    };

    let outcome = state.renderer.render_map(latitude, longitude).await?;

    {
        let _guard = state.persist_lock.lock().await;
        outcome.map.persist(&state.output_dir).await?;
    }

    Ok(Json(GenerateMapResponse {
        message: "Interactive map generated successfully.".to_string(),
        map_url: MAP_URL.to_string(),
        overlays: outcome.composited(),
        layers: outcome.layers,
    }))
}

/// Serve the last rendered map.
///
/// # Endpoint
///
/// `GET /interactive_map.html`
pub async fn map_handler<C: TileClient + 'static>(
    State(state): State<AppState<C>>,
) -> Result<Html<String>, ApiError> {
    let path = state.output_dir.join(MAP_HTML_FILE);
    match tokio::fs::read_to_string(&path).await {
        Ok(html) => Ok(Html(html)),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            Err(ApiError::NotFound("no map has been rendered yet".to_string()))
        }
        Err(e) => Err(ApiError::Io(e.to_string())),
    }
}

/// Serve an overlay image referenced by the rendered map.
///
/// # Endpoint
///
/// `GET /temp_tiles/{file}`
pub async fn tile_image_handler<C: TileClient + 'static>(
    State(state): State<AppState<C>>,
    Path(file): Path<String>,
) -> Result<Response, ApiError> {
    if !is_tile_file_name(&file) {
        return Err(ApiError::NotFound(file));
    }

    let path = state.output_dir.join(TILE_DIR).join(&file);
    match tokio::fs::read(&path).await {
        Ok(data) => Ok(([(header::CONTENT_TYPE, "image/png")], data).into_response()),
        Err(e) if e.kind() == ErrorKind::NotFound => Err(ApiError::NotFound(file)),
        Err(e) => Err(ApiError::Io(e.to_string())),
    }
}

/// Handle health check requests.
///
/// # Endpoint
///
/// `GET /health`
///
/// # Response
///
/// `200 OK` with JSON body:
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0"
/// }
/// ```
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
