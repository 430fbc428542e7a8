//! Tile fetching tests against a local WMTS-like server.
//!
//! Tests verify:
//! - GetTile query parameters as received by the server
//! - Status, timeout and decode error classification of the reqwest client
//! - A full render over real HTTP

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use tokio::sync::RwLock;

use wmts_overlay::error::FetchError;
use wmts_overlay::fetch::{ReqwestTileClient, TileClient, TileFetcher, WmtsEndpoint};
use wmts_overlay::render::{MapRenderer, RenderConfig};
use wmts_overlay::resolve::{resolve, ResolvedTileRequest};

use super::test_utils::{is_valid_png, jpeg_tile, png_store, png_tile};

// =============================================================================
// Local Tile Server
// =============================================================================

type QueryLog = Arc<RwLock<Vec<HashMap<String, String>>>>;

/// Answer based on the requested layer:
/// - "broken" -> 500
/// - "slow" -> PNG after 2 seconds
/// - "garbage" -> 200 with a non-image body
/// - "photo" -> JPEG
/// - anything else -> PNG
async fn wmts_handler(
    State(log): State<QueryLog>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let layer = params.get("LAYER").cloned().unwrap_or_default();
    log.write().await.push(params);

    match layer.as_str() {
        "broken" => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        "slow" => {
            tokio::time::sleep(Duration::from_secs(2)).await;
            ([(header::CONTENT_TYPE, "image/png")], png_tile(4, 4)).into_response()
        }
        "garbage" => ([(header::CONTENT_TYPE, "image/png")], "not really a png").into_response(),
        "photo" => ([(header::CONTENT_TYPE, "image/jpeg")], jpeg_tile(16, 16)).into_response(),
        _ => ([(header::CONTENT_TYPE, "image/png")], png_tile(4, 4)).into_response(),
    }
}

/// Start a tile server on an ephemeral port and return its address and query log.
async fn spawn_tile_server() -> (SocketAddr, QueryLog) {
    let log: QueryLog = Arc::new(RwLock::new(Vec::new()));
    let app = Router::new()
        .route("/wmts.cgi", get(wmts_handler))
        .with_state(log.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (addr, log)
}

fn endpoint(addr: SocketAddr) -> WmtsEndpoint {
    WmtsEndpoint::new(format!("http://{}/wmts.cgi", addr))
}

fn request_for(layer: &str) -> ResolvedTileRequest {
    resolve(layer, &png_store(&[layer])).unwrap()
}

// =============================================================================
// Client
// =============================================================================

#[tokio::test]
async fn test_get_tile_query_parameters() {
    let (addr, log) = spawn_tile_server().await;
    let fetcher = TileFetcher::new(ReqwestTileClient::new().unwrap(), endpoint(addr));

    let raster = fetcher.fetch(&request_for("Coastlines_15m")).await.unwrap();
    assert_eq!(raster.dimensions(), (4, 4));

    let log = log.read().await;
    assert_eq!(log.len(), 1);
    let params = &log[0];
    assert_eq!(params["SERVICE"], "WMTS");
    assert_eq!(params["REQUEST"], "GetTile");
    assert_eq!(params["VERSION"], "1.0.0");
    assert_eq!(params["LAYER"], "Coastlines_15m");
    assert_eq!(params["STYLE"], "default");
    assert_eq!(params["TILEMATRIXSET"], "EPSG:4326_15m");
    assert_eq!(params["TILEMATRIX"], "3");
    assert_eq!(params["TILEROW"], "1");
    assert_eq!(params["TILECOL"], "1");
    assert_eq!(params["FORMAT"], "image/png");
}

#[tokio::test]
async fn test_server_error_is_remote_rejected() {
    let (addr, _log) = spawn_tile_server().await;
    let fetcher = TileFetcher::new(ReqwestTileClient::new().unwrap(), endpoint(addr));

    let err = fetcher.fetch(&request_for("broken")).await.unwrap_err();
    assert_eq!(err, FetchError::RemoteRejected(500));
}

#[tokio::test]
async fn test_unknown_path_is_remote_rejected() {
    let (addr, _log) = spawn_tile_server().await;
    let client = ReqwestTileClient::new().unwrap();

    let err = client
        .get(&format!("http://{}/nope", addr))
        .await
        .unwrap_err();
    assert_eq!(err, FetchError::RemoteRejected(404));
}

#[tokio::test]
async fn test_slow_tile_times_out() {
    let (addr, _log) = spawn_tile_server().await;
    let client = ReqwestTileClient::with_timeout(Duration::from_millis(200)).unwrap();
    let fetcher = TileFetcher::new(client, endpoint(addr));

    let err = fetcher.fetch(&request_for("slow")).await.unwrap_err();
    assert_eq!(err, FetchError::Timeout);
}

#[tokio::test]
async fn test_non_image_body_fails_to_decode() {
    let (addr, _log) = spawn_tile_server().await;
    let fetcher = TileFetcher::new(ReqwestTileClient::new().unwrap(), endpoint(addr));

    let err = fetcher.fetch(&request_for("garbage")).await.unwrap_err();
    assert!(matches!(err, FetchError::DecodeFailed(_)));
}

#[tokio::test]
async fn test_jpeg_tile_is_decoded() {
    let (addr, _log) = spawn_tile_server().await;
    let fetcher = TileFetcher::new(ReqwestTileClient::new().unwrap(), endpoint(addr));

    let raster = fetcher.fetch(&request_for("photo")).await.unwrap();
    assert_eq!(raster.dimensions(), (16, 16));
    assert!(is_valid_png(&raster.data));
}

// =============================================================================
// Render over HTTP
// =============================================================================

#[tokio::test]
async fn test_render_over_http() {
    let (addr, log) = spawn_tile_server().await;
    let layers = ["Coastlines_15m", "broken", "garbage", "GRUMP_Settlements"];

    let fetcher = TileFetcher::new(ReqwestTileClient::new().unwrap(), endpoint(addr));
    let renderer = MapRenderer::new(
        png_store(&layers),
        fetcher,
        RenderConfig::default().with_layers(layers.iter().chain(["unlisted"].iter()).copied()),
    );

    let outcome = renderer.render_map(10.0, -70.0).await.unwrap();

    assert_eq!(
        outcome.map.artifact.overlay_names(),
        vec!["Coastlines_15m", "GRUMP_Settlements"]
    );
    assert_eq!(outcome.skipped(), 3);

    // "unlisted" is not in the store, so only four requests were made.
    assert_eq!(log.read().await.len(), 4);
}
