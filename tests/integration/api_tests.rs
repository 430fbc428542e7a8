//! API integration tests for map generation and serving.
//!
//! Tests verify:
//! - POST /generate-map success and validation errors
//! - Serving the rendered map and its overlay images
//! - HTTP response codes, headers and JSON bodies

use std::path::Path;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use wmts_overlay::render::{RenderConfig, DEFAULT_LAYERS};
use wmts_overlay::{create_router, RouterConfig};

use super::test_utils::{is_valid_png, mock_renderer, png_store, MockResponse, MockTileClient};

// =============================================================================
// Helpers
// =============================================================================

/// Router whose store supports the first three default layers; the second one
/// is rejected by the tile endpoint.
fn test_router(output_dir: &Path) -> Router {
    let store = png_store(&DEFAULT_LAYERS[..3]);
    let client = MockTileClient::new()
        .with_png_layers(&[DEFAULT_LAYERS[0], DEFAULT_LAYERS[2]])
        .with_response(DEFAULT_LAYERS[1], MockResponse::Status(500));
    let renderer = mock_renderer(store, client, RenderConfig::default());

    create_router(
        renderer,
        output_dir.to_path_buf(),
        RouterConfig::new().with_tracing(false),
    )
}

fn generate_request(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/generate-map")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

// =============================================================================
// Map Generation
// =============================================================================

#[tokio::test]
async fn test_generate_map_success() {
    let dir = tempfile::tempdir().unwrap();
    let router = test_router(dir.path());

    let response = router
        .oneshot(generate_request(r#"{"latitude": 10.0, "longitude": -70.0}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["message"], "Interactive map generated successfully.");
    assert_eq!(json["map_url"], "/interactive_map.html");
    assert_eq!(json["overlays"], 2);

    let layers = json["layers"].as_array().unwrap();
    assert_eq!(layers.len(), DEFAULT_LAYERS.len());
    assert_eq!(layers[0]["status"], "composited");
    assert!(layers[0].get("reason").is_none());
    assert_eq!(layers[1]["status"], "skipped");
    assert!(layers[1]["reason"].as_str().unwrap().contains("500"));
    assert_eq!(layers[7]["layer_id"], DEFAULT_LAYERS[7]);

    assert!(dir.path().join("interactive_map.html").exists());
    assert!(dir.path().join("interactive_map.json").exists());
}

#[tokio::test]
async fn test_generate_map_missing_coordinates() {
    let dir = tempfile::tempdir().unwrap();

    for body in [r#"{}"#, r#"{"latitude": 10.0}"#, r#"{"longitude": -70.0}"#] {
        let response = test_router(dir.path())
            .oneshot(generate_request(body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let json = body_json(response).await;
        assert_eq!(json["error"], "invalid_request");
        assert_eq!(json["message"], "Latitude and longitude are required.");
        assert_eq!(json["status"], 400);
    }

    // Nothing was written for rejected requests.
    assert!(!dir.path().join("interactive_map.html").exists());
}

#[tokio::test]
async fn test_generate_map_out_of_range_coordinate() {
    let dir = tempfile::tempdir().unwrap();
    let router = test_router(dir.path());

    let response = router
        .oneshot(generate_request(r#"{"latitude": 95.0, "longitude": 0.0}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "invalid_coordinate");
    assert!(json["message"].as_str().unwrap().contains("latitude"));
}

#[tokio::test]
async fn test_generate_map_malformed_body() {
    let dir = tempfile::tempdir().unwrap();
    let router = test_router(dir.path());

    let response = router
        .oneshot(generate_request("latitude=10&longitude=-70"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "invalid_body");
    assert_eq!(json["status"], 400);
    assert!(!json["message"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_generate_map_wrong_field_type() {
    let dir = tempfile::tempdir().unwrap();
    let router = test_router(dir.path());

    let response = router
        .oneshot(generate_request(r#"{"latitude": "x", "longitude": 1}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = body_json(response).await;
    assert_eq!(json["error"], "invalid_body");
    assert_eq!(json["status"], 422);
}

#[tokio::test]
async fn test_generate_map_wrong_content_type() {
    let dir = tempfile::tempdir().unwrap();
    let router = test_router(dir.path());

    let request = Request::builder()
        .method("POST")
        .uri("/generate-map")
        .header("content-type", "text/plain")
        .body(Body::from(r#"{"latitude": 10.0, "longitude": -70.0}"#))
        .unwrap();
    let response = router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "application/json"
    );
    let json = body_json(response).await;
    assert_eq!(json["error"], "invalid_body");
    assert_eq!(json["status"], 415);

    // Nothing was written for rejected requests.
    assert!(!dir.path().join("interactive_map.html").exists());
}

#[tokio::test]
async fn test_generate_map_persist_failure() {
    let dir = tempfile::tempdir().unwrap();
    // A regular file where the output directory should be.
    let blocked = dir.path().join("not-a-dir");
    std::fs::write(&blocked, b"").unwrap();
    let router = test_router(&blocked);

    let response = router
        .oneshot(generate_request(r#"{"latitude": 10.0, "longitude": -70.0}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert_eq!(json["error"], "persist_error");
}

// =============================================================================
// Map and Tile Serving
// =============================================================================

#[tokio::test]
async fn test_map_not_found_before_render() {
    let dir = tempfile::tempdir().unwrap();
    let router = test_router(dir.path());

    let response = router
        .oneshot(get_request("/interactive_map.html"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["error"], "not_found");
}

#[tokio::test]
async fn test_map_served_after_render() {
    let dir = tempfile::tempdir().unwrap();
    let router = test_router(dir.path());

    let response = router
        .clone()
        .oneshot(generate_request(r#"{"latitude": 10.0, "longitude": -70.0}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = router
        .clone()
        .oneshot(get_request("/interactive_map.html"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap()
        .starts_with("text/html"));

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let html = String::from_utf8(body.to_vec()).unwrap();
    assert!(html.contains("setView([10, -70], 5)"));
    assert!(html.contains(DEFAULT_LAYERS[0]));
    assert!(html.contains(DEFAULT_LAYERS[2]));

    // Second overlay in the map, so position 01.
    let tile_uri = format!("/temp_tiles/01_{}.png", DEFAULT_LAYERS[2]);
    assert!(html.contains(&tile_uri[1..]));
    let response = router.oneshot(get_request(&tile_uri)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers().get("content-type").unwrap(), "image/png");

    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert!(is_valid_png(&body));
}

#[tokio::test]
async fn test_tile_image_rejects_unsafe_names() {
    let dir = tempfile::tempdir().unwrap();
    let router = test_router(dir.path());

    for uri in [
        "/temp_tiles/..",
        "/temp_tiles/%2E%2E",
        "/temp_tiles/interactive_map.html",
        "/temp_tiles/missing.png",
    ] {
        let response = router.clone().oneshot(get_request(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "uri: {}", uri);
    }
}

// =============================================================================
// Health and CORS
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let dir = tempfile::tempdir().unwrap();
    let router = test_router(dir.path());

    let response = router.oneshot(get_request("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_cors_headers_present() {
    let dir = tempfile::tempdir().unwrap();
    let router = test_router(dir.path());

    let request = Request::builder()
        .uri("/health")
        .header("origin", "https://example.com")
        .body(Body::empty())
        .unwrap();
    let response = router.oneshot(request).await.unwrap();

    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .unwrap(),
        "*"
    );
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let router = test_router(dir.path());

    let response = router.oneshot(get_request("/tiles/x/0/0/0.jpg")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
