//! Open-Meteo client against a local stand-in server.

use axum::{extract::Query, http::StatusCode, routing::get, Json, Router};
use geotrace_core::{ElevationError, ElevationProvider, GeoPoint, TerrainHeightResolver};
use geotrace_elevation::{GridBounds, OpenMeteoElevation};
use serde::Deserialize;
use std::time::Duration;
use tokio::net::TcpListener;

#[derive(Debug, Deserialize)]
struct ElevationQuery {
    latitude: String,
    longitude: String,
}

/// Elevation = latitude * 10, so answers are easy to check.
async fn elevation(Query(query): Query<ElevationQuery>) -> Json<serde_json::Value> {
    let heights: Vec<f64> = query
        .latitude
        .split(',')
        .map(|lat| lat.parse::<f64>().unwrap_or(0.0) * 10.0)
        .collect();
    assert_eq!(heights.len(), query.longitude.split(',').count());
    Json(serde_json::json!({ "elevation": heights }))
}

async fn spawn(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}/v1/elevation", addr)
}

fn client(url: String) -> OpenMeteoElevation {
    OpenMeteoElevation::new(url, Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn single_point_height() {
    let url = spawn(Router::new().route("/v1/elevation", get(elevation))).await;
    let provider = client(url);

    let height = provider.sample_height(GeoPoint::new(10.0, 55.0, 0.0)).await.unwrap();

    assert_eq!(height, Some(550.0));
}

#[tokio::test]
async fn batch_is_split_into_requests() {
    let url = spawn(Router::new().route("/v1/elevation", get(elevation))).await;
    let provider = client(url).with_max_points_per_request(3);

    let points: Vec<_> = (0..7).map(|i| GeoPoint::new(10.0, i as f64, 0.0)).collect();
    let heights = provider.sample_batch(&points).await.unwrap();

    let expected: Vec<_> = (0..7).map(|i| Some(i as f64 * 10.0)).collect();
    assert_eq!(heights, expected);
}

#[tokio::test]
async fn http_error_is_reported_and_resolver_falls_back() {
    let router = Router::new().route(
        "/v1/elevation",
        get(|| async { (StatusCode::TOO_MANY_REQUESTS, "slow down") }),
    );
    let url = spawn(router).await;
    let provider = client(url);

    let err = provider.sample_height(GeoPoint::new(10.0, 55.0, 0.0)).await.unwrap_err();
    assert_eq!(err, ElevationError::Status(429));

    let resolver = TerrainHeightResolver::new(provider);
    assert_eq!(resolver.resolve_height(10.0, 55.0).await, 0.0);
}

#[tokio::test]
async fn malformed_body_is_decode_error() {
    let router = Router::new().route("/v1/elevation", get(|| async { "not json" }));
    let provider = client(spawn(router).await);

    let err = provider.sample_height(GeoPoint::new(10.0, 55.0, 0.0)).await.unwrap_err();
    assert!(matches!(err, ElevationError::Decode(_)));
}

#[tokio::test]
async fn grid_fetch_samples_every_lattice_point() {
    let url = spawn(Router::new().route("/v1/elevation", get(elevation))).await;
    let provider = client(url).with_max_points_per_request(50);
    let bounds = GridBounds {
        min_lon: 10.0,
        min_lat: 55.0,
        max_lon: 10.002,
        max_lat: 55.002,
    };

    let grid = provider.fetch_grid(bounds, 50.0, 400).await.unwrap();

    assert!(grid.layout().len() <= 400);
    let height = grid.sample(10.001, 55.001);
    assert!((height - 550.01).abs() < 0.01, "height {height}");
}
