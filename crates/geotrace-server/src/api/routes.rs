//! REST API routes.

use axum::{
    extract::{Path, State},
    http::{HeaderName, StatusCode},
    response::IntoResponse,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

use geotrace_core::{GeoPoint, Orientation, RenderHandle, Renderable, TrackedKind, TrackedObjectInfo};

use crate::api::error::ApiError;
use crate::api::ws;
use crate::state::AppState;

/// Stream sequence number a scene snapshot is current up to.
pub const STREAM_SEQ_HEADER: HeaderName = HeaderName::from_static("x-stream-seq");

/// Create the API router.
pub fn create_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health))
        .route("/v1/objects", get(list_objects).post(add_object))
        .route("/v1/objects/:id", delete(remove_object))
        .route("/v1/objects/:id/position", post(update_position))
        .route("/v1/objects/:id/route", put(set_route).delete(remove_route))
        .route("/v1/objects/:id/live-path", delete(remove_live_path))
        .route("/v1/objects/:id/live-path/reset", post(reset_live_path))
        .route("/v1/objects/:id/orientation", put(set_orientation))
        .route("/v1/objects/:id/payload/rotate", post(rotate_payload))
        .route("/v1/objects/:id/payload/target", put(point_payload))
        .route("/v1/follow", post(follow))
        .route("/v1/scene", get(scene))
        .route("/v1/terrain", get(terrain_status))
        .route("/v1/terrain/tolerance", post(set_tolerance))
        .route("/v1/terrain/expiration", post(set_expiration))
        .route("/v1/terrain/cache", delete(clear_terrain_cache))
        .route("/v1/stream", get(ws::ws_handler))
}

// === Request/Response types ===

#[derive(Debug, Deserialize)]
pub struct AddObjectRequest {
    pub id: String,
    #[serde(default)]
    pub kind: TrackedKind,
    pub lon: f64,
    pub lat: f64,
    /// Altitude relative to the ground reference
    #[serde(alias = "altitude_m")]
    pub alt: f64,
}

#[derive(Debug, Deserialize)]
pub struct PositionRequest {
    pub lon: f64,
    pub lat: f64,
    #[serde(alias = "altitude_m")]
    pub alt: f64,
    #[serde(default)]
    pub flight_path_enabled: bool,
    /// Telemetry value that colors the live path
    #[serde(default)]
    pub scalar: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct RouteRequest {
    pub lons: Vec<f64>,
    pub lats: Vec<f64>,
    pub alts: Vec<f64>,
}

#[derive(Debug, Deserialize)]
pub struct FollowRequest {
    pub id: Option<String>,
}

/// Absolute heading, pitch and roll in degrees.
#[derive(Debug, Deserialize)]
pub struct OrientationRequest {
    pub heading: f64,
    #[serde(default)]
    pub pitch: f64,
    #[serde(default)]
    pub roll: f64,
}

/// Euler increments in degrees.
#[derive(Debug, Deserialize)]
pub struct RotateRequest {
    #[serde(default)]
    pub yaw: f64,
    #[serde(default)]
    pub pitch: f64,
    #[serde(default)]
    pub roll: f64,
}

#[derive(Debug, Deserialize)]
pub struct PayloadTargetRequest {
    pub id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ToleranceRequest {
    pub meters: f64,
    /// Latitude at which meters are converted to degrees
    #[serde(default)]
    pub latitude: f64,
}

#[derive(Debug, Deserialize)]
pub struct ExpirationRequest {
    pub minutes: f64,
}

#[derive(Debug, Serialize)]
pub struct SceneItem {
    pub handle: RenderHandle,
    #[serde(flatten)]
    pub renderable: Renderable,
}

#[derive(Debug, Serialize)]
pub struct TerrainStatus {
    pub tolerance_deg: f64,
    pub expiration_s: f64,
    pub max_entries: usize,
    pub cached_entries: usize,
}

fn validate_point(point: &GeoPoint) -> Result<(), ApiError> {
    if !point.is_finite() {
        return Err(ApiError::Invalid("coordinates must be finite".to_string()));
    }
    if !(-90.0..=90.0).contains(&point.lat) || !(-180.0..=180.0).contains(&point.lon) {
        return Err(ApiError::Invalid(format!(
            "coordinates out of range (lon={}, lat={})",
            point.lon, point.lat
        )));
    }
    Ok(())
}

// === Handlers ===

async fn health() -> &'static str {
    "OK"
}

async fn list_objects(State(state): State<Arc<AppState>>) -> Result<Json<Vec<TrackedObjectInfo>>, ApiError> {
    Ok(Json(state.engine().list_objects().await?))
}

async fn add_object(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AddObjectRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    let id = request.id.trim().to_string();
    if id.is_empty() {
        return Err(ApiError::Invalid("id must not be empty".to_string()));
    }
    let point = GeoPoint::new(request.lon, request.lat, request.alt);
    validate_point(&point)?;

    state.engine().add_object(id.clone(), request.kind, point).await?;
    Ok((StatusCode::CREATED, Json(json!({ "id": id, "kind": request.kind }))))
}

async fn remove_object(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.engine().remove_object(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn update_position(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(request): Json<PositionRequest>,
) -> Result<StatusCode, ApiError> {
    let point = GeoPoint::new(request.lon, request.lat, request.alt);
    validate_point(&point)?;
    state
        .engine()
        .update_position(id, point, request.flight_path_enabled, request.scalar)
        .await?;
    Ok(StatusCode::ACCEPTED)
}

async fn set_route(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(request): Json<RouteRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    // Length mismatches are reported by the engine
    for ((lon, lat), alt) in request.lons.iter().zip(&request.lats).zip(&request.alts) {
        validate_point(&GeoPoint::new(*lon, *lat, *alt))?;
    }
    let waypoints = state
        .engine()
        .set_route(id, request.lons, request.lats, request.alts)
        .await?;
    Ok(Json(json!({ "waypoints": waypoints })))
}

async fn remove_route(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.engine().remove_route(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn remove_live_path(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.engine().remove_live_path(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn reset_live_path(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.engine().reset_live_path(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn follow(
    State(state): State<Arc<AppState>>,
    Json(request): Json<FollowRequest>,
) -> Result<StatusCode, ApiError> {
    state.engine().follow(request.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn set_orientation(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(request): Json<OrientationRequest>,
) -> Result<Json<Orientation>, ApiError> {
    let orientation = Orientation::new(request.heading, request.pitch, request.roll);
    if !orientation.is_finite() {
        return Err(ApiError::Invalid("orientation must be finite".to_string()));
    }
    state.engine().set_orientation(id, orientation).await?;
    Ok(Json(orientation))
}

async fn rotate_payload(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(request): Json<RotateRequest>,
) -> Result<Json<Orientation>, ApiError> {
    if ![request.yaw, request.pitch, request.roll].iter().all(|v| v.is_finite()) {
        return Err(ApiError::Invalid("rotation must be finite".to_string()));
    }
    let orientation = state
        .engine()
        .rotate_payload(id, request.yaw, request.pitch, request.roll)
        .await?;
    Ok(Json(orientation))
}

async fn point_payload(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(request): Json<PayloadTargetRequest>,
) -> Result<StatusCode, ApiError> {
    state.engine().point_payload(id, request.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Live scene as a JSON array; `x-stream-seq` tells stream clients which
/// messages the snapshot already contains.
async fn scene(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    let snapshot = state.engine().snapshot().await?;
    let items: Vec<SceneItem> = snapshot
        .items
        .into_iter()
        .map(|(handle, renderable)| SceneItem { handle, renderable })
        .collect();
    Ok(([(STREAM_SEQ_HEADER, snapshot.seq.to_string())], Json(items)))
}

fn terrain_status_of(state: &AppState) -> TerrainStatus {
    let settings = state.resolver().settings();
    TerrainStatus {
        tolerance_deg: settings.tolerance_deg,
        expiration_s: settings.expiration.as_secs_f64(),
        max_entries: settings.max_entries,
        cached_entries: state.resolver().cache_len(),
    }
}

async fn terrain_status(State(state): State<Arc<AppState>>) -> Json<TerrainStatus> {
    Json(terrain_status_of(&state))
}

async fn set_tolerance(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ToleranceRequest>,
) -> Result<Json<TerrainStatus>, ApiError> {
    if !request.meters.is_finite() || !request.latitude.is_finite() {
        return Err(ApiError::Invalid("tolerance must be finite".to_string()));
    }
    state.resolver().set_tolerance_meters(request.meters, request.latitude);
    Ok(Json(terrain_status_of(&state)))
}

async fn set_expiration(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ExpirationRequest>,
) -> Result<Json<TerrainStatus>, ApiError> {
    if !request.minutes.is_finite() || request.minutes < 0.0 {
        return Err(ApiError::Invalid("minutes must be a non-negative number".to_string()));
    }
    state.resolver().set_expiration(request.minutes);
    Ok(Json(terrain_status_of(&state)))
}

async fn clear_terrain_cache(State(state): State<Arc<AppState>>) -> StatusCode {
    let cleared = state.resolver().cache_len();
    state.resolver().clear_cache();
    tracing::info!(cleared, "terrain cache cleared");
    StatusCode::NO_CONTENT
}
