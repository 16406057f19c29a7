//! Terrain height resolution with spatial-tolerance caching.
//!
//! Two modes share one resolver:
//! - continuous: every query goes through the tolerance cache, so repeated
//!   nearby queries cost one provider round trip per expiration window;
//! - ground reference: one resolution per track, kept for the whole session
//!   and reused as a flat offset for every altitude of that track.

use dashmap::DashMap;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::time::Instant;

use crate::cache::{prune_cache, CacheEntry};
use crate::error::ElevationError;
use crate::models::GeoPoint;
use crate::spatial::tolerance_degrees;

/// Default lon/lat tolerance (~2 m).
pub const DEFAULT_TOLERANCE_DEG: f64 = 0.00003;
/// Default cache expiration.
pub const DEFAULT_EXPIRATION: Duration = Duration::from_secs(5 * 60);

/// Source of ground elevation samples.
///
/// `Ok(None)` means the provider had no data for the point.
pub trait ElevationProvider: Send + Sync {
    fn sample_height(&self, point: GeoPoint) -> BoxFuture<'_, Result<Option<f64>, ElevationError>>;
}

impl<P: ElevationProvider + ?Sized> ElevationProvider for Arc<P> {
    fn sample_height(&self, point: GeoPoint) -> BoxFuture<'_, Result<Option<f64>, ElevationError>> {
        (**self).sample_height(point)
    }
}

impl<P: ElevationProvider + ?Sized> ElevationProvider for Box<P> {
    fn sample_height(&self, point: GeoPoint) -> BoxFuture<'_, Result<Option<f64>, ElevationError>> {
        (**self).sample_height(point)
    }
}

/// Provider that reports the same height everywhere.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlatElevation(pub f64);

impl ElevationProvider for FlatElevation {
    fn sample_height(&self, _point: GeoPoint) -> BoxFuture<'_, Result<Option<f64>, ElevationError>> {
        let height = self.0;
        Box::pin(async move { Ok(Some(height)) })
    }
}

/// How a relative altitude becomes an absolute one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AltitudeMode {
    /// Resolve terrain under every point (tolerance cached)
    Continuous,
    /// Resolve once per track and reuse as a constant offset
    #[default]
    GroundReference,
    /// Altitudes are already absolute
    Absolute,
}

impl AltitudeMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "continuous" | "terrain" => Some(Self::Continuous),
            "ground-ref" | "ground_ref" | "ground_reference" | "constant" => {
                Some(Self::GroundReference)
            }
            "absolute" | "amsl" => Some(Self::Absolute),
            _ => None,
        }
    }
}

/// Tunables of the tolerance cache.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TerrainSettings {
    /// Lon/lat tolerance in degrees; 0 means exact match only
    pub tolerance_deg: f64,
    /// Entries at least this old are ignored and pruned
    pub expiration: Duration,
    /// Upper bound on cached entries
    pub max_entries: usize,
}

impl Default for TerrainSettings {
    fn default() -> Self {
        Self {
            tolerance_deg: DEFAULT_TOLERANCE_DEG,
            expiration: DEFAULT_EXPIRATION,
            max_entries: 10_000,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct TerrainCacheEntry {
    lon: f64,
    lat: f64,
    height: f64,
    inserted_at: Instant,
}

impl CacheEntry for TerrainCacheEntry {
    fn inserted_at(&self) -> Instant {
        self.inserted_at
    }
}

/// Shared terrain height service. All methods take `&self`; wrap in `Arc`.
pub struct TerrainHeightResolver {
    provider: Box<dyn ElevationProvider>,
    settings: Mutex<TerrainSettings>,
    cache: DashMap<String, TerrainCacheEntry>,
    ground_refs: DashMap<String, f64>,
}

impl TerrainHeightResolver {
    pub fn new(provider: impl ElevationProvider + 'static) -> Self {
        Self::with_settings(provider, TerrainSettings::default())
    }

    pub fn with_settings(provider: impl ElevationProvider + 'static, settings: TerrainSettings) -> Self {
        Self {
            provider: Box::new(provider),
            settings: Mutex::new(settings),
            cache: DashMap::new(),
            ground_refs: DashMap::new(),
        }
    }

    pub fn settings(&self) -> TerrainSettings {
        *self.settings.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn update_settings(&self, apply: impl FnOnce(&mut TerrainSettings)) {
        let mut guard = self.settings.lock().unwrap_or_else(PoisonError::into_inner);
        apply(&mut guard);
    }

    /// Ground elevation at `(lon, lat)` in meters. Never fails: provider
    /// errors and missing data resolve to 0.
    pub async fn resolve_height(&self, lon: f64, lat: f64) -> f64 {
        let settings = self.settings();
        if let Some(height) = self.lookup(lon, lat, &settings, Instant::now()) {
            tracing::trace!(lon, lat, height, "terrain cache hit");
            return height;
        }

        tracing::debug!(lon, lat, "terrain cache miss, sampling provider");
        let height = self.sample(lon, lat).await;

        let now = Instant::now();
        self.cache.insert(
            cache_key(lon, lat),
            TerrainCacheEntry {
                lon,
                lat,
                height,
                inserted_at: now,
            },
        );
        if self.cache.len() > settings.max_entries {
            let removed = prune_cache(&self.cache, settings.max_entries, settings.expiration, now);
            tracing::debug!(removed, "pruned terrain cache");
        }

        height
    }

    fn lookup(&self, lon: f64, lat: f64, settings: &TerrainSettings, now: Instant) -> Option<f64> {
        let tolerance = settings.tolerance_deg;
        self.cache.iter().find_map(|entry| {
            let cached = entry.value();
            let within = (cached.lon - lon).abs() <= tolerance && (cached.lat - lat).abs() <= tolerance;
            let fresh = now.saturating_duration_since(cached.inserted_at) < settings.expiration;
            (within && fresh).then_some(cached.height)
        })
    }

    async fn sample(&self, lon: f64, lat: f64) -> f64 {
        match self.provider.sample_height(GeoPoint::new(lon, lat, 0.0)).await {
            Ok(Some(height)) if height.is_finite() => height,
            Ok(Some(height)) => {
                tracing::error!(lon, lat, height, "terrain sample not finite, using 0");
                0.0
            }
            Ok(None) => {
                tracing::error!(lon, lat, "failed to sample terrain, no data");
                0.0
            }
            Err(err) => {
                tracing::error!(lon, lat, "failed to sample terrain: {}", err);
                0.0
            }
        }
    }

    /// Set the tolerance from meters, converted at `latitude`.
    pub fn set_tolerance_meters(&self, meters: f64, latitude: f64) {
        let degrees = tolerance_degrees(meters, latitude);
        tracing::debug!(meters, latitude, degrees, "terrain cache tolerance updated");
        self.update_settings(|settings| settings.tolerance_deg = degrees);
    }

    pub fn set_tolerance_degrees(&self, degrees: f64) {
        let degrees = if degrees.is_finite() { degrees.max(0.0) } else { 0.0 };
        self.update_settings(|settings| settings.tolerance_deg = degrees);
    }

    pub fn set_expiration(&self, minutes: f64) {
        let secs = if minutes.is_finite() { (minutes * 60.0).max(0.0) } else { 0.0 };
        self.update_settings(|settings| settings.expiration = Duration::from_secs_f64(secs));
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    /// Drop expired entries now instead of waiting for the size bound.
    pub fn prune(&self) -> usize {
        let settings = self.settings();
        prune_cache(&self.cache, settings.max_entries, settings.expiration, Instant::now())
    }

    /// Fix the ground reference of `track` at `(lon, lat)`.
    ///
    /// Resolves once; later calls return the stored value without touching the
    /// provider.
    pub async fn set_ground_ref(&self, track: &str, lon: f64, lat: f64) -> f64 {
        if let Some(existing) = self.ground_ref(track) {
            return existing;
        }
        let height = self.resolve_height(lon, lat).await;
        let stored = *self.ground_refs.entry(track.to_string()).or_insert(height);
        tracing::info!(track, lon, lat, ground_ref = stored, "ground reference established");
        stored
    }

    pub fn ground_ref(&self, track: &str) -> Option<f64> {
        self.ground_refs.get(track).map(|value| *value)
    }

    pub fn clear_ground_ref(&self, track: &str) {
        self.ground_refs.remove(track);
    }

    /// Turn a point with relative altitude into an absolute one.
    pub async fn absolute(&self, mode: AltitudeMode, track: &str, point: GeoPoint) -> GeoPoint {
        match mode {
            AltitudeMode::Absolute => point,
            AltitudeMode::Continuous => {
                let ground = self.resolve_height(point.lon, point.lat).await;
                point.with_alt(point.alt + ground)
            }
            AltitudeMode::GroundReference => {
                let ground = self.set_ground_ref(track, point.lon, point.lat).await;
                point.with_alt(point.alt + ground)
            }
        }
    }
}

fn cache_key(lon: f64, lat: f64) -> String {
    format!("{:.5},{:.5}", lon, lat)
}
