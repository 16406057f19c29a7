//! Server configuration from environment.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use geotrace_core::terrain::{DEFAULT_EXPIRATION, DEFAULT_TOLERANCE_DEG};
use geotrace_core::{tolerance_degrees, AltitudeMode, EngineConfig, TerrainSettings};
use geotrace_elevation::GridBounds;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_port: u16,
    /// Elevation API base URL; empty means flat terrain
    pub elevation_url: String,
    pub elevation_timeout_s: u64,
    /// Flat terrain height used when no elevation URL is set
    pub flat_elevation_m: f64,
    /// Preload a terrain grid over these bounds instead of querying per point
    pub terrain_grid_bounds: Option<GridBounds>,
    pub terrain_grid_spacing_m: f64,
    pub terrain_grid_max_points: usize,
    pub altitude_mode: AltitudeMode,
    /// Cache tolerance in meters (converted at the equator); unset keeps the default
    pub terrain_tolerance_m: Option<f64>,
    pub terrain_cache_minutes: f64,
    pub terrain_cache_max_entries: usize,
    pub terrain_prune_interval_s: u64,
    pub frame_hz: u32,
    pub animation_ms: u64,
    pub station_animation_ms: u64,
    pub command_buffer: usize,
    pub stream_buffer: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            elevation_url: String::new(),
            elevation_timeout_s: 5,
            flat_elevation_m: 0.0,
            terrain_grid_bounds: None,
            terrain_grid_spacing_m: 30.0,
            terrain_grid_max_points: 2500,
            altitude_mode: AltitudeMode::GroundReference,
            terrain_tolerance_m: None,
            terrain_cache_minutes: DEFAULT_EXPIRATION.as_secs_f64() / 60.0,
            terrain_cache_max_entries: 10_000,
            terrain_prune_interval_s: 60,
            frame_hz: 60,
            animation_ms: 300,
            station_animation_ms: 0,
            command_buffer: 256,
            stream_buffer: 1024,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server_port: env_parse("GEOTRACE_PORT", defaults.server_port),
            elevation_url: env::var("GEOTRACE_ELEVATION_URL")
                .map(|value| value.trim().to_string())
                .unwrap_or(defaults.elevation_url),
            elevation_timeout_s: env_parse("GEOTRACE_ELEVATION_TIMEOUT_S", defaults.elevation_timeout_s),
            flat_elevation_m: env_parse("GEOTRACE_FLAT_ELEVATION_M", defaults.flat_elevation_m),
            terrain_grid_bounds: env_setting("GEOTRACE_TERRAIN_GRID", GridBounds::parse),
            terrain_grid_spacing_m: env_parse("GEOTRACE_TERRAIN_GRID_SPACING_M", defaults.terrain_grid_spacing_m),
            terrain_grid_max_points: env_parse("GEOTRACE_TERRAIN_GRID_MAX_POINTS", defaults.terrain_grid_max_points),
            altitude_mode: env_setting("GEOTRACE_ALTITUDE_MODE", AltitudeMode::parse)
                .unwrap_or(defaults.altitude_mode),
            terrain_tolerance_m: env_setting("GEOTRACE_TERRAIN_TOLERANCE_M", |raw| {
                raw.parse::<f64>().ok().filter(|meters| meters.is_finite())
            }),
            terrain_cache_minutes: env_parse("GEOTRACE_TERRAIN_CACHE_MINUTES", defaults.terrain_cache_minutes),
            terrain_cache_max_entries: env_parse(
                "GEOTRACE_TERRAIN_CACHE_MAX_ENTRIES",
                defaults.terrain_cache_max_entries,
            ),
            terrain_prune_interval_s: env_parse("GEOTRACE_TERRAIN_PRUNE_INTERVAL_S", defaults.terrain_prune_interval_s),
            frame_hz: env_parse("GEOTRACE_FRAME_HZ", defaults.frame_hz),
            animation_ms: env_parse("GEOTRACE_ANIMATION_MS", defaults.animation_ms),
            station_animation_ms: env_parse("GEOTRACE_STATION_ANIMATION_MS", defaults.station_animation_ms),
            command_buffer: env_parse("GEOTRACE_COMMAND_BUFFER", defaults.command_buffer),
            stream_buffer: env_parse("GEOTRACE_STREAM_BUFFER", defaults.stream_buffer),
        }
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            animation_duration: Duration::from_millis(self.animation_ms),
            station_animation_duration: Duration::from_millis(self.station_animation_ms),
            altitude_mode: self.altitude_mode,
            ..EngineConfig::default()
        }
    }

    pub fn terrain_settings(&self) -> TerrainSettings {
        let tolerance_deg = self
            .terrain_tolerance_m
            .map(|meters| tolerance_degrees(meters, 0.0))
            .unwrap_or(DEFAULT_TOLERANCE_DEG);
        let minutes = if self.terrain_cache_minutes.is_finite() {
            self.terrain_cache_minutes.max(0.0)
        } else {
            0.0
        };
        TerrainSettings {
            tolerance_deg,
            expiration: Duration::from_secs_f64(minutes * 60.0),
            max_entries: self.terrain_cache_max_entries.max(1),
        }
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.frame_hz.clamp(1, 240)))
    }
}

fn env_parse<T: FromStr>(key: &str, default: T) -> T {
    env_setting(key, |raw| raw.parse().ok()).unwrap_or(default)
}

/// Read and parse `key`. Unset or blank is `None`; a value that does not
/// parse is `None` with a warning.
fn env_setting<T>(key: &str, parse: impl FnOnce(&str) -> Option<T>) -> Option<T> {
    let raw = env::var(key).ok()?;
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let parsed = parse(trimmed);
    if parsed.is_none() {
        tracing::warn!(key, value = %raw, "unparseable config value, using default");
    }
    parsed
}
