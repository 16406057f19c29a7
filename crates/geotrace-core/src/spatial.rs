//! Spatial math: geodetic to world conversion and degree/meter helpers.

use serde::{Deserialize, Serialize};

/// Meters per degree of latitude (and of longitude at the equator).
pub const METERS_PER_DEG_LAT: f64 = 111_320.0;

/// WGS-84 semi-major axis in meters
const WGS84_A: f64 = 6_378_137.0;
/// WGS-84 flattening
const WGS84_F: f64 = 1.0 / 298.257_223_563;
/// WGS-84 first eccentricity squared
const WGS84_E2: f64 = 2.0 * WGS84_F - WGS84_F * WGS84_F;

/// Earth-centred, Earth-fixed Cartesian position in meters.
///
/// This is the frame the globe renders in, so interpolation and distance math
/// happen here rather than on raw degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldPosition {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl WorldPosition {
    /// Raw constructor for local-frame math. Prefer [`WorldPosition::from_degrees`].
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Convert longitude/latitude (degrees) and height (meters) on the WGS-84
    /// ellipsoid.
    pub fn from_degrees(lon: f64, lat: f64, alt: f64) -> Self {
        let lat = lat.to_radians();
        let lon = lon.to_radians();
        let (sin_lat, cos_lat) = lat.sin_cos();
        let (sin_lon, cos_lon) = lon.sin_cos();

        let n = WGS84_A / (1.0 - WGS84_E2 * sin_lat * sin_lat).sqrt();

        Self {
            x: (n + alt) * cos_lat * cos_lon,
            y: (n + alt) * cos_lat * sin_lon,
            z: (n * (1.0 - WGS84_E2) + alt) * sin_lat,
        }
    }

    pub fn distance_to(&self, other: &WorldPosition) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// Componentwise linear interpolation; `t` is not clamped.
    pub fn lerp(&self, end: &WorldPosition, t: f64) -> WorldPosition {
        WorldPosition {
            x: self.x + (end.x - self.x) * t,
            y: self.y + (end.y - self.y) * t,
            z: self.z + (end.z - self.z) * t,
        }
    }

    pub fn midpoint(&self, other: &WorldPosition) -> WorldPosition {
        self.lerp(other, 0.5)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    /// Geodetic longitude and latitude in degrees (Bowring's method).
    pub fn lon_lat(&self) -> (f64, f64) {
        let b = WGS84_A * (1.0 - WGS84_F);
        let ep2 = (WGS84_A * WGS84_A - b * b) / (b * b);
        let p = self.x.hypot(self.y);
        let theta = (self.z * WGS84_A).atan2(p * b);
        let (sin_t, cos_t) = theta.sin_cos();
        let lat = (self.z + ep2 * b * sin_t.powi(3)).atan2(p - WGS84_E2 * WGS84_A * cos_t.powi(3));
        let lon = self.y.atan2(self.x);
        (lon.to_degrees(), lat.to_degrees())
    }
}

/// Heading (degrees clockwise from north) and pitch (degrees above the local
/// horizon) of the line of sight from `from` to `to`, measured in the
/// east-north-up frame at `from`. `None` when the points coincide.
pub fn heading_pitch(from: &WorldPosition, to: &WorldPosition) -> Option<(f64, f64)> {
    let (dx, dy, dz) = (to.x - from.x, to.y - from.y, to.z - from.z);
    if (dx * dx + dy * dy + dz * dz).sqrt() < 1e-9 {
        return None;
    }

    let (lon, lat) = from.lon_lat();
    let (sin_lat, cos_lat) = lat.to_radians().sin_cos();
    let (sin_lon, cos_lon) = lon.to_radians().sin_cos();

    let east = -sin_lon * dx + cos_lon * dy;
    let north = -sin_lat * cos_lon * dx - sin_lat * sin_lon * dy + cos_lat * dz;
    let up = cos_lat * cos_lon * dx + cos_lat * sin_lon * dy + sin_lat * dz;

    let heading = east.atan2(north).to_degrees().rem_euclid(360.0);
    let pitch = up.atan2(east.hypot(north)).to_degrees();
    Some((heading, pitch))
}

/// Meters per degree of longitude at `lat_deg`.
pub fn meters_per_deg_lon(lat_deg: f64) -> f64 {
    METERS_PER_DEG_LAT * lat_deg.to_radians().cos()
}

/// Convert a metric tolerance into a single degree tolerance usable on both
/// axes. The larger of the latitude and longitude conversions wins; zero or
/// negative input yields zero (exact match only).
pub fn tolerance_degrees(meters: f64, lat_deg: f64) -> f64 {
    if meters <= 0.0 || !meters.is_finite() {
        return 0.0;
    }
    let lat_tolerance = meters / METERS_PER_DEG_LAT;
    let lon_tolerance = meters / meters_per_deg_lon(lat_deg);
    if lon_tolerance.is_finite() {
        lat_tolerance.max(lon_tolerance)
    } else {
        lat_tolerance
    }
}
