//! Core data models for the telemetry path engine.

use serde::{Deserialize, Serialize};

use crate::spatial::{heading_pitch, WorldPosition};

/// Geodetic position as reported by a vehicle or station.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Longitude in degrees
    pub lon: f64,
    /// Latitude in degrees
    pub lat: f64,
    /// Altitude in meters
    #[serde(alias = "altitude_m")]
    pub alt: f64,
}

impl GeoPoint {
    pub fn new(lon: f64, lat: f64, alt: f64) -> Self {
        Self { lon, lat, alt }
    }

    /// Same horizontal position with a different altitude.
    pub fn with_alt(self, alt: f64) -> Self {
        Self { alt, ..self }
    }

    pub fn is_finite(&self) -> bool {
        self.lon.is_finite() && self.lat.is_finite() && self.alt.is_finite()
    }

    pub fn to_world(&self) -> WorldPosition {
        WorldPosition::from_degrees(self.lon, self.lat, self.alt)
    }
}

/// What kind of object a controller drives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackedKind {
    /// Aerial vehicle with live path, route and distance tracking
    #[default]
    Vehicle,
    /// Fixed ground station (antenna)
    Station,
}

/// Attitude in degrees. Heading runs clockwise from north, pitch is positive
/// above the local horizon, roll is positive right-wing-down.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Orientation {
    pub heading: f64,
    pub pitch: f64,
    pub roll: f64,
}

impl Orientation {
    /// Normalized: heading in `[0, 360)`, pitch clamped to `[-90, 90]`,
    /// roll in `[-180, 180)`.
    pub fn new(heading: f64, pitch: f64, roll: f64) -> Self {
        Self {
            heading: heading.rem_euclid(360.0),
            pitch: pitch.clamp(-90.0, 90.0),
            roll: (roll + 180.0).rem_euclid(360.0) - 180.0,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.heading.is_finite() && self.pitch.is_finite() && self.roll.is_finite()
    }

    /// Apply yaw/pitch/roll increments on top of the current attitude.
    pub fn rotated(self, yaw: f64, pitch: f64, roll: f64) -> Self {
        Self::new(self.heading + yaw, self.pitch + pitch, self.roll + roll)
    }

    /// Level attitude looking from `from` straight at `to`. `None` when the
    /// two coincide.
    pub fn facing(from: &WorldPosition, to: &WorldPosition) -> Option<Self> {
        heading_pitch(from, to).map(|(heading, pitch)| Self::new(heading, pitch, 0.0))
    }

    /// Largest per-axis difference in degrees, heading and roll taken the
    /// short way round.
    pub fn max_delta(&self, other: &Orientation) -> f64 {
        let wrap = |a: f64, b: f64| {
            let d = (a - b).rem_euclid(360.0);
            d.min(360.0 - d)
        };
        wrap(self.heading, other.heading)
            .max((self.pitch - other.pitch).abs())
            .max(wrap(self.roll, other.roll))
    }
}

/// RGBA color with components in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const RED: Color = Color::rgb(1.0, 0.0, 0.0);
    pub const GREEN: Color = Color::rgb(0.0, 0.502, 0.0);
    pub const BLUE: Color = Color::rgb(0.0, 0.0, 1.0);
    pub const YELLOW: Color = Color::rgb(1.0, 1.0, 0.0);
    pub const ORANGE: Color = Color::rgb(1.0, 0.647, 0.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    /// Build an opaque color from hue (degrees), saturation and value.
    pub fn from_hsv(hue_deg: f32, saturation: f32, value: f32) -> Self {
        let h = hue_deg.rem_euclid(360.0) / 60.0;
        let s = saturation.clamp(0.0, 1.0);
        let v = value.clamp(0.0, 1.0);
        let c = v * s;
        let x = c * (1.0 - (h.rem_euclid(2.0) - 1.0).abs());
        let m = v - c;
        let (r, g, b) = match h as u32 {
            0 => (c, x, 0.0),
            1 => (x, c, 0.0),
            2 => (0.0, c, x),
            3 => (0.0, x, c),
            4 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };
        Self::rgb(r + m, g + m, b + m)
    }

    /// Hue in degrees `[0, 360)`; `None` for greys.
    pub fn hue(&self) -> Option<f32> {
        let max = self.r.max(self.g).max(self.b);
        let min = self.r.min(self.g).min(self.b);
        let delta = max - min;
        if delta <= f32::EPSILON {
            return None;
        }
        let hue = if max == self.r {
            60.0 * ((self.g - self.b) / delta).rem_euclid(6.0)
        } else if max == self.g {
            60.0 * ((self.b - self.r) / delta + 2.0)
        } else {
            60.0 * ((self.r - self.g) / delta + 4.0)
        };
        Some(hue.rem_euclid(360.0))
    }
}

/// Running bounds of the telemetry scalar shown by the legend.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScalarRange {
    pub min: f64,
    pub max: f64,
}

impl ScalarRange {
    /// Empty range: `+inf / -inf` until the first value arrives.
    pub const EMPTY: ScalarRange = ScalarRange {
        min: f64::INFINITY,
        max: f64::NEG_INFINITY,
    };

    pub fn is_empty(&self) -> bool {
        self.min > self.max
    }

    /// Widen to include `value`. Returns true if the bounds moved.
    pub fn include(&mut self, value: f64) -> bool {
        let mut changed = false;
        if value < self.min {
            self.min = value;
            changed = true;
        }
        if value > self.max {
            self.max = value;
            changed = true;
        }
        changed
    }

    /// Position of `value` inside the range. A degenerate range maps to 0.5.
    pub fn normalize(&self, value: f64) -> f64 {
        let span = self.max - self.min;
        if self.is_empty() || span <= 0.0 || !span.is_finite() {
            return 0.5;
        }
        ((value - self.min) / span).clamp(0.0, 1.0)
    }
}

/// One point of a live path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySample {
    pub position: WorldPosition,
    pub scalar: Option<f64>,
    pub color: Color,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hsv_primary_hues() {
        let red = Color::from_hsv(0.0, 1.0, 1.0);
        assert!((red.r - 1.0).abs() < 1e-6 && red.g.abs() < 1e-6 && red.b.abs() < 1e-6);

        let blue = Color::from_hsv(240.0, 1.0, 1.0);
        assert!(blue.r.abs() < 1e-6 && blue.g.abs() < 1e-6 && (blue.b - 1.0).abs() < 1e-6);

        let hue = Color::from_hsv(120.0, 1.0, 1.0).hue().unwrap();
        assert!((hue - 120.0).abs() < 1e-3);
    }

    #[test]
    fn white_has_no_hue() {
        assert!(Color::WHITE.hue().is_none());
    }

    #[test]
    fn range_tracks_bounds_and_normalizes() {
        let mut range = ScalarRange::EMPTY;
        assert!(range.is_empty());
        assert!(range.include(5.0));
        assert!(!range.include(5.0));
        assert_eq!(range.normalize(5.0), 0.5);
        assert!(range.include(15.0));
        assert_eq!(range.normalize(10.0), 0.5);
        assert_eq!(range.normalize(15.0), 1.0);
        assert_eq!(range.normalize(5.0), 0.0);
    }

    #[test]
    fn geo_point_accepts_altitude_alias() {
        let point: GeoPoint =
            serde_json::from_str(r#"{"lon": 10.0, "lat": 55.0, "altitude_m": 12.5}"#).unwrap();
        assert_eq!(point, GeoPoint::new(10.0, 55.0, 12.5));
    }

    #[test]
    fn orientation_normalizes_and_accumulates() {
        let o = Orientation::new(370.0, 120.0, 190.0);
        assert_eq!(o.heading, 10.0);
        assert_eq!(o.pitch, 90.0);
        assert_eq!(o.roll, -170.0);

        let turned = Orientation::default().rotated(-30.0, 10.0, 0.0).rotated(-30.0, 5.0, 0.0);
        assert_eq!(turned, Orientation::new(300.0, 15.0, 0.0));
        assert_eq!(turned.max_delta(&Orientation::new(2.0, 15.0, 0.0)), 62.0);
    }

    #[test]
    fn facing_points_at_target() {
        let from = GeoPoint::new(10.0, 55.0, 100.0).to_world();
        let to = GeoPoint::new(10.001, 55.0, 100.0).to_world();
        let o = Orientation::facing(&from, &to).unwrap();
        assert!((o.heading - 90.0).abs() < 0.01);
        assert_eq!(o.roll, 0.0);
        assert!(Orientation::facing(&from, &from).is_none());
    }
}
