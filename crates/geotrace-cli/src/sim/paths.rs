//! Simulated trajectories.

use rand::Rng;
use serde::Serialize;
use std::f64::consts::PI;

/// Interval between simulated samples.
pub const STEP_MS: u64 = 200;

/// Per-step drift on both axes while moving diagonally.
const DIAGONAL_STEP_DEG: f64 = 0.000005;
/// Per-step descent while dropping between legs.
const DESCENT_STEP_M: f64 = 0.2;
const DIAGONAL_MS: u64 = 5_000;
const DESCENT_MS: u64 = 1_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlightPhase {
    Diagonal,
    Descent,
}

/// Zig-zag flight: a diagonal leg, a short descent, then the next diagonal
/// leg in the opposite direction.
#[derive(Debug, Clone)]
pub struct ZigZagFlight {
    pub lon: f64,
    pub lat: f64,
    pub alt: f64,
    direction: f64,
    phase: FlightPhase,
    phase_elapsed_ms: u64,
}

impl ZigZagFlight {
    pub fn new(lon: f64, lat: f64, alt: f64) -> Self {
        Self {
            lon,
            lat,
            alt,
            direction: 1.0,
            phase: FlightPhase::Diagonal,
            phase_elapsed_ms: 0,
        }
    }

    pub fn phase(&self) -> FlightPhase {
        self.phase
    }

    /// Advance one sample period and return the new (lon, lat, alt).
    ///
    /// The step that ends a phase only switches phase; position holds.
    pub fn step(&mut self) -> (f64, f64, f64) {
        match self.phase {
            FlightPhase::Diagonal => {
                if self.phase_elapsed_ms < DIAGONAL_MS {
                    self.lon += self.direction * DIAGONAL_STEP_DEG;
                    self.lat += self.direction * DIAGONAL_STEP_DEG;
                } else {
                    self.phase = FlightPhase::Descent;
                    self.phase_elapsed_ms = 0;
                }
            }
            FlightPhase::Descent => {
                if self.phase_elapsed_ms < DESCENT_MS {
                    self.alt -= DESCENT_STEP_M;
                } else {
                    self.phase = FlightPhase::Diagonal;
                    self.phase_elapsed_ms = 0;
                    self.direction = -self.direction;
                }
            }
        }
        self.phase_elapsed_ms += STEP_MS;
        (self.lon, self.lat, self.alt)
    }
}

/// Power reading in 0..=1000.
pub fn random_power<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    rng.random_range(0..=1000u32) as f64
}

/// Parallel route arrays in the shape the server expects.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RoutePoints {
    pub lons: Vec<f64>,
    pub lats: Vec<f64>,
    pub alts: Vec<f64>,
}

impl RoutePoints {
    pub fn len(&self) -> usize {
        self.lons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lons.is_empty()
    }
}

/// Closed circle of 37 waypoints every 10 degrees around (lon, lat).
///
/// Altitudes ride 50 m above `base_alt` with a 5 m sine swell.
pub fn circular_route(lon: f64, lat: f64, base_alt: f64, radius_deg: f64) -> RoutePoints {
    let mut route = RoutePoints::default();
    for i in 0..=36 {
        let angle = (i * 10) as f64 * PI / 180.0;
        route.lons.push(lon + radius_deg * angle.cos());
        route.lats.push(lat + radius_deg * angle.sin());
        route.alts.push(50.0 + base_alt + 5.0 * angle.sin());
    }
    route
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zig_zag_moves_descends_and_reverses() {
        let mut flight = ZigZagFlight::new(10.0, 55.0, 100.0);

        // 25 diagonal steps, then the switching step
        for _ in 0..25 {
            flight.step();
        }
        assert!((flight.lon - (10.0 + 25.0 * DIAGONAL_STEP_DEG)).abs() < 1e-12);
        assert!((flight.lat - (55.0 + 25.0 * DIAGONAL_STEP_DEG)).abs() < 1e-12);
        flight.step();
        assert_eq!(flight.phase(), FlightPhase::Descent);

        // the switching step counts toward the descent window
        for _ in 0..4 {
            flight.step();
        }
        assert!((flight.alt - 99.2).abs() < 1e-9);
        assert_eq!(flight.phase(), FlightPhase::Descent);
        flight.step();
        assert_eq!(flight.phase(), FlightPhase::Diagonal);

        let before = flight.lon;
        flight.step();
        assert!(flight.lon < before);
    }

    #[test]
    fn circle_closes_on_itself() {
        let route = circular_route(10.0, 55.0, 20.0, 0.001);
        assert_eq!(route.len(), 37);
        assert!((route.lons[0] - route.lons[36]).abs() < 1e-12);
        assert!((route.lats[0] - route.lats[36]).abs() < 1e-12);
        assert!((route.alts[0] - 70.0).abs() < 1e-9);
        // quarter turn: highest point of the swell
        assert!((route.alts[9] - 75.0).abs() < 1e-9);
        assert!((route.lats[9] - 55.001).abs() < 1e-9);
    }

    #[test]
    fn power_stays_in_range() {
        let mut rng = rand::rng();
        for _ in 0..200 {
            let power = random_power(&mut rng);
            assert!((0.0..=1000.0).contains(&power));
        }
    }
}
