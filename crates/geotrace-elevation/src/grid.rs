//! In-memory terrain grid with bilinear sampling.

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};

use geotrace_core::spatial::{meters_per_deg_lon, METERS_PER_DEG_LAT};
use geotrace_core::{ElevationError, ElevationProvider, GeoPoint};

/// Lon/lat rectangle in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridBounds {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl GridBounds {
    /// Bounding box of the finite points, `None` if there are none.
    pub fn from_points(points: &[GeoPoint]) -> Option<Self> {
        let mut bounds = GridBounds {
            min_lon: f64::INFINITY,
            min_lat: f64::INFINITY,
            max_lon: f64::NEG_INFINITY,
            max_lat: f64::NEG_INFINITY,
        };
        for point in points {
            if !point.lat.is_finite() || !point.lon.is_finite() {
                continue;
            }
            bounds.min_lat = bounds.min_lat.min(point.lat);
            bounds.max_lat = bounds.max_lat.max(point.lat);
            bounds.min_lon = bounds.min_lon.min(point.lon);
            bounds.max_lon = bounds.max_lon.max(point.lon);
        }
        bounds.is_valid().then_some(bounds)
    }

    /// Parse `min_lon,min_lat,max_lon,max_lat`.
    pub fn parse(value: &str) -> Option<Self> {
        let parts: Vec<f64> = value
            .split(',')
            .map(|part| part.trim().parse::<f64>())
            .collect::<Result<_, _>>()
            .ok()?;
        let [min_lon, min_lat, max_lon, max_lat] = parts.as_slice() else {
            return None;
        };
        let bounds = GridBounds {
            min_lon: *min_lon,
            min_lat: *min_lat,
            max_lon: *max_lon,
            max_lat: *max_lat,
        };
        bounds.is_valid().then_some(bounds)
    }

    pub fn is_valid(&self) -> bool {
        [self.min_lon, self.min_lat, self.max_lon, self.max_lat]
            .iter()
            .all(|v| v.is_finite())
            && self.min_lon <= self.max_lon
            && self.min_lat <= self.max_lat
    }

    /// Grow each side by `pad_ratio` of the span, at least 0.0015°.
    pub fn expand(&self, pad_ratio: f64) -> Self {
        let pad_lat = ((self.max_lat - self.min_lat) * pad_ratio).max(0.0015);
        let pad_lon = ((self.max_lon - self.min_lon) * pad_ratio).max(0.0015);
        GridBounds {
            min_lon: self.min_lon - pad_lon,
            min_lat: self.min_lat - pad_lat,
            max_lon: self.max_lon + pad_lon,
            max_lat: self.max_lat + pad_lat,
        }
    }

    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        lon >= self.min_lon && lon <= self.max_lon && lat >= self.min_lat && lat <= self.max_lat
    }

    /// Pick rows/cols for roughly `spacing_m` meter cells, coarsening until the
    /// grid fits in `max_points`.
    pub fn layout(&self, spacing_m: f64, max_points: usize) -> GridLayout {
        let mean_lat = (self.min_lat + self.max_lat) / 2.0;
        let per_deg_lon = meters_per_deg_lon(mean_lat).max(METERS_PER_DEG_LAT * 0.01);
        let max_points = max_points.max(4);
        let mut spacing = spacing_m.max(1.0);

        loop {
            let lat_step_deg = spacing / METERS_PER_DEG_LAT;
            let lon_step_deg = spacing / per_deg_lon;
            let rows = ((self.max_lat - self.min_lat) / lat_step_deg).ceil().max(1.0) as usize + 1;
            let cols = ((self.max_lon - self.min_lon) / lon_step_deg).ceil().max(1.0) as usize + 1;
            let layout = GridLayout {
                bounds: *self,
                rows,
                cols,
                lat_step_deg,
                lon_step_deg,
            };
            if layout.len() <= max_points {
                return layout;
            }
            let scale = ((layout.len() as f64) / (max_points as f64)).sqrt().max(1.1);
            spacing *= scale;
        }
    }
}

/// Sampling lattice over a [`GridBounds`], row-major from the south-west corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLayout {
    pub bounds: GridBounds,
    pub rows: usize,
    pub cols: usize,
    pub lat_step_deg: f64,
    pub lon_step_deg: f64,
}

impl GridLayout {
    pub fn len(&self) -> usize {
        self.rows.saturating_mul(self.cols)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Lattice points in row-major order.
    pub fn points(&self) -> Vec<GeoPoint> {
        let mut points = Vec::with_capacity(self.len());
        for row in 0..self.rows {
            let lat = self.bounds.min_lat + row as f64 * self.lat_step_deg;
            for col in 0..self.cols {
                let lon = self.bounds.min_lon + col as f64 * self.lon_step_deg;
                points.push(GeoPoint::new(lon, lat, 0.0));
            }
        }
        points
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TerrainGrid {
    layout: GridLayout,
    elevations_m: Vec<f64>,
}

impl TerrainGrid {
    /// Build from row-major samples. Non-finite samples become 0.
    pub fn new(layout: GridLayout, elevations_m: Vec<f64>) -> Result<Self, ElevationError> {
        if layout.is_empty() || elevations_m.len() != layout.len() {
            return Err(ElevationError::Decode(format!(
                "grid expects {} samples, got {}",
                layout.len(),
                elevations_m.len()
            )));
        }
        let elevations_m = elevations_m
            .into_iter()
            .map(|value| if value.is_finite() { value } else { 0.0 })
            .collect();
        Ok(Self { layout, elevations_m })
    }

    pub fn layout(&self) -> &GridLayout {
        &self.layout
    }

    /// Bilinear height at `(lon, lat)`, clamped to the grid edges.
    pub fn sample(&self, lon: f64, lat: f64) -> f64 {
        if !lat.is_finite() || !lon.is_finite() {
            return 0.0;
        }
        let layout = &self.layout;
        let bounds = &layout.bounds;
        let lat = lat.clamp(bounds.min_lat, bounds.max_lat);
        let lon = lon.clamp(bounds.min_lon, bounds.max_lon);

        let max_y = (layout.rows - 1) as f64;
        let max_x = (layout.cols - 1) as f64;
        let y = ((lat - bounds.min_lat) / layout.lat_step_deg.max(1e-9)).clamp(0.0, max_y);
        let x = ((lon - bounds.min_lon) / layout.lon_step_deg.max(1e-9)).clamp(0.0, max_x);

        let y0 = y.floor() as usize;
        let x0 = x.floor() as usize;
        let y1 = (y0 + 1).min(layout.rows - 1);
        let x1 = (x0 + 1).min(layout.cols - 1);
        let dy = y - y0 as f64;
        let dx = x - x0 as f64;

        let v00 = self.value_at(y0, x0);
        let v10 = self.value_at(y0, x1);
        let v01 = self.value_at(y1, x0);
        let v11 = self.value_at(y1, x1);

        let v0 = v00 + (v10 - v00) * dx;
        let v1 = v01 + (v11 - v01) * dx;
        v0 + (v1 - v0) * dy
    }

    fn value_at(&self, row: usize, col: usize) -> f64 {
        let idx = row.saturating_mul(self.layout.cols) + col.min(self.layout.cols - 1);
        self.elevations_m.get(idx).copied().unwrap_or(0.0)
    }
}

impl ElevationProvider for TerrainGrid {
    /// No data outside the grid bounds.
    fn sample_height(&self, point: GeoPoint) -> BoxFuture<'_, Result<Option<f64>, ElevationError>> {
        let height = self
            .layout
            .bounds
            .contains(point.lon, point.lat)
            .then(|| self.sample(point.lon, point.lat));
        Box::pin(async move { Ok(height) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_grid() -> TerrainGrid {
        // 2x2 cells over one degree: SW 0, SE 10, NW 20, NE 30
        let layout = GridLayout {
            bounds: GridBounds {
                min_lon: 0.0,
                min_lat: 0.0,
                max_lon: 1.0,
                max_lat: 1.0,
            },
            rows: 2,
            cols: 2,
            lat_step_deg: 1.0,
            lon_step_deg: 1.0,
        };
        TerrainGrid::new(layout, vec![0.0, 10.0, 20.0, 30.0]).unwrap()
    }

    #[test]
    fn bilinear_sampling() {
        let grid = unit_grid();
        assert_eq!(grid.sample(0.0, 0.0), 0.0);
        assert_eq!(grid.sample(1.0, 1.0), 30.0);
        assert!((grid.sample(0.5, 0.5) - 15.0).abs() < 1e-9);
        assert!((grid.sample(0.5, 0.0) - 5.0).abs() < 1e-9);
        // clamped outside
        assert_eq!(grid.sample(5.0, -3.0), 10.0);
    }

    #[test]
    fn sample_count_must_match_layout() {
        let layout = *unit_grid().layout();
        assert!(TerrainGrid::new(layout, vec![1.0; 3]).is_err());
    }

    #[test]
    fn layout_respects_point_budget() {
        let bounds = GridBounds {
            min_lon: 10.0,
            min_lat: 55.0,
            max_lon: 10.1,
            max_lat: 55.1,
        };
        let fine = bounds.layout(10.0, 1_000_000);
        let coarse = bounds.layout(10.0, 500);
        assert!(fine.len() > coarse.len());
        assert!(coarse.len() <= 500);
        assert_eq!(coarse.points().len(), coarse.len());
    }

    #[test]
    fn bounds_parse_and_expand() {
        let bounds = GridBounds::parse("10, 55, 10.01, 55.02").unwrap();
        assert_eq!(bounds.max_lat, 55.02);
        assert!(GridBounds::parse("10,55,9,56").is_none());
        assert!(GridBounds::parse("10,55").is_none());

        let padded = bounds.expand(0.2);
        assert!(padded.contains(bounds.min_lon - 0.001, bounds.min_lat - 0.001));
    }

    #[test]
    fn bounds_from_points_skips_non_finite() {
        let points = [
            GeoPoint::new(10.0, 55.0, 0.0),
            GeoPoint::new(f64::NAN, 56.0, 0.0),
            GeoPoint::new(10.5, 54.0, 0.0),
        ];
        let bounds = GridBounds::from_points(&points).unwrap();
        assert_eq!((bounds.min_lat, bounds.max_lat), (54.0, 55.0));
        assert!(GridBounds::from_points(&[]).is_none());
    }

    #[tokio::test]
    async fn provider_has_no_data_outside() {
        let grid = unit_grid();
        assert_eq!(grid.sample_height(GeoPoint::new(0.5, 0.5, 0.0)).await, Ok(Some(15.0)));
        assert_eq!(grid.sample_height(GeoPoint::new(2.0, 0.5, 0.0)).await, Ok(None));
    }
}
