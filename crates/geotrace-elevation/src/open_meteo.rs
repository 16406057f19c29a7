//! Open-Meteo elevation API client.
//!
//! `GET {base}?latitude=a,b&longitude=c,d` answers `{"elevation":[..]}` with
//! one value per requested coordinate, in order.

use futures::future::BoxFuture;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use geotrace_core::{ElevationError, ElevationProvider, GeoPoint};

use crate::grid::{GridBounds, TerrainGrid};

pub const DEFAULT_BASE_URL: &str = "https://api.open-meteo.com/v1/elevation";
/// Coordinates per request accepted by the public API.
pub const MAX_POINTS_PER_REQUEST: usize = 100;

#[derive(Debug, Deserialize)]
struct OpenMeteoElevationResponse {
    elevation: Option<Vec<Option<f64>>>,
}

#[derive(Debug, Clone)]
pub struct OpenMeteoElevation {
    client: Client,
    base_url: String,
    max_points_per_request: usize,
}

impl OpenMeteoElevation {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ElevationError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| ElevationError::Request(err.to_string()))?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            max_points_per_request: MAX_POINTS_PER_REQUEST,
        }
    }

    pub fn with_max_points_per_request(mut self, max_points: usize) -> Self {
        self.max_points_per_request = max_points.max(1);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Heights for every point, in order. `None` where the API had no value.
    pub async fn sample_batch(&self, points: &[GeoPoint]) -> Result<Vec<Option<f64>>, ElevationError> {
        let mut heights = Vec::with_capacity(points.len());
        for chunk in points.chunks(self.max_points_per_request) {
            heights.extend(self.fetch_chunk(chunk).await?);
        }
        Ok(heights)
    }

    async fn fetch_chunk(&self, chunk: &[GeoPoint]) -> Result<Vec<Option<f64>>, ElevationError> {
        let latitudes: Vec<f64> = chunk.iter().map(|p| p.lat).collect();
        let longitudes: Vec<f64> = chunk.iter().map(|p| p.lon).collect();
        let url = build_provider_url(&self.base_url, &join_params(&latitudes), &join_params(&longitudes));

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| ElevationError::Request(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!("Elevation provider HTTP {}", status);
            return Err(ElevationError::Status(status.as_u16()));
        }

        let payload: OpenMeteoElevationResponse = response
            .json()
            .await
            .map_err(|err| ElevationError::Decode(err.to_string()))?;
        let values = payload
            .elevation
            .ok_or_else(|| ElevationError::Decode("missing elevation".to_string()))?;
        if values.len() != chunk.len() {
            return Err(ElevationError::Decode(format!(
                "expected {} samples, got {}",
                chunk.len(),
                values.len()
            )));
        }

        Ok(values
            .into_iter()
            .map(|value| value.filter(|v| v.is_finite()))
            .collect())
    }

    /// Sample a whole grid over `bounds` for offline bilinear lookups.
    pub async fn fetch_grid(
        &self,
        bounds: GridBounds,
        spacing_m: f64,
        max_points: usize,
    ) -> Result<TerrainGrid, ElevationError> {
        let layout = bounds.layout(spacing_m, max_points);
        let points = layout.points();
        tracing::info!(
            rows = layout.rows,
            cols = layout.cols,
            requests = points.len().div_ceil(self.max_points_per_request),
            "fetching terrain grid"
        );
        let heights = self.sample_batch(&points).await?;
        let elevations = heights.into_iter().map(|h| h.unwrap_or(0.0)).collect();
        TerrainGrid::new(layout, elevations)
    }
}

impl ElevationProvider for OpenMeteoElevation {
    fn sample_height(&self, point: GeoPoint) -> BoxFuture<'_, Result<Option<f64>, ElevationError>> {
        Box::pin(async move {
            let heights = self.sample_batch(&[point]).await?;
            Ok(heights.into_iter().next().flatten())
        })
    }
}

fn join_params(values: &[f64]) -> String {
    values
        .iter()
        .map(|value| format!("{:.6}", value))
        .collect::<Vec<_>>()
        .join(",")
}

fn build_provider_url(base: &str, latitudes: &str, longitudes: &str) -> String {
    let separator = if base.contains('?') { "&" } else { "?" };
    format!("{}{}latitude={}&longitude={}", base, separator, latitudes, longitudes)
}
