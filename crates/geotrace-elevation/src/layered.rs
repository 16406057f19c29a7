//! Provider chaining: a local source first, a live one where it has no data.

use futures::future::BoxFuture;

use geotrace_core::{ElevationError, ElevationProvider, GeoPoint};

/// Answers from `primary` and asks `fallback` for points the primary has no
/// data for (or fails on). Typically a preloaded [`TerrainGrid`](crate::TerrainGrid)
/// in front of the live HTTP client.
#[derive(Debug, Clone)]
pub struct LayeredElevation<P, F> {
    primary: P,
    fallback: F,
}

impl<P, F> LayeredElevation<P, F> {
    pub fn new(primary: P, fallback: F) -> Self {
        Self { primary, fallback }
    }

    pub fn primary(&self) -> &P {
        &self.primary
    }
}

impl<P: ElevationProvider, F: ElevationProvider> ElevationProvider for LayeredElevation<P, F> {
    fn sample_height(&self, point: GeoPoint) -> BoxFuture<'_, Result<Option<f64>, ElevationError>> {
        Box::pin(async move {
            match self.primary.sample_height(point).await {
                Ok(Some(height)) => Ok(Some(height)),
                Ok(None) => self.fallback.sample_height(point).await,
                Err(err) => {
                    tracing::debug!(lon = point.lon, lat = point.lat, "primary elevation failed: {}", err);
                    self.fallback.sample_height(point).await
                }
            }
        })
    }
}
