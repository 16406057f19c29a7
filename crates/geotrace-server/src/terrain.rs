//! Elevation provider selection for the server.

use std::time::Duration;

use geotrace_core::{ElevationProvider, FlatElevation, TerrainHeightResolver};
use geotrace_elevation::{LayeredElevation, OpenMeteoElevation};

use crate::config::Config;

/// Pick the provider described by `config`:
/// - no URL: flat terrain at `flat_elevation_m`;
/// - URL and grid bounds: preload a grid and query live outside it, or live
///   only if the preload fails;
/// - URL only: live queries.
pub async fn build_provider(config: &Config) -> anyhow::Result<Box<dyn ElevationProvider>> {
    if config.elevation_url.is_empty() {
        tracing::info!(height = config.flat_elevation_m, "no elevation URL, using flat terrain");
        return Ok(Box::new(FlatElevation(config.flat_elevation_m)));
    }

    let timeout = Duration::from_secs(config.elevation_timeout_s.max(1));
    let client = OpenMeteoElevation::new(config.elevation_url.clone(), timeout)?;

    if let Some(bounds) = config.terrain_grid_bounds {
        let preload = client
            .fetch_grid(bounds, config.terrain_grid_spacing_m, config.terrain_grid_max_points)
            .await;
        match preload {
            Ok(grid) => {
                tracing::info!(
                    rows = grid.layout().rows,
                    cols = grid.layout().cols,
                    "terrain grid preloaded"
                );
                return Ok(Box::new(LayeredElevation::new(grid, client)));
            }
            Err(err) => {
                tracing::warn!("Terrain grid preload failed, using live queries: {}", err);
            }
        }
    }

    tracing::info!(url = %config.elevation_url, "using live elevation queries");
    Ok(Box::new(client))
}

pub async fn build_resolver(config: &Config) -> anyhow::Result<TerrainHeightResolver> {
    let provider = build_provider(config).await?;
    Ok(TerrainHeightResolver::with_settings(provider, config.terrain_settings()))
}
