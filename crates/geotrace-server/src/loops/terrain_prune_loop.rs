//! Periodic terrain cache pruning.
//!
//! The resolver only prunes on insert once it is over its size bound; this
//! loop drops expired entries during quiet periods too.

use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;

use geotrace_core::TerrainHeightResolver;

pub async fn run_terrain_prune_loop(resolver: Arc<TerrainHeightResolver>, every: Duration) {
    let mut ticker = interval(every.max(Duration::from_secs(1)));
    // first tick completes immediately
    ticker.tick().await;

    loop {
        ticker.tick().await;
        let removed = resolver.prune();
        if removed > 0 {
            tracing::debug!(removed, remaining = resolver.cache_len(), "pruned expired terrain entries");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geotrace_core::FlatElevation;

    #[tokio::test(start_paused = true)]
    async fn expired_entries_are_dropped() {
        let resolver = Arc::new(TerrainHeightResolver::new(FlatElevation(1.0)));
        resolver.set_expiration(1.0);
        resolver.resolve_height(10.0, 55.0).await;
        assert_eq!(resolver.cache_len(), 1);

        let task = tokio::spawn(run_terrain_prune_loop(resolver.clone(), Duration::from_secs(30)));
        tokio::time::sleep(Duration::from_secs(35)).await;
        assert_eq!(resolver.cache_len(), 1);

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(resolver.cache_len(), 0);
        task.abort();
    }
}
