//! Age and size bounded pruning for `DashMap` caches.

use dashmap::DashMap;
use std::hash::Hash;
use std::time::Duration;
use tokio::time::Instant;

pub trait CacheEntry {
    fn inserted_at(&self) -> Instant;
}

/// Drop entries older than `max_age`, then evict oldest-first until at most
/// `max_entries` remain. Returns the number of removed entries.
pub fn prune_cache<K, V>(
    cache: &DashMap<K, V>,
    max_entries: usize,
    max_age: Duration,
    now: Instant,
) -> usize
where
    K: Clone + Eq + Hash,
    V: CacheEntry,
{
    let before = cache.len();
    let mut entries: Vec<(K, Instant)> = cache
        .iter()
        .map(|entry| (entry.key().clone(), entry.value().inserted_at()))
        .collect();

    entries.retain(|(key, inserted_at)| {
        if now.saturating_duration_since(*inserted_at) >= max_age {
            cache.remove(key);
            false
        } else {
            true
        }
    });

    if cache.len() > max_entries {
        entries.sort_by_key(|(_, inserted_at)| *inserted_at);
        for (key, _) in entries {
            if cache.len() <= max_entries {
                break;
            }
            cache.remove(&key);
        }
    }

    before.saturating_sub(cache.len())
}
