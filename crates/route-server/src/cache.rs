//! Age- and size-bounded eviction for DashMap tables, shared by the elevation
//! cache and the session table.

use dashmap::DashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

/// Anything that remembers when it was last refreshed.
pub trait CacheEntry {
    fn fetched_at(&self) -> Instant;
}

/// Drop entries older than `max_age`, then the oldest until at most `max_entries` remain.
pub fn prune_cache<K, V>(cache: &DashMap<K, V>, max_entries: usize, max_age: Duration)
where
    K: Clone + Eq + Hash,
    V: CacheEntry,
{
    let now = Instant::now();
    let mut entries: Vec<(K, Instant)> = cache
        .iter()
        .map(|entry| (entry.key().clone(), entry.value().fetched_at()))
        .collect();

    entries.retain(|(key, fetched_at)| {
        let expired = now.duration_since(*fetched_at) > max_age;
        if expired {
            cache.remove(key);
        }
        !expired
    });

    if cache.len() <= max_entries {
        return;
    }

    entries.sort_by_key(|(_, fetched_at)| *fetched_at);
    for (key, _) in entries {
        if cache.len() <= max_entries {
            break;
        }
        cache.remove(&key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Stamp(Instant);

    impl CacheEntry for Stamp {
        fn fetched_at(&self) -> Instant {
            self.0
        }
    }

    #[test]
    fn evicts_oldest_beyond_capacity() {
        let cache = DashMap::new();
        let base = Instant::now();
        for i in 0..5u64 {
            cache.insert(i, Stamp(base + Duration::from_millis(i)));
        }
        prune_cache(&cache, 3, Duration::from_secs(60));
        assert_eq!(cache.len(), 3);
        assert!(!cache.contains_key(&0));
        assert!(!cache.contains_key(&1));
        assert!(cache.contains_key(&4));
    }

    #[test]
    fn evicts_expired_entries() {
        let cache = DashMap::new();
        let Some(old) = Instant::now().checked_sub(Duration::from_secs(120)) else {
            return;
        };
        cache.insert("stale", Stamp(old));
        cache.insert("fresh", Stamp(Instant::now()));
        prune_cache(&cache, 10, Duration::from_secs(60));
        assert!(cache.contains_key("fresh"));
        assert!(!cache.contains_key("stale"));
    }
}
