use std::hash::Hash;
use std::time::{Duration, Instant};

use dashmap::DashMap;

/// Expiry-only memoization for expensive reads.
///
/// Entries are served until their TTL lapses and are overwritten by the
/// next recomputation; there is no active invalidation, so consumers may
/// observe values up to one TTL old.
pub struct TtlCache<K, V> {
    entries: DashMap<K, (Instant, V)>,
    ttl: Duration,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    pub fn get(&self, key: &K) -> Option<V> {
        self.entries.get(key).and_then(|entry| {
            let (inserted_at, value) = entry.value();
            (inserted_at.elapsed() < self.ttl).then(|| value.clone())
        })
    }

    pub fn insert(&self, key: K, value: V) {
        self.entries.insert(key, (Instant::now(), value));
    }
}
