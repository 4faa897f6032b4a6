use crate::utils::Clock;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use std::hash::Hash;
use std::sync::Arc;

struct CacheEntry<V> {
    value: V,
    stored_at: DateTime<Utc>,
}

/// Map whose entries expire `ttl` after insertion.
///
/// Expired entries are dropped when a lookup touches them and on every insert;
/// there is no background sweep. Concurrent misses on the same key may both refetch.
pub struct TtlCache<K, V> {
    entries: DashMap<K, CacheEntry<V>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
            clock,
        }
    }

    pub fn get(&self, key: &K) -> Option<V> {
        let now = self.clock.now();
        match self.entries.get(key) {
            Some(entry) if now - entry.stored_at < self.ttl => return Some(entry.value.clone()),
            Some(_) => {}
            None => return None,
        }

        // The read guard is gone by now, so taking the shard write lock is safe.
        self.entries
            .remove_if(key, |_, entry| now - entry.stored_at >= self.ttl);
        None
    }

    pub fn insert(&self, key: K, value: V) {
        let now = self.clock.now();
        self.entries.retain(|_, entry| now - entry.stored_at < self.ttl);
        self.entries.insert(key, CacheEntry { value, stored_at: now });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
