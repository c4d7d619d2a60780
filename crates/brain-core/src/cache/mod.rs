//! Bounded LRU caches
//!
//! - `KeywordCache`: node keys known to exist in the graph, so repeated
//!   assertions on the same keywords skip the lookup round trip
//! - `ResponseCache`: HTTP response bodies keyed by request URL

use std::hash::Hash;
use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;
use parking_lot::Mutex;
use serde::Serialize;

use crate::graph::NodeRef;

/// Capacity used when a capacity of zero is requested
pub const DEFAULT_CACHE_SIZE: usize = 1000;

/// Cache statistics for observability
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub size: usize,
    pub capacity: usize,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }
}

struct Inner<K: Hash + Eq, V> {
    entries: LruCache<K, V>,
    stats: CacheStats,
}

/// Thread-safe LRU map with hit/miss accounting
pub struct BoundedCache<K: Hash + Eq, V> {
    inner: Arc<Mutex<Inner<K, V>>>,
}

impl<K: Hash + Eq, V> Clone for BoundedCache<K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K: Hash + Eq, V: Clone> BoundedCache<K, V> {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity)
            .or(NonZeroUsize::new(DEFAULT_CACHE_SIZE))
            .unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: Arc::new(Mutex::new(Inner {
                entries: LruCache::new(capacity),
                stats: CacheStats {
                    capacity: capacity.get(),
                    ..CacheStats::default()
                },
            })),
        }
    }

    pub fn get(&self, key: &K) -> Option<V> {
        let mut inner = self.inner.lock();
        match inner.entries.get(key).cloned() {
            Some(value) => {
                inner.stats.hits += 1;
                Some(value)
            }
            None => {
                inner.stats.misses += 1;
                None
            }
        }
    }

    pub fn insert(&self, key: K, value: V) {
        let mut inner = self.inner.lock();
        if let Some((evicted_key, _)) = inner.entries.push(key, value) {
            // push hands back the old entry on a plain update as well
            if !inner.entries.contains(&evicted_key) {
                inner.stats.evictions += 1;
            }
        }
        inner.stats.size = inner.entries.len();
    }

    pub fn remove(&self, key: &K) -> Option<V> {
        let mut inner = self.inner.lock();
        let removed = inner.entries.pop(key);
        inner.stats.size = inner.entries.len();
        removed
    }

    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.entries.clear();
        let capacity = inner.stats.capacity;
        inner.stats = CacheStats {
            capacity,
            ..CacheStats::default()
        };
    }

    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        self.inner.lock().stats.clone()
    }
}

/// Node keys known to exist in the graph
#[derive(Clone)]
pub struct KeywordCache {
    known: BoundedCache<NodeRef, ()>,
}

impl KeywordCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            known: BoundedCache::new(capacity),
        }
    }

    pub fn contains(&self, node: &NodeRef) -> bool {
        self.known.get(node).is_some()
    }

    pub fn remember(&self, node: &NodeRef) {
        self.known.insert(node.clone(), ());
    }

    pub fn forget(&self, node: &NodeRef) {
        self.known.remove(node);
    }

    pub fn clear(&self) {
        self.known.clear();
    }

    pub fn stats(&self) -> CacheStats {
        self.known.stats()
    }
}

impl Default for KeywordCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_SIZE)
    }
}

/// Decoded responses keyed by request URL
pub type ResponseCache<V> = BoundedCache<String, V>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Label;

    fn node(name: &str) -> NodeRef {
        NodeRef::new(Label::new("Concept").unwrap(), name)
    }

    #[test]
    fn test_cache_stats_hit_rate_no_requests() {
        let stats = CacheStats::default();
        assert_eq!(stats.hit_rate(), 0.0);
    }

    #[test]
    fn test_hits_and_misses_are_counted() {
        let cache: BoundedCache<String, u32> = BoundedCache::new(4);
        cache.insert("a".to_string(), 1);

        assert_eq!(cache.get(&"a".to_string()), Some(1));
        assert_eq!(cache.get(&"b".to_string()), None);

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hit_rate(), 50.0);
    }

    #[test]
    fn test_least_recently_used_is_evicted() {
        let cache: BoundedCache<u32, u32> = BoundedCache::new(2);
        cache.insert(1, 10);
        cache.insert(2, 20);
        assert_eq!(cache.get(&1), Some(10));
        cache.insert(3, 30);

        assert_eq!(cache.get(&2), None);
        assert_eq!(cache.get(&1), Some(10));
        assert_eq!(cache.stats().evictions, 1);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_updating_a_key_is_not_an_eviction() {
        let cache: BoundedCache<u32, u32> = BoundedCache::new(2);
        cache.insert(1, 10);
        cache.insert(1, 11);

        assert_eq!(cache.get(&1), Some(11));
        assert_eq!(cache.stats().evictions, 0);
    }

    #[test]
    fn test_zero_capacity_falls_back_to_default() {
        let cache: BoundedCache<u32, u32> = BoundedCache::new(0);
        assert_eq!(cache.stats().capacity, DEFAULT_CACHE_SIZE);
    }

    #[test]
    fn test_clear_resets_stats_but_keeps_capacity() {
        let cache: BoundedCache<u32, u32> = BoundedCache::new(8);
        cache.insert(1, 1);
        cache.get(&1);
        cache.clear();

        let stats = cache.stats();
        assert!(cache.is_empty());
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.capacity, 8);
    }

    #[test]
    fn test_keyword_cache_remember_and_forget() {
        let keywords = KeywordCache::new(16);
        let leaf = node("leaf");

        assert!(!keywords.contains(&leaf));
        keywords.remember(&leaf);
        assert!(keywords.contains(&leaf));
        keywords.forget(&leaf);
        assert!(!keywords.contains(&leaf));
    }

    #[test]
    fn test_clones_share_entries() {
        let keywords = KeywordCache::default();
        let other = keywords.clone();
        keywords.remember(&node("tree"));
        assert!(other.contains(&node("tree")));
    }
}
