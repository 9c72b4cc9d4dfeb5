use lru::LruCache;
use std::hash::Hash;
use std::num::NonZeroUsize;
use crate::core::error::{Error, Result};

/// Fixed-capacity map evicting the least recently used key.
///
/// A capacity of 0 means unbounded. Reads and writes both move the key to
/// most-recent; a miss records nothing.
pub struct BoundedCache<K: Hash + Eq, V> {
    cache: LruCache<K, V>,
    capacity: Option<NonZeroUsize>,
    hit_count: usize,
    miss_count: usize,
}

impl<K: Hash + Eq, V> BoundedCache<K, V> {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity);
        let cache = match capacity {
            Some(cap) => LruCache::new(cap),
            None => LruCache::unbounded(),
        };
        BoundedCache {
            cache,
            capacity,
            hit_count: 0,
            miss_count: 0,
        }
    }

    pub fn get(&mut self, key: &K) -> Option<&V> {
        match self.cache.get(key) {
            Some(value) => {
                self.hit_count += 1;
                Some(value)
            }
            None => {
                self.miss_count += 1;
                None
            }
        }
    }

    /// Lookup without touching recency or statistics
    pub fn contains(&self, key: &K) -> bool {
        self.cache.contains(key)
    }

    /// Insert or replace; evicts the oldest entry when over capacity
    pub fn set(&mut self, key: K, value: V) {
        self.cache.put(key, value);
    }

    pub fn delete(&mut self, key: &K) -> Result<V> {
        self.cache
            .pop(key)
            .ok_or_else(|| Error::not_found("Key not in cache"))
    }

    pub fn clear(&mut self) {
        self.cache.clear();
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    pub fn capacity(&self) -> Option<usize> {
        self.capacity.map(NonZeroUsize::get)
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hit_count: self.hit_count,
            miss_count: self.miss_count,
            size: self.cache.len(),
            capacity: self.capacity(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CacheStats {
    pub hit_count: usize,
    pub miss_count: usize,
    pub size: usize,
    pub capacity: Option<usize>,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hit_count + self.miss_count;
        if total == 0 {
            0.0
        } else {
            self.hit_count as f64 / total as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ErrorKind;

    #[test]
    fn evicts_first_inserted_without_reads() {
        let mut cache = BoundedCache::new(3);
        for key in 1..=4 {
            cache.set(key, key * 10);
        }
        assert!(!cache.contains(&1));
        assert!(cache.contains(&2) && cache.contains(&3) && cache.contains(&4));
        assert_eq!(cache.len(), 3);
    }

    #[test]
    fn read_protects_from_eviction() {
        let mut cache = BoundedCache::new(3);
        cache.set("a", 1);
        cache.set("b", 2);
        cache.set("c", 3);
        assert_eq!(cache.get(&"a"), Some(&1));
        cache.set("d", 4);

        assert!(cache.contains(&"a"));
        assert!(!cache.contains(&"b"));
    }

    #[test]
    fn rewrite_protects_from_eviction() {
        let mut cache = BoundedCache::new(2);
        cache.set("a", 1);
        cache.set("b", 2);
        cache.set("a", 10);
        cache.set("c", 3);

        assert_eq!(cache.get(&"a"), Some(&10));
        assert!(!cache.contains(&"b"));
    }

    #[test]
    fn miss_does_not_disturb_order() {
        let mut cache = BoundedCache::new(2);
        cache.set("a", 1);
        cache.set("b", 2);
        assert_eq!(cache.get(&"zzz"), None);
        cache.set("c", 3);

        assert!(!cache.contains(&"a"));
        assert!(!cache.contains(&"zzz"));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn zero_capacity_is_unbounded() {
        let mut cache = BoundedCache::new(0);
        for key in 0..1000 {
            cache.set(key, ());
        }
        assert_eq!(cache.len(), 1000);
        assert_eq!(cache.capacity(), None);
    }

    #[test]
    fn delete_and_clear() {
        let mut cache = BoundedCache::new(4);
        cache.set(1, "x");
        assert_eq!(cache.delete(&1).unwrap(), "x");
        assert_eq!(cache.delete(&1).unwrap_err().kind, ErrorKind::NotFound);

        cache.set(2, "y");
        cache.set(3, "z");
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.capacity(), Some(4));
    }

    #[test]
    fn stats_track_hits_and_misses() {
        let mut cache = BoundedCache::new(2);
        cache.set(1, 1);
        cache.get(&1);
        cache.get(&1);
        cache.get(&2);
        let stats = cache.stats();
        assert_eq!(stats.hit_count, 2);
        assert_eq!(stats.miss_count, 1);
        assert!((stats.hit_rate() - 2.0 / 3.0).abs() < 1e-9);
    }
}
