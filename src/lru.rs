//! Fixed-capacity LRU counter for text deduplication.
//!
//! Tracks how often a text fingerprint has been seen across documents.
//! When the cache is full the least-recently-used entry is evicted, so the
//! counter stays bounded no matter how long the process runs.

use std::collections::HashMap;

/// LRU mapping from fingerprint to occurrence count.
#[derive(Debug)]
pub struct LruCache {
    capacity: usize,
    entries: HashMap<u64, (usize, u64)>,
    clock: u64,
}

impl LruCache {
    /// Default capacity of the process-wide deduplication counter.
    pub const DEFAULT_CAPACITY: usize = 4096;

    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: HashMap::with_capacity(capacity.min(1024)),
            clock: 0,
        }
    }

    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    /// Look up a key, refreshing its recency.
    pub fn get(&mut self, key: u64) -> Option<usize> {
        let stamp = self.tick();
        let entry = self.entries.get_mut(&key)?;
        entry.1 = stamp;
        Some(entry.0)
    }

    /// Insert or replace a value, evicting the least-recently-used entry
    /// when at capacity.
    pub fn put(&mut self, key: u64, value: usize) {
        let stamp = self.tick();
        if let Some(entry) = self.entries.get_mut(&key) {
            *entry = (value, stamp);
            return;
        }
        if self.entries.len() >= self.capacity {
            self.evict_oldest();
        }
        self.entries.insert(key, (value, stamp));
    }

    /// Increment the counter for a key and return the new count.
    pub fn increment(&mut self, key: u64) -> usize {
        let current = self.get(key).unwrap_or(0);
        let next = current + 1;
        self.put(key, next);
        next
    }

    fn evict_oldest(&mut self) {
        if let Some((&oldest, _)) = self.entries.iter().min_by_key(|(_, (_, stamp))| *stamp) {
            self.entries.remove(&oldest);
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.clock = 0;
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for LruCache {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eviction_order_without_access() {
        let mut cache = LruCache::new(3);
        cache.put(1, 1);
        cache.put(2, 2);
        cache.put(3, 3);
        cache.put(4, 4);

        assert_eq!(cache.get(1), None);
        assert_eq!(cache.get(4), Some(4));
        assert_eq!(cache.len(), 3);
    }

    #[test]
    fn get_refreshes_recency() {
        let mut cache = LruCache::new(3);
        cache.put(1, 1);
        cache.put(2, 2);
        cache.put(3, 3);

        // Touch 1 so that 2 becomes the oldest.
        assert_eq!(cache.get(1), Some(1));
        cache.put(4, 4);

        assert_eq!(cache.get(2), None);
        assert_eq!(cache.get(1), Some(1));
    }

    #[test]
    fn increment_counts_up() {
        let mut cache = LruCache::new(8);
        assert_eq!(cache.increment(7), 1);
        assert_eq!(cache.increment(7), 2);
        assert_eq!(cache.increment(7), 3);
        assert_eq!(cache.increment(8), 1);
    }

    #[test]
    fn put_replaces_value() {
        let mut cache = LruCache::new(2);
        cache.put(1, 10);
        cache.put(1, 20);
        assert_eq!(cache.get(1), Some(20));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn clear_empties() {
        let mut cache = LruCache::new(2);
        cache.put(1, 1);
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.get(1), None);
    }
}
