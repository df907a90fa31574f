//! Simhash and LRU counter properties.

use websift::dedup::{hamming_distance, simhash, similarity};
use websift::lru::LruCache;

#[test]
fn simhash_close_for_near_duplicates() {
    let a = simhash("the quick brown fox jumps over the lazy dog");
    let b = simhash("the quick brown fox jumps over the lazy cat");
    assert!(
        hamming_distance(a, b) <= 12,
        "one-token change moved {} bits",
        hamming_distance(a, b)
    );
}

#[test]
fn simhash_far_for_unrelated_text() {
    let a = simhash("the quick brown fox jumps over the lazy dog");
    let b = simhash("completely unrelated words describing server configuration parameters instead");
    assert!(hamming_distance(a, b) > 12);
}

#[test]
fn hamming_symmetry_and_bounds() {
    let a = simhash("first sample text for the symmetry check");
    let b = simhash("second sample text for the symmetry check");
    assert_eq!(hamming_distance(a, b), hamming_distance(b, a));
    assert!(hamming_distance(a, b) <= 64);
    assert_eq!(hamming_distance(a, a), 0);
    assert!((similarity(a, a) - 1.0).abs() < f64::EPSILON);
    assert!(similarity(a, b) >= 0.0 && similarity(a, b) <= 1.0);
}

#[test]
fn lru_eviction_without_access() {
    let mut cache = LruCache::new(3);
    cache.put(1, 1);
    cache.put(2, 2);
    cache.put(3, 3);
    cache.put(4, 4);

    assert_eq!(cache.get(1), None, "oldest entry should be evicted");
    assert_eq!(cache.get(4), Some(4));
}

#[test]
fn lru_access_refreshes_entries() {
    let mut cache = LruCache::new(3);
    cache.put(1, 1);
    cache.put(2, 2);
    cache.put(3, 3);

    assert_eq!(cache.get(1), Some(1));
    cache.put(4, 4);

    assert_eq!(cache.get(2), None, "least recently used should be evicted");
    assert_eq!(cache.get(1), Some(1));
}
