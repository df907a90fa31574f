//! Duplicate detection via locality-sensitive hashing.
//!
//! Text segments are reduced to a 64-bit simhash (Charikar) over a token
//! sample; near-identical segments land on nearby hashes. A process-wide
//! LRU counter tracks how often each segment has been seen so that site
//! chrome repeated across a crawl gets dropped after `max_repetitions`
//! occurrences.

use std::collections::HashMap;
use std::sync::{LazyLock, Mutex};

use sha2::{Digest, Sha256};

use crate::lru::LruCache;
use crate::options::ExtractionOptions;

const HASH_BITS: u32 = 64;

/// Default number of tokens fed into the simhash.
const SAMPLE_TARGET: usize = 64;

static SEGMENT_COUNTER: LazyLock<Mutex<LruCache>> =
    LazyLock::new(|| Mutex::new(LruCache::default()));

static SIMHASH_MEMO: LazyLock<Mutex<HashMap<u64, u64>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

/// Empty the process-wide deduplication counter and the simhash memo.
///
/// Callers must ensure no extraction is in flight.
pub fn reset_caches() {
    if let Ok(mut counter) = SEGMENT_COUNTER.lock() {
        counter.clear();
    }
    if let Ok(mut memo) = SIMHASH_MEMO.lock() {
        memo.clear();
    }
}

fn is_separator(c: char) -> bool {
    !c.is_alphanumeric() && !c.is_whitespace()
}

/// Sample up to `target` tokens from the input for hashing.
///
/// Tokens are whitespace-separated words with punctuation stripped from
/// both ends; only fully alphanumeric tokens are kept. The sample prefers
/// longer tokens: the length floor starts at 4 and drops until at least
/// half of the candidate tokens survive. Inputs without such tokens (e.g.
/// CJK text with fullwidth punctuation) are re-split after replacing every
/// punctuation character with a space.
#[must_use]
pub fn sample_tokens(input: &str, target: usize) -> Vec<String> {
    let mut tokens: Vec<String> = input
        .split_whitespace()
        .map(|t| t.trim_matches(is_separator))
        .filter(|t| !t.is_empty() && t.chars().all(char::is_alphanumeric))
        .map(ToString::to_string)
        .collect();

    if tokens.is_empty() {
        let replaced: String = input
            .chars()
            .map(|c| if is_separator(c) { ' ' } else { c })
            .collect();
        tokens = replaced
            .split_whitespace()
            .filter(|t| t.chars().all(char::is_alphanumeric))
            .map(ToString::to_string)
            .collect();
    }

    let mut sample = Vec::new();
    for floor in (0..=4usize).rev() {
        sample = tokens
            .iter()
            .filter(|t| t.chars().count() > floor)
            .cloned()
            .collect();
        if sample.len() * 2 >= tokens.len() {
            break;
        }
    }

    sample.truncate(target);
    sample
}

/// Hash one token to 64 bits: the first 8 bytes of its SHA-256 digest.
fn token_hash(token: &str) -> u64 {
    let digest = Sha256::digest(token.as_bytes());
    u64::from_be_bytes([
        digest[0], digest[1], digest[2], digest[3], digest[4], digest[5], digest[6], digest[7],
    ])
}

/// Charikar simhash of a text over its token sample.
#[must_use]
pub fn simhash(text: &str) -> u64 {
    let memo_key = token_hash(text);
    if let Ok(memo) = SIMHASH_MEMO.lock() {
        if let Some(&cached) = memo.get(&memo_key) {
            return cached;
        }
    }

    let mut vector = [0i64; HASH_BITS as usize];
    for token in sample_tokens(text, SAMPLE_TARGET) {
        let hash = token_hash(&token);
        for (i, slot) in vector.iter_mut().enumerate() {
            if hash >> i & 1 == 1 {
                *slot += 1;
            } else {
                *slot -= 1;
            }
        }
    }

    let mut result: u64 = 0;
    for (i, &component) in vector.iter().enumerate() {
        if component >= 0 {
            result |= 1 << i;
        }
    }

    if let Ok(mut memo) = SIMHASH_MEMO.lock() {
        memo.insert(memo_key, result);
    }
    result
}

/// Number of differing bits between two simhashes.
#[inline]
#[must_use]
pub fn hamming_distance(a: u64, b: u64) -> u32 {
    (a ^ b).count_ones()
}

/// Similarity in `[0, 1]` derived from the Hamming distance.
#[must_use]
pub fn similarity(a: u64, b: u64) -> f64 {
    f64::from(HASH_BITS - hamming_distance(a, b)) / f64::from(HASH_BITS)
}

/// Document-level fingerprint: simhash of title and raw text, as hex.
#[must_use]
pub fn content_fingerprint(title: &str, raw_text: &str) -> String {
    format!("{:016x}", simhash(&format!("{title} {raw_text}")))
}

/// Count one occurrence of a segment; true once it has been seen more
/// than `max_repetitions` times. Short segments are never counted.
#[must_use]
pub fn duplicate_test(text: &str, options: &ExtractionOptions) -> bool {
    let trimmed = text.trim();
    if trimmed.chars().count() <= options.min_duplcheck_size {
        return false;
    }
    let key = token_hash(trimmed);
    let Ok(mut counter) = SEGMENT_COUNTER.lock() else {
        return false;
    };
    counter.increment(key) > options.max_repetitions
}

/// Like [`duplicate_test`] but without counting; used for the final
/// document-level check where the body was already counted per segment.
#[must_use]
pub fn seen_too_often(text: &str, options: &ExtractionOptions) -> bool {
    let trimmed = text.trim();
    if trimmed.chars().count() <= options.min_duplcheck_size {
        return false;
    }
    let key = token_hash(trimmed);
    let Ok(mut counter) = SEGMENT_COUNTER.lock() else {
        return false;
    };
    counter.get(key).unwrap_or(0) > options.max_repetitions
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sampling_prefers_long_tokens() {
        let tokens = sample_tokens("a bb ccc dddd eeeee ffffff", SAMPLE_TARGET);
        // Floor settles where at least half the tokens survive.
        assert!(tokens.iter().all(|t| t.chars().count() >= 3));
        assert!(tokens.contains(&"eeeee".to_string()));
    }

    #[test]
    fn sampling_strips_punctuation() {
        let tokens = sample_tokens("\"quoted\" (parens), trailing!", SAMPLE_TARGET);
        assert!(tokens.contains(&"quoted".to_string()));
        assert!(tokens.contains(&"parens".to_string()));
        assert!(tokens.contains(&"trailing".to_string()));
    }

    #[test]
    fn simhash_is_deterministic() {
        let text = "the quick brown fox jumps over the lazy dog";
        assert_eq!(simhash(text), simhash(text));
    }

    #[test]
    fn hamming_symmetry_and_bounds() {
        let a = simhash("the quick brown fox jumps over the lazy dog");
        let b = simhash("an entirely different sentence about content extraction");
        assert_eq!(hamming_distance(a, b), hamming_distance(b, a));
        assert!(hamming_distance(a, b) <= 64);
        assert_eq!(hamming_distance(a, a), 0);
        assert!((similarity(a, a) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn near_duplicates_land_close() {
        let a = simhash("the quick brown fox jumps over the lazy dog");
        let b = simhash("the quick brown fox jumps over the lazy cat");
        assert!(hamming_distance(a, b) <= 12, "distance {}", hamming_distance(a, b));
    }

    #[test]
    fn fingerprint_is_hex() {
        let fp = content_fingerprint("Title", "some article text goes here");
        assert_eq!(fp.len(), 16);
        assert!(fp.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn duplicate_counting() {
        reset_caches();
        let options = ExtractionOptions {
            min_duplcheck_size: 10,
            max_repetitions: 2,
            ..ExtractionOptions::default()
        };
        let segment = "this segment is long enough to be counted by the deduplicator";

        // max_repetitions occurrences pass, the next one is a duplicate.
        assert!(!duplicate_test(segment, &options));
        assert!(!duplicate_test(segment, &options));
        assert!(duplicate_test(segment, &options));

        reset_caches();
        assert!(!duplicate_test(segment, &options));
        reset_caches();
    }

    #[test]
    fn short_segments_are_ignored() {
        let options = ExtractionOptions::default();
        for _ in 0..10 {
            assert!(!duplicate_test("too short", &options));
        }
    }
}
