//! Per-query result cache.
//!
//! Results are stored under a normalized key so that queries containing the
//! path separator of a nested-key store cannot collide with its structure.
//! Normalization only affects the key: the fetch function always receives the
//! query exactly as typed.

use lru::LruCache;
use std::num::NonZeroUsize;

/// Character that would be read as a nested-key separator.
const KEY_SEPARATOR: char = '.';

/// Replacement for [`KEY_SEPARATOR`] inside cache keys.
const SAFE_SEPARATOR: char = '-';

/// Returns the cache key for a query.
pub fn normalize_key(query: &str) -> String {
    query.replace(KEY_SEPARATOR, &SAFE_SEPARATOR.to_string())
}

/// Maps normalized queries to the records previously fetched for them.
///
/// Unbounded by default. With a capacity the least recently written entry is
/// dropped first; lookups never change recency.
#[derive(Debug)]
pub struct QueryCache<R> {
    entries: LruCache<String, Vec<R>>,
}

impl<R> Default for QueryCache<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> QueryCache<R> {
    pub fn new() -> Self {
        Self {
            entries: LruCache::unbounded(),
        }
    }

    pub fn with_capacity(capacity: NonZeroUsize) -> Self {
        Self {
            entries: LruCache::new(capacity),
        }
    }

    /// Store `results` for `query`, replacing any previous entry.
    pub fn put(&mut self, query: &str, results: Vec<R>) {
        let key = normalize_key(query);
        tracing::trace!("Caching {} results under '{}'", results.len(), key);
        self.entries.put(key, results);
    }

    /// Look up the results stored for `query`.
    pub fn get(&self, query: &str) -> Option<&[R]> {
        self.entries
            .peek(normalize_key(query).as_str())
            .map(Vec::as_slice)
    }

    /// Remove the entry for `query`, if any.
    pub fn evict(&mut self, query: &str) {
        if self.entries.pop(normalize_key(query).as_str()).is_some() {
            tracing::debug!("Evicted cached results for '{}'", query);
        }
    }

    /// Remove every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
