//! Compiled pattern cache.
//!
//! The in-flight expectation is re-tested after every received byte, so
//! compiling it each time would dominate the cost of a poll. Patterns are
//! compiled once and kept with least-recently-used eviction.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use regex::bytes::Regex;

/// Default maximum cache size.
pub const DEFAULT_CACHE_SIZE: usize = 32;

/// A cache for compiled byte regexes.
pub struct RegexCache {
    inner: Mutex<LruCache>,
    max_size: usize,
}

#[derive(Default)]
struct LruCache {
    entries: HashMap<String, Arc<Regex>>,
    /// Least recently used first.
    order: Vec<String>,
    hits: usize,
    misses: usize,
}

impl LruCache {
    fn touch(&mut self, pattern: &str) {
        if let Some(pos) = self.order.iter().position(|p| p == pattern) {
            let key = self.order.remove(pos);
            self.order.push(key);
        }
    }
}

impl RegexCache {
    /// Create a new cache holding at most `max_size` patterns.
    #[must_use]
    pub fn new(max_size: usize) -> Self {
        Self {
            inner: Mutex::new(LruCache::default()),
            max_size: max_size.max(1),
        }
    }

    /// Create a new cache with default size.
    #[must_use]
    pub fn with_default_size() -> Self {
        Self::new(DEFAULT_CACHE_SIZE)
    }

    /// Get or compile a pattern.
    ///
    /// # Errors
    ///
    /// Returns an error if the pattern is invalid.
    pub fn get_or_compile(&self, pattern: &str) -> Result<Arc<Regex>, regex::Error> {
        // The cache is only an optimisation, so a poisoned lock is still usable.
        let mut cache = self.inner.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(regex) = cache.entries.get(pattern).cloned() {
            cache.hits += 1;
            cache.touch(pattern);
            return Ok(regex);
        }

        cache.misses += 1;
        let regex = Arc::new(Regex::new(pattern)?);

        if cache.entries.len() >= self.max_size && !cache.order.is_empty() {
            let oldest = cache.order.remove(0);
            cache.entries.remove(&oldest);
        }
        cache.entries.insert(pattern.to_string(), Arc::clone(&regex));
        cache.order.push(pattern.to_string());

        Ok(regex)
    }

    /// Check if a pattern is cached.
    #[must_use]
    pub fn contains(&self, pattern: &str) -> bool {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .contains_key(pattern)
    }

    /// Get the current number of cached patterns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .len()
    }

    /// Check if the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get cache statistics.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        let cache = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        CacheStats {
            size: cache.entries.len(),
            max_size: self.max_size,
            total_hits: cache.hits,
            total_misses: cache.misses,
        }
    }
}

impl Default for RegexCache {
    fn default() -> Self {
        Self::with_default_size()
    }
}

impl std::fmt::Debug for RegexCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegexCache")
            .field("stats", &self.stats())
            .finish()
    }
}

/// Statistics about a regex cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    /// Current number of cached patterns.
    pub size: usize,
    /// Maximum cache size.
    pub max_size: usize,
    /// Total cache hits.
    pub total_hits: usize,
    /// Total cache misses.
    pub total_misses: usize,
}

impl CacheStats {
    /// Get the cache hit rate as a ratio (0.0 to 1.0).
    ///
    /// Returns 1.0 if no accesses have been made.
    #[must_use]
    pub fn hit_rate(&self) -> f64 {
        let total = self.total_hits + self.total_misses;
        if total == 0 {
            1.0
        } else {
            self.total_hits as f64 / total as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_returns_same_regex() {
        let cache = RegexCache::new(10);
        let r1 = cache.get_or_compile(r"\d+").unwrap();
        let r2 = cache.get_or_compile(r"\d+").unwrap();
        assert!(Arc::ptr_eq(&r1, &r2));
    }

    #[test]
    fn cache_evicts_least_recently_used() {
        let cache = RegexCache::new(2);
        cache.get_or_compile("a+").unwrap();
        cache.get_or_compile("b+").unwrap();
        // Touch "a+" so "b+" becomes the eviction candidate.
        cache.get_or_compile("a+").unwrap();
        cache.get_or_compile("c+").unwrap();

        assert_eq!(cache.len(), 2);
        assert!(cache.contains("a+"));
        assert!(!cache.contains("b+"));
        assert!(cache.contains("c+"));
    }

    #[test]
    fn cache_invalid_pattern() {
        let cache = RegexCache::new(10);
        assert!(cache.get_or_compile("[invalid").is_err());
        assert!(cache.is_empty());
    }

    #[test]
    fn cache_stats_tracking() {
        let cache = RegexCache::new(10);
        cache.get_or_compile("OK").unwrap();
        cache.get_or_compile("OK").unwrap();
        cache.get_or_compile("OK").unwrap();
        cache.get_or_compile("ERROR").unwrap();

        let stats = cache.stats();
        assert_eq!(stats.total_hits, 2);
        assert_eq!(stats.total_misses, 2);
        assert!((stats.hit_rate() - 0.5).abs() < 0.001);
    }
}
