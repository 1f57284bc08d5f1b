//! Memoization of parsed selectors
//!
//! Selector strings are usually a handful of literals repeated on every
//! request, so each engine keeps the parsed form keyed by the exact text.

use crate::error::Result;
use crate::select::parser::parse;
use crate::select::selector::Selector;
use dashmap::DashMap;
use std::sync::Arc;
use tracing::debug;

/// Thread-safe, append-only cache of parsed selectors
///
/// Entries are never evicted. Feeding it unbounded or untrusted selector text
/// grows it without limit; use [`SelectorCache::disabled`] or call
/// [`SelectorCache::clear`] in that situation.
#[derive(Debug)]
pub struct SelectorCache {
    entries: DashMap<String, Arc<Selector>>,
    enabled: bool,
}

impl SelectorCache {
    pub fn new() -> Self {
        SelectorCache {
            entries: DashMap::new(),
            enabled: true,
        }
    }

    /// A cache that parses on every lookup and stores nothing
    pub fn disabled() -> Self {
        SelectorCache {
            entries: DashMap::new(),
            enabled: false,
        }
    }

    /// Return the parsed selector for `dsl`, parsing and storing it on a miss
    ///
    /// Concurrent misses on the same text may both parse; the last insert wins,
    /// and both results are equal.
    pub fn get_or_parse(&self, dsl: &str) -> Result<Arc<Selector>> {
        if let Some(hit) = self.entries.get(dsl) {
            debug!(selector = dsl, "selector cache hit");
            return Ok(Arc::clone(hit.value()));
        }

        let selector = Arc::new(parse(dsl)?);
        debug!(selector = dsl, cached = self.enabled, "parsed selector");

        if self.enabled {
            self.entries.insert(dsl.to_string(), Arc::clone(&selector));
        }

        Ok(selector)
    }

    pub fn contains(&self, dsl: &str) -> bool {
        self.entries.contains_key(dsl)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }
}

impl Default for SelectorCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_returns_same_selector() {
        let cache = SelectorCache::new();
        let first = cache.get_or_parse("name pojos{ name }").unwrap();
        let second = cache.get_or_parse("name pojos{ name }").unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_keys_are_exact_text() {
        let cache = SelectorCache::new();
        let spaced = cache.get_or_parse("name  age").unwrap();
        let single = cache.get_or_parse("name age").unwrap();

        assert_eq!(cache.len(), 2);
        assert_eq!(spaced, single);
    }

    #[test]
    fn test_errors_are_not_cached() {
        let cache = SelectorCache::new();
        assert!(cache.get_or_parse("name }").is_err());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_disabled_cache_stores_nothing() {
        let cache = SelectorCache::disabled();
        let first = cache.get_or_parse("name").unwrap();
        let second = cache.get_or_parse("name").unwrap();

        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(first, second);
        assert!(!cache.contains("name"));
    }

    #[test]
    fn test_clear() {
        let cache = SelectorCache::new();
        cache.get_or_parse("name").unwrap();
        cache.clear();
        assert!(cache.is_empty());
    }
}
