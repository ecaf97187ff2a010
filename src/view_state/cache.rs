//! LRU cache for expensive render results, keyed by source text.

use lru::LruCache;
use std::borrow::Borrow;
use std::hash::Hash;
use std::num::NonZeroUsize;
use tracing::trace;

/// Capacity used when none (or zero) is configured.
pub const DEFAULT_CACHE_CAPACITY: usize = 1000;

/// Configuration for render cache.
///
/// Loaded from the `[cache]` section of the config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderCacheConfig {
    /// Maximum number of cached entries (default: 1000).
    pub capacity: usize,
}

impl Default for RenderCacheConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

/// Hit/miss/eviction counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    /// Lookups that found a value.
    pub hits: u64,
    /// Lookups that found nothing.
    pub misses: u64,
    /// Entries dropped to make room.
    pub evictions: u64,
}

/// Bounded LRU cache for rendered output.
///
/// `get` promotes the entry to most recently used; `has` does not.
/// Inserting past capacity evicts the least recently used entry, so
/// `len() <= capacity()` always holds.
pub struct RenderCache<V, K = String>
where
    K: Hash + Eq,
{
    cache: LruCache<K, V>,
    stats: CacheStats,
}

impl<V, K: Hash + Eq> RenderCache<V, K> {
    /// Create new cache with given capacity.
    ///
    /// If capacity is 0, uses default of 1000.
    ///
    /// ```
    /// # use tokflow::view_state::cache::RenderCache;
    /// let cache: RenderCache<u32> = RenderCache::new(0);
    /// assert_eq!(cache.capacity(), 1000);
    /// ```
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity)
            .or(NonZeroUsize::new(DEFAULT_CACHE_CAPACITY))
            .unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: LruCache::new(capacity),
            stats: CacheStats::default(),
        }
    }

    /// Create from config.
    pub fn from_config(config: &RenderCacheConfig) -> Self {
        Self::new(config.capacity)
    }

    /// Get cached value if present.
    ///
    /// Updates LRU ordering (most recently used).
    pub fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let value = self.cache.get(key);
        if value.is_some() {
            self.stats.hits += 1;
        } else {
            self.stats.misses += 1;
        }
        value
    }

    /// Insert or update a value, making it most recently used.
    ///
    /// If the key is new and the cache is full, evicts the least recently
    /// used entry.
    pub fn set(&mut self, key: K, value: V) {
        if !self.cache.contains(&key) && self.cache.len() == self.cache.cap().get() {
            self.stats.evictions += 1;
            trace!(capacity = self.cache.cap().get(), "Evicting render cache entry");
        }
        self.cache.put(key, value);
    }

    /// True if the key is cached. Does not change recency.
    pub fn has<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.cache.contains(key)
    }

    /// Clear the cache. Counters are kept.
    pub fn clear(&mut self) {
        self.cache.clear();
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Check if cache is empty.
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// Maximum number of entries.
    pub fn capacity(&self) -> usize {
        self.cache.cap().get()
    }

    /// Counters since construction.
    pub fn stats(&self) -> CacheStats {
        self.stats
    }
}

impl<V: Clone, K: Hash + Eq> RenderCache<V, K> {
    /// Return the cached value for `key`, computing and storing it on a miss.
    pub fn get_or_insert_with(&mut self, key: K, render: impl FnOnce() -> V) -> V {
        if let Some(value) = self.get(&key) {
            return value.clone();
        }
        let value = render();
        self.set(key, value.clone());
        value
    }
}

impl<V, K: Hash + Eq> Default for RenderCache<V, K> {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

impl<V, K: Hash + Eq> std::fmt::Debug for RenderCache<V, K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderCache")
            .field("len", &self.len())
            .field("capacity", &self.capacity())
            .field("stats", &self.stats)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Helper to create a test render.
    fn test_render(line_count: usize) -> Vec<String> {
        (0..line_count).map(|i| format!("Line {}", i)).collect()
    }

    // ===== RenderCacheConfig Tests =====

    #[test]
    fn render_cache_config_default_is_1000() {
        let config = RenderCacheConfig::default();
        assert_eq!(config.capacity, 1000);
    }

    #[test]
    fn render_cache_config_parses_from_toml() {
        let config: RenderCacheConfig = toml::from_str("capacity = 42").unwrap();
        assert_eq!(config.capacity, 42);

        let config: RenderCacheConfig = toml::from_str("").unwrap();
        assert_eq!(config.capacity, 1000);
    }

    // ===== RenderCache Tests =====

    #[test]
    fn render_cache_new_creates_empty_cache() {
        let cache: RenderCache<Vec<String>> = RenderCache::new(10);
        assert_eq!(cache.len(), 0);
        assert!(cache.is_empty());
        assert_eq!(cache.capacity(), 10);
    }

    #[test]
    fn render_cache_new_with_zero_capacity_uses_default() {
        let cache: RenderCache<Vec<String>> = RenderCache::new(0);
        assert_eq!(cache.len(), 0);
        assert_eq!(cache.capacity(), 1000);
    }

    #[test]
    fn render_cache_from_config_uses_config_capacity() {
        let config = RenderCacheConfig { capacity: 50 };
        let cache: RenderCache<Vec<String>> = RenderCache::from_config(&config);
        assert_eq!(cache.capacity(), 50);
    }

    #[test]
    fn render_cache_default_has_capacity_1000() {
        let cache: RenderCache<Vec<String>> = RenderCache::default();
        assert!(cache.is_empty());
        assert_eq!(cache.capacity(), 1000);
    }

    #[test]
    fn render_cache_set_and_get_stores_and_retrieves() {
        let mut cache = RenderCache::new(10);
        cache.set("x^2".to_string(), test_render(5));

        let retrieved = cache.get("x^2");
        assert!(retrieved.is_some(), "Should retrieve stored value");
        assert_eq!(retrieved.unwrap().len(), 5);
    }

    #[test]
    fn render_cache_get_returns_none_for_missing_key() {
        let mut cache: RenderCache<Vec<String>> = RenderCache::new(10);
        assert!(cache.get("missing").is_none(), "Should return None for missing key");
    }

    #[test]
    fn render_cache_set_overwrites_existing_key() {
        let mut cache = RenderCache::new(10);

        cache.set("k".to_string(), test_render(3));
        cache.set("k".to_string(), test_render(5));

        assert_eq!(cache.len(), 1);
        let retrieved = cache.get("k").unwrap();
        assert_eq!(retrieved.len(), 5, "Should have overwritten value");
    }

    #[test]
    fn render_cache_lru_eviction_removes_least_recently_used() {
        let mut cache = RenderCache::new(3);

        cache.set("k1".to_string(), test_render(1));
        cache.set("k2".to_string(), test_render(2));
        cache.set("k3".to_string(), test_render(3));

        assert_eq!(cache.len(), 3);

        // Adding 4th item should evict k1 (least recently used)
        cache.set("k4".to_string(), test_render(4));

        assert_eq!(cache.len(), 3, "Cache should stay at capacity");
        assert!(!cache.has("k1"), "k1 should be evicted");
        assert!(cache.has("k2"), "k2 should remain");
        assert!(cache.has("k3"), "k3 should remain");
        assert!(cache.has("k4"), "k4 should be present");
        assert_eq!(cache.stats().evictions, 1);
    }

    #[test]
    fn render_cache_get_updates_lru_ordering() {
        let mut cache = RenderCache::new(3);

        cache.set("k1".to_string(), test_render(1));
        cache.set("k2".to_string(), test_render(2));
        cache.set("k3".to_string(), test_render(3));

        // Access k1 to make it most recently used
        cache.get("k1");

        // Adding k4 should evict k2 (now least recently used)
        cache.set("k4".to_string(), test_render(4));

        assert!(cache.has("k1"), "k1 should remain (recently used)");
        assert!(!cache.has("k2"), "k2 should be evicted");
        assert!(cache.has("k3"), "k3 should remain");
        assert!(cache.has("k4"), "k4 should be present");
    }

    #[test]
    fn render_cache_has_does_not_update_lru_ordering() {
        let mut cache = RenderCache::new(2);

        cache.set("a".to_string(), 1);
        cache.set("b".to_string(), 2);
        assert!(cache.has("a"));

        cache.set("c".to_string(), 3);

        assert!(!cache.has("a"), "has() must not protect a from eviction");
        assert!(cache.has("b"));
    }

    #[test]
    fn render_cache_set_existing_key_promotes() {
        let mut cache = RenderCache::new(2);

        cache.set("a".to_string(), 1);
        cache.set("b".to_string(), 2);
        cache.set("a".to_string(), 10);
        cache.set("c".to_string(), 3);

        assert_eq!(cache.get("a"), Some(&10));
        assert!(!cache.has("b"));
        assert_eq!(cache.stats().evictions, 1);
    }

    #[test]
    fn render_cache_capacity_one_keeps_latest() {
        let mut cache = RenderCache::new(1);
        cache.set("a".to_string(), 1);
        cache.set("b".to_string(), 2);
        assert_eq!(cache.len(), 1);
        assert!(cache.has("b"));
    }

    #[test]
    fn render_cache_clear_removes_all_entries() {
        let mut cache = RenderCache::new(10);

        cache.set("k1".to_string(), test_render(1));
        cache.set("k2".to_string(), test_render(2));
        assert_eq!(cache.len(), 2);

        cache.clear();

        assert_eq!(cache.len(), 0);
        assert!(cache.is_empty());
        assert!(cache.get("k1").is_none(), "get after clear should miss");
    }

    #[test]
    fn render_cache_get_or_insert_with_computes_once() {
        let mut cache = RenderCache::new(4);
        let mut calls = 0;

        let first = cache.get_or_insert_with("\\frac{1}{2}".to_string(), || {
            calls += 1;
            test_render(2)
        });
        let second = cache.get_or_insert_with("\\frac{1}{2}".to_string(), || {
            calls += 1;
            test_render(9)
        });

        assert_eq!(calls, 1);
        assert_eq!(first, second);
        assert_eq!(cache.stats().hits, 1);
        assert_eq!(cache.stats().misses, 1);
    }

    #[test]
    fn render_cache_stats_count_hits_and_misses() {
        let mut cache = RenderCache::new(4);
        cache.set("a".to_string(), 1);

        cache.get("a");
        cache.get("a");
        cache.get("zzz");

        let stats = cache.stats();
        assert_eq!(stats.hits, 2);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.evictions, 0);
    }

    #[test]
    fn render_cache_supports_custom_key_types() {
        let mut cache: RenderCache<&str, (u16, u64)> = RenderCache::new(2);
        cache.set((80u16, 7u64), "wrapped");
        assert!(cache.has(&(80u16, 7u64)));
        assert!(!cache.has(&(100u16, 7u64)), "Different width should miss");
    }
}
