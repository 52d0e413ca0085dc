//! In-process cache tier with LRU eviction.
//!
//! Bounded by entry count rather than bytes. Eviction removes the least
//! recently used entry, tracked with a monotonic access counter.

use crate::cache::types::CacheKey;
use std::collections::HashMap;
use std::sync::Mutex;

/// Entry in the memory cache.
#[derive(Debug, Clone)]
struct Entry {
    /// Cached tile response bytes
    data: Vec<u8>,
    /// Access-counter value at last use, for LRU ordering
    last_used: u64,
}

/// Counters describing cache behavior, for logging and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemoryCacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

struct Inner {
    entries: HashMap<CacheKey, Entry>,
    /// Monotonic counter; incremented on every access
    tick: u64,
    stats: MemoryCacheStats,
}

/// In-process cache for raw tile responses.
///
/// Safe for concurrent read/insert from multiple fetch tasks.
pub struct MemoryCache {
    inner: Mutex<Inner>,
    max_entries: usize,
}

impl MemoryCache {
    /// Create a new memory cache bounded to `max_entries` entries.
    pub fn new(max_entries: usize) -> Self {
        Self {
            inner: Mutex::new(Inner {
                entries: HashMap::new(),
                tick: 0,
                stats: MemoryCacheStats::default(),
            }),
            max_entries,
        }
    }

    /// Get a cached response, marking the entry as recently used.
    pub fn get(&self, key: &CacheKey) -> Option<Vec<u8>> {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.tick += 1;
        let tick = inner.tick;

        let data = inner.entries.get_mut(key).map(|entry| {
            entry.last_used = tick;
            entry.data.clone()
        });

        match data {
            Some(data) => {
                inner.stats.hits += 1;
                Some(data)
            }
            None => {
                inner.stats.misses += 1;
                None
            }
        }
    }

    /// Insert a response, evicting least recently used entries when full.
    ///
    /// Re-inserting an existing key replaces its data without eviction.
    pub fn put(&self, key: CacheKey, data: Vec<u8>) {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.tick += 1;
        let tick = inner.tick;

        if !inner.entries.contains_key(&key) {
            while inner.entries.len() >= self.max_entries {
                let oldest = inner
                    .entries
                    .iter()
                    .min_by_key(|(_, entry)| entry.last_used)
                    .map(|(k, _)| k.clone());
                match oldest {
                    Some(k) => {
                        inner.entries.remove(&k);
                        inner.stats.evictions += 1;
                    }
                    None => break,
                }
            }
        }

        inner.entries.insert(
            key,
            Entry {
                data,
                last_used: tick,
            },
        );
    }

    /// Check if a key is currently cached.
    pub fn contains(&self, key: &CacheKey) -> bool {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.entries.contains_key(key)
    }

    /// Current number of cached entries.
    pub fn entry_count(&self) -> usize {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.entries.len()
    }

    /// Maximum number of entries this cache holds.
    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    /// Snapshot of hit/miss/eviction counters.
    pub fn stats(&self) -> MemoryCacheStats {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.stats
    }

    /// Remove all entries.
    pub fn clear(&self) {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.entries.clear();
    }
}
