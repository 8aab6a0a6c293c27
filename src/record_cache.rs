// TTL cache for catalog records fetched from the REST API.
// Only fetched input snapshots are cached here; price breakdowns never are.

use dashmap::DashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

#[derive(Debug, Default)]
pub struct CacheStats {
    pub items_count: AtomicUsize,
    pub hit_count: AtomicUsize,
    pub miss_count: AtomicUsize,
    pub eviction_count: AtomicUsize,
    pub expired_count: AtomicUsize,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CacheStatsReport {
    pub items_count: usize,
    pub hit_count: usize,
    pub miss_count: usize,
    pub eviction_count: usize,
    pub expired_count: usize,
}

#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub ttl: Duration,
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(300),
            max_entries: 256,
        }
    }
}

struct CacheEntry<T> {
    value: T,
    created_at: Instant,
}

impl<T> CacheEntry<T> {
    fn is_expired(&self, ttl: Duration) -> bool {
        self.created_at.elapsed() > ttl
    }
}

pub struct RecordCache<T> {
    entries: DashMap<String, CacheEntry<T>>,
    config: CacheConfig,
    stats: CacheStats,
}

impl<T: Clone> RecordCache<T> {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            entries: DashMap::new(),
            config,
            stats: CacheStats::default(),
        }
    }

    pub fn get(&self, key: &str) -> Option<T> {
        let expired = match self.entries.get(key) {
            Some(entry) if !entry.is_expired(self.config.ttl) => {
                self.stats.hit_count.fetch_add(1, Ordering::SeqCst);
                tracing::debug!(key, "record cache hit");
                return Some(entry.value.clone());
            }
            Some(_) => true,
            None => false,
        };

        // re-checked under the write lock so a fresh insert is never dropped
        let ttl = self.config.ttl;
        if expired && self.entries.remove_if(key, |_, entry| entry.is_expired(ttl)).is_some() {
            self.stats.items_count.fetch_sub(1, Ordering::SeqCst);
            self.stats.expired_count.fetch_add(1, Ordering::SeqCst);
        }
        self.stats.miss_count.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(key, expired, "record cache miss");
        None
    }

    pub fn insert(&self, key: &str, value: T) {
        if self.config.max_entries == 0 {
            return;
        }
        if !self.entries.contains_key(key) {
            while self.entries.len() >= self.config.max_entries {
                if !self.evict_oldest() {
                    break;
                }
            }
        }

        let entry = CacheEntry {
            value,
            created_at: Instant::now(),
        };
        if self.entries.insert(key.to_string(), entry).is_none() {
            self.stats.items_count.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// Drop one key, or everything when `key` is `None`. Returns how many entries went.
    pub fn invalidate(&self, key: Option<&str>) -> usize {
        let removed = match key {
            Some(key) => usize::from(self.entries.remove(key).is_some()),
            None => {
                let mut count = 0;
                self.entries.retain(|_, _| {
                    count += 1;
                    false
                });
                count
            }
        };
        self.stats.items_count.fetch_sub(removed, Ordering::SeqCst);
        removed
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStatsReport {
        CacheStatsReport {
            items_count: self.stats.items_count.load(Ordering::SeqCst),
            hit_count: self.stats.hit_count.load(Ordering::SeqCst),
            miss_count: self.stats.miss_count.load(Ordering::SeqCst),
            eviction_count: self.stats.eviction_count.load(Ordering::SeqCst),
            expired_count: self.stats.expired_count.load(Ordering::SeqCst),
        }
    }

    fn evict_oldest(&self) -> bool {
        let oldest_key = self
            .entries
            .iter()
            .min_by_key(|entry| entry.value().created_at)
            .map(|entry| entry.key().clone());

        match oldest_key {
            Some(key) if self.entries.remove(&key).is_some() => {
                self.stats.items_count.fetch_sub(1, Ordering::SeqCst);
                self.stats.eviction_count.fetch_add(1, Ordering::SeqCst);
                true
            }
            _ => false,
        }
    }
}
