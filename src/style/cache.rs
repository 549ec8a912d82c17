use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::foundation::clock::{Clock, SystemClock};
use crate::style::layers::RenderLayer;

/// Bounds for the converted-style cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StyleCacheOpts {
    /// Maximum entries retained; the least recently used entry is evicted beyond this.
    pub capacity: usize,
    /// Entries older than this are rebuilt on next access.
    pub ttl: Option<Duration>,
}

impl Default for StyleCacheOpts {
    fn default() -> Self {
        Self {
            capacity: 64,
            ttl: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub style_id: String,
    pub toggles: String,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

struct Entry {
    layers: Arc<[RenderLayer]>,
    inserted_at: Instant,
}

#[derive(Default)]
struct Inner {
    map: HashMap<CacheKey, Entry>,
    lru: VecDeque<CacheKey>,
}

impl Inner {
    fn touch(&mut self, key: &CacheKey) {
        if let Some(pos) = self.lru.iter().position(|k| k == key) {
            self.lru.remove(pos);
        }
        self.lru.push_back(key.clone());
    }

    fn remove(&mut self, key: &CacheKey) {
        self.map.remove(key);
        if let Some(pos) = self.lru.iter().position(|k| k == key) {
            self.lru.remove(pos);
        }
    }
}

/// Shared LRU of resolved layer lists. Entries are immutable once inserted.
pub struct StyleCache {
    opts: StyleCacheOpts,
    clock: Arc<dyn Clock>,
    inner: Mutex<Inner>,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl std::fmt::Debug for StyleCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StyleCache")
            .field("opts", &self.opts)
            .field("stats", &self.stats())
            .finish()
    }
}

impl StyleCache {
    pub fn new(opts: StyleCacheOpts) -> Self {
        Self::with_clock(opts, Arc::new(SystemClock))
    }

    pub fn with_clock(opts: StyleCacheOpts, clock: Arc<dyn Clock>) -> Self {
        Self {
            opts,
            clock,
            inner: Mutex::new(Inner::default()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    pub fn get(&self, key: &CacheKey) -> Option<Arc<[RenderLayer]>> {
        let now = self.clock.now();
        let mut inner = self.lock();
        let expired = match inner.map.get(key) {
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                return None;
            }
            Some(e) => self
                .opts
                .ttl
                .is_some_and(|ttl| now.saturating_duration_since(e.inserted_at) >= ttl),
        };
        if expired {
            inner.remove(key);
            self.misses.fetch_add(1, Ordering::Relaxed);
            return None;
        }
        inner.touch(key);
        self.hits.fetch_add(1, Ordering::Relaxed);
        inner.map.get(key).map(|e| Arc::clone(&e.layers))
    }

    /// Insert unless another resolution already stored the key; returns the retained value.
    pub fn insert_if_absent(&self, key: CacheKey, layers: Arc<[RenderLayer]>) -> Arc<[RenderLayer]> {
        if self.opts.capacity == 0 {
            return layers;
        }
        let now = self.clock.now();
        let mut inner = self.lock();
        if let Some(existing) = inner.map.get(&key) {
            let out = Arc::clone(&existing.layers);
            inner.touch(&key);
            return out;
        }
        inner.map.insert(
            key.clone(),
            Entry {
                layers: Arc::clone(&layers),
                inserted_at: now,
            },
        );
        inner.touch(&key);
        while inner.lru.len() > self.opts.capacity {
            if let Some(old) = inner.lru.pop_front() {
                inner.map.remove(&old);
                self.evictions.fetch_add(1, Ordering::Relaxed);
            }
        }
        layers
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.lock().map.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // Entries are never half-written, so a poisoned lock still holds a consistent map.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/style/cache.rs"]
mod tests;
