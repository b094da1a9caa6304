//! In-memory LRU tier for media payloads.

use std::num::NonZeroUsize;
use std::sync::Arc;

use bytes::Bytes;
use lru::LruCache;
use tokio::sync::RwLock;
use tracing::{debug, trace};

use crate::domain::entities::CacheKey;

/// Default maximum number of payloads held in memory.
pub const DEFAULT_MEMORY_ENTRIES: usize = 10;

/// Entry-count-bounded memory tier.
///
/// Exists only to skip redundant disk reads within a session; it is never
/// persisted and never the sole source of truth. A miss here must still
/// consult the disk tier.
pub struct MemoryMediaStore {
    entries: Arc<RwLock<LruCache<CacheKey, Bytes>>>,
    hits: std::sync::atomic::AtomicU64,
    misses: std::sync::atomic::AtomicU64,
}

impl MemoryMediaStore {
    /// Creates a tier holding at most `capacity` payloads.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Arc::new(RwLock::new(LruCache::new(cap))),
            hits: std::sync::atomic::AtomicU64::new(0),
            misses: std::sync::atomic::AtomicU64::new(0),
        }
    }

    /// Creates a tier with the default capacity.
    #[must_use]
    pub fn with_default_capacity() -> Self {
        Self::new(DEFAULT_MEMORY_ENTRIES)
    }

    /// Payload for `key`, promoting it in the LRU order.
    pub async fn get(&self, key: &CacheKey) -> Option<Bytes> {
        let mut entries = self.entries.write().await;
        if let Some(data) = entries.get(key) {
            self.hits.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
            trace!(key = %key, "Memory tier hit");
            Some(data.clone())
        } else {
            self.misses
                .fetch_add(1, std::sync::atomic::Ordering::Relaxed);
            trace!(key = %key, "Memory tier miss");
            None
        }
    }

    /// Payload for `key` without promoting it.
    pub async fn peek(&self, key: &CacheKey) -> Option<Bytes> {
        let entries = self.entries.read().await;
        entries.peek(key).cloned()
    }

    /// Stores a payload, evicting the least recently used entry when full.
    pub async fn put(&self, key: CacheKey, data: Bytes) {
        let mut entries = self.entries.write().await;
        debug!(key = %key, size = data.len(), "Storing payload in memory tier");
        entries.put(key, data);
    }

    /// Drops the entry for `key`, if present.
    pub async fn remove(&self, key: &CacheKey) {
        let mut entries = self.entries.write().await;
        if entries.pop(key).is_some() {
            debug!(key = %key, "Evicted payload from memory tier");
        }
    }

    /// Number of held payloads (best-effort under concurrency).
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.try_read().map(|e| e.len()).unwrap_or(0)
    }

    /// Returns true when nothing is held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every entry.
    pub async fn clear(&self) {
        let mut entries = self.entries.write().await;
        entries.clear();
        debug!("Cleared memory tier");
    }

    /// Returns hit/miss statistics.
    #[must_use]
    pub fn stats(&self) -> MemoryStats {
        let hits = self.hits.load(std::sync::atomic::Ordering::Relaxed);
        let misses = self.misses.load(std::sync::atomic::Ordering::Relaxed);
        MemoryStats {
            hits,
            misses,
            size: self.len(),
        }
    }
}

impl Default for MemoryMediaStore {
    fn default() -> Self {
        Self::with_default_capacity()
    }
}

/// Memory tier statistics.
#[derive(Debug, Clone)]
pub struct MemoryStats {
    /// Number of lookup hits.
    pub hits: u64,
    /// Number of lookup misses.
    pub misses: u64,
    /// Current number of held payloads.
    pub size: usize,
}

impl std::fmt::Display for MemoryStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "memory tier: {} entries ({} hits, {} misses)",
            self.size, self.hits, self.misses
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::Locator;

    fn key(raw: &str) -> CacheKey {
        CacheKey::derive(&Locator::new(raw))
    }

    #[tokio::test]
    async fn test_put_and_get() {
        let store = MemoryMediaStore::new(4);
        let key = key("https://h/a.mp4");

        store.put(key.clone(), Bytes::from_static(b"data")).await;
        assert_eq!(store.get(&key).await.as_deref(), Some(b"data".as_ref()));
    }

    #[tokio::test]
    async fn test_miss() {
        let store = MemoryMediaStore::new(4);
        assert!(store.get(&key("https://h/missing.mp4")).await.is_none());
    }

    #[tokio::test]
    async fn test_lru_eviction_at_capacity() {
        let store = MemoryMediaStore::new(2);
        let a = key("https://h/a.mp4");
        let b = key("https://h/b.mp4");
        let c = key("https://h/c.mp4");

        store.put(a.clone(), Bytes::from_static(b"a")).await;
        store.put(b.clone(), Bytes::from_static(b"b")).await;
        store.put(c.clone(), Bytes::from_static(b"c")).await;

        assert!(store.get(&a).await.is_none());
        assert!(store.get(&b).await.is_some());
        assert!(store.get(&c).await.is_some());
    }

    #[tokio::test]
    async fn test_peek_does_not_promote() {
        let store = MemoryMediaStore::new(2);
        let a = key("https://h/a.mp4");
        let b = key("https://h/b.mp4");

        store.put(a.clone(), Bytes::from_static(b"a")).await;
        store.put(b.clone(), Bytes::from_static(b"b")).await;
        let _ = store.peek(&a).await;
        store.put(key("https://h/c.mp4"), Bytes::from_static(b"c")).await;

        assert!(store.peek(&a).await.is_none());
    }

    #[tokio::test]
    async fn test_clear_and_stats() {
        let store = MemoryMediaStore::new(4);
        let a = key("https://h/a.mp4");
        store.put(a.clone(), Bytes::from_static(b"a")).await;

        let _ = store.get(&a).await;
        let _ = store.get(&key("https://h/zzz.mp4")).await;

        let stats = store.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.size, 1);

        store.clear().await;
        assert!(store.is_empty());
    }
}
